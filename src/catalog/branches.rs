//! Branch listing and per-branch lookups.
use super::{list_detail, ApiContext};
use crate::harness::{Contract, Method, Scenario};

const GET_BRANCH_PRIORITY: i32 = 16;

pub(super) fn scenarios(ctx: &ApiContext) -> Vec<Scenario> {
    let mut scenarios = Vec::new();

    let template = ctx.template();
    scenarios.push(
        Scenario::single(
            "list-branches",
            0,
            Contract::status(200).not_null("name").not_null("0.name"),
            move |_| template.build(Method::Get, "/repos/{owner}/{repo}/branches", &[]),
        )
        .summarize(|success| list_detail(success, "name", "Branches", "no branches found")),
    );

    for branch in &ctx.data.branches {
        let template = ctx.template();
        let name = branch.clone();
        let fetched = branch.clone();
        scenarios.push(
            Scenario::single(
                &format!("get-branch[{branch}]"),
                GET_BRANCH_PRIORITY,
                Contract::status(200).equals("name", branch.as_str()),
                move |_| {
                    template.build(
                        Method::Get,
                        "/repos/{owner}/{repo}/branches/{branch}",
                        &[("branch", name.as_str())],
                    )
                },
            )
            .summarize(move |_| format!("Branch details fetched for: {fetched}")),
        );
    }

    scenarios
}
