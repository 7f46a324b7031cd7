//! Commit history, single-commit lookup, and ref comparison.
use super::{body, str_field, ApiContext};
use crate::harness::{Contract, Method, Scenario};
use serde_json::Value;

pub(super) fn scenarios(ctx: &ApiContext) -> Vec<Scenario> {
    let data = &ctx.data;
    let mut scenarios = Vec::new();

    let template = ctx.template();
    scenarios.push(
        Scenario::single(
            "list-commits",
            1,
            Contract::status(200).not_null("sha").not_null("0.sha"),
            move |_| template.build(Method::Get, "/repos/{owner}/{repo}/commits", &[]),
        )
        .summarize(|success| {
            let count = body(success).and_then(Value::as_array).map_or(0, Vec::len);
            format!("Commits: {count}")
        }),
    );

    let template = ctx.template();
    let reference = data.commit_ref.clone();
    scenarios.push(
        Scenario::single(
            "get-commit-by-ref",
            2,
            Contract::status(200).not_null("sha").not_null("commit.message"),
            move |_| {
                template.build(
                    Method::Get,
                    "/repos/{owner}/{repo}/commits/{ref}",
                    &[("ref", reference.as_str())],
                )
            },
        )
        .summarize(|success| {
            format!("Commit SHA: {}", str_field(success, "sha").unwrap_or_default())
        }),
    );

    let template = ctx.template();
    let basehead = format!("{}...{}", data.compare_base, data.compare_head);
    scenarios.push(
        Scenario::single(
            "compare-commits",
            3,
            Contract::status(200).not_null("status").not_null("commits"),
            move |_| {
                template.build(
                    Method::Get,
                    "/repos/{owner}/{repo}/compare/{basehead}",
                    &[("basehead", basehead.as_str())],
                )
            },
        )
        .summarize(|success| {
            let status = str_field(success, "status").unwrap_or("unknown");
            let commits = body(success)
                .and_then(|value| value.get("commits"))
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            format!("Comparison status: {status}, {commits} commits")
        }),
    );

    scenarios
}
