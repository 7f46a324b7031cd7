//! Repository metadata, listing, and lifecycle scenarios.
use super::{body, list_detail, names, str_field, ApiContext, CREATED_REPO_KEY};
use crate::harness::{Contract, Method, PageOptions, Scenario, ScenarioSuccess};
use serde_json::{json, Value};

const CREATED_REPO_DESCRIPTION: &str = "Repository created via API test";

pub(super) fn scenarios(ctx: &ApiContext) -> Vec<Scenario> {
    let data = &ctx.data;
    let full_name = format!("{}/{}", data.owner, data.repo);
    let mut scenarios = Vec::new();

    let template = ctx.template();
    scenarios.push(
        Scenario::single(
            "get-repository",
            1,
            Contract::status(200)
                .equals("full_name", full_name.as_str())
                .equals("private", data.private_repo),
            move |_| template.build(Method::Get, "/repos/{owner}/{repo}", &[]),
        )
        .summarize(|success| {
            format!(
                "Repository: {}",
                str_field(success, "full_name").unwrap_or("<unknown>")
            )
        }),
    );

    let template = ctx.template();
    let update = json!({"name": data.repo, "description": data.update_description});
    scenarios.push(
        Scenario::single(
            "update-repository",
            2,
            Contract::status(200).equals("description", data.update_description.as_str()),
            move |_| {
                Ok(template
                    .build(Method::Patch, "/repos/{owner}/{repo}", &[])?
                    .with_json_body(update.clone()))
            },
        )
        .summarize(|success| {
            format!(
                "Description: {}",
                str_field(success, "description").unwrap_or_default()
            )
        }),
    );

    let template = ctx.template();
    scenarios.push(
        Scenario::single("list-repository-events", 3, Contract::status(200), move |_| {
            template.build(Method::Get, "/repos/{owner}/{repo}/events", &[])
        })
        .summarize(|success| match body(success).and_then(Value::as_array) {
            Some(events) if !events.is_empty() => format!("{} events found", events.len()),
            _ => "no events found (empty list is valid)".to_string(),
        }),
    );

    let template = ctx.template();
    let deleted = full_name.clone();
    scenarios.push(
        Scenario::single("delete-repository", 4, Contract::status(204), move |_| {
            template.build(Method::Delete, "/repos/{owner}/{repo}", &[])
        })
        .enabled(ctx.include_destructive)
        .summarize(move |_| format!("Repository deleted: {deleted}")),
    );

    let template = ctx.template();
    scenarios.push(
        Scenario::single(
            "check-automated-security-fixes",
            5,
            Contract::any_status([200, 204, 404]),
            move |_| template.build(Method::Get, "/repos/{owner}/{repo}/automated-security-fixes", &[]),
        )
        .summarize(security_fixes_detail),
    );

    let template = ctx.template();
    scenarios.push(
        Scenario::single("list-contributors", 6, Contract::status(200), move |_| {
            template.build(Method::Get, "/repos/{owner}/{repo}/contributors", &[])
        })
        .summarize(|success| list_detail(success, "login", "Contributors", "no contributors found")),
    );

    let template = ctx.template();
    scenarios.push(
        Scenario::single("list-public-repositories", 7, Contract::status(200), move |_| {
            template.build(Method::Get, "/repositories", &[])
        })
        .summarize(|success| {
            let count = names(success, "name").len();
            if count == 0 {
                "no public repositories found".to_string()
            } else {
                format!("Count: {count}")
            }
        }),
    );

    let template = ctx.template();
    let options = PageOptions::default();
    scenarios.push(
        Scenario::paginated(
            "list-public-repositories-paginated",
            8,
            Contract::status(200),
            "name",
            options,
            move |_| template.build(Method::Get, "/repositories", &[]),
        )
        .summarize(move |success| match success {
            ScenarioSuccess::Pages(pages) => {
                let counts: Vec<String> = pages.page_counts.iter().map(usize::to_string).collect();
                format!(
                    "Total repositories from {} pages: {} (per page: {})",
                    options.max_pages,
                    pages.items.len(),
                    counts.join(", ")
                )
            }
            ScenarioSuccess::Response(_) => String::new(),
        }),
    );

    let template = ctx.template();
    scenarios.push(
        Scenario::single("list-user-repositories", 9, Contract::status(200), move |_| {
            template.build(Method::Get, "/user/repos", &[])
        })
        .summarize(|success| {
            list_detail(
                success,
                "name",
                "Repositories",
                "no repositories found for the authenticated user",
            )
        }),
    );

    let template = ctx.template();
    let created = ctx.created_repo_name.clone();
    let create = json!({
        "name": created,
        "description": CREATED_REPO_DESCRIPTION,
        "private": false,
    });
    scenarios.push(
        Scenario::single(
            "create-user-repository",
            10,
            Contract::status(201).equals("name", created.as_str()),
            move |_| {
                Ok(template
                    .build(Method::Post, "/user/repos", &[])?
                    .with_json_body(create.clone()))
            },
        )
        .produces(CREATED_REPO_KEY, "name")
        .summarize(|success| {
            format!("Repository: {}", str_field(success, "name").unwrap_or_default())
        }),
    );

    let template = ctx.template();
    scenarios.push(
        Scenario::single("delete-user-repository", 11, Contract::status(204), move |view| {
            let name = view.require_str(CREATED_REPO_KEY)?;
            template.build(Method::Delete, "/repos/{owner}/{name}", &[("name", name)])
        })
        .requires("create-user-repository")
        .summarize(move |_| format!("Repository deleted: {created}")),
    );

    scenarios
}

fn security_fixes_detail(success: &ScenarioSuccess) -> String {
    match success.response().map(|outcome| outcome.status) {
        Some(204) => "automated security fixes enabled".to_string(),
        Some(404) => "automated security fixes not enabled".to_string(),
        Some(status) => format!("status {status}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::tests::context;
    use crate::catalog::{scenarios, CREATED_REPO_KEY};
    use crate::harness::{
        ConsoleSink, EntryStatus, Orchestrator, Plan, ResponseOutcome, RetryPolicy,
    };
    use crate::harness::testing::ScriptedTransport;
    use serde_json::json;

    fn run_only(
        names: &[&str],
        script: Vec<ResponseOutcome>,
    ) -> (crate::harness::RunReport, ScriptedTransport) {
        let transport = ScriptedTransport::new(script.into_iter().map(Ok).collect());
        let plan = Plan::new(scenarios(&context())).unwrap();
        let mut sink = ConsoleSink::new(Vec::new());
        let report = Orchestrator::new(&transport, RetryPolicy::default())
            .only(names.iter().map(|name| name.to_string()))
            .run(&plan, &mut sink);
        (report, transport)
    }

    #[test]
    fn repository_contract_checks_full_name_and_privacy() {
        let (report, transport) = run_only(
            &["get-repository"],
            vec![ResponseOutcome::json(200, &json!({"full_name": "octo/demo", "private": false}))],
        );
        let entry = report.entry("get-repository").unwrap();
        assert_eq!(entry.status, EntryStatus::Pass);
        assert_eq!(entry.detail.as_deref(), Some("Repository: octo/demo"));
        assert_eq!(transport.sent()[0].path, "/repos/octo/demo");

        let (report, _) = run_only(
            &["get-repository"],
            vec![ResponseOutcome::json(200, &json!({"full_name": "octo/demo", "private": true}))],
        );
        let entry = report.entry("get-repository").unwrap();
        assert_eq!(entry.status, EntryStatus::Fail);
        assert!(entry.diagnostic.as_deref().unwrap().contains("private"));
    }

    #[test]
    fn security_fixes_accepts_absent_configuration() {
        let (report, _) = run_only(
            &["check-automated-security-fixes"],
            vec![ResponseOutcome::new(404, Default::default(), "")],
        );
        let entry = report.entry("check-automated-security-fixes").unwrap();
        assert_eq!(entry.status, EntryStatus::Pass);
        assert_eq!(entry.detail.as_deref(), Some("automated security fixes not enabled"));
    }

    #[test]
    fn created_repository_is_deleted_by_name() {
        let ctx = context();
        let (report, transport) = run_only(
            &["create-user-repository", "delete-user-repository"],
            vec![
                ResponseOutcome::json(201, &json!({"name": ctx.created_repo_name})),
                ResponseOutcome::new(204, Default::default(), ""),
            ],
        );
        assert_eq!(report.counts.pass, 2, "{:?}", report.entries);
        let sent = transport.sent();
        assert_eq!(sent[0].body.as_ref().unwrap()["name"], json!(ctx.created_repo_name));
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
        assert_eq!(sent[1].path, format!("/repos/octo/{}", ctx.created_repo_name));
        assert_eq!(CREATED_REPO_KEY, "created-repo-name");
    }
}
