//! Scenario catalog for the repository REST API.
//!
//! Each submodule declares one resource family. All requests share a template
//! carrying the media type, bearer credentials, and the target repository.
mod branches;
mod commits;
mod content;
mod repository;

use crate::config::{ApiSettings, TestData};
use crate::harness::{RequestTemplate, Scenario, ScenarioSuccess};
use serde_json::Value;

pub const ACCEPT: &str = "application/vnd.github+json";
pub const CREATED_REPO_KEY: &str = "created-repo-name";
pub const FILE_SHA_KEY: &str = "file-sha";

/// Everything the catalog needs to describe one run.
#[derive(Debug, Clone)]
pub struct ApiContext {
    pub settings: ApiSettings,
    pub data: TestData,
    /// Fixed per run so retries of the create call target the same name.
    pub created_repo_name: String,
    pub include_destructive: bool,
}

impl ApiContext {
    pub fn template(&self) -> RequestTemplate {
        let template = RequestTemplate::new(self.settings.base_url.as_str())
            .with_default_header("Accept", ACCEPT)
            .with_path_param("owner", self.data.owner.as_str())
            .with_path_param("repo", self.data.repo.as_str());
        match &self.settings.token {
            Some(token) => template.with_default_header("Authorization", format!("Bearer {token}")),
            None => template,
        }
    }
}

/// Every scenario in declaration order.
pub fn scenarios(ctx: &ApiContext) -> Vec<Scenario> {
    let mut scenarios = repository::scenarios(ctx);
    scenarios.extend(content::scenarios(ctx));
    scenarios.extend(branches::scenarios(ctx));
    scenarios.extend(commits::scenarios(ctx));
    scenarios
}

fn body(success: &ScenarioSuccess) -> Option<&Value> {
    success.response().and_then(|outcome| outcome.json_body().ok())
}

fn str_field<'a>(success: &'a ScenarioSuccess, field: &str) -> Option<&'a str> {
    body(success).and_then(|value| value.get(field)).and_then(Value::as_str)
}

/// String members named `field` across the elements of a top-level array.
fn names(success: &ScenarioSuccess, field: &str) -> Vec<String> {
    body(success)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(field).and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn list_detail(success: &ScenarioSuccess, field: &str, label: &str, empty: &str) -> String {
    let names = names(success, field);
    if names.is_empty() {
        empty.to_string()
    } else {
        format!("{label} ({}): {}", names.len(), names.join(", "))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::harness::Plan;

    pub(crate) fn context() -> ApiContext {
        ApiContext {
            settings: ApiSettings {
                base_url: "https://api.example.test".to_string(),
                token: Some("ghp_test".to_string()),
            },
            data: TestData {
                owner: "octo".to_string(),
                repo: "demo".to_string(),
                private_repo: false,
                update_description: "updated by harness".to_string(),
                branches: vec!["master".to_string(), "develop".to_string()],
                commit_ref: "master".to_string(),
                compare_base: "master".to_string(),
                compare_head: "develop".to_string(),
            },
            created_repo_name: "test-repo-1700000000000".to_string(),
            include_destructive: false,
        }
    }

    #[test]
    fn catalog_wires_into_a_valid_plan() {
        let plan = Plan::new(scenarios(&context())).unwrap();
        let names = plan.names();
        assert_eq!(names.first(), Some(&"list-branches"));
        let position = |name: &str| names.iter().position(|n| *n == name).unwrap();
        assert!(position("create-user-repository") < position("delete-user-repository"));
        assert!(position("create-file-content") < position("fetch-file-sha"));
        assert!(position("fetch-file-sha") < position("delete-file-content"));
        assert!(names.contains(&"get-branch[develop]"));
        assert!(!plan.get("delete-repository").unwrap().enabled);
    }

    #[test]
    fn destructive_scenarios_are_opt_in() {
        let mut ctx = context();
        ctx.include_destructive = true;
        let plan = Plan::new(scenarios(&ctx)).unwrap();
        assert!(plan.get("delete-repository").unwrap().enabled);
    }

    #[test]
    fn template_carries_credentials_and_media_type() {
        let request = context()
            .template()
            .build(crate::harness::Method::Get, "/repos/{owner}/{repo}", &[])
            .unwrap();
        assert_eq!(request.path, "/repos/octo/demo");
        assert_eq!(request.header("accept"), Some(ACCEPT));
        assert_eq!(request.header("authorization"), Some("Bearer ghp_test"));

        let mut anonymous = context();
        anonymous.settings.token = None;
        let request = anonymous
            .template()
            .build(crate::harness::Method::Get, "/repositories", &[])
            .unwrap();
        assert_eq!(request.header("authorization"), None);
    }
}
