//! Run configuration: API endpoint and credentials from the environment,
//! target repository details from the test-data file.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const BASE_URI_ENV: &str = "GITHUB_API_BASE_URI";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const DEFAULT_BASE_URI: &str = "https://api.github.com";
pub const DEFAULT_TEST_DATA: &str = "testdata/TestData.json";

/// Target repository and expected values, read once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestData {
    pub owner: String,
    pub repo: String,
    pub private_repo: bool,
    pub update_description: String,
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,
    #[serde(default = "default_commit_ref")]
    pub commit_ref: String,
    #[serde(default = "default_compare_base")]
    pub compare_base: String,
    #[serde(default = "default_compare_head")]
    pub compare_head: String,
}

fn default_branches() -> Vec<String> {
    vec!["master".to_string(), "develop".to_string()]
}

fn default_commit_ref() -> String {
    "master".to_string()
}

fn default_compare_base() -> String {
    "master".to_string()
}

fn default_compare_head() -> String {
    "develop".to_string()
}

/// Load and validate the test-data JSON file.
pub fn load_test_data(path: &Path) -> Result<TestData> {
    let bytes = fs::read(path).with_context(|| format!("read test data {}", path.display()))?;
    let data: TestData = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse test data {}", path.display()))?;
    validate_test_data(&data).with_context(|| format!("validate test data {}", path.display()))?;
    Ok(data)
}

fn validate_test_data(data: &TestData) -> Result<()> {
    if data.owner.trim().is_empty() {
        return Err(anyhow!("owner must not be empty"));
    }
    if data.repo.trim().is_empty() {
        return Err(anyhow!("repo must not be empty"));
    }
    if let Some(branch) = data.branches.iter().find(|branch| branch.trim().is_empty()) {
        return Err(anyhow!("branch names must not be empty (got {branch:?})"));
    }
    let mut seen = BTreeSet::new();
    if let Some(branch) = data.branches.iter().find(|branch| !seen.insert(branch.as_str())) {
        return Err(anyhow!("branch {branch:?} is listed more than once"));
    }
    Ok(())
}

/// API endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: Option<String>,
}

impl ApiSettings {
    /// Resolve settings through `lookup` (normally `std::env::var`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(BASE_URI_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URI.to_string());
        let token = lookup(TOKEN_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        ApiSettings { base_url, token }
    }

    pub fn from_env() -> Self {
        ApiSettings::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow!("{TOKEN_ENV} must be set to run scenarios"))
    }
}
