//! Request templates and the immutable request values built from them.
use super::error::HarnessError;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const PLACEHOLDER_PATTERN: &str = r"\{([A-Za-z_][A-Za-z0-9_-]*)\}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base request description shared by every scenario of a run.
#[derive(Debug, Clone, Default)]
pub struct RequestTemplate {
    base_url: String,
    default_headers: Vec<(String, String)>,
    path_params: BTreeMap<String, String>,
}

impl RequestTemplate {
    pub fn new(base_url: impl Into<String>) -> Self {
        RequestTemplate {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_headers: Vec::new(),
            path_params: BTreeMap::new(),
        }
    }

    pub fn with_default_header(mut self, name: &str, value: impl Into<String>) -> Self {
        upsert_header(&mut self.default_headers, name, value.into());
        self
    }

    pub fn with_path_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path_params.insert(name.to_string(), value.into());
        self
    }

    /// Resolve `path_template` against template-level params overlaid with
    /// `params`, failing on any placeholder left without a value.
    pub fn build(
        &self,
        method: Method,
        path_template: &str,
        params: &[(&str, &str)],
    ) -> Result<RequestSpec, HarnessError> {
        let placeholder = Regex::new(PLACEHOLDER_PATTERN)
            .map_err(|err| HarnessError::configuration(format!("placeholder pattern: {err}")))?;
        let mut missing = Vec::new();
        let path = placeholder.replace_all(path_template, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let value = params
                .iter()
                .rev()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
                .or_else(|| self.path_params.get(name).cloned());
            match value {
                Some(value) => value,
                None => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        });
        if let Some(name) = missing.first() {
            return Err(HarnessError::configuration(format!(
                "path template {path_template:?} references unresolved parameter {{{name}}}"
            )));
        }
        let stray = placeholder.replace_all(path_template, "");
        if stray.contains('{') || stray.contains('}') {
            return Err(HarnessError::configuration(format!(
                "path template {path_template:?} contains a malformed placeholder"
            )));
        }
        let path = if path.starts_with('/') {
            path.into_owned()
        } else {
            format!("/{path}")
        };
        Ok(RequestSpec {
            base_url: self.base_url.clone(),
            method,
            path,
            query: BTreeMap::new(),
            headers: self.default_headers.clone(),
            body: None,
        })
    }
}

/// Fully resolved request. Specialization consumes and returns a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub base_url: String,
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        upsert_header(&mut self.headers, name, value.into());
        self
    }

    pub fn with_query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_json_body(mut self, body: Value) -> Self {
        if self.header("content-type").is_none() {
            upsert_header(&mut self.headers, "Content-Type", "application/json".to_string());
        }
        self.body = Some(body);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Absolute URL without the query string.
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    /// Method and path with query, used in logs and diagnostics.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            return format!("{} {}", self.method, self.path);
        }
        let query = self
            .query
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{} {}?{}", self.method, self.path, query)
    }

    pub fn body_bytes(&self) -> Option<Vec<u8>> {
        self.body.as_ref().map(|body| body.to_string().into_bytes())
    }
}

fn upsert_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value));
}
