//! Shared test infrastructure for integration tests.
//!
//! `MockApi` serves a small in-process imitation of the repository REST API
//! so the `rharness` binary can be driven end to end.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tempfile::TempDir;
use tiny_http::{Header, Response, Server};

pub const OWNER: &str = "octo";
pub const REPO: &str = "demo";
pub const TOKEN: &str = "test-token";
pub const SCENARIO_COUNT: usize = 21;

/// One request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
    pub authorization: Option<String>,
}

impl Recorded {
    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.split('&').find_map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| *key == name)
                .map(|(_, value)| value)
        })
    }
}

/// In-process HTTP server answering through a route handler.
pub struct MockApi {
    pub base_url: String,
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl MockApi {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, Value) + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind mock api"));
        let addr = server.server_addr().to_ip().expect("ip listener");
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let thread_server = Arc::clone(&server);
        let log = Arc::clone(&recorded);
        let handle = thread::spawn(move || {
            for mut request in thread_server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let url = request.url().to_string();
                let (path, query) = match url.split_once('?') {
                    Some((path, query)) => (path.to_string(), query.to_string()),
                    None => (url, String::new()),
                };
                let authorization = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Authorization"))
                    .map(|header| header.value.as_str().to_string());
                let seen = Recorded {
                    method: request.method().as_str().to_string(),
                    path,
                    query,
                    body,
                    authorization,
                };
                let (status, payload) = handler(&seen);
                log.lock().expect("record lock").push(seen);
                let text = if payload.is_null() {
                    String::new()
                } else {
                    payload.to_string()
                };
                let content_type =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("static header");
                let response = Response::from_string(text)
                    .with_status_code(status)
                    .with_header(content_type);
                let _ = request.respond(response);
            }
        });
        MockApi {
            base_url: format!("http://{addr}"),
            server,
            handle: Some(handle),
            recorded,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().expect("record lock").clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn repo_path(suffix: &str) -> String {
    format!("/repos/{OWNER}/{REPO}{suffix}")
}

/// Healthy API responses for every catalog endpoint.
pub fn healthy_api(request: &Recorded) -> (u16, Value) {
    let method = request.method.as_str();
    let path = request.path.as_str();
    let repo_root = repo_path("");
    let Some(rest) = path.strip_prefix(repo_root.as_str()) else {
        return account_routes(request);
    };
    match (method, rest) {
        ("GET", "") => (200, json!({"full_name": format!("{OWNER}/{REPO}"), "private": false})),
        ("PATCH", "") => {
            let body = request.json_body();
            (200, json!({"name": body["name"], "description": body["description"]}))
        }
        ("GET", "/events") => (200, json!([])),
        ("GET", "/automated-security-fixes") => (404, json!({"message": "Not Found"})),
        ("GET", "/contributors") => (200, json!([{"login": "octocat"}, {"login": "hubot"}])),
        ("GET", "/contents/README.md") => (
            200,
            json!({
                "name": "README.md",
                "type": "file",
                "encoding": "base64",
                "content": STANDARD.encode("# demo\n"),
            }),
        ),
        ("PUT", "/contents/test-file.txt") => (
            201,
            json!({"content": {"name": "test-file.txt"}, "commit": {"sha": "7638417d"}}),
        ),
        ("GET", "/contents/test-file.txt") => (200, json!({"sha": "3d21ec53a331a6f0"})),
        ("DELETE", "/contents/test-file.txt") => {
            (200, json!({"content": null, "commit": {"sha": "9a0b"}}))
        }
        ("GET", "/branches") => (200, json!([{"name": "master"}, {"name": "develop"}])),
        ("GET", "/commits") => (200, json!([{"sha": "a1"}, {"sha": "b2"}])),
        ("GET", rest) if rest.starts_with("/branches/") => {
            (200, json!({"name": &rest["/branches/".len()..]}))
        }
        ("GET", rest) if rest.starts_with("/commits/") => {
            (200, json!({"sha": "a1", "commit": {"message": "initial commit"}}))
        }
        ("GET", rest) if rest.starts_with("/compare/") => {
            (200, json!({"status": "ahead", "commits": [{"sha": "b2"}]}))
        }
        _ => not_found(),
    }
}

fn account_routes(request: &Recorded) -> (u16, Value) {
    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/repositories") => {
            let page: usize = request
                .query_param("page")
                .and_then(|page| page.parse().ok())
                .unwrap_or(1);
            let per_page: usize = request
                .query_param("per_page")
                .and_then(|size| size.parse().ok())
                .unwrap_or(30);
            if page >= 4 {
                return (200, json!([]));
            }
            let items: Vec<Value> = (0..per_page)
                .map(|idx| json!({"name": format!("public-{page}-{idx}")}))
                .collect();
            (200, Value::Array(items))
        }
        ("GET", "/user/repos") => (200, json!([{"name": REPO}])),
        ("POST", "/user/repos") => (201, json!({"name": request.json_body()["name"]})),
        ("DELETE", path) if path.starts_with(&format!("/repos/{OWNER}/test-repo-")) => {
            (204, Value::Null)
        }
        _ => not_found(),
    }
}

fn not_found() -> (u16, Value) {
    (404, json!({"message": "Not Found"}))
}

/// Write a test-data file into `dir` and return its path.
pub fn write_test_data(dir: &Path) -> PathBuf {
    let path = dir.join("TestData.json");
    let data = json!({
        "owner": OWNER,
        "repo": REPO,
        "privateRepo": false,
        "updateDescription": "updated by integration test",
    });
    std::fs::write(&path, data.to_string()).expect("write test data");
    path
}

/// Run `rharness` against `api` with a fresh test-data file.
pub fn run_harness(api: &MockApi, args: &[&str]) -> (Output, TempDir) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let test_data = write_test_data(temp_dir.path());
    let output = Command::new(env!("CARGO_BIN_EXE_rharness"))
        .args(args)
        .arg("--test-data")
        .arg(&test_data)
        .env("GITHUB_API_BASE_URI", &api.base_url)
        .env("GITHUB_TOKEN", TOKEN)
        .env_remove("RUST_LOG")
        .output()
        .expect("run rharness");
    (output, temp_dir)
}

pub fn read_report(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).expect("read report");
    serde_json::from_str(&text).expect("parse report")
}

pub fn entry<'a>(report: &'a Value, scenario: &str) -> &'a Value {
    report["entries"]
        .as_array()
        .and_then(|entries| entries.iter().find(|entry| entry["scenario"] == scenario))
        .unwrap_or_else(|| panic!("no report entry for {scenario}"))
}
