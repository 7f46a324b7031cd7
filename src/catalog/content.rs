//! Repository contents: read a known file, then create and remove a scratch file.
use super::{body, str_field, ApiContext, FILE_SHA_KEY};
use crate::harness::{Contract, Method, Scenario, ScenarioSuccess};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

const README_PATH: &str = "README.md";
const SCRATCH_PATH: &str = "test-file.txt";
const SCRATCH_CONTENT: &str = "This is a test file created by API.";
const CONTENTS_PATH: &str = "/repos/{owner}/{repo}/contents/{path}";

pub(super) fn scenarios(ctx: &ApiContext) -> Vec<Scenario> {
    let repo = ctx.data.repo.clone();
    let mut scenarios = Vec::new();

    let template = ctx.template();
    scenarios.push(
        Scenario::single(
            "get-repository-content",
            1,
            Contract::status(200)
                .equals("name", README_PATH)
                .any_of("type", ["file", "dir"]),
            move |_| template.build(Method::Get, CONTENTS_PATH, &[("path", README_PATH)]),
        )
        .summarize(readme_detail),
    );

    let template = ctx.template();
    let create = json!({
        "message": format!("Create {SCRATCH_PATH} via API"),
        "content": STANDARD.encode(SCRATCH_CONTENT),
    });
    let created_in = repo.clone();
    scenarios.push(
        Scenario::single(
            "create-file-content",
            2,
            Contract::status(201)
                .equals("content.name", SCRATCH_PATH)
                .member_present("commit"),
            move |_| {
                Ok(template
                    .build(Method::Put, CONTENTS_PATH, &[("path", SCRATCH_PATH)])?
                    .with_json_body(create.clone()))
            },
        )
        .summarize(move |_| format!("File '{SCRATCH_PATH}' created in {created_in}")),
    );

    let template = ctx.template();
    scenarios.push(
        Scenario::single(
            "fetch-file-sha",
            3,
            Contract::status(200).not_null("sha"),
            move |_| template.build(Method::Get, CONTENTS_PATH, &[("path", SCRATCH_PATH)]),
        )
        .requires("create-file-content")
        .produces(FILE_SHA_KEY, "sha")
        .summarize(|success| format!("sha {}", str_field(success, "sha").unwrap_or_default())),
    );

    let template = ctx.template();
    let deleted = Contract::status(200).member_present("content").member_present("commit");
    scenarios.push(
        Scenario::single("delete-file-content", 3, deleted, move |view| {
            let sha = view.require_str(FILE_SHA_KEY)?;
            Ok(template
                .build(Method::Delete, CONTENTS_PATH, &[("path", SCRATCH_PATH)])?
                .with_json_body(json!({
                    "message": format!("Delete {SCRATCH_PATH} via API"),
                    "sha": sha,
                })))
        })
        .requires("fetch-file-sha")
        .summarize(move |_| format!("File '{SCRATCH_PATH}' deleted from {repo}")),
    );

    scenarios
}

fn readme_detail(success: &ScenarioSuccess) -> String {
    let Some(value) = body(success) else {
        return String::new();
    };
    let kind = value.get("type").and_then(Value::as_str).unwrap_or("unknown");
    let encoded = value.get("content").and_then(Value::as_str);
    let encoding = value.get("encoding").and_then(Value::as_str);
    match (encoded, encoding) {
        (Some(encoded), Some(encoding)) if encoding.eq_ignore_ascii_case("base64") => {
            match decode_content(encoded) {
                Some(decoded) => format!("{README_PATH} ({kind}, {} bytes decoded)", decoded.len()),
                None => format!("{README_PATH} ({kind}, content is not valid base64)"),
            }
        }
        _ => format!("{README_PATH} ({kind}, content not available as base64)"),
    }
}

/// Decode API file content, which arrives base64 encoded with line breaks.
fn decode_content(encoded: &str) -> Option<Vec<u8>> {
    let compact: String = encoded.chars().filter(|ch| !ch.is_whitespace()).collect();
    STANDARD.decode(compact).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::scenarios as catalog;
    use crate::catalog::tests::context;
    use crate::harness::testing::ScriptedTransport;
    use crate::harness::{ConsoleSink, EntryStatus, Orchestrator, Plan, ResponseOutcome, RetryPolicy};

    #[test]
    fn wrapped_base64_content_is_decoded() {
        let encoded = STANDARD.encode("# demo\n\nhello world\n");
        let wrapped = format!("{}\n{}", &encoded[..8], &encoded[8..]);
        assert_eq!(
            decode_content(&wrapped).unwrap(),
            b"# demo\n\nhello world\n".to_vec()
        );
        assert!(decode_content("***").is_none());
    }

    #[test]
    fn readme_detail_reports_decoded_size() {
        let success = ScenarioSuccess::Response(ResponseOutcome::json(
            200,
            &json!({
                "name": "README.md",
                "type": "file",
                "encoding": "base64",
                "content": STANDARD.encode("hello"),
            }),
        ));
        assert_eq!(readme_detail(&success), "README.md (file, 5 bytes decoded)");
    }

    #[test]
    fn scratch_file_is_deleted_with_the_fetched_sha() {
        let transport = ScriptedTransport::new(vec![
            Ok(ResponseOutcome::json(
                201,
                &json!({"content": {"name": SCRATCH_PATH}, "commit": {"sha": "7638417d"}}),
            )),
            Ok(ResponseOutcome::json(200, &json!({"sha": "3d21ec53"}))),
            Ok(ResponseOutcome::json(200, &json!({"content": null, "commit": {"sha": "9a0b"}}))),
        ]);
        let plan = Plan::new(catalog(&context())).unwrap();
        let mut sink = ConsoleSink::new(Vec::new());
        let report = Orchestrator::new(&transport, RetryPolicy::default())
            .only(
                ["create-file-content", "fetch-file-sha", "delete-file-content"]
                    .map(String::from),
            )
            .run(&plan, &mut sink);
        assert_eq!(report.counts.pass, 3, "{:?}", report.entries);

        let sent = transport.sent();
        assert_eq!(sent[0].method, Method::Put);
        assert_eq!(
            sent[0].body.as_ref().unwrap()["content"],
            json!(STANDARD.encode(SCRATCH_CONTENT))
        );
        assert_eq!(sent[2].method, Method::Delete);
        assert_eq!(sent[2].path, "/repos/octo/demo/contents/test-file.txt");
        assert_eq!(sent[2].body.as_ref().unwrap()["sha"], json!("3d21ec53"));
    }

    #[test]
    fn failed_create_skips_the_whole_chain() {
        let transport = ScriptedTransport::new(vec![Ok(ResponseOutcome::json(
            422,
            &json!({"message": "sha wasn't supplied"}),
        ))]);
        let plan = Plan::new(catalog(&context())).unwrap();
        let mut sink = ConsoleSink::new(Vec::new());
        let report = Orchestrator::new(&transport, RetryPolicy::default())
            .only(
                ["create-file-content", "fetch-file-sha", "delete-file-content"]
                    .map(String::from),
            )
            .run(&plan, &mut sink);
        assert_eq!(report.entry("create-file-content").unwrap().status, EntryStatus::Fail);
        assert_eq!(report.entry("fetch-file-sha").unwrap().status, EntryStatus::Skipped);
        assert_eq!(report.entry("delete-file-content").unwrap().status, EntryStatus::Skipped);
        assert_eq!(transport.sent().len(), 1);
    }
}
