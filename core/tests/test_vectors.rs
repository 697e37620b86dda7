//! Verify envelopes and reply classification against JSON vectors stored in
//! `test-vectors/`.
//!
//! Each envelope vector names a typed call, its input, and the body that must
//! reach the wire. Each response vector gives a status, a raw body and the
//! number of targeted services, then the expected classification. Comparing
//! parsed JSON (not raw strings) avoids false negatives from key ordering.

use kea_ctrl_core::{
    protocol::parse_response, ClientConfig, ErrorKind, HttpRequest, TransactionContext, Transport,
};
use serde_json::Value;

/// Records every request and answers with a fixed success.
#[derive(Default)]
struct Recorder {
    sent: Vec<HttpRequest>,
}

impl Transport for Recorder {
    fn post(&mut self, request: &HttpRequest, sink: &mut Vec<u8>) -> Result<u16, String> {
        self.sent.push(request.clone());
        sink.extend_from_slice(br#"[{"result":0,"text":"ok"}]"#);
        Ok(200)
    }
}

fn context() -> TransactionContext<Recorder> {
    TransactionContext::with_transport(ClientConfig::default(), Recorder::default()).unwrap()
}

fn str_arg<'a>(input: &'a Value, key: &str) -> &'a str {
    input[key].as_str().unwrap()
}

fn u32_arg(input: &Value, key: &str) -> u32 {
    input[key].as_u64().unwrap() as u32
}

fn kind_named(name: &str) -> ErrorKind {
    match name {
        "HttpStatus" => ErrorKind::HttpStatus,
        "MalformedResponse" => ErrorKind::MalformedResponse,
        "Command" => ErrorKind::Command,
        other => panic!("unknown error kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[test]
fn envelope_test_vectors() {
    let raw = include_str!("../../test-vectors/envelopes.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let mut ctx = context();

        let result = match case["call"].as_str().unwrap() {
            "list_commands" => ctx.list_commands(str_arg(input, "service")),
            "version_get" => {
                let services: Vec<&str> = input["services"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|s| s.as_str().unwrap())
                    .collect();
                ctx.version_get(&services)
            }
            "config_set" => ctx.config_set(str_arg(input, "service"), &input["config"]),
            "config_write" => {
                ctx.config_write(str_arg(input, "service"), str_arg(input, "filename"))
            }
            "subnet4_get" => ctx.subnet4_get(u32_arg(input, "subnet_id")),
            "lease4_get_by_ip" => ctx.lease4_get_by_ip(str_arg(input, "ip_address")),
            "lease4_get_all" => ctx.lease4_get_all(u32_arg(input, "subnet_id")),
            "lease4_wipe" => ctx.lease4_wipe(u32_arg(input, "subnet_id")),
            "lease6_get_by_duid" => {
                ctx.lease6_get_by_duid(str_arg(input, "duid"), u32_arg(input, "iaid"))
            }
            "statistic_get" => ctx.statistic_get(str_arg(input, "service"), str_arg(input, "name")),
            "reservation_get_all" => {
                ctx.reservation_get_all(str_arg(input, "service"), u32_arg(input, "subnet_id"))
            }
            other => panic!("{name}: unknown call {other}"),
        };
        result.unwrap_or_else(|e| panic!("{name}: {e}"));

        let sent = &ctx.transport().sent;
        assert_eq!(sent.len(), 1, "{name}: one request");
        assert_eq!(sent[0].url, "http://127.0.0.1:8000/", "{name}: url");
        assert!(
            sent[0]
                .headers
                .contains(&("Authorization".to_string(), "Basic cm9vdDpyb290".to_string())),
            "{name}: authorization header"
        );

        let body: Value = serde_json::from_str(&sent[0].body).unwrap();
        assert_eq!(body, case["expected_body"], "{name}: body");
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap();
        let targeted = case["targeted"].as_u64().unwrap() as usize;
        let expected = &case["expected"];

        let result = parse_response(status, body.as_bytes(), targeted);
        match expected.get("entries") {
            Some(entries) => {
                let response = result.unwrap_or_else(|e| panic!("{name}: {e}"));
                assert_eq!(response.len() as u64, entries.as_u64().unwrap(), "{name}: entries");
                let reparsed: Value = serde_json::from_str(&response.to_json_string()).unwrap();
                let original: Value = serde_json::from_str(body).unwrap();
                assert_eq!(reparsed, original, "{name}: entries preserved");
            }
            None => {
                let err = result.expect_err(name);
                assert_eq!(err.kind(), kind_named(expected["error"].as_str().unwrap()), "{name}: kind");
                assert_eq!(err.to_string(), expected["message"].as_str().unwrap(), "{name}: message");
            }
        }
    }
}
