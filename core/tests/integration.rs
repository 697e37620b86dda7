//! End-to-end transactions against the live mock agent.
//!
//! # Design
//! Starts the mock agent on a random port in a background thread, then
//! drives a real `TransactionContext` over HTTP with ureq. The shared
//! `Agent` handle lets each test queue scripted replies and inspect the
//! envelopes the agent actually received.

use kea_ctrl_core::{ClientConfig, CtrlError, ErrorKind, TransactionContext, NO_ERROR};
use mock_agent::{Agent, ScriptedReply};
use serde_json::{json, Value};

/// Start a mock agent on a random port and return its endpoint and state.
fn start_agent() -> (String, Agent) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let agent = Agent::default();
    let shared = agent.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_agent::run_with_state(listener, shared).await
        })
        .unwrap();
    });

    (format!("http://{addr}"), agent)
}

fn context(endpoint: &str) -> TransactionContext {
    TransactionContext::create(Some(endpoint)).unwrap()
}

fn script(agent: &Agent, status: u16, body: &str) {
    agent.blocking_write().scripted.push_back(ScriptedReply {
        status,
        body: body.to_string(),
    });
}

#[test]
fn lease4_lifecycle() {
    let (endpoint, agent) = start_agent();
    let mut ctx = context(&endpoint);

    // Step 1: add a lease; the caller's document stays usable.
    let lease = json!({ "ip-address": "192.0.2.10", "hw-address": "1a:1b:1c:1d:1e:1f" });
    let added = ctx.lease4_add(&lease).unwrap();
    assert_eq!(added.result_code(0), Some(0));
    assert_eq!(lease["ip-address"], "192.0.2.10");
    assert_eq!(ctx.last_error(), NO_ERROR);

    // Step 2: read it back.
    let fetched = ctx.lease4_get_by_ip("192.0.2.10").unwrap();
    assert_eq!(
        fetched.arguments(0).unwrap()["hw-address"],
        "1a:1b:1c:1d:1e:1f"
    );

    // Step 3: a second add collides and surfaces the agent's text.
    let err = ctx.lease4_add(&lease).unwrap_err();
    match err {
        CtrlError::Command { code, ref text } => {
            assert_eq!(code, 1);
            assert_eq!(text, "IPv4 lease already exists.");
        }
        other => panic!("expected command error, got {other:?}"),
    }
    assert_eq!(ctx.last_error(), "Kea API Error (1): IPv4 lease already exists.");

    // Step 4: delete, then the lookup misses.
    ctx.lease4_del("192.0.2.10").unwrap();
    let err = ctx.lease4_get_by_ip("192.0.2.10").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Command);

    // Step 5: the agent saw every envelope addressed to dhcp4.
    let state = agent.blocking_read();
    assert_eq!(state.received.len(), 5);
    for envelope in &state.received {
        assert_eq!(envelope["service"], json!(["dhcp4"]));
    }
    assert!(state.leases4.is_empty());
}

#[test]
fn config_set_wraps_under_service_key() {
    let (endpoint, agent) = start_agent();
    let mut ctx = context(&endpoint);

    let config = json!({ "valid-lifetime": 4000, "subnet4": [] });
    let response = ctx.config_set("dhcp4", &config).unwrap();
    assert_eq!(response.text(0), Some("Configuration successful."));

    let sent = agent.blocking_read().received[0].clone();
    assert_eq!(sent["command"], "config-set");
    assert_eq!(sent["arguments"], json!({ "Dhcp4": config }));

    let response = ctx.config_get("dhcp4").unwrap();
    assert_eq!(response.arguments(0).unwrap()["Dhcp4"]["valid-lifetime"], 4000);
}

#[test]
fn multi_service_partial_failure_is_not_an_error() {
    let (endpoint, _agent) = start_agent();
    let mut ctx = context(&endpoint);

    let response = ctx.version_get(&["bogus", "dhcp4"]).unwrap();
    assert_eq!(response.len(), 2);
    assert_eq!(response.result_code(0), Some(1));
    assert!(response.is_success(1));
    assert_eq!(ctx.last_error(), NO_ERROR);
}

#[test]
fn single_service_failure_is_an_error() {
    let (endpoint, _agent) = start_agent();
    let mut ctx = context(&endpoint);

    let err = ctx.version_get(&["bogus"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Command);
}

#[test]
fn scripted_multi_entry_reply_with_failing_head() {
    let (endpoint, agent) = start_agent();
    script(
        &agent,
        200,
        r#"[{"result":1,"text":"unreachable"},{"result":0,"text":"ok"}]"#,
    );
    let mut ctx = context(&endpoint);

    let response = ctx
        .execute_transaction("status-get", &["dhcp4", "dhcp6"], None)
        .unwrap();
    assert_eq!(response.text(0), Some("unreachable"));
    assert_eq!(response.text(1), Some("ok"));
}

#[test]
fn error_slot_resets_after_success() {
    let (endpoint, agent) = start_agent();
    script(&agent, 500, "boom");
    let mut ctx = context(&endpoint);

    let err = ctx.status_get("dhcp4").unwrap_err();
    match err {
        CtrlError::HttpStatus { status, ref body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected HTTP status error, got {other:?}"),
    }
    assert_eq!(ctx.last_error(), "HTTP request failed with code 500");
    assert_eq!(ctx.last_response_body(), b"boom");

    ctx.status_get("dhcp4").unwrap();
    assert_eq!(ctx.last_error(), NO_ERROR);
}

#[test]
fn non_array_body_is_malformed() {
    let (endpoint, agent) = start_agent();
    script(&agent, 200, r#"{"result":0}"#);
    let mut ctx = context(&endpoint);

    let err = ctx.list_commands("dhcp4").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert_eq!(
        ctx.last_error(),
        "malformed response: Failed to parse Kea response as a JSON array."
    );
}

#[test]
fn bad_credentials_surface_as_http_status() {
    let (endpoint, _agent) = start_agent();
    let config = ClientConfig {
        endpoint,
        password: "wrong".to_string(),
        ..ClientConfig::default()
    };
    let mut ctx = TransactionContext::with_config(config).unwrap();

    let err = ctx.list_commands("dhcp4").unwrap_err();
    assert!(matches!(err, CtrlError::HttpStatus { status: 401, .. }));
}

#[test]
fn closed_port_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut ctx = context(&format!("http://127.0.0.1:{port}"));

    let err = ctx.status_get("dhcp4").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.is_transient());
    assert!(ctx.last_error().starts_with("transport failed"));
}

#[test]
fn silent_agent_times_out_as_transport_error() {
    // Accepts connections and never answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });

    let config = ClientConfig {
        endpoint: format!("http://{addr}"),
        timeout_ms: Some(300),
        ..ClientConfig::default()
    };
    let mut ctx = TransactionContext::with_config(config).unwrap();

    let started = std::time::Instant::now();
    let err = ctx.status_get("dhcp4").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(ctx.last_error().starts_with("transport failed"));
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}

#[test]
fn precondition_sends_nothing() {
    let (endpoint, agent) = start_agent();
    let mut ctx = context(&endpoint);

    let err = ctx.lease4_del("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    let err = ctx.config_set("dhcp4", &Value::Null).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);

    assert!(agent.blocking_read().received.is_empty());
}
