//! A simulated Kea control agent.
//!
//! Accepts command envelopes on `POST /`, enforces HTTP basic auth, and
//! answers with one result object per targeted service. A handful of
//! commands are simulated in memory; replies queued in `scripted` take
//! precedence so tests can force any status or body.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, warn};

const SERVICES: [&str; 3] = ["dhcp4", "dhcp6", "d2"];

const SUPPORTED: [&str; 10] = [
    "config-get",
    "config-set",
    "config-test",
    "lease4-add",
    "lease4-del",
    "lease4-get",
    "list-commands",
    "statistic-get-all",
    "status-get",
    "version-get",
];

#[derive(Clone, Debug, Deserialize)]
pub struct CommandEnvelope {
    pub command: String,
    #[serde(default)]
    pub service: Vec<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// A canned reply returned verbatim for the next request.
#[derive(Clone, Debug)]
pub struct ScriptedReply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug)]
pub struct AgentState {
    pub username: String,
    pub password: String,
    pub leases4: HashMap<String, Value>,
    pub configs: HashMap<String, Value>,
    /// Every parsed envelope, in arrival order.
    pub received: Vec<Value>,
    pub scripted: VecDeque<ScriptedReply>,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            username: "root".to_string(),
            password: "root".to_string(),
            leases4: HashMap::new(),
            configs: HashMap::new(),
            received: Vec::new(),
            scripted: VecDeque::new(),
        }
    }
}

pub type Agent = Arc<RwLock<AgentState>>;

pub fn app() -> Router {
    app_with_state(Agent::default())
}

pub fn app_with_state(agent: Agent) -> Router {
    Router::new().route("/", post(handle_command)).with_state(agent)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, agent: Agent) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(agent)).await
}

async fn handle_command(State(agent): State<Agent>, headers: HeaderMap, body: String) -> Response {
    let mut state = agent.write().await;
    if !state.authorized(&headers) {
        warn!("rejecting request with bad credentials");
        return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
    }

    let raw: Value = match serde_json::from_str(&body) {
        Ok(raw) => raw,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid JSON").into_response(),
    };
    state.received.push(raw.clone());

    if let Some(reply) = state.scripted.pop_front() {
        let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response();
    }

    let envelope: CommandEnvelope = match serde_json::from_value(raw) {
        Ok(envelope) => envelope,
        Err(_) => return (StatusCode::BAD_REQUEST, "missing command").into_response(),
    };
    debug!(command = %envelope.command, services = envelope.service.len(), "command received");

    let entries: Vec<Value> = if envelope.service.is_empty() {
        vec![state.execute(&envelope, None)]
    } else {
        envelope
            .service
            .iter()
            .map(|service| state.execute(&envelope, Some(service.as_str())))
            .collect()
    };
    Json(entries).into_response()
}

fn reply(result: i64, text: &str) -> Value {
    json!({ "result": result, "text": text })
}

fn reply_with(result: i64, text: &str, arguments: Value) -> Value {
    json!({ "result": result, "text": text, "arguments": arguments })
}

/// `dhcp4` becomes `Dhcp4`.
fn config_key(service: &str) -> String {
    let mut chars = service.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

impl AgentState {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", self.username, self.password))
        );
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }

    fn execute(&mut self, envelope: &CommandEnvelope, service: Option<&str>) -> Value {
        if let Some(service) = service {
            if !SERVICES.contains(&service) {
                return reply(
                    1,
                    &format!("forwarding socket is not configured for the server type {service}"),
                );
            }
        }
        let target = service.unwrap_or("ca");
        let args = envelope.arguments.as_ref();

        match envelope.command.as_str() {
            "list-commands" => reply_with(0, "", json!(SUPPORTED)),
            "version-get" => reply_with(0, "2.4.1", json!({ "extended": "2.4.1 (mock)" })),
            "status-get" => reply_with(0, "", json!({ "pid": std::process::id(), "uptime": 1 })),
            "statistic-get-all" => reply_with(
                0,
                "",
                json!({ "pkt4-received": [[self.received.len(), "2024-01-01 00:00:00.000000"]] }),
            ),
            "config-get" => {
                let config = self.configs.get(target).cloned().unwrap_or_else(|| json!({}));
                reply_with(0, "", json!({ config_key(target): config }))
            }
            "config-set" | "config-test" => {
                let key = config_key(target);
                let Some(config) = args.and_then(|a| a.get(&key)) else {
                    return reply(1, &format!("Missing mandatory '{key}' parameter."));
                };
                if envelope.command == "config-test" {
                    return reply(0, "Configuration seems sane.");
                }
                self.configs.insert(target.to_string(), config.clone());
                reply(0, "Configuration successful.")
            }
            "lease4-add" => {
                let Some(ip) = args.and_then(|a| a.get("ip-address")).and_then(Value::as_str) else {
                    return reply(1, "missing parameter 'ip-address'");
                };
                if self.leases4.contains_key(ip) {
                    return reply(1, "IPv4 lease already exists.");
                }
                let lease = args.cloned().unwrap_or(Value::Null);
                self.leases4.insert(ip.to_string(), lease);
                reply(0, &format!("Lease for address {ip} added."))
            }
            "lease4-get" => {
                let ip = args.and_then(|a| a.get("ip-address")).and_then(Value::as_str);
                match ip.and_then(|ip| self.leases4.get(ip)) {
                    Some(lease) => reply_with(0, "IPv4 lease found.", lease.clone()),
                    None => reply(3, "Lease not found."),
                }
            }
            "lease4-del" => {
                let ip = args.and_then(|a| a.get("ip-address")).and_then(Value::as_str);
                match ip.and_then(|ip| self.leases4.remove(ip)) {
                    Some(_) => reply(0, "IPv4 lease deleted."),
                    None => reply(3, "IPv4 lease not found."),
                }
            }
            other => reply(2, &format!("'{other}' command not supported.")),
        }
    }
}
