//! Wire envelope and response validation for the control-agent protocol.
//!
//! # Design
//! A request is a single JSON object: `command`, an optional `service` list
//! and optional `arguments`. The reply is a JSON array with one result object
//! per targeted service. `parse_response` applies every check a transaction
//! needs after the bytes arrive, so the context only has to move data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CtrlError, Result};

const NOT_AN_ARRAY: &str = "Failed to parse Kea response as a JSON array.";
const NOT_AN_OBJECT: &str = "Kea response array item is not an object.";

/// The command envelope. `arguments` is owned by the envelope once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(rename = "service", skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl CommandRequest {
    pub fn new(command: &str, services: &[&str], arguments: Option<Value>) -> Self {
        Self {
            command: command.to_string(),
            services: services.iter().map(|s| s.to_string()).collect(),
            arguments,
        }
    }

    pub fn to_body(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CtrlError::Serialization(e.to_string()))
    }
}

/// Typed view of one result object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseEntry {
    pub result: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// A validated response array, owned by the caller.
///
/// Entry 0 is always an object. When more than one service was targeted,
/// entries may carry non-zero results and must be inspected individually.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommandResponse {
    entries: Vec<Value>,
}

impl CommandResponse {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&Value> {
        self.entries.get(index)
    }

    /// Typed view of entry `index`, or `None` if it lacks an integer result.
    pub fn view(&self, index: usize) -> Option<ResponseEntry> {
        self.entry(index)
            .and_then(|e| serde_json::from_value(e.clone()).ok())
    }

    pub fn result_code(&self, index: usize) -> Option<i64> {
        self.entry(index).and_then(result_code_of)
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.entry(index)?.get("text")?.as_str()
    }

    pub fn arguments(&self, index: usize) -> Option<&Value> {
        self.entry(index)?.get("arguments")
    }

    pub fn is_success(&self, index: usize) -> bool {
        self.result_code(index) == Some(0)
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.entries
    }

    pub fn to_json_string(&self) -> String {
        Value::Array(self.entries.clone()).to_string()
    }
}

fn result_code_of(entry: &Value) -> Option<i64> {
    let result = entry.get("result")?;
    result
        .as_i64()
        .or_else(|| result.as_f64().map(|f| f as i64))
}

/// Validate an agent reply.
///
/// `targeted` is the number of services the request named. A non-zero
/// result in entry 0 fails the call only when `targeted <= 1`; with a
/// fan-out the full array is returned so partial successes survive.
pub fn parse_response(status: u16, body: &[u8], targeted: usize) -> Result<CommandResponse> {
    if status != 200 {
        return Err(CtrlError::HttpStatus {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    let entries = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(entries)) => entries,
        _ => return Err(CtrlError::MalformedResponse(NOT_AN_ARRAY.to_string())),
    };

    let first = match entries.first() {
        Some(first) if first.is_object() => first,
        _ => return Err(CtrlError::MalformedResponse(NOT_AN_OBJECT.to_string())),
    };

    let code = result_code_of(first);
    if code != Some(0) && targeted <= 1 {
        let text = first
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        return Err(CtrlError::Command {
            code: code.unwrap_or(-1),
            text,
        });
    }

    Ok(CommandResponse { entries })
}
