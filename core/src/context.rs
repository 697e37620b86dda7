//! The Transaction Layer: one context per logical connection to the agent.
//!
//! # Design
//! `TransactionContext` owns the transport, a reusable response buffer, and
//! a bounded last-error slot. `execute_transaction` is the single path every
//! command takes. It resets the buffer and the error slot first, so nothing
//! from a previous call can leak into the next one. A context is `&mut`
//! for every call; sharing one across threads needs external locking.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{CtrlError, Result};
use crate::http::{HttpRequest, Transport, UreqTransport};
use crate::protocol::{parse_response, CommandRequest, CommandResponse};

/// Capacity of the last-error slot in bytes, terminator included.
pub const MAX_ERROR_SIZE: usize = 256;

/// Contents of the last-error slot after a successful call.
pub const NO_ERROR: &str = "No error";

/// State for talking to one control agent.
pub struct TransactionContext<T: Transport = UreqTransport> {
    url: String,
    authorization: String,
    transport: T,
    response_buffer: Vec<u8>,
    last_error: String,
}

impl TransactionContext<UreqTransport> {
    /// Context for `endpoint`, or `DEFAULT_ENDPOINT` when `None`, with the
    /// default credentials and timeout.
    pub fn create(endpoint: Option<&str>) -> Result<Self> {
        Self::with_config(ClientConfig::with_endpoint(endpoint))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = UreqTransport::new(config.timeout());
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> TransactionContext<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let url = config.endpoint_url()?;
        Ok(Self {
            url: url.into(),
            authorization: config.authorization(),
            transport,
            response_buffer: Vec::new(),
            last_error: NO_ERROR.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Message describing the most recent failure, or `NO_ERROR`.
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    /// Raw body of the most recent exchange.
    pub fn last_response_body(&self) -> &[u8] {
        &self.response_buffer
    }

    /// Send `command` to `services` and validate the reply.
    ///
    /// `arguments` moves into the request envelope. The reply is checked for
    /// HTTP 200, a JSON array, and an object in entry 0. A non-zero result in
    /// entry 0 fails the call only when at most one service was targeted.
    pub fn execute_transaction(
        &mut self,
        command: &str,
        services: &[&str],
        arguments: Option<Value>,
    ) -> Result<CommandResponse> {
        self.response_buffer.clear();
        self.set_last_error(NO_ERROR);

        match self.transact(command, services, arguments) {
            Ok(response) => Ok(response),
            Err(err) => {
                warn!(command, error = %err, "transaction failed");
                Err(self.fail(err))
            }
        }
    }

    fn transact(
        &mut self,
        command: &str,
        services: &[&str],
        arguments: Option<Value>,
    ) -> Result<CommandResponse> {
        let body = CommandRequest::new(command, services, arguments).to_body()?;
        let request = HttpRequest {
            url: self.url.clone(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), self.authorization.clone()),
            ],
            body,
        };

        debug!(command, services = services.len(), "sending command");
        let status = self
            .transport
            .post(&request, &mut self.response_buffer)
            .map_err(CtrlError::Transport)?;

        parse_response(status, &self.response_buffer, services.len())
    }

    /// Record `err` in the last-error slot and hand it back.
    pub(crate) fn fail(&mut self, err: CtrlError) -> CtrlError {
        self.set_last_error(&err.to_string());
        err
    }

    fn set_last_error(&mut self, message: &str) {
        let mut end = message.len().min(MAX_ERROR_SIZE - 1);
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        self.last_error.clear();
        self.last_error.push_str(&message[..end]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{scripted, ScriptedTransport};
    use serde_json::json;

    #[test]
    fn create_uses_the_default_endpoint() {
        let ctx = TransactionContext::create(None).unwrap();
        assert_eq!(ctx.endpoint(), "http://127.0.0.1:8000/");
        assert_eq!(ctx.last_error(), NO_ERROR);
    }

    #[test]
    fn create_rejects_a_bad_endpoint() {
        let err = TransactionContext::create(Some("::nope")).err().unwrap();
        assert!(matches!(err, CtrlError::Init(_)));
    }

    #[test]
    fn request_carries_headers_and_envelope() {
        let mut ctx = scripted(vec![Ok((200, r#"[{"result":0}]"#.to_string()))]);
        ctx.execute_transaction("lease4-add", &["dhcp4"], Some(json!({"ip-address": "10.0.0.5"})))
            .unwrap();

        let sent = &ctx.transport().sent[0];
        assert!(sent
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
        assert!(sent
            .headers
            .contains(&("Authorization".to_string(), "Basic cm9vdDpyb290".to_string())));
        let body: Value = serde_json::from_str(&sent.body).unwrap();
        assert_eq!(
            body,
            json!({"command": "lease4-add", "service": ["dhcp4"], "arguments": {"ip-address": "10.0.0.5"}})
        );
    }

    #[test]
    fn transport_failure_is_recorded() {
        let mut ctx = scripted(vec![Err("Connection refused".to_string())]);
        let err = ctx.execute_transaction("status-get", &["dhcp4"], None).unwrap_err();
        assert!(matches!(err, CtrlError::Transport(_)));
        assert!(ctx.last_error().contains("Connection refused"));
    }

    #[test]
    fn http_status_is_recorded() {
        let mut ctx = scripted(vec![Ok((500, "boom".to_string()))]);
        let err = ctx.execute_transaction("status-get", &["dhcp4"], None).unwrap_err();
        assert!(matches!(err, CtrlError::HttpStatus { status: 500, .. }));
        assert_eq!(ctx.last_error(), "HTTP request failed with code 500");
    }

    #[test]
    fn failure_then_success_leaves_no_stale_error() {
        let mut ctx = scripted(vec![
            Ok((200, r#"[{"result":1,"text":"x"}]"#.to_string())),
            Ok((200, r#"[{"result":0}]"#.to_string())),
        ]);
        assert!(ctx.execute_transaction("config-get", &["dhcp4"], None).is_err());
        assert_eq!(ctx.last_error(), "Kea API Error (1): x");

        ctx.execute_transaction("config-get", &["dhcp4"], None).unwrap();
        assert_eq!(ctx.last_error(), NO_ERROR);
        assert_eq!(ctx.last_response_body(), br#"[{"result":0}]"#);
    }

    #[test]
    fn buffer_is_reset_between_calls() {
        let mut ctx = scripted(vec![
            Ok((200, r#"[{"result":0,"text":"a long first response body"}]"#.to_string())),
            Ok((200, r#"[{"result":0}]"#.to_string())),
        ]);
        ctx.execute_transaction("version-get", &[], None).unwrap();
        let resp = ctx.execute_transaction("version-get", &[], None).unwrap();
        assert_eq!(resp.text(0), None);
    }

    #[test]
    fn fan_out_returns_partial_failure_untouched() {
        let mut ctx = scripted(vec![Ok((
            200,
            r#"[{"result":1,"text":"x"},{"result":0}]"#.to_string(),
        ))]);
        let resp = ctx
            .execute_transaction("version-get", &["dhcp4", "dhcp6"], None)
            .unwrap();
        assert_eq!(resp.len(), 2);
        assert_eq!(ctx.last_error(), NO_ERROR);
    }

    #[test]
    fn last_error_is_bounded() {
        let long = "é".repeat(400);
        let mut ctx = scripted(vec![Err(long)]);
        ctx.execute_transaction("status-get", &["dhcp4"], None).unwrap_err();
        assert!(ctx.last_error().len() < MAX_ERROR_SIZE);
        assert!(ctx.last_error().starts_with("transport failed: "));
    }

    #[test]
    fn scripted_transport_counts_requests() {
        let ctx: TransactionContext<ScriptedTransport> = scripted(Vec::new());
        assert!(ctx.transport().sent.is_empty());
    }
}
