//! In-memory transport for unit tests.

use std::collections::VecDeque;

use crate::config::ClientConfig;
use crate::context::TransactionContext;
use crate::http::{HttpRequest, Transport};

/// Replays queued `(status, body)` replies and records what was sent.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    pub replies: VecDeque<Result<(u16, String), String>>,
    pub sent: Vec<HttpRequest>,
}

impl Transport for ScriptedTransport {
    fn post(&mut self, request: &HttpRequest, sink: &mut Vec<u8>) -> Result<u16, String> {
        self.sent.push(request.clone());
        let (status, body) = self
            .replies
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply".to_string()))?;
        sink.extend_from_slice(body.as_bytes());
        Ok(status)
    }
}

pub(crate) fn scripted(
    replies: Vec<Result<(u16, String), String>>,
) -> TransactionContext<ScriptedTransport> {
    let transport = ScriptedTransport {
        replies: replies.into(),
        sent: Vec::new(),
    };
    TransactionContext::with_transport(ClientConfig::default(), transport).unwrap()
}
