//! HTTP plumbing for the control-agent client.
//!
//! # Design
//! `HttpRequest` describes one POST as plain data. A `Transport` executes it
//! and appends the response body to a caller-owned buffer, which is how the
//! context reuses a single growable buffer across transactions. Tests plug
//! in a scripted transport; production code uses `UreqTransport`.

use std::io::Read;
use std::time::Duration;

/// An HTTP POST described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes `HttpRequest` values.
///
/// Implementations append every received body chunk to `sink` and return
/// the HTTP status code. A failure to complete the exchange is reported as
/// the transport's own error text.
pub trait Transport {
    fn post(&mut self, request: &HttpRequest, sink: &mut Vec<u8>) -> Result<u16, String>;
}

/// Blocking transport backed by one long-lived `ureq::Agent`.
///
/// Non-2xx statuses are returned as data rather than errors so the caller
/// decides how to classify them.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout` bounds the whole exchange; `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn post(&mut self, request: &HttpRequest, sink: &mut Vec<u8>) -> Result<u16, String> {
        let mut builder = self.agent.post(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        let mut response = builder
            .send(request.body.as_bytes())
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        response
            .body_mut()
            .as_reader()
            .read_to_end(sink)
            .map_err(|e| e.to_string())?;
        Ok(status)
    }
}
