//! HTTP transport interface.
//!
//! Checks talk to the backend and frontend through [`HttpTransport`] so that
//! tests can substitute canned responses. [`UreqTransport`] is the real client.
//!
//! # Graceful Degradation
//!
//! - Connection refused / DNS failure: Returns `TransportError::Connect`
//! - 4xx/5xx responses: Returned as ordinary `HttpResponse` values so the
//!   caller can assert on the status code
//! - Body read failure: Returns `TransportError::Body`
//!
//! No retries and no timeouts beyond the client defaults.

use serde_json::Value;
use std::io::Read;
use thiserror::Error;

/// HTTP method used by the integration checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Options => "OPTIONS",
        }
    }
}

/// An outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        HttpRequest {
            method,
            url: url.into(),
            headers: Vec::new(),
            json: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn options(url: impl Into<String>) -> Self {
        Self::new(Method::Options, url)
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::Post, url);
        request.json = Some(body);
        request
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A received response. Header names are stored lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Builder used by fakes: JSON body plus a matching content type
    pub fn with_json(mut self, body: &Value) -> Self {
        self.body = body.to_string().into_bytes();
        self.with_header("content-type", "application/json")
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Connect(String),

    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),
}

/// Something that can execute an HTTP request
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking HTTP client backed by `ureq`
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        UreqTransport {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let mut outgoing = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            outgoing = outgoing.set(name, value);
        }

        let sent = match &request.json {
            Some(body) => outgoing.send_json(body),
            None => outgoing.call(),
        };

        // Status errors still carry a response worth asserting on.
        let response = match sent {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(TransportError::Connect(transport.to_string()));
            }
        };

        let status = response.status();
        let headers = response
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                response
                    .header(&name)
                    .map(|value| (name.to_ascii_lowercase(), value.to_string()))
            })
            .collect();

        let mut body = Vec::new();
        response.into_reader().read_to_end(&mut body)?;

        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Join a base URL and an absolute path without doubling the slash
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
