//! HTTP request/response types and the transport seam.
//!
//! # Design
//! `HttpRequest` is plain data: the client builds it without touching the
//! network, so every route can be checked in tests without a server.
//! `HttpResponse` keeps its body as an unread reader; the response wrapper
//! decides when the body is drained and drops the reader right after.
//!
//! `Transport` is the only place I/O happens. The default implementation is
//! a blocking `ureq::Agent` configured to hand 4xx/5xx back as data.

use std::fmt;
use std::io::{Cursor, Read};

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `RaindropClient::build_*` methods. Header names are stored
/// lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response whose body has not been read yet.
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn Read + Send>,
}

impl HttpResponse {
    /// Response backed by an in-memory body.
    pub fn from_text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Box::new(Cursor::new(body.into().into_bytes())),
        }
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Executes an `HttpRequest` and returns the response with its body unread.
///
/// Non-2xx statuses are successful round-trips and must come back as
/// `Ok`; only failures to complete the exchange are errors.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

/// A `ureq` agent that returns 4xx/5xx responses as data rather than `Err`.
pub fn default_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for ureq::Agent {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.path.as_str();
        let headers = request.headers.as_slice();
        let body = request.body.as_deref();

        let result = match (request.method, body) {
            (HttpMethod::Get, _) => with_headers(self.get(url), headers).call(),
            (HttpMethod::Delete, None) => with_headers(self.delete(url), headers).call(),
            (HttpMethod::Delete, Some(body)) => {
                with_headers(self.delete(url).force_send_body(), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.post(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.put(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.put(url), headers).send_empty(),
        };

        let response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        Ok(HttpResponse {
            status,
            headers,
            body: Box::new(response.into_body().into_reader()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            path: "http://localhost/".to_string(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: None,
        };
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(HttpMethod::Get.as_str(), "GET");
    }

    #[test]
    fn from_text_body_is_readable() {
        let mut response = HttpResponse::from_text(200, "hello");
        let mut out = String::new();
        response.body.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            path: "http://127.0.0.1:1/".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = default_agent().send(&req).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
