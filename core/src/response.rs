//! Deferred consumption of a completed (or failed) Raindrop call.
//!
//! # Design
//! An `OperationResponse` is either a live `HttpResponse` with an unread
//! body or the error that stopped the call earlier. Consuming it takes
//! `self`, so the body is read at most once. The body reader is dropped as
//! soon as the read finishes, before any caller code runs.

use std::io::Read;

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Outcome of one client call, consumed exactly once.
#[derive(Debug)]
pub struct OperationResponse {
    outcome: Result<HttpResponse, ApiError>,
}

impl OperationResponse {
    pub fn from_response(response: HttpResponse) -> Self {
        Self {
            outcome: Ok(response),
        }
    }

    pub fn from_error(error: ApiError) -> Self {
        Self { outcome: Err(error) }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// HTTP status, when the round-trip completed.
    pub fn status(&self) -> Option<u16> {
        self.outcome.as_ref().ok().map(|r| r.status)
    }

    /// Read the whole body and hand it to `callback`.
    ///
    /// A wrapper holding an error returns that error and never calls
    /// `callback`. The status code is not inspected.
    pub fn execute_on_response<T, F>(self, callback: F) -> Result<T, ApiError>
    where
        F: FnOnce(&str) -> T,
    {
        let (_, body) = self.read_body()?;
        Ok(callback(&body))
    }

    /// The raw body text, regardless of status.
    pub fn text(self) -> Result<String, ApiError> {
        self.execute_on_response(str::to_owned)
    }

    /// Check the status and decode a 2xx body as `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let (status, body) = self.read_body()?;
        check_status(status, &body)?;
        serde_json::from_str(&body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    fn read_body(self) -> Result<(u16, String), ApiError> {
        let HttpResponse {
            status, mut body, ..
        } = self.outcome?;
        let mut text = String::new();
        let read = body.read_to_string(&mut text);
        drop(body);
        read.map_err(|e| ApiError::BodyRead(e.to_string()))?;
        Ok((status, text))
    }
}

impl From<Result<HttpResponse, ApiError>> for OperationResponse {
    fn from(outcome: Result<HttpResponse, ApiError>) -> Self {
        Self { outcome }
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(status: u16, body: &str) -> Result<(), ApiError> {
    match status {
        200..=299 => Ok(()),
        401 => Err(ApiError::Unauthorized),
        404 => Err(ApiError::NotFound),
        _ => Err(ApiError::HttpError {
            status,
            body: body.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::types::{ItemResponse, Raindrop};

    /// Body reader that records when it is dropped.
    struct TrackedBody {
        inner: io::Cursor<Vec<u8>>,
        released: Arc<AtomicBool>,
    }

    impl Read for TrackedBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Drop for TrackedBody {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    struct FailingBody;

    impl Read for FailingBody {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    fn tracked(body: &str) -> (OperationResponse, Arc<AtomicBool>) {
        let released = Arc::new(AtomicBool::new(false));
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: Box::new(TrackedBody {
                inner: io::Cursor::new(body.as_bytes().to_vec()),
                released: released.clone(),
            }),
        };
        (OperationResponse::from_response(response), released)
    }

    #[test]
    fn callback_receives_full_body_once() {
        let (response, _) = tracked(r#"{"result":true}"#);
        let calls = AtomicUsize::new(0);
        let body = response
            .execute_on_response(|body| {
                calls.fetch_add(1, Ordering::SeqCst);
                body.to_string()
            })
            .unwrap();
        assert_eq!(body, r#"{"result":true}"#);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn errored_wrapper_skips_callback() {
        let response = OperationResponse::from_error(ApiError::Transport("refused".to_string()));
        let mut called = false;
        let err = response.execute_on_response(|_| called = true).unwrap_err();
        assert!(!called);
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn body_released_before_failing_callback_returns() {
        let (response, released) = tracked("payload");
        let observed = response
            .execute_on_response(|_| -> Result<(), String> {
                assert!(released.load(Ordering::SeqCst));
                Err("callback failed".to_string())
            })
            .unwrap();
        assert!(observed.is_err());
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn wrapper_can_be_consumed_on_another_thread() {
        let (response, released) = tracked(r#"{"result":true}"#);
        let body = std::thread::spawn(move || response.text())
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(body, r#"{"result":true}"#);
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn body_read_failure_is_reported() {
        let response = OperationResponse::from_response(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: Box::new(FailingBody),
        });
        let mut called = false;
        let err = response.execute_on_response(|_| called = true).unwrap_err();
        assert!(!called);
        assert!(matches!(err, ApiError::BodyRead(_)));
    }

    #[test]
    fn status_is_visible_before_consumption() {
        let response = OperationResponse::from_response(HttpResponse::from_text(201, ""));
        assert!(response.is_ok());
        assert_eq!(response.status(), Some(201));

        let failed = OperationResponse::from_error(ApiError::NotFound);
        assert!(!failed.is_ok());
        assert_eq!(failed.status(), None);
    }

    #[test]
    fn text_ignores_status() {
        let response = OperationResponse::from_response(HttpResponse::from_text(500, "boom"));
        assert_eq!(response.text().unwrap(), "boom");
    }

    #[test]
    fn json_decodes_success() {
        let response = OperationResponse::from_response(HttpResponse::from_text(
            200,
            r#"{"result":true,"item":{"_id":1,"link":"https://example.com"}}"#,
        ));
        let parsed: ItemResponse<Raindrop> = response.json().unwrap();
        assert_eq!(parsed.item.id, Some(1));
        assert_eq!(parsed.item.link, "https://example.com");
    }

    #[test]
    fn json_maps_error_statuses() {
        let not_found = OperationResponse::from_response(HttpResponse::from_text(404, ""));
        assert!(matches!(
            not_found.json::<serde_json::Value>().unwrap_err(),
            ApiError::NotFound
        ));

        let unauthorized = OperationResponse::from_response(HttpResponse::from_text(401, ""));
        assert!(matches!(
            unauthorized.json::<serde_json::Value>().unwrap_err(),
            ApiError::Unauthorized
        ));

        let server = OperationResponse::from_response(HttpResponse::from_text(500, "internal"));
        assert!(matches!(
            server.json::<serde_json::Value>().unwrap_err(),
            ApiError::HttpError { status: 500, .. }
        ));
    }

    #[test]
    fn json_bad_body() {
        let response = OperationResponse::from_response(HttpResponse::from_text(200, "not json"));
        assert!(matches!(
            response.json::<serde_json::Value>().unwrap_err(),
            ApiError::DeserializationError(_)
        ));
    }
}
