//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{Error, auth::TOKEN_HEADER};

/// JSON fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 3] = ["password", "token", "refresh_token"];

const REDACTED_VALUE: &str = "********";

/// Headers whose values are never written to the logs.
const SENSITIVE_HEADERS: [&str; 3] = [TOKEN_HEADER, "authorization", "cookie"];

/// The largest request or response body, in bytes, that will be buffered for logging.
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords and session tokens in JSON bodies and headers are redacted.
/// Bodies are passed on byte for byte; a request body larger than [MAX_BODY_SIZE]
/// is rejected with a 400.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return Error::Validation("request body is too large or could not be read".to_owned())
                .into_response();
        }
    };

    hide_sensitive_headers(&mut parts.headers);
    log_request(&parts, &redact_secrets(&String::from_utf8_lossy(&bytes)));

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_response(&parts, &redact_secrets(&String::from_utf8_lossy(&bytes)));

    Response::from_parts(parts, Body::from(bytes))
}

/// Mark the [SENSITIVE_HEADERS] so that their values are hidden when the headers are logged.
fn hide_sensitive_headers(headers: &mut HeaderMap) {
    for (name, value) in headers.iter_mut() {
        if SENSITIVE_HEADERS.contains(&name.as_str()) {
            value.set_sensitive(true);
        }
    }
}

/// Replace the values of [REDACTED_FIELDS] in a JSON object.
///
/// Text that is not a JSON object is returned unchanged.
fn redact_secrets(body_text: &str) -> String {
    let mut value = match serde_json::from_str::<Value>(body_text) {
        Ok(value @ Value::Object(_)) => value,
        _ => return body_text.to_owned(),
    };

    let mut redacted_any = false;

    if let Value::Object(fields) = &mut value {
        for field in REDACTED_FIELDS {
            if let Some(secret) = fields.get_mut(field) {
                *secret = Value::String(REDACTED_VALUE.to_owned());
                redacted_any = true;
            }
        }
    }

    if redacted_any {
        value.to_string()
    } else {
        body_text.to_owned()
    }
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it is short enough to log
/// in full.
fn truncate_body(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!("Received request: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod logging_middleware_tests {
    use std::{
        io::{self, Write},
        sync::{Arc, Mutex},
    };

    use axum::{
        Json, Router,
        body::{Body, Bytes},
        extract::Request,
        http::StatusCode,
        middleware,
        routing::post,
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use tracing_subscriber::fmt::MakeWriter;

    use crate::auth::TOKEN_HEADER;

    use super::{
        LOG_BODY_LENGTH_LIMIT, MAX_BODY_SIZE, hide_sensitive_headers, log_request,
        logging_middleware, redact_secrets, truncate_body,
    };

    /// Collects everything a `tracing_subscriber::fmt` subscriber writes.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
            .route("/bytes", post(|body: Bytes| async move { body }))
            .layer(middleware::from_fn(logging_middleware));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[test]
    fn redacts_password_and_tokens() {
        let body = json!({
            "email": "a@b.com",
            "password": "pw123456",
            "token": "abc",
            "refresh_token": "def",
        })
        .to_string();

        let redacted: Value = serde_json::from_str(&redact_secrets(&body)).unwrap();

        assert_eq!(
            redacted,
            json!({
                "email": "a@b.com",
                "password": "********",
                "token": "********",
                "refresh_token": "********",
            })
        );
    }

    #[test]
    fn leaves_other_bodies_untouched() {
        assert_eq!(redact_secrets("password=hunter2"), "password=hunter2");
        assert_eq!(redact_secrets("[1, 2, 3]"), "[1, 2, 3]");

        let body = r#"{"name":"P1","price":100}"#;
        assert_eq!(redact_secrets(body), body);
    }

    #[test]
    fn truncates_on_char_boundary() {
        let body = "é".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        let truncated = truncate_body(&body).unwrap();

        assert_eq!(truncated.chars().count(), LOG_BODY_LENGTH_LIMIT);
        assert_eq!(truncate_body("short"), None);
    }

    #[test]
    fn token_header_is_not_logged() {
        let (mut parts, _) = Request::builder()
            .uri("/cart/list?id=1")
            .header(TOKEN_HEADER, "SECRET-ACCESS-TOKEN")
            .header("accept", "application/json")
            .body(Body::empty())
            .unwrap()
            .into_parts();
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        hide_sensitive_headers(&mut parts.headers);
        tracing::subscriber::with_default(subscriber, || log_request(&parts, ""));

        let logs = logs.contents();
        assert!(logs.contains("Received request"), "nothing was logged: {logs}");
        assert!(logs.contains("application/json"));
        assert!(!logs.contains("SECRET-ACCESS-TOKEN"), "token was logged: {logs}");
        assert_eq!(parts.headers[TOKEN_HEADER], "SECRET-ACCESS-TOKEN");
    }

    #[tokio::test]
    async fn passes_non_utf8_bodies_through_unchanged() {
        let server = get_test_server();
        let body = Bytes::from_static(&[0xff, 0xfe, b'a', 0x80]);

        let response = server.post("/bytes").bytes(body.clone()).await;

        response.assert_status_ok();
        assert_eq!(response.as_bytes(), &body);
    }

    #[tokio::test]
    async fn oversized_request_body_is_rejected() {
        let server = get_test_server();

        let response = server
            .post("/bytes")
            .bytes(Bytes::from(vec![b'a'; MAX_BODY_SIZE + 1]))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let server = get_test_server();
        let body = json!({ "email": "a@b.com", "password": "pw123456" });

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        response.assert_json(&body);
    }
}
