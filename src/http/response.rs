//! HTTP response building module
//!
//! Provides builders for the status code responses the server emits,
//! decoupled from specific business logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::{Response, StatusCode};

/// Methods answered by the server
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build a response with the given content type and body.
///
/// For HEAD requests the body is dropped but `Content-Length` still reports
/// the size the GET body would have.
pub fn build_body_response(
    status: StatusCode,
    content_type: &'static str,
    content: impl Into<Bytes>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content = content.into();
    let content_length = content.len();
    let body = if is_head { Bytes::new() } else { content };

    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response(path: &str, is_head: bool) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });
    build_body_response(
        StatusCode::NOT_FOUND,
        "application/json",
        body.to_string(),
        is_head,
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", ALLOWED_METHODS)
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::PAYLOAD_TOO_LARGE)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("413 Payload Too Large")))
        .unwrap_or_else(|e| {
            log_build_error("413", &e);
            Response::new(Full::new(Bytes::from("413 Payload Too Large")))
        })
}

/// Build 500 Internal Server Error response with a JSON body
pub fn build_500_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(r#"{"error":"Internal server error"}"#)))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            let mut resp = Response::new(Full::new(Bytes::from("Error")));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}

/// Build health check response
pub fn build_health_response(status: &'static str, is_head: bool) -> Response<Full<Bytes>> {
    build_body_response(StatusCode::OK, "text/plain", status, is_head)
}

/// Stamp headers every response carries
pub fn apply_common_headers(
    resp: &mut Response<Full<Bytes>>,
    server_name: &str,
    enable_cors: bool,
) {
    let headers = resp.headers_mut();
    match HeaderValue::from_str(server_name) {
        Ok(value) => {
            headers.insert(SERVER, value);
        }
        Err(e) => log_build_error("Server header", &e),
    }
    if enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}

/// Log response build error
fn log_build_error(what: &str, error: &impl std::fmt::Display) {
    crate::logger::log_error(&format!("Failed to build {what} response: {error}"));
}
