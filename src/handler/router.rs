//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use crate::config::{AppState, RoutesConfig};
use crate::handler::items;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response, Uri, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub uri: &'a Uri,
    pub headers: &'a HeaderMap,
    pub is_head: bool,
}

/// Main entry point for HTTP request handling.
///
/// The request body is never read, so any body type is accepted.
#[allow(clippy::unused_async)]
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let uri = req.uri();
    let config = &state.config;

    // 1. Check HTTP method, 2. check body size
    let rejected = check_http_method(method, config.http.enable_cors)
        .or_else(|| check_body_size(req.headers(), config.http.max_body_size));

    let mut response = rejected.unwrap_or_else(|| {
        // 3. Log headers if enabled
        logger::log_headers_count(req.headers().len(), config.logging.show_headers);

        let ctx = RequestContext {
            path: uri.path(),
            uri,
            headers: req.headers(),
            is_head: *method == Method::HEAD,
        };

        // 4. Dispatch
        route_request(&ctx, &config.routes, &state)
    });

    http::apply_common_headers(
        &mut response,
        &config.http.server_name,
        config.http.enable_cors,
    );

    if config.logging.access_log {
        log_access(&req, peer_addr, &response, started, &config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Route request based on path and configuration
fn route_request(
    ctx: &RequestContext<'_>,
    routes: &RoutesConfig,
    state: &AppState,
) -> Response<Full<Bytes>> {
    // Health check endpoints (highest priority, always fast)
    if routes.health.enabled
        && (ctx.path == routes.health.liveness_path || ctx.path == routes.health.readiness_path)
    {
        return http::build_health_response("ok", ctx.is_head);
    }

    if ctx.path == routes.items_path {
        let url = items::request_url(ctx.uri, ctx.headers, &state.config);
        return items::handle_items(&url, ctx.is_head);
    }

    http::build_404_response(ctx.path, ctx.is_head)
}

/// Write one access log line for a finished request
fn log_access<B>(
    req: &Request<B>,
    peer_addr: SocketAddr,
    response: &Response<Full<Bytes>>,
    started: Instant,
    format: &str,
) {
    let entry = access_entry(req, peer_addr, response, started);
    logger::log_access(&entry, format);
}

/// Build the access log entry for a request and the response sent for it
fn access_entry<B>(
    req: &Request<B>,
    peer_addr: SocketAddr,
    response: &Response<Full<Bytes>>,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = http_version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    // HEAD responses advertise the GET length but send no body
    entry.body_bytes = if req.method() == Method::HEAD {
        0
    } else {
        response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    };
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

const fn http_version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
