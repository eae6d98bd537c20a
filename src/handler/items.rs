//! Items endpoint
//!
//! Answers GET (and HEAD) with the fixed item list followed by an echo of the
//! request URL.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HOST;
use hyper::{HeaderMap, Response, StatusCode, Uri};

use crate::config::Config;
use crate::http;
use crate::items;
use crate::logger;

/// Content type of the items response, trailing space included
pub const ITEMS_CONTENT_TYPE: &str = "application/json ";

/// Reconstruct the absolute URL the client requested.
///
/// Absolute-form targets are returned untouched. Otherwise the origin comes
/// from `http.origin`, then the `Host` header, then the listen address.
pub fn request_url(uri: &Uri, headers: &HeaderMap, config: &Config) -> String {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return uri.to_string();
    }

    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());

    let origin = if let Some(origin) = &config.http.origin {
        origin.trim_end_matches('/').to_string()
    } else if let Some(host) = headers.get(HOST).and_then(|v| v.to_str().ok()) {
        format!("http://{host}")
    } else {
        // SocketAddr's Display brackets IPv6 hosts
        config.get_socket_addr().map_or_else(
            |_| format!("http://{}:{}", config.server.host, config.server.port),
            |addr| format!("http://{addr}"),
        )
    };

    format!("{origin}{path_and_query}")
}

/// Build the items response for the given request URL
pub fn handle_items(url: &str, is_head: bool) -> Response<Full<Bytes>> {
    match items::render_items(url) {
        Ok(json) => http::build_body_response(StatusCode::OK, ITEMS_CONTENT_TYPE, json, is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize items: {e}"));
            http::build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::HeaderValue;

    fn test_config(extra: &str) -> Config {
        Config::load_from_str(extra).unwrap()
    }

    fn host_headers(host: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_str(host).unwrap());
        headers
    }

    async fn body_text(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_request_url_from_host_header() {
        let uri: Uri = "/api/v1/items?x=1".parse().unwrap();
        let url = request_url(&uri, &host_headers("example.com:3000"), &test_config(""));
        assert_eq!(url, "http://example.com:3000/api/v1/items?x=1");
    }

    #[test]
    fn test_request_url_absolute_form_untouched() {
        let uri: Uri = "https://example.com/api/v1/items?x=1".parse().unwrap();
        let url = request_url(&uri, &host_headers("other.host"), &test_config(""));
        assert_eq!(url, "https://example.com/api/v1/items?x=1");
    }

    #[test]
    fn test_request_url_configured_origin_wins_over_host() {
        let cfg = test_config("[http]\norigin = \"https://example.com/\"");
        let uri: Uri = "/api/v1/items?x=1".parse().unwrap();
        let url = request_url(&uri, &host_headers("127.0.0.1:8080"), &cfg);
        assert_eq!(url, "https://example.com/api/v1/items?x=1");
    }

    #[test]
    fn test_request_url_falls_back_to_listen_address() {
        let uri: Uri = "/api/v1/items".parse().unwrap();
        let url = request_url(&uri, &HeaderMap::new(), &test_config(""));
        assert_eq!(url, "http://127.0.0.1:8080/api/v1/items");
    }

    #[test]
    fn test_request_url_brackets_ipv6_listen_address() {
        let uri: Uri = "/api/v1/items".parse().unwrap();
        let config = test_config("[server]\nhost = \"::1\"\nport = 8080");
        let url = request_url(&uri, &HeaderMap::new(), &config);
        assert_eq!(url, "http://[::1]:8080/api/v1/items");
    }

    #[test]
    fn test_request_url_keeps_query_verbatim() {
        let uri: Uri = "/api/v1/items?q=a%20b&empty=&flag".parse().unwrap();
        let url = request_url(&uri, &host_headers("h"), &test_config(""));
        assert_eq!(url, "http://h/api/v1/items?q=a%20b&empty=&flag");
    }

    #[tokio::test]
    async fn test_handle_items_scenario() {
        let resp = handle_items("https://example.com/api/v1/items?x=1", false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "application/json ");
        assert!(resp.headers()["Content-Type"]
            .to_str()
            .unwrap()
            .contains("application/json"));
        assert_eq!(
            body_text(resp).await,
            r#"[{"id":1,"name":"Buy groceries"},{"id":2,"name":"Finish SvelteKit project"},{"id":3,"name":"Walk the dog"},{"url":"https://example.com/api/v1/items?x=1"}]"#
        );
    }

    #[tokio::test]
    async fn test_handle_items_any_url_is_ok() {
        for url in ["", "not a url", "http://x/?a=\u{e9}", "/relative"] {
            let resp = handle_items(url, false);
            assert_eq!(resp.status(), StatusCode::OK);
            let parsed: serde_json::Value =
                serde_json::from_str(&body_text(resp).await).unwrap();
            assert_eq!(parsed.as_array().unwrap().len(), 4);
            assert_eq!(parsed[3]["url"], url);
        }
    }

    #[tokio::test]
    async fn test_handle_items_is_byte_identical() {
        let url = "http://localhost:8080/api/v1/items";
        let first = body_text(handle_items(url, false)).await;
        let second = body_text(handle_items(url, false)).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_handle_items_head() {
        let get = handle_items("http://h/api/v1/items", false);
        let head = handle_items("http://h/api/v1/items", true);
        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(
            head.headers()["Content-Length"],
            get.headers()["Content-Length"]
        );
        assert_eq!(body_text(head).await, "");
    }
}
