//! End-to-end request flow through the Axum router.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::Router;
use host_rewrite_proxy::proxy::ProxyHandler;
use host_rewrite_proxy::rewrite::ProxyResponse;
use host_rewrite_proxy::{HttpServer, ProxyConfig, Shutdown};
use tower::ServiceExt;

mod common;

use common::RecordingUpstream;

const PUBLIC: &str = "public.example.com";
const BACKEND: &str = "v1-dot-proj.appspot.com";

fn router(upstream: RecordingUpstream, config: ProxyConfig) -> Router {
    let handler = Arc::new(ProxyHandler::new(BACKEND, upstream).unwrap());
    HttpServer::new(config, handler).router()
}

fn https(method: &str, path: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::HOST, PUBLIC)
        .header("x-forwarded-proto", "https")
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_request_and_response_are_rewritten() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=1; Domain=v1-dot-proj.appspot.com"),
    );
    headers.insert("x-cloud-trace-context", HeaderValue::from_static("abc/1"));
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
    let (upstream, seen) = RecordingUpstream::replying(ProxyResponse::new(
        StatusCode::OK,
        headers,
        "<a href=\"https://v1-dot-proj.appspot.com/google\">go</a>",
    ));
    let app = router(upstream, ProxyConfig::default());

    let resp = app
        .oneshot(
            https("GET", "/api/x%2Fy")
                .header(header::COOKIE, "sess=abc")
                .header("forwarded", "for=1.2.3.4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::SET_COOKIE).unwrap(),
        "session=1; Domain=public.example.com"
    );
    assert!(resp.headers().keys().all(|k| !k.as_str().starts_with("x-")));
    assert_eq!(body_text(resp).await, "<a href=\"https://public.example.com/google\">go</a>");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let out = &seen[0];
    assert_eq!(out.url.as_str(), "https://v1-dot-proj.appspot.com/api/x/y");
    assert_eq!(out.headers.get(header::COOKIE).unwrap(), "sess=abc");
    assert_eq!(out.headers.get(header::HOST).unwrap(), BACKEND);
    assert!(out.headers.get("forwarded").is_none());
    assert!(out.headers.get("x-forwarded-proto").is_none());
    assert!(out.headers.get("x-request-id").is_none());
    assert_eq!(out.headers.get_all("x-oauth-redirect").iter().count(), 1);
    assert_eq!(out.headers.get("x-oauth-redirect").unwrap(), "https://public.example.com");
}

#[tokio::test]
async fn test_plaintext_is_rejected() {
    let (upstream, seen) = RecordingUpstream::ok("unused");
    let app = router(upstream, ProxyConfig::default());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::HOST, PUBLIC)
                .body(Body::from("password=hunter2"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("Only HTTPS is supported"));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_reserved_path_is_rejected() {
    let (upstream, seen) = RecordingUpstream::ok("unused");
    let app = router(upstream, ProxyConfig::default());

    for (method, path) in [("GET", "/_ah/health"), ("POST", "/_ah/push-handlers/x")] {
        let resp = app
            .clone()
            .oneshot(https(method, path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(resp).await, "App Engine Methods not implemented");
    }
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_encoded_reserved_path_is_rejected() {
    let (upstream, seen) = RecordingUpstream::ok("unused");
    let app = router(upstream, ProxyConfig::default());

    for path in [
        "/_ah%2Fhealth",
        "/%5Fah/warmup",
        "/x/../_ah/health",
        "/x/..%2F_ah/health",
    ] {
        let resp = app
            .clone()
            .oneshot(https("GET", path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
    }
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_caller_host_spelling_is_rewritten() {
    let (upstream, seen) = RecordingUpstream::ok("hello from v1-dot-proj.appspot.com");
    let app = router(upstream, ProxyConfig::default());

    for host in ["Public.Example.com", "public.example.com:443"] {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/home")
                    .header(header::HOST, host)
                    .header(header::ORIGIN, format!("https://{host}"))
                    .header("x-forwarded-proto", "https")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, format!("hello from {host}"));
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    for out in seen.iter() {
        assert_eq!(out.url.as_str(), "https://v1-dot-proj.appspot.com/home");
        assert_eq!(out.headers.get(header::HOST).unwrap(), BACKEND);
        assert_eq!(out.headers.get(header::ORIGIN).unwrap(), "https://v1-dot-proj.appspot.com");
    }
}

#[tokio::test]
async fn test_binary_bodies_pass_untouched() {
    let response_bytes: Vec<u8> = vec![0xff, 0xd8, 0xff, 0xe0, 0x00];
    let (upstream, seen) = RecordingUpstream::replying(ProxyResponse::new(
        StatusCode::OK,
        HeaderMap::new(),
        response_bytes.clone(),
    ));
    let app = router(upstream, ProxyConfig::default());

    let mut request_bytes = vec![0xfe, 0x00];
    request_bytes.extend_from_slice(PUBLIC.as_bytes());
    let resp = app
        .oneshot(
            https("PUT", "/upload")
                .body(Body::from(request_bytes.clone()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, Bytes::from(response_bytes));
    assert_eq!(seen.lock().unwrap()[0].body, Bytes::from(request_bytes));
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let (upstream, seen) = RecordingUpstream::failing();
    let app = router(upstream, ProxyConfig::default());

    let resp = app
        .oneshot(https("GET", "/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(seen.lock().unwrap().len(), 1, "no retries");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (upstream, seen) = RecordingUpstream::ok("unused");
    let mut config = ProxyConfig::default();
    config.proxy.max_body_bytes = 8;
    let app = router(upstream, config);

    let resp = app
        .oneshot(https("POST", "/").body(Body::from("0123456789")).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_server_serves_and_shuts_down() {
    let (upstream, seen) = RecordingUpstream::ok("hello from v1-dot-proj.appspot.com");
    let handler = Arc::new(ProxyHandler::new(BACKEND, upstream).unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let proxy_addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(ProxyConfig::default(), handler);
    let server_shutdown = shutdown.subscribe();
    let task = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(format!("http://{}/hello", proxy_addr))
        .header("x-forwarded-proto", "https")
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("x-request-id").is_none());
    let host = format!("127.0.0.1:{}", proxy_addr.port());
    assert_eq!(res.text().await.unwrap(), format!("hello from {}", host));

    let url = seen.lock().unwrap()[0].url.to_string();
    assert_eq!(url, format!("https://{}/hello", BACKEND));

    drop(client);
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
