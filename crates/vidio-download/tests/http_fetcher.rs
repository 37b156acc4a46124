//! Integration tests for the `reqwest` fetcher against a local media server.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use futures_util::TryStreamExt;
use tokio_test::assert_ok;
use vidio_core::{ForwardedHeaders, RemoteFetcherPort, RemoteResponse};
use vidio_download::{DEFAULT_USER_AGENT, HttpRemoteFetcher};

const MEDIA: &[u8] = b"hello";

async fn media(headers: HeaderMap) -> Response {
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    if range == Some("bytes=2-") {
        return (
            StatusCode::PARTIAL_CONTENT,
            [
                (header::CONTENT_TYPE, "video/mp4"),
                (header::CONTENT_RANGE, "bytes 2-4/5"),
                (header::ACCEPT_RANGES, "bytes"),
            ],
            &MEDIA[2..],
        )
            .into_response();
    }

    (
        [
            (header::CONTENT_TYPE, "video/mp4"),
            (header::ACCEPT_RANGES, "bytes"),
        ],
        MEDIA,
    )
        .into_response()
}

async fn echo(headers: HeaderMap) -> String {
    let value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string()
    };
    format!(
        "{}|{}|{}",
        value(header::USER_AGENT),
        value(header::ACCEPT_ENCODING),
        value(header::RANGE)
    )
}

async fn spawn_media_server() -> String {
    let app = Router::new()
        .route("/media", get(media))
        .route("/redirect", get(|| async { Redirect::temporary("/media") }))
        .route(
            "/blocked",
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    [(header::CONTENT_TYPE, "text/html")],
                    "<html>denied</html>",
                )
            }),
        )
        .route("/echo", get(echo))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                ([(header::CONTENT_TYPE, "video/mp4")], MEDIA)
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

async fn body_of(response: RemoteResponse) -> Vec<u8> {
    response
        .body
        .try_fold(Vec::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await
        .expect("read body")
}

#[tokio::test]
async fn test_fetch_full_media() {
    let base = spawn_media_server().await;
    let fetcher = assert_ok!(HttpRemoteFetcher::new());

    let response = assert_ok!(
        fetcher
            .fetch(&format!("{base}/media"), &ForwardedHeaders::default())
            .await
    );

    assert_eq!(response.status, 200);
    assert!(response.is_usable());
    assert_eq!(response.content_length, Some(5));
    assert_eq!(response.accept_ranges.as_deref(), Some("bytes"));
    assert_eq!(body_of(response).await, MEDIA);
}

#[tokio::test]
async fn test_fetch_forwards_range() {
    let base = spawn_media_server().await;
    let fetcher = HttpRemoteFetcher::new().unwrap();
    let headers = ForwardedHeaders {
        user_agent: None,
        range: Some("bytes=2-".to_string()),
    };

    let response = fetcher
        .fetch(&format!("{base}/media"), &headers)
        .await
        .unwrap();

    assert_eq!(response.status, 206);
    assert_eq!(response.content_range.as_deref(), Some("bytes 2-4/5"));
    assert_eq!(body_of(response).await, b"llo");
}

#[tokio::test]
async fn test_fetch_follows_redirects() {
    let base = spawn_media_server().await;
    let fetcher = HttpRemoteFetcher::new().unwrap();

    let response = fetcher
        .fetch(&format!("{base}/redirect"), &ForwardedHeaders::default())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type.as_deref(), Some("video/mp4"));
}

#[tokio::test]
async fn test_error_page_is_reported_not_rejected() {
    let base = spawn_media_server().await;
    let fetcher = HttpRemoteFetcher::new().unwrap();

    let response = fetcher
        .fetch(&format!("{base}/blocked"), &ForwardedHeaders::default())
        .await
        .unwrap();

    assert_eq!(response.status, 403);
    assert!(!response.is_usable());
}

#[tokio::test]
async fn test_request_headers() {
    let base = spawn_media_server().await;
    let fetcher = HttpRemoteFetcher::new().unwrap();

    let response = fetcher
        .fetch(&format!("{base}/echo"), &ForwardedHeaders::default())
        .await
        .unwrap();
    let echoed = String::from_utf8(body_of(response).await).unwrap();
    assert_eq!(echoed, format!("{DEFAULT_USER_AGENT}|identity|-"));

    let headers = ForwardedHeaders {
        user_agent: Some("Mozilla/5.0 test".to_string()),
        range: Some("bytes=0-".to_string()),
    };
    let response = fetcher
        .fetch(&format!("{base}/echo"), &headers)
        .await
        .unwrap();
    let echoed = String::from_utf8(body_of(response).await).unwrap();
    assert_eq!(echoed, "Mozilla/5.0 test|identity|bytes=0-");
}

#[tokio::test]
async fn test_connection_refused_is_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpRemoteFetcher::new().unwrap();
    let err = fetcher
        .fetch(&format!("http://{addr}/media"), &ForwardedHeaders::default())
        .await
        .unwrap_err();
    assert!(matches!(err, vidio_core::FetchError::Request(_)));
}

#[tokio::test]
async fn test_slow_headers_time_out() {
    let base = spawn_media_server().await;
    let fetcher = HttpRemoteFetcher::new()
        .unwrap()
        .with_headers_timeout(Duration::from_millis(200));

    let err = fetcher
        .fetch(&format!("{base}/slow"), &ForwardedHeaders::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        vidio_core::FetchError::Timeout(d) if d == Duration::from_millis(200)
    ));
}
