use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, MultipartEcho, BINARY_BODY};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

// --- echo ---

#[tokio::test]
async fn echo_reports_method_query_and_headers() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/echo?q=x&lang=en")
                .header("x-app", "ocr")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.query["q"], "x");
    assert_eq!(echo.query["lang"], "en");
    assert_eq!(echo.headers["x-app"], "ocr");
    assert!(echo.body.is_empty());
}

#[tokio::test]
async fn echo_returns_body_text() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body("a=b".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body, "a=b");
    assert_eq!(echo.headers["content-type"], "application/x-www-form-urlencoded");
}

// --- multipart ---

#[tokio::test]
async fn multipart_lists_parts_in_order() {
    let body = "--B\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
        \r\n\
        img\r\n\
        --B\r\n\
        Content-Disposition: form-data; name=\"field\"\r\n\
        \r\n\
        value\r\n\
        --B--\r\n";
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/multipart?token=t")
                .header(http::header::CONTENT_TYPE, "multipart/form-data; boundary=B")
                .body(body.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: MultipartEcho = body_json(resp).await;
    assert_eq!(echo.query["token"], "t");
    assert_eq!(echo.parts.len(), 2);
    assert_eq!(echo.parts[0].name, "file");
    assert_eq!(echo.parts[0].filename.as_deref(), Some("a.png"));
    assert_eq!(echo.parts[0].contents, "img");
    assert_eq!(echo.parts[1].name, "field");
    assert_eq!(echo.parts[1].contents, "value");
}

#[tokio::test]
async fn multipart_without_boundary_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/multipart")
                .body("nothing".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}

// --- canned responses ---

#[tokio::test]
async fn empty_has_no_body() {
    let resp = app()
        .oneshot(Request::builder().uri("/empty").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn malformed_returns_broken_json() {
    let resp = app()
        .oneshot(Request::builder().uri("/malformed").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"{invalid");
}

#[tokio::test]
async fn binary_returns_non_utf8_bytes() {
    let resp = app()
        .oneshot(Request::builder().uri("/binary").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert_eq!(&bytes[..], BINARY_BODY);
    assert!(std::str::from_utf8(&bytes).is_err());
}

#[tokio::test]
async fn status_route_forces_code() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/503").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn status_route_rejects_invalid_code() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/42").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
