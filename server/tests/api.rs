use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use envelope_core::{Envelope, ERROR_CODE};
use envelope_server::{
    app, routes, with_error_handling, ServerConfig, Wallet, DUPLICATE_ADDRESS,
    GENERIC_FAILURE_MESSAGE,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn test_app() -> Router {
    app(&ServerConfig::default())
}

/// Create a wallet through the router and return it.
async fn create(app: &Router, nickname: &str, address: &str) -> Wallet {
    let body = serde_json::json!({"nickname": nickname, "address": address}).to_string();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/wallets", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<Wallet> = body_json(resp).await;
    assert!(env.is_success(), "create failed: {:?}", env.message);
    env.data.unwrap()
}

// --- health / routing ---

#[tokio::test]
async fn health_reports_ok() {
    let resp = test_app().oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope = body_json(resp).await;
    assert_eq!(env.data(), Some(&serde_json::json!({"status": "ok"})));
}

#[tokio::test]
async fn unknown_route_returns_404_envelope() {
    let resp = test_app().oneshot(empty_request("GET", "/nope")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let env: Envelope = body_json(resp).await;
    assert_eq!(env.code, ERROR_CODE);
    assert_eq!(env.message.as_deref(), Some("route not found"));
}

#[tokio::test]
async fn unsupported_method_returns_405_envelope() {
    let resp = test_app()
        .oneshot(json_request("PATCH", "/api/wallets", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let raw = body_bytes(resp).await;
    assert!(!raw.is_empty());
    let env: Envelope = serde_json::from_slice(&raw).unwrap();
    assert_eq!(env.code, ERROR_CODE);
    assert_eq!(env.message.as_deref(), Some("method PATCH not allowed"));
}

#[tokio::test]
async fn unsupported_method_on_item_route_returns_405_envelope() {
    let resp = test_app()
        .oneshot(empty_request(
            "POST",
            "/api/wallets/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let env: Envelope = body_json(resp).await;
    assert_eq!(env.code, ERROR_CODE);
}

// --- list ---

#[tokio::test]
async fn list_wallets_empty() {
    let resp = test_app().oneshot(empty_request("GET", "/api/wallets")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<Vec<Wallet>> = body_json(resp).await;
    assert!(env.is_success());
    assert_eq!(env.data, Some(Vec::new()));
}

#[tokio::test]
async fn list_wallets_sorted_by_nickname() {
    let app = test_app();
    create(&app, "zeta", "0x2").await;
    create(&app, "alpha", "0x1").await;

    let resp = app.oneshot(empty_request("GET", "/api/wallets")).await.unwrap();
    let env: Envelope<Vec<Wallet>> = body_json(resp).await;
    let names: Vec<String> = env.data.unwrap().into_iter().map(|w| w.nickname).collect();
    assert_eq!(names, ["alpha", "zeta"]);
}

// --- create ---

#[tokio::test]
async fn create_wallet_from_json() {
    let app = test_app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/wallets",
            r#"{"nickname":" main ","address":"0xabc"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<Wallet> = body_json(resp).await;
    assert_eq!(env.message.as_deref(), Some("wallet created"));
    let wallet = env.data.unwrap();
    assert_eq!(wallet.nickname, "main");
    assert_eq!(wallet.address, "0xabc");
}

#[tokio::test]
async fn create_wallet_from_urlencoded_form() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/wallets")
                .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("nickname=hot&address=0xdef"))
                .unwrap(),
        )
        .await
        .unwrap();

    let env: Envelope<Wallet> = body_json(resp).await;
    assert_eq!(env.data.unwrap().nickname, "hot");
}

#[tokio::test]
async fn create_wallet_from_multipart_form() {
    let boundary = "XBOUNDARY";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"nickname\"\r\n\r\ncold\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"address\"\r\n\r\n0x123\r\n\
         --{boundary}--\r\n"
    );
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/wallets")
                .header(
                    http::header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<Wallet> = body_json(resp).await;
    let wallet = env.data.unwrap();
    assert_eq!(wallet.nickname, "cold");
    assert_eq!(wallet.address, "0x123");
}

#[tokio::test]
async fn create_wallet_blank_nickname_is_business_error() {
    let resp = test_app()
        .oneshot(json_request(
            "POST",
            "/api/wallets",
            r#"{"nickname":"  ","address":"0xabc"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope = body_json(resp).await;
    assert_eq!(env.code, ERROR_CODE);
    assert_eq!(env.message.as_deref(), Some("nickname is required"));
}

#[tokio::test]
async fn create_wallet_duplicate_address_uses_custom_code() {
    let app = test_app();
    create(&app, "first", "0xAAA").await;

    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/wallets",
            r#"{"nickname":"second","address":"0xaaa"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope = body_json(resp).await;
    assert_eq!(env.code, DUPLICATE_ADDRESS);
    assert_eq!(env.data, Some(serde_json::json!({})));
}

#[tokio::test]
async fn create_wallet_missing_field_returns_422_envelope() {
    let resp = test_app()
        .oneshot(json_request("POST", "/api/wallets", r#"{"nickname":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let env: Envelope = body_json(resp).await;
    assert_eq!(env.code, ERROR_CODE);
    assert!(env.message.is_some());
}

#[tokio::test]
async fn create_wallet_malformed_json_returns_400_envelope() {
    let resp = test_app()
        .oneshot(json_request("POST", "/api/wallets", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let env: Envelope = body_json(resp).await;
    assert_eq!(env.code, ERROR_CODE);
}

// --- get ---

#[tokio::test]
async fn get_wallet_not_found() {
    let resp = test_app()
        .oneshot(empty_request(
            "GET",
            "/api/wallets/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let env: Envelope = body_json(resp).await;
    assert_eq!(
        env.message.as_deref(),
        Some("wallet 00000000-0000-0000-0000-000000000000 not found")
    );
}

#[tokio::test]
async fn get_wallet_bad_uuid_returns_400() {
    let resp = test_app()
        .oneshot(empty_request("GET", "/api/wallets/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let env: Envelope = body_json(resp).await;
    assert_eq!(env.message.as_deref(), Some("invalid wallet id: not-a-uuid"));
}

// --- update ---

#[tokio::test]
async fn update_wallet_partial_fields() {
    let app = test_app();
    let wallet = create(&app, "main", "0x1").await;

    let resp = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/wallets/{}", wallet.id),
            r#"{"nickname":"renamed"}"#,
        ))
        .await
        .unwrap();

    let env: Envelope<Wallet> = body_json(resp).await;
    let updated = env.data.unwrap();
    assert_eq!(updated.nickname, "renamed");
    assert_eq!(updated.address, "0x1");
}

#[tokio::test]
async fn update_wallet_to_taken_address_is_rejected() {
    let app = test_app();
    create(&app, "a", "0x1").await;
    let b = create(&app, "b", "0x2").await;

    let resp = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/wallets/{}", b.id),
            r#"{"address":"0x1"}"#,
        ))
        .await
        .unwrap();

    let env: Envelope = body_json(resp).await;
    assert_eq!(env.code, DUPLICATE_ADDRESS);
}

#[tokio::test]
async fn update_wallet_not_found() {
    let resp = test_app()
        .oneshot(json_request(
            "PUT",
            "/api/wallets/00000000-0000-0000-0000-000000000000",
            r#"{"nickname":"x"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_wallet_then_get_is_not_found() {
    let app = test_app();
    let wallet = create(&app, "gone", "0x9").await;
    let uri = format!("/api/wallets/{}", wallet.id);

    let resp = app.clone().oneshot(empty_request("DELETE", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope = body_json(resp).await;
    assert_eq!(env.message.as_deref(), Some("wallet deleted"));
    assert_eq!(env.data, Some(serde_json::json!({})));

    let resp = app.oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- panics ---

async fn boom() -> &'static str {
    panic!("ledger exploded")
}

fn panicking_app(debug: bool) -> Router {
    with_error_handling(routes().route("/boom", get(boom)), debug)
}

#[tokio::test]
async fn panic_returns_generic_500_envelope() {
    let resp = panicking_app(false)
        .oneshot(empty_request("GET", "/boom"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let env: Envelope<Value> = body_json(resp).await;
    assert_eq!(env.code, ERROR_CODE);
    assert_eq!(env.message.as_deref(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn panic_detail_exposed_in_debug_mode() {
    let resp = panicking_app(true)
        .oneshot(empty_request("GET", "/boom"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let env: Envelope<Value> = body_json(resp).await;
    assert_eq!(env.message.as_deref(), Some("ledger exploded"));
}
