use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use merchant_core::{ApiError, ApiSession, HttpOptions, MerchantToken};
use reqwest::Method;
use serde_json::{json, Value};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    Json(json!({ "authorization": auth }))
}

fn router() -> Router {
    Router::new()
        .route("/whoami", get(echo_auth))
        .route(
            "/reject",
            post(|| async { (StatusCode::CONFLICT, "merchant name taken") }),
        )
        .route("/garbage", get(|| async { "not json" }))
}

#[tokio::test]
async fn attaches_token_header() {
    let base = spawn(router()).await;
    let session = ApiSession::new(&base, &HttpOptions::default())
        .unwrap()
        .with_token(MerchantToken::new("abc123"));

    let body: Value = session.get("whoami").await.unwrap();
    assert_eq!(body["authorization"], "Token abc123");
}

#[tokio::test]
async fn omits_header_without_token() {
    let base = spawn(router()).await;
    let session = ApiSession::new(&base, &HttpOptions::default()).unwrap();

    let body: Value = session.get("/whoami").await.unwrap();
    assert!(body["authorization"].is_null());
}

#[tokio::test]
async fn blank_token_sends_no_header() {
    let base = spawn(router()).await;
    let session = ApiSession::new(&base, &HttpOptions::default())
        .unwrap()
        .with_token(MerchantToken::new(""));

    let body: Value = session.get("whoami").await.unwrap();
    assert!(body["authorization"].is_null());
}

#[tokio::test]
async fn keeps_body_of_rejected_requests() {
    let base = spawn(router()).await;
    let session = ApiSession::new(&base, &HttpOptions::default()).unwrap();

    let err = session
        .call_empty(Method::POST, "reject", Some(json!({})))
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status.as_u16(), 409);
            assert_eq!(body, "merchant name taken");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn reports_undecodable_bodies() {
    let base = spawn(router()).await;
    let session = ApiSession::new(&base, &HttpOptions::default()).unwrap();

    let err = session.get::<Value>("garbage").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { ref path, .. } if path == "garbage"));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = ApiSession::new(&format!("http://{addr}"), &HttpOptions::default()).unwrap();
    let err = session.get::<Value>("whoami").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
