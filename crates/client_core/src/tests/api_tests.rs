use std::sync::{Arc, Mutex};

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{domain::MessageContent, error::ApiErrorKind};
use tokio::net::TcpListener;

use super::*;
use crate::{form::FormPhase, session::ChatSession, texts};

async fn spawn_stub(app: Router) -> anyhow::Result<HttpApiClient> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let settings = ClientSettings {
        api_base_url: format!("http://{addr}/api/v1/"),
        ..ClientSettings::default()
    };
    HttpApiClient::from_settings(&settings)
}

fn figures() -> Value {
    json!({
        "ipn": 1000.0,
        "sn": 0.0,
        "total_tax": 1000.0,
        "opv": 500.0,
        "so": 0.0,
        "vosms": 150.0,
        "total_social": 650.0,
        "limit_percentage": 33.333,
        "warnings": null
    })
}

fn calculation_ok_router(seen: Arc<Mutex<Vec<Value>>>) -> Router {
    Router::new()
        .route(
            "/api/v1/chat",
            post(|Json(body): Json<ChatRequest>| async move {
                Json(json!({
                    "type": "show_calculation_form",
                    "ai_message": format!("form for: {}", body.message)
                }))
            }),
        )
        .route(
            "/api/v1/calculate_from_form",
            post(move |Json(body): Json<Value>| {
                let seen = seen.clone();
                async move {
                    seen.lock().expect("lock").push(body);
                    Json(json!({
                        "calculation": figures(),
                        "explanation": "Упрощенка: 3% от дохода.",
                        "disclaimer": "server notice"
                    }))
                }
            }),
        )
}

#[tokio::test]
async fn chat_decodes_ai_message() {
    let app = Router::new().route(
        "/api/v1/chat",
        post(|Json(body): Json<ChatRequest>| async move {
            Json(json!({"type": "ai_message", "ai_message": format!("echo: {}", body.message)}))
        }),
    );
    let client = spawn_stub(app).await.expect("spawn stub");

    let response = client.chat("привет").await.expect("chat");
    assert_eq!(
        response,
        ChatTurnResponse::AiMessage {
            text: "echo: привет".into()
        }
    );
}

#[tokio::test]
async fn chat_unknown_type_is_unrecognized() {
    let app = Router::new().route(
        "/api/v1/chat",
        post(|| async { Json(json!({"type": "carousel", "items": []})) }),
    );
    let client = spawn_stub(app).await.expect("spawn stub");

    assert_eq!(
        client.chat("hi").await.expect("chat"),
        ChatTurnResponse::Unrecognized
    );
}

#[tokio::test]
async fn non_success_status_extracts_error_field() {
    let app = Router::new().route(
        "/api/v1/chat",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": "rate limited"})),
            )
        }),
    );
    let client = spawn_stub(app).await.expect("spawn stub");

    let error = client.chat("hi").await.expect_err("should fail");
    assert_eq!(error.kind, ApiErrorKind::Server);
    assert_eq!(error.http_status, Some(429));
    assert_eq!(error.detail, "HTTP status: 429 - rate limited");
}

#[tokio::test]
async fn non_success_status_without_json_keeps_status_only() {
    let app = Router::new().route(
        "/api/v1/chat",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let client = spawn_stub(app).await.expect("spawn stub");

    let error = client.chat("hi").await.expect_err("should fail");
    assert_eq!(error.detail, "HTTP status: 502");
}

#[tokio::test]
async fn non_success_chat_error_envelope_uses_error_message() {
    let app = Router::new().route(
        "/api/v1/chat",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"type": "error", "error_message": "не удалось сгенерировать ответ"})),
            )
        }),
    );
    let client = spawn_stub(app).await.expect("spawn stub");

    let error = client.chat("hi").await.expect_err("should fail");
    assert_eq!(
        error.detail,
        "HTTP status: 500 - не удалось сгенерировать ответ"
    );
}

#[tokio::test]
async fn undecodable_success_body_is_malformed() {
    let app = Router::new().route("/api/v1/chat", post(|| async { "definitely not json" }));
    let client = spawn_stub(app).await.expect("spawn stub");

    let error = client.chat("hi").await.expect_err("should fail");
    assert_eq!(error.kind, ApiErrorKind::MalformedResponse);
    assert_eq!(error.http_status, Some(200));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let settings = ClientSettings {
        api_base_url: format!("http://{addr}/api/v1/"),
        ..ClientSettings::default()
    };
    let client = HttpApiClient::from_settings(&settings).expect("client");

    let error = client.chat("hi").await.expect_err("should fail");
    assert_eq!(error.kind, ApiErrorKind::Transport);
    assert_eq!(error.http_status, None);
}

#[tokio::test]
async fn calculate_posts_snake_case_body() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let client = spawn_stub(calculation_ok_router(seen.clone()))
        .await
        .expect("spawn stub");

    let result = client
        .calculate(CalculationRequest {
            revenue: 100000.0,
            months_worked: 3,
        })
        .await
        .expect("calculate");

    assert_eq!(result.calculation.total_social, 650.0);
    assert!(result.calculation.warnings.is_empty());
    assert_eq!(result.disclaimer, "server notice");
    assert_eq!(
        seen.lock().expect("lock").as_slice(),
        &[json!({"revenue": 100000.0, "months_worked": 3})]
    );
}

#[tokio::test]
async fn calculation_without_explanation_is_rejected() {
    let app = Router::new().route(
        "/api/v1/calculate_from_form",
        post(|| async { Json(json!({"calculation": figures(), "disclaimer": "d"})) }),
    );
    let client = spawn_stub(app).await.expect("spawn stub");

    let error = client
        .calculate(CalculationRequest {
            revenue: 1.0,
            months_worked: 1,
        })
        .await
        .expect_err("should fail");
    assert_eq!(error.kind, ApiErrorKind::MalformedResponse);
}

#[tokio::test]
async fn health_reports_service_status() {
    let app = Router::new().route("/health", get(|| async { Json(json!({"status": "UP"})) }));
    let client = spawn_stub(app).await.expect("spawn stub");

    let health = client.health().await.expect("health");
    assert!(health.is_up());
}

#[test]
fn error_detail_falls_back_to_raw_json() {
    assert_eq!(
        error_detail(400, r#"{"details":"bad field"}"#),
        r#"HTTP status: 400 - {"details":"bad field"}"#
    );
    assert_eq!(
        error_detail(400, r#"{"error":"", "message":"use message"}"#),
        "HTTP status: 400 - use message"
    );
    assert_eq!(error_detail(503, ""), "HTTP status: 503");
}

#[tokio::test]
async fn session_round_trip_over_http() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let client = spawn_stub(calculation_ok_router(seen.clone()))
        .await
        .expect("spawn stub");
    let mut session = ChatSession::default();
    session.greet(texts::GREETING);

    assert!(session.send_user_message(&client, "посчитай налог").await);
    assert_eq!(session.form().phase(), FormPhase::Open);
    assert_eq!(
        session.conversation().transcript()[2].as_text(),
        Some("form for: посчитай налог")
    );

    assert!(session.send_form(&client, "100 000", "3").await);
    assert_eq!(session.form().phase(), FormPhase::Closed);
    assert_eq!(seen.lock().expect("lock").len(), 1);

    let transcript = session.conversation().transcript();
    assert_eq!(transcript.len(), 4);
    let MessageContent::Calculation(view) = &transcript[3].content else {
        panic!("expected calculation message");
    };
    assert_eq!(view.ipn, "1\u{a0}000,00");
    assert_eq!(view.vosms, "150,00");
    assert_eq!(view.limit_percentage, "33,3");
    assert_eq!(view.warnings, None);
    assert_eq!(session.disclaimer().text(), Some("server notice"));
}
