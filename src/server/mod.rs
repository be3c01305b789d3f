//! HTTP 서버 모듈 - axum 기반 /generate 엔드포인트
//!
//! 모든 응답(에러/프리플라이트 포함)에 허용적 CORS 헤더를 부여합니다.
//! 어떤 코드 경로도 포맷되지 않은 에러를 내보내지 않습니다 -
//! 항상 성공 계약 또는 에러 계약 JSON으로 응답합니다.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::reply::{ReplyError, ReplyPipeline, Ticket};

// ============================================================================
// AppState
// ============================================================================

/// 공유 상태
///
/// 파이프라인 외에 요청 간 공유되는 가변 상태는 없습니다.
pub struct AppState {
    pub pipeline: ReplyPipeline,
}

// ============================================================================
// Router
// ============================================================================

/// 라우터 구성
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/generate", post(generate).options(generate_options))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 서버 실행
pub async fn run(state: Arc<AppState>, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("palank-reply server listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - 동작 확인용 (부작용 없음)
async fn home() -> &'static str {
    "palank-reply server is running"
}

/// OPTIONS /generate
///
/// 프리플라이트 요청은 CORS 레이어가 직접 응답하고,
/// 그 외의 OPTIONS 요청은 이 핸들러가 최소 응답을 반환합니다.
async fn generate_options() -> &'static str {
    "ok"
}

/// POST /generate - 티켓으로 답변 생성
///
/// 본문을 직접 파싱하여 누락/비정상 JSON을 400 계약으로 매핑합니다.
/// 자격 증명 확인이 본문 파싱보다 먼저입니다 - 키가 없으면
/// 페이로드와 무관하게 500으로 응답합니다.
async fn generate(State(state): State<Arc<AppState>>, body: String) -> Response {
    if !state.pipeline.has_credentials() {
        return error_response(ReplyError::MissingApiKey);
    }

    let ticket: Ticket = match serde_json::from_str(&body) {
        Ok(ticket) => ticket,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "No JSON data received" })),
            )
                .into_response();
        }
    };

    match state.pipeline.handle(ticket).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 실패를 에러 계약으로 매핑
fn error_response(err: ReplyError) -> Response {
    match err {
        ReplyError::MissingApiKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "API Key not found",
                "hint": "Set GEMINI_API_KEY or GOOGLE_AI_API_KEY",
            })),
        )
            .into_response(),
        ReplyError::Upstream(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response(),
    }
}

// ============================================================================
// Tests
// ============================================================================
