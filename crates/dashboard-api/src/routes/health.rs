//! 루트 배너와 헬스 체크 endpoint.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

/// 루트 배너.
///
/// GET /
async fn index(State(state): State<Arc<AppState>>) -> Json<Value> {
    let environment =
        std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    Json(json!({
        "message": "대시보드 API 서버 실행 중: /hot /news /price/{ticker} 사용 가능",
        "database_status": if state.db_pool.is_some() { "연결됨" } else { "연결 실패" },
        "environment": environment,
    }))
}

/// 서버 상태 확인.
///
/// GET /health
async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let database = if state.is_db_healthy().await {
        "connected"
    } else {
        "disconnected"
    };

    Json(json!({
        "status": "healthy",
        "database": database,
        "uptime_secs": state.uptime_secs(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// 라우터 생성.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
}
