//! API 라우트.
//!
//! 원래 프론트엔드가 쓰는 경로를 그대로 유지합니다 (뒤따르는 슬래시 포함).

pub mod company;
pub mod health;
pub mod market;
pub mod news;
pub mod rankings;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::router())
        .merge(company::router())
        .merge(market::router())
        .merge(news::router())
        .merge(rankings::router())
}
