//! 기업 문서 endpoint.

use crate::error::{from_data_error, service_unavailable, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};
use dashboard_core::CompanyDocument;
use dashboard_data::synthetic;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// 기업 상세 문서 조회 (짧은요약/개요 병합 포함).
///
/// GET /company/{name}
async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<CompanyDocument>> {
    let store = state
        .company_store
        .as_ref()
        .ok_or_else(|| service_unavailable("데이터베이스 연결 실패"))?;

    let doc = store.find_company(&name).await.map_err(from_data_error)?;
    Ok(Json(doc))
}

/// 전체 기업명 목록.
///
/// DB가 없으면 전체 폴백 목록(20개), 조회가 실패하거나 비었으면
/// 축약 폴백 목록(10개)을 반환합니다. 항상 200.
///
/// GET /companies/names
async fn get_company_names(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let store = match &state.company_store {
        Some(store) => store,
        None => {
            warn!("DB 미연결, 전체 폴백 기업명 반환");
            return Json(synthetic::fallback_company_names());
        }
    };

    match store.company_names().await {
        Ok(names) if !names.is_empty() => Json(names),
        Ok(_) => {
            warn!("기업명 목록 비어 있음, 축약 폴백 반환");
            Json(synthetic::fallback_company_names_short())
        }
        Err(e) => {
            warn!(error = %e, "기업명 조회 실패, 축약 폴백 반환");
            Json(synthetic::fallback_company_names_short())
        }
    }
}

/// 기업 재무지표 안내.
///
/// 재무지표 JSON은 프론트엔드가 정적 파일로 직접 로드합니다.
/// 이 엔드포인트는 안내 응답만 반환합니다.
///
/// GET /company_metrics/{name}
async fn get_company_metrics(Path(name): Path<String>) -> Json<Value> {
    Json(json!({
        "message": "기업 지표는 프론트엔드에서 직접 로드됩니다",
        "기업명": name,
        "data_source": "/기업별_재무지표.json",
    }))
}

/// 라우터 생성.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/company/{name}", get(get_company))
        .route("/companies/names", get(get_company_names))
        .route("/company_metrics/{name}", get(get_company_metrics))
}
