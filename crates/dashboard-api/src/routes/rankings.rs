//! 재무지표 랭킹과 참조 데이터 endpoint.

use crate::error::{from_data_error, not_found, service_unavailable, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};
use dashboard_data::ranking;
use serde_json::Value;
use std::sync::Arc;

/// 랭킹에 쓰는 지표 키와 응답 라벨.
const RANKING_METRICS: &[(&str, &str, &str)] = &[
    ("2024/12_매출액", "매출액", "매출액_TOP5"),
    ("2024/12_DPS", "DPS", "DPS_TOP5"),
    ("2024/12_영업이익률", "영업이익률", "영업이익률_TOP5"),
];

/// 지표별 상위 5개 기업.
///
/// GET /rankings/
async fn get_rankings(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let store = state
        .company_store
        .as_ref()
        .ok_or_else(|| service_unavailable("데이터베이스 연결 실패"))?;

    let docs = store.metric_documents().await.map_err(from_data_error)?;

    let mut result = serde_json::Map::new();
    for (metric_key, label, response_key) in RANKING_METRICS {
        let top5 = ranking::top_n(&docs, metric_key, label, 5);
        result.insert(response_key.to_string(), Value::Array(top5));
    }

    Ok(Json(Value::Object(result)))
}

/// 전체 기업의 연도별 핵심 지표 표.
///
/// GET /api/treasure
async fn get_treasure(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    let store = state
        .company_store
        .as_ref()
        .ok_or_else(|| service_unavailable("데이터베이스 연결 실패"))?;

    let docs = store.metric_documents().await.map_err(from_data_error)?;
    Ok(Json(ranking::treasure_rows(&docs)))
}

/// 기업의 사업부문별 매출 내역.
///
/// GET /sales/{name}
async fn get_sales(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<Value>>> {
    let sales = state
        .sales
        .as_ref()
        .ok_or_else(|| not_found("매출 데이터 파일이 없습니다"))?;

    let rows = sales.sales_for(&name).map_err(from_data_error)?;
    Ok(Json(rows))
}

/// 산업별 설명.
///
/// GET /industry/{name}
async fn get_industry(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let industry = state
        .industry
        .as_ref()
        .ok_or_else(|| not_found("산업 설명 파일이 없습니다"))?;

    let item = industry
        .find(&name)
        .ok_or_else(|| not_found(format!("해당 산업 정보 없음: {}", name)))?;

    Ok(Json(item.clone()))
}

/// 라우터 생성.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rankings/", get(get_rankings))
        .route("/api/treasure", get(get_treasure))
        .route("/sales/{name}", get(get_sales))
        .route("/industry/{name}", get(get_industry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use dashboard_data::reference::{IndustryReference, SalesReference};
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_rankings_without_db_returns_503() {
        let state = Arc::new(create_test_state());
        let app = router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/rankings/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_treasure_without_db_returns_503() {
        let state = Arc::new(create_test_state());
        let app = router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/treasure")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_sales_without_file_returns_404() {
        let state = Arc::new(create_test_state());
        let app = router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/sales/%EC%82%BC%EC%84%B1%EC%A0%84%EC%9E%90")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sales_with_loaded_reference() {
        let csv = "\
종목명,사업부문,매출품목명,구분,2022_12 매출액,2023_12 매출액,2024_12 매출액
삼성전자,DX,스마트폰,수출,1000,1100,1200
";
        let mut state = create_test_state();
        state.sales = Some(SalesReference::from_reader(csv.as_bytes()).unwrap());
        let app = router().with_state(Arc::new(state));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/sales/%EC%82%BC%EC%84%B1%EC%A0%84%EC%9E%90")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json[0]["사업부문"], "DX");
    }

    #[tokio::test]
    async fn test_sales_unknown_company_returns_404() {
        let csv = "\
종목명,사업부문,매출품목명,구분,2022_12 매출액,2023_12 매출액,2024_12 매출액
삼성전자,DX,스마트폰,수출,1000,1100,1200
";
        let mut state = create_test_state();
        state.sales = Some(SalesReference::from_reader(csv.as_bytes()).unwrap());
        let app = router().with_state(Arc::new(state));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/sales/%ED%98%84%EB%8C%80%EC%B0%A8")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_industry_with_loaded_reference() {
        let data = r#"[{"industry": "반도체", "description": "메모리 생산"}]"#;
        let mut state = create_test_state();
        state.industry = Some(IndustryReference::from_reader(data.as_bytes()).unwrap());
        let app = router().with_state(Arc::new(state));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/industry/%EB%B0%98%EB%8F%84%EC%B2%B4")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["description"], "메모리 생산");
    }

    #[tokio::test]
    async fn test_industry_unknown_returns_404() {
        let data = r#"[{"industry": "반도체", "description": "메모리 생산"}]"#;
        let mut state = create_test_state();
        state.industry = Some(IndustryReference::from_reader(data.as_bytes()).unwrap());
        let app = router().with_state(Arc::new(state));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/industry/%EC%A1%B0%EC%84%A0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
