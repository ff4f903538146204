//! 뉴스/리포트 endpoint.
//!
//! 스크래핑이 실패하거나 빈 결과가 나오면 폴백 목록으로 대체하므로
//! 이 그룹의 엔드포인트는 파라미터 오류를 빼면 항상 200을 반환합니다.

use crate::error::{invalid_input, ApiResult};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::{routing::get, Json, Router};
use dashboard_core::{NewsItem, ReportItem};
use dashboard_data::synthetic;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct KeywordQuery {
    keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    code: Option<String>,
}

/// 키워드 뉴스 검색 (최대 10건).
///
/// GET /news/?keyword=반도체
async fn get_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeywordQuery>,
) -> ApiResult<Json<Vec<NewsItem>>> {
    let keyword = query
        .keyword
        .filter(|k| !k.is_empty())
        .ok_or_else(|| invalid_input("keyword 파라미터가 필요합니다"))?;

    let items = match state.news.search(&keyword, 10).await {
        Ok(items) if !items.is_empty() => items,
        Ok(_) => {
            warn!(keyword = %keyword, "뉴스 검색 결과 없음, 폴백 반환");
            synthetic::keyword_news_fallback(&keyword)
        }
        Err(e) => {
            warn!(keyword = %keyword, error = %e, "뉴스 검색 실패, 폴백 반환");
            synthetic::keyword_news_fallback(&keyword)
        }
    };

    Ok(Json(items))
}

/// 코스피 관련 인기 뉴스 (최대 5건).
///
/// GET /hot/
async fn get_hot_news(State(state): State<Arc<AppState>>) -> Json<Vec<NewsItem>> {
    match state.news.search("코스피", 5).await {
        Ok(items) if !items.is_empty() => Json(items),
        Ok(_) => Json(synthetic::hot_news_fallback()),
        Err(e) => {
            warn!(error = %e, "인기 뉴스 수집 실패, 폴백 반환");
            Json(synthetic::hot_news_fallback())
        }
    }
}

/// 실적 발표 뉴스 (최대 5건).
///
/// GET /main_news/
async fn get_main_news(State(state): State<Arc<AppState>>) -> Json<Vec<NewsItem>> {
    match state.news.search("실적 발표", 5).await {
        Ok(items) if !items.is_empty() => Json(items),
        Ok(_) => Json(synthetic::earnings_news_fallback()),
        Err(e) => {
            warn!(error = %e, "실적 뉴스 수집 실패, 폴백 반환");
            Json(synthetic::earnings_news_fallback())
        }
    }
}

/// 종목 애널리스트 리포트 (최대 10건).
///
/// FnGuide 컨센서스 페이지를 스크래핑하고, 실패하면 합성 리포트를
/// 생성해 반환합니다.
///
/// GET /report/?code=A005930
async fn get_reports(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Vec<ReportItem>>> {
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| invalid_input("code 파라미터가 필요합니다"))?;

    let items = match state.reports.fetch_reports(&code, 10).await {
        Ok(items) if !items.is_empty() => items,
        Ok(_) => {
            warn!(code = %code, "리포트 없음, 합성 리포트 반환");
            synthetic::synth_reports(&code)
        }
        Err(e) => {
            warn!(code = %code, error = %e, "리포트 수집 실패, 합성 리포트 반환");
            synthetic::synth_reports(&code)
        }
    };

    Ok(Json(items))
}

/// 라우터 생성.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/news/", get(get_news))
        .route("/hot/", get(get_hot_news))
        .route("/main_news/", get(get_main_news))
        .route("/report/", get(get_reports))
}
