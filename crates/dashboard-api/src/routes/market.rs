//! 시세/지수/투자자 동향 endpoint.
//!
//! 코스피 지수와 종목 시세는 폴백 캐스케이드를 거치므로 항상 200으로
//! 시계열을 반환합니다. 어떤 단계에서 데이터가 나왔는지는
//! `X-Data-Source` 응답 헤더로 노출됩니다.

use crate::error::{from_data_error, invalid_input, ApiResult};
use crate::sources::{KrxIndexSource, KrxStockSource, YahooSource};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use dashboard_core::{PricePoint, SourceTag};
use dashboard_data::{synthetic, FetchSource};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// 코스피 지수 코드.
const KOSPI_INDEX_CODE: &str = "1001";

/// 지수/시세 조회 기간 (달력일).
const SERIES_DAYS: i64 = 365;

/// 코스피 백업용 Yahoo 심볼/기간 조합 (순서대로 시도).
const KOSPI_YAHOO_CONFIGS: &[(&str, &str)] = &[
    ("^KS11", "1y"),
    ("KS11", "1y"),
    ("^KS11", "6mo"),
    ("^KS11", "3mo"),
    ("^KS11", "1mo"),
    // 마지막 수단: 아시아 시장을 추종하는 미국 상장 ETF
    ("EWY", "1y"),
    ("FXI", "1y"),
    ("EWJ", "1y"),
];

/// 시계열 응답 (배열 본문 + 출처 헤더).
fn series_response(source: SourceTag, points: Vec<PricePoint>) -> impl IntoResponse {
    ([("x-data-source", source.as_str())], Json(points))
}

/// 코스피 지수 시계열.
///
/// GET /kospi/
async fn get_kospi(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut sources: Vec<Box<dyn FetchSource>> = vec![Box::new(KrxIndexSource::new(
        state.krx.clone(),
        KOSPI_INDEX_CODE,
        SERIES_DAYS,
    ))];

    if let Some(yahoo) = &state.yahoo {
        for (symbol, range) in KOSPI_YAHOO_CONFIGS {
            sources.push(Box::new(YahooSource::new(
                yahoo.clone(),
                *symbol,
                range,
                SourceTag::Backup,
            )));
        }
    }

    let series = state
        .cascade
        .resolve("kospi", &sources, synthetic::synth_index_series)
        .await;

    series_response(series.source, series.points)
}

/// 국내 종목인지 판별 (6자리 숫자 또는 .KS 접미사).
fn is_domestic_ticker(ticker: &str) -> bool {
    if ticker.ends_with(".KS") {
        return true;
    }
    ticker.len() == 6 && ticker.chars().all(|c| c.is_ascii_digit())
}

/// 종목 시세 시계열.
///
/// GET /price/{ticker}
async fn get_price(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> impl IntoResponse {
    let mut sources: Vec<Box<dyn FetchSource>> = Vec::new();

    if is_domestic_ticker(&ticker) {
        let code = ticker.trim_end_matches(".KS").to_string();
        sources.push(Box::new(KrxStockSource::new(
            state.krx.clone(),
            code.clone(),
            SERIES_DAYS,
        )));
        if let Some(yahoo) = &state.yahoo {
            sources.push(Box::new(YahooSource::new(
                yahoo.clone(),
                format!("{}.KS", code),
                "1y",
                SourceTag::Backup,
            )));
        }
    } else if let Some(yahoo) = &state.yahoo {
        // 해외 종목은 Yahoo가 1순위
        sources.push(Box::new(YahooSource::new(
            yahoo.clone(),
            ticker.clone(),
            "2y",
            SourceTag::Primary,
        )));
    }

    let key = format!("price:{}", ticker);
    let series = state
        .cascade
        .resolve(&key, &sources, || synthetic::synth_price_series(&ticker))
        .await;

    series_response(series.source, series.points)
}

/// 시가총액 상위 10개.
///
/// GET /marketcap/
async fn get_marketcap(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let mut rows = state
        .krx
        .get_market_snapshot()
        .await
        .map_err(from_data_error)?;

    rows.sort_by(|a, b| b.market_cap.cmp(&a.market_cap));
    rows.truncate(10);

    let top10: Vec<Value> = rows
        .into_iter()
        .map(|row| {
            json!({
                "기업명": row.name,
                "티커": row.code,
                "시가총액": row.market_cap,
                "종가": row.close,
            })
        })
        .collect();

    Ok(Json(json!({ "시가총액_TOP10": top10 })))
}

/// 거래량 상위 5개.
///
/// GET /top_volume
async fn get_top_volume(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    let mut rows = state
        .krx
        .get_market_snapshot()
        .await
        .map_err(from_data_error)?;

    rows.sort_by(|a, b| b.volume.cmp(&a.volume));
    rows.truncate(5);

    let top5: Vec<Value> = rows
        .into_iter()
        .map(|row| {
            json!({
                "종목명": row.name,
                "종목코드": row.code,
                "거래량": row.volume,
            })
        })
        .collect();

    Ok(Json(top5))
}

#[derive(Debug, Deserialize)]
struct InvestorQuery {
    ticker: Option<String>,
}

/// 종목별 투자자 순매수 동향 (최근 10일).
///
/// GET /investors/?ticker=005930
async fn get_investors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InvestorQuery>,
) -> ApiResult<Json<Vec<Value>>> {
    let ticker = query
        .ticker
        .filter(|t| !t.is_empty())
        .ok_or_else(|| invalid_input("ticker 파라미터가 필요합니다"))?;

    let flows = state
        .krx
        .get_investor_flows(&ticker, 10)
        .await
        .map_err(from_data_error)?;

    let rows: Vec<Value> = flows
        .into_iter()
        .map(|flow| {
            json!({
                "date": flow.date.format("%Y-%m-%d").to_string(),
                "기관합계": flow.institution,
                "개인": flow.individual,
                "외국인합계": flow.foreign,
            })
        })
        .collect();

    Ok(Json(rows))
}

/// 전체시장 투자자별 거래대금 (최근 10일 합산).
///
/// GET /investor/value/
async fn get_investor_value(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    let rows = state
        .krx
        .get_investor_values(10)
        .await
        .map_err(from_data_error)?;

    let records: Vec<Value> = rows
        .into_iter()
        .map(|row| {
            json!({
                "투자자구분": row.investor,
                "매도": row.sell,
                "매수": row.buy,
                "순매수": row.net_buy,
            })
        })
        .collect();

    Ok(Json(records))
}

/// 라우터 생성.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/kospi/", get(get_kospi))
        .route("/price/{ticker}", get(get_price))
        .route("/marketcap/", get(get_marketcap))
        .route("/top_volume", get(get_top_volume))
        .route("/investors/", get(get_investors))
        .route("/investor/value/", get(get_investor_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_is_domestic_ticker() {
        assert!(is_domestic_ticker("005930"));
        assert!(is_domestic_ticker("005930.KS"));
        assert!(!is_domestic_ticker("AAPL"));
        assert!(!is_domestic_ticker("12345"));
        assert!(!is_domestic_ticker("1234567"));
    }

    #[tokio::test]
    async fn test_investors_requires_ticker() {
        let state = Arc::new(create_test_state());
        let app = router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/investors/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "INVALID_INPUT");
    }

    // 캐스케이드 엔드포인트는 외부 소스가 전부 실패해도 합성 시계열로 200을 반환한다.
    // 외부 호출이 필요하므로 기본 테스트에서는 제외.
    #[tokio::test]
    #[ignore]
    async fn test_kospi_always_returns_series() {
        let state = Arc::new(create_test_state());
        let app = router().with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/kospi/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-data-source"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let points: Vec<PricePoint> = serde_json::from_slice(&body).unwrap();
        assert!(!points.is_empty());
    }
}
