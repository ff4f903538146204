//! Yahoo Finance 백업 시세 소스.

use crate::error::{DataError, Result};
use chrono::{TimeZone, Utc};
use dashboard_core::PricePoint;
use rust_decimal::Decimal;
use tracing::debug;

/// Yahoo Finance 제공자.
pub struct YahooProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooProvider {
    pub fn new() -> Result<Self> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| DataError::ConnectionError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }

    /// 일별 종가 조회.
    ///
    /// # 인자
    /// - `symbol`: Yahoo 심볼 (예: "^KS11", "005930.KS", "EWY")
    /// - `range`: Yahoo 기간 문자열 (예: "1mo", "3mo", "1y")
    pub async fn get_daily_closes(&self, symbol: &str, range: &str) -> Result<Vec<PricePoint>> {
        debug!(symbol = symbol, range = range, "Yahoo Finance API 호출");

        let response = self
            .connector
            .get_quote_range(symbol, "1d", range)
            .await
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", symbol, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류: {}", e)))?;

        let mut points: Vec<PricePoint> = quotes
            .iter()
            .filter_map(|q| {
                let date = Utc.timestamp_opt(q.timestamp as i64, 0).single()?.date_naive();
                let close = Decimal::from_f64_retain(q.close)?;
                if close <= Decimal::ZERO {
                    return None;
                }
                Some(PricePoint::new(date, close))
            })
            .collect();

        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);

        Ok(points)
    }
}
