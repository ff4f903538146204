//! KRX(한국거래소) 데이터 소스.
//!
//! KRX 정보데이터시스템에서 지수/종목 종가, 전종목 스냅샷,
//! 투자자별 거래 동향을 조회합니다.

use crate::error::{DataError, Result};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Asia::Seoul;
use dashboard_core::PricePoint;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info};

/// KRX API 기본 URL.
const KRX_API_URL: &str = "https://data.krx.co.kr/comm/bldAttendant/getJsonData.cmd";

/// HTTP 요청 기본 타임아웃.
const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// 지수 시세 조회 bld (코스피 1001 등).
const BLD_INDEX_OHLCV: &str = "dbms/MDC/STAT/standard/MDCSTAT00301";

/// 개별종목 시세 조회 bld.
const BLD_STOCK_OHLCV: &str = "dbms/MDC/STAT/standard/MDCSTAT01701";

/// 전종목 시세 스냅샷 bld (일별).
const BLD_MARKET_SNAPSHOT: &str = "dbms/MDC/STAT/standard/MDCSTAT01501";

/// 전체시장 투자자별 거래실적 bld.
const BLD_INVESTOR_VALUE: &str = "dbms/MDC/STAT/standard/MDCSTAT02201";

/// 개별종목 투자자별 거래실적 일별추이 bld.
const BLD_INVESTOR_VOLUME: &str = "dbms/MDC/STAT/standard/MDCSTAT02203";

#[derive(Debug, Deserialize)]
struct IndexResponse {
    #[serde(default)]
    output: Vec<IndexRecord>,
}

#[derive(Debug, Deserialize)]
struct IndexRecord {
    #[serde(rename = "TRD_DD")]
    trd_dd: Option<String>,
    #[serde(rename = "CLSPRC_IDX", default)]
    close: String,
}

#[derive(Debug, Deserialize)]
struct StockResponse {
    #[serde(default)]
    output: Vec<StockRecord>,
}

#[derive(Debug, Deserialize)]
struct StockRecord {
    #[serde(rename = "TRD_DD")]
    trd_dd: Option<String>,
    #[serde(rename = "TDD_CLSPRC", default)]
    close: String,
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    #[serde(rename = "OutBlock_1", default)]
    out_block: Vec<SnapshotRecord>,
    #[serde(default)]
    output: Vec<SnapshotRecord>,
}

#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    #[serde(rename = "ISU_SRT_CD", default)]
    code: String,
    #[serde(rename = "ISU_ABBRV", default)]
    name: String,
    #[serde(rename = "TDD_CLSPRC", default)]
    close: String,
    #[serde(rename = "MKTCAP", default)]
    market_cap: String,
    #[serde(rename = "ACC_TRDVOL", default)]
    volume: String,
}

#[derive(Debug, Deserialize)]
struct InvestorValueResponse {
    #[serde(default)]
    output: Vec<InvestorValueRecord>,
}

#[derive(Debug, Deserialize)]
struct InvestorValueRecord {
    #[serde(rename = "INVST_TP_NM", default)]
    investor: String,
    #[serde(rename = "ASK_TRDVAL", default)]
    sell: String,
    #[serde(rename = "BID_TRDVAL", default)]
    buy: String,
    #[serde(rename = "NETBID_TRDVAL", default)]
    net_buy: String,
}

#[derive(Debug, Deserialize)]
struct InvestorVolumeResponse {
    #[serde(default)]
    output: Vec<InvestorVolumeRecord>,
}

#[derive(Debug, Deserialize)]
struct InvestorVolumeRecord {
    #[serde(rename = "TRD_DD")]
    trd_dd: Option<String>,
    /// 기관합계
    #[serde(rename = "TRDVAL1", default)]
    institution: String,
    /// 기타법인
    #[serde(rename = "TRDVAL2", default)]
    #[allow(dead_code)]
    other_corp: String,
    /// 개인
    #[serde(rename = "TRDVAL3", default)]
    individual: String,
    /// 외국인합계
    #[serde(rename = "TRDVAL4", default)]
    foreign: String,
}

/// 전종목 스냅샷의 한 행.
#[derive(Debug, Clone)]
pub struct MarketSnapshotRow {
    /// 종목코드 (단축코드)
    pub code: String,
    /// 종목명
    pub name: String,
    /// 종가
    pub close: Decimal,
    /// 시가총액
    pub market_cap: Decimal,
    /// 누적 거래량
    pub volume: Decimal,
}

/// 개별 종목의 일별 투자자 순매수 동향.
#[derive(Debug, Clone)]
pub struct InvestorFlow {
    pub date: NaiveDate,
    /// 기관합계 순매수
    pub institution: Decimal,
    /// 개인 순매수
    pub individual: Decimal,
    /// 외국인합계 순매수
    pub foreign: Decimal,
}

/// 전체시장 투자자별 거래실적의 한 행.
#[derive(Debug, Clone)]
pub struct InvestorValueRow {
    /// 투자자 구분 (기관, 개인, 외국인 등)
    pub investor: String,
    /// 매도 거래대금
    pub sell: Decimal,
    /// 매수 거래대금
    pub buy: Decimal,
    /// 순매수 거래대금
    pub net_buy: Decimal,
}

/// KRX 정보데이터시스템 클라이언트.
pub struct KrxClient {
    client: reqwest::Client,
    base_url: String,
}

impl KrxClient {
    /// 새로운 KRX 클라이언트 생성.
    pub fn new() -> Result<Self> {
        Self::build(KRX_API_URL, DEFAULT_TIMEOUT)
    }

    /// 요청 타임아웃을 지정한 클라이언트 생성.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self> {
        Self::build(KRX_API_URL, timeout)
    }

    /// 임의 엔드포인트를 바라보는 클라이언트 생성 (테스트용).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::build(base_url, DEFAULT_TIMEOUT)
    }

    fn build(base_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::ConnectionError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// 공통 POST 요청.
    async fn post_form(&self, params: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .post(&self.base_url)
            .header(
                "Referer",
                "https://data.krx.co.kr/contents/MDC/MDI/outerLoader/index.cmd",
            )
            .form(params)
            .send()
            .await
            .map_err(|e| DataError::FetchError(format!("KRX API 호출 실패: {}", e)))?;

        if !response.status().is_success() {
            return Err(DataError::FetchError(format!(
                "KRX API 오류: {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DataError::FetchError(format!("응답 읽기 실패: {}", e)))?;

        debug!(response_len = text.len(), "KRX API 응답 수신");
        Ok(text)
    }

    /// 지수 일별 종가 조회.
    ///
    /// # 인자
    /// - `index_code`: 지수 코드 (예: "1001" = 코스피)
    /// - `days`: 최근 N일 (달력일 기준, 휴장일은 응답에서 빠짐)
    pub async fn get_index_closes(&self, index_code: &str, days: i64) -> Result<Vec<PricePoint>> {
        let (start, end) = recent_range(days);
        // 지수 코드는 시장 구분 1자리 + 지수 번호로 분해됨
        let ind_idx = &index_code[..1];
        let ind_idx2 = &index_code[1..];

        let params = [
            ("bld", BLD_INDEX_OHLCV),
            ("indIdx", ind_idx),
            ("indIdx2", ind_idx2),
            ("strtDd", &start),
            ("endDd", &end),
        ];

        let text = self.post_form(&params).await?;
        let parsed: IndexResponse = serde_json::from_str(&text).map_err(|e| {
            DataError::ParseError(format!(
                "지수 응답 파싱 실패: {} - {}",
                e,
                body_snippet(&text)
            ))
        })?;

        let mut points = Vec::with_capacity(parsed.output.len());
        for record in &parsed.output {
            let date = parse_krx_date(record.trd_dd.as_deref().unwrap_or(""))?;
            let close = parse_krx_number(&record.close)?;
            if close.is_zero() {
                continue;
            }
            points.push(PricePoint::new(date, close));
        }
        points.sort_by_key(|p| p.date);

        info!(index_code = index_code, count = points.len(), "KRX 지수 조회 완료");
        Ok(points)
    }

    /// 개별 종목 일별 종가 조회.
    ///
    /// # 인자
    /// - `stock_code`: 종목코드 (6자리, 예: "005930")
    /// - `days`: 최근 N일 (달력일 기준)
    pub async fn get_stock_closes(&self, stock_code: &str, days: i64) -> Result<Vec<PricePoint>> {
        let (start, end) = recent_range(days);
        let isin_cd = format!("KR7{}003", stock_code);

        let params = [
            ("bld", BLD_STOCK_OHLCV),
            ("isuCd", isin_cd.as_str()),
            ("strtDd", &start),
            ("endDd", &end),
            ("adjStkPrc", "2"), // 수정주가 사용
        ];

        let text = self.post_form(&params).await?;
        let parsed: StockResponse = serde_json::from_str(&text).map_err(|e| {
            DataError::ParseError(format!(
                "종목 응답 파싱 실패: {} - {}",
                e,
                body_snippet(&text)
            ))
        })?;

        let mut points = Vec::with_capacity(parsed.output.len());
        for record in &parsed.output {
            let date = parse_krx_date(record.trd_dd.as_deref().unwrap_or(""))?;
            let close = parse_krx_number(&record.close)?;
            if close.is_zero() {
                continue;
            }
            points.push(PricePoint::new(date, close));
        }
        points.sort_by_key(|p| p.date);

        info!(stock_code = stock_code, count = points.len(), "KRX 종목 조회 완료");
        Ok(points)
    }

    /// 전종목 시세 스냅샷 조회 (기준일 하루치).
    ///
    /// 시가총액 상위/거래량 상위 랭킹의 원천 데이터입니다.
    pub async fn get_market_snapshot(&self) -> Result<Vec<MarketSnapshotRow>> {
        let date = latest_trading_day();

        let params = [
            ("bld", BLD_MARKET_SNAPSHOT),
            ("mktId", "ALL"),
            ("trdDd", &date),
        ];

        let text = self.post_form(&params).await?;
        let parsed: SnapshotResponse = serde_json::from_str(&text).map_err(|e| {
            DataError::ParseError(format!(
                "스냅샷 응답 파싱 실패: {} - {}",
                e,
                body_snippet(&text)
            ))
        })?;

        let records = if parsed.out_block.is_empty() {
            &parsed.output
        } else {
            &parsed.out_block
        };

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let close = parse_krx_number(&record.close)?;
            let market_cap = parse_krx_number(&record.market_cap)?;
            let volume = parse_krx_number(&record.volume)?;
            if record.code.is_empty() || close.is_zero() {
                continue;
            }
            rows.push(MarketSnapshotRow {
                code: record.code.clone(),
                name: record.name.clone(),
                close,
                market_cap,
                volume,
            });
        }

        info!(date = %date, count = rows.len(), "KRX 전종목 스냅샷 조회 완료");
        Ok(rows)
    }

    /// 개별 종목의 최근 투자자별 순매수 동향 조회.
    pub async fn get_investor_flows(&self, stock_code: &str, days: i64) -> Result<Vec<InvestorFlow>> {
        let (start, end) = recent_range(days);
        let isin_cd = format!("KR7{}003", stock_code);

        let params = [
            ("bld", BLD_INVESTOR_VOLUME),
            ("isuCd", isin_cd.as_str()),
            ("strtDd", &start),
            ("endDd", &end),
            ("askBid", "3"),     // 순매수
            ("trdVolVal", "1"),  // 거래량 기준
        ];

        let text = self.post_form(&params).await?;
        let parsed: InvestorVolumeResponse = serde_json::from_str(&text).map_err(|e| {
            DataError::ParseError(format!(
                "투자자 동향 파싱 실패: {} - {}",
                e,
                body_snippet(&text)
            ))
        })?;

        let mut flows = Vec::with_capacity(parsed.output.len());
        for record in &parsed.output {
            let date = parse_krx_date(record.trd_dd.as_deref().unwrap_or(""))?;
            flows.push(InvestorFlow {
                date,
                institution: parse_krx_number(&record.institution)?,
                individual: parse_krx_number(&record.individual)?,
                foreign: parse_krx_number(&record.foreign)?,
            });
        }
        flows.sort_by_key(|f| f.date);

        info!(stock_code = stock_code, count = flows.len(), "KRX 투자자 동향 조회 완료");
        Ok(flows)
    }

    /// 전체시장 투자자별 거래대금 조회 (최근 N일 합산).
    pub async fn get_investor_values(&self, days: i64) -> Result<Vec<InvestorValueRow>> {
        let (start, end) = recent_range(days);

        let params = [
            ("bld", BLD_INVESTOR_VALUE),
            ("mktId", "ALL"),
            ("strtDd", &start),
            ("endDd", &end),
            ("trdVolVal", "2"), // 거래대금 기준
        ];

        let text = self.post_form(&params).await?;
        let parsed: InvestorValueResponse = serde_json::from_str(&text).map_err(|e| {
            DataError::ParseError(format!(
                "투자자 거래실적 파싱 실패: {} - {}",
                e,
                body_snippet(&text)
            ))
        })?;

        let mut rows = Vec::with_capacity(parsed.output.len());
        for record in &parsed.output {
            if record.investor.is_empty() {
                continue;
            }
            rows.push(InvestorValueRow {
                investor: record.investor.clone(),
                sell: parse_krx_number(&record.sell)?,
                buy: parse_krx_number(&record.buy)?,
                net_buy: parse_krx_number(&record.net_buy)?,
            });
        }

        info!(count = rows.len(), "KRX 투자자 거래실적 조회 완료");
        Ok(rows)
    }
}

/// 오류 메시지에 담을 응답 본문 앞부분.
///
/// KRX는 점검 시간에 JSON 대신 한글 안내 HTML을 돌려주므로 자르는 위치가
/// 멀티바이트 문자 중간에 걸릴 수 있습니다. 문자 경계까지 물러나 자릅니다.
fn body_snippet(text: &str) -> &str {
    let mut end = text.len().min(200);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// 최근 N일 범위를 YYYYMMDD 문자열 쌍으로 계산 (서울 기준).
fn recent_range(days: i64) -> (String, String) {
    let today = Utc::now().with_timezone(&Seoul).date_naive();
    let start = today - Duration::days(days);
    (
        start.format("%Y%m%d").to_string(),
        today.format("%Y%m%d").to_string(),
    )
}

/// 가장 최근 거래일 추정 (서울 기준, 주말은 금요일로 당김).
fn latest_trading_day() -> String {
    let mut day = Utc::now().with_timezone(&Seoul).date_naive();
    while matches!(day.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
        day -= Duration::days(1);
    }
    day.format("%Y%m%d").to_string()
}

/// KRX 날짜 문자열 파싱 (YYYY/MM/DD 또는 YYYYMMDD).
fn parse_krx_date(s: &str) -> Result<NaiveDate> {
    if s.contains('/') {
        return NaiveDate::parse_from_str(s, "%Y/%m/%d")
            .map_err(|e| DataError::ParseError(format!("날짜 파싱 실패: {} - {}", s, e)));
    }

    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|e| DataError::ParseError(format!("날짜 파싱 실패: {} - {}", s, e)))
}

/// KRX 숫자 문자열 파싱 (쉼표 제거).
fn parse_krx_number(s: &str) -> Result<Decimal> {
    if s.is_empty() || s == "-" {
        return Ok(Decimal::ZERO);
    }

    let cleaned = s.replace(',', "");

    Decimal::from_str(&cleaned)
        .map_err(|e| DataError::ParseError(format!("숫자 파싱 실패: {} - {}", s, e)))
}
