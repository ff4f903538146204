//! FnGuide 콘센서스 리포트 스크래핑.
//!
//! FnGuide 종목 콘센서스 페이지의 리포트 테이블에서 날짜/제목/투자의견/
//! 목표주가/전일종가/증권사를 추출합니다.
//!
//! HTML 파싱은 동기 함수로 분리되어 정적 HTML로 단위 테스트가 가능합니다.

use crate::error::{DataError, Result};
use dashboard_core::ReportItem;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// 리포트 행 선택자 후보 (순서대로 시도).
const ROW_SELECTORS: &[&str] = &[
    "#bodycontent4 tr",
    "table.us_table_ty1 tbody tr",
    "table tr",
];

/// HTTP 요청 기본 타임아웃.
const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// FnGuide 콘센서스 스크래퍼.
pub struct FnGuideReportScraper {
    client: reqwest::Client,
}

impl FnGuideReportScraper {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// 요청 타임아웃을 지정한 스크래퍼 생성.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::ConnectionError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { client })
    }

    /// 종목 콘센서스 리포트 조회.
    ///
    /// # 인자
    /// - `code`: FnGuide 종목 코드 (예: "A005930")
    pub async fn fetch_reports(&self, code: &str, limit: usize) -> Result<Vec<ReportItem>> {
        let url = format!(
            "https://comp.fnguide.com/SVO2/ASP/SVD_Consensus.asp?pGB=1&gicode={}&MenuYn=Y&ReportGB=&NewMenuID=108",
            code
        );

        let response = self
            .client
            .get(&url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
            )
            .header("Accept-Language", "ko-KR,ko;q=0.9,en;q=0.8")
            .send()
            .await
            .map_err(|e| DataError::FetchError(format!("리포트 페이지 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            return Err(DataError::FetchError(format!(
                "리포트 페이지 오류: {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| DataError::FetchError(format!("응답 읽기 실패: {}", e)))?;

        let reports = parse_consensus_html(&html, limit);
        if reports.is_empty() {
            warn!(code = code, "리포트 파싱 결과 없음");
        } else {
            debug!(code = code, count = reports.len(), "리포트 파싱 완료");
        }

        Ok(reports)
    }
}

/// 콘센서스 페이지 HTML에서 리포트 목록 추출.
pub fn parse_consensus_html(html: &str, limit: usize) -> Vec<ReportItem> {
    let document = Html::parse_document(html);

    let mut rows: Vec<ElementRef> = Vec::new();
    for selector_str in ROW_SELECTORS {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };
        rows = document.select(&selector).collect();
        if !rows.is_empty() {
            break;
        }
    }

    let td_selector = match Selector::parse("td") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    rows.into_iter()
        .filter_map(|row| {
            let cells: Vec<ElementRef> = row.select(&td_selector).collect();
            // 날짜/제목/의견/목표주가/전일종가/증권사 6개 컬럼 필요
            if cells.len() < 6 {
                return None;
            }
            parse_report_row(&cells)
        })
        .take(limit)
        .collect()
}

/// 리포트 테이블의 한 행 파싱.
fn parse_report_row(cells: &[ElementRef]) -> Option<ReportItem> {
    let date = parse_date_cell(&cells[0]);
    let (title, summary_dd) = parse_title_cell(&cells[1]);

    if title.chars().count() <= 3 {
        return None;
    }

    let opinion = cell_text(&cells[2]);
    let target_price = cell_text(&cells[3]);
    let closing_price = cell_text(&cells[4]);
    let analyst = cell_text(&cells[5]);

    let summary = if summary_dd.is_empty() {
        format!(
            "투자 의견: {} / 목표주가: {} / 전일종가: {}",
            non_empty(&opinion),
            non_empty(&target_price),
            non_empty(&closing_price)
        )
    } else {
        summary_dd
    };

    Some(ReportItem {
        date,
        title,
        summary,
        opinion: non_empty(&opinion).to_string(),
        target_price: non_empty(&target_price).to_string(),
        closing_price: non_empty(&closing_price).to_string(),
        analyst: non_empty(&analyst).to_string(),
    })
}

/// 날짜 셀 파싱.
///
/// FnGuide는 연도를 `span.yy1`/`span.yy2` 두 자리씩 나눠 담습니다.
/// 예: yy1="24", yy2="06" + 나머지 텍스트 "/03" → "202406/03".
fn parse_date_cell(cell: &ElementRef) -> String {
    let full_text = cell_text(cell);

    let yy_selector = match Selector::parse("span.yy1, span.yy2") {
        Ok(s) => s,
        Err(_) => return full_text,
    };
    let spans: Vec<String> = cell
        .select(&yy_selector)
        .map(|s| s.text().collect::<String>().trim().to_string())
        .collect();

    if spans.len() >= 2 {
        let year = format!("{}{}", spans[0], spans[1]);
        let rest = full_text.replace(&year, "");
        let rest = rest.trim();
        return format!("20{}/{}", year, rest.trim_start_matches('/'));
    }

    full_text
}

/// 제목 셀 파싱. (제목, dd 요약) 쌍을 반환.
fn parse_title_cell(cell: &ElementRef) -> (String, String) {
    let txt2 = Selector::parse("span.txt2")
        .ok()
        .and_then(|s| cell.select(&s).next().map(|e| e.text().collect::<String>()));
    let anchor = Selector::parse("a")
        .ok()
        .and_then(|s| cell.select(&s).next().map(|e| e.text().collect::<String>()));

    let title = match (txt2, anchor) {
        (Some(text), _) => text.trim().to_string(),
        (None, Some(company)) => format!("{} 리포트", company.trim()),
        (None, None) => cell_text(cell),
    };

    let summary = match Selector::parse("dd") {
        Ok(dd_selector) => cell
            .select(&dd_selector)
            .map(|dd| dd.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" / "),
        Err(_) => String::new(),
    };

    (title, summary)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn non_empty(s: &str) -> &str {
    if s.is_empty() {
        "분석 중"
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ROW: &str = r##"
        <table class="us_table_ty1"><tbody id="bodycontent4">
            <tr>
                <td><span class="yy1">24</span><span class="yy2">06</span>/03</td>
                <td>
                    <a href="#">삼성전자</a>
                    <span class="txt2">HBM 경쟁력 회복 구간 진입</span>
                    <dl><dd>메모리 가격 반등</dd><dd>목표주가 상향</dd></dl>
                </td>
                <td>매수</td>
                <td>95,000</td>
                <td>78,000</td>
                <td>한국투자증권</td>
            </tr>
        </tbody></table>
    "##;

    #[test]
    fn test_parse_consensus_html_full_row() {
        let reports = parse_consensus_html(SAMPLE_ROW, 10);
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        assert_eq!(report.date, "202406/03");
        assert_eq!(report.title, "HBM 경쟁력 회복 구간 진입");
        assert_eq!(report.summary, "메모리 가격 반등 / 목표주가 상향");
        assert_eq!(report.opinion, "매수");
        assert_eq!(report.target_price, "95,000");
        assert_eq!(report.closing_price, "78,000");
        assert_eq!(report.analyst, "한국투자증권");
    }

    #[test]
    fn test_parse_consensus_html_summary_fallback() {
        let html = r#"
            <table><tr>
                <td>2024/06/03</td>
                <td><span class="txt2">실적 개선 기대</span></td>
                <td>보유</td>
                <td>55,000</td>
                <td>52,000</td>
                <td>KB증권</td>
            </tr></table>
        "#;
        let reports = parse_consensus_html(html, 10);
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].summary,
            "투자 의견: 보유 / 목표주가: 55,000 / 전일종가: 52,000"
        );
    }

    #[test]
    fn test_parse_consensus_html_skips_short_rows() {
        let html = r#"
            <table><tr><td>날짜</td><td>제목</td></tr></table>
        "#;
        assert!(parse_consensus_html(html, 10).is_empty());
    }

    #[test]
    fn test_parse_consensus_html_empty_cells_become_placeholder() {
        let html = r#"
            <table><tr>
                <td>2024/06/03</td>
                <td><span class="txt2">밸류에이션 매력 부각</span></td>
                <td></td>
                <td></td>
                <td></td>
                <td></td>
            </tr></table>
        "#;
        let reports = parse_consensus_html(html, 10);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].opinion, "분석 중");
        assert_eq!(reports[0].analyst, "분석 중");
    }

    #[test]
    fn test_parse_consensus_html_respects_limit() {
        let mut html = String::from("<table>");
        for i in 0..15 {
            html.push_str(&format!(
                r#"<tr><td>2024/06/{i:02}</td><td><span class="txt2">리포트 제목 {i}</span></td>
                   <td>매수</td><td>1</td><td>1</td><td>증권사</td></tr>"#
            ));
        }
        html.push_str("</table>");

        assert_eq!(parse_consensus_html(&html, 10).len(), 10);
    }
}
