//! 합성 플레이스홀더 데이터.
//!
//! 모든 데이터 소스가 실패했을 때 프론트엔드가 빈 화면 대신 그럴듯한
//! 모양의 데이터를 받도록 하는 최후의 폴백입니다. 합성 시계열은 캐시에
//! `synthetic` 태그로 남아 실데이터와 절대 섞이지 않습니다.

use chrono::{Datelike, Duration, Utc};
use chrono_tz::Asia::Seoul;
use dashboard_core::{NewsItem, PricePoint, ReportItem};
use rand::Rng;
use rust_decimal::Decimal;

/// 합성 지수 시계열의 기준값.
const INDEX_BASE: f64 = 2500.0;

/// 합성 리포트의 투자의견 후보.
const OPINIONS: &[&str] = &["매수", "보유", "매도"];

/// 합성 리포트의 증권사 후보.
const ANALYSTS: &[&str] = &[
    "삼성증권",
    "KB증권",
    "NH투자증권",
    "미래에셋증권",
    "한국투자증권",
];

/// 합성 지수 시계열 생성 (최근 30일 중 평일만, 기준 2500 ±50 랜덤워크).
pub fn synth_index_series() -> Vec<PricePoint> {
    let mut rng = rand::thread_rng();
    let today = Utc::now().with_timezone(&Seoul).date_naive();
    let mut level = INDEX_BASE;

    let mut points = Vec::new();
    for i in (1..=30).rev() {
        let date = today - Duration::days(i);
        if matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            continue;
        }
        level += rng.gen_range(-50.0..50.0);
        let close = Decimal::from_f64_retain((level * 100.0).round() / 100.0)
            .unwrap_or_else(|| Decimal::from(INDEX_BASE as i64));
        points.push(PricePoint::new(date, close));
    }
    points
}

/// 합성 주가 시계열 생성 (최근 30일, ±2000 랜덤워크).
///
/// 삼성전자(005930)는 7만원대, 그 외는 5만원대를 기준으로 합니다.
pub fn synth_price_series(ticker: &str) -> Vec<PricePoint> {
    let mut rng = rand::thread_rng();
    let today = Utc::now().with_timezone(&Seoul).date_naive();
    let base: i64 = if ticker.contains("005930") { 70000 } else { 50000 };
    let mut level = base as f64;

    let mut points = Vec::new();
    for i in (1..=30).rev() {
        let date = today - Duration::days(i);
        level += rng.gen_range(-2000.0..2000.0);
        let close = Decimal::from_f64_retain(level.round()).unwrap_or_else(|| Decimal::from(base));
        points.push(PricePoint::new(date, close));
    }
    points
}

/// 코스피 키워드 뉴스 폴백 목록.
pub fn hot_news_fallback() -> Vec<NewsItem> {
    vec![
        NewsItem::new("코스피 시장 동향 분석", "#"),
        NewsItem::new("주요 기업 실적 발표", "#"),
        NewsItem::new("투자자 관심사 증가", "#"),
        NewsItem::new("시장 전망 보고서", "#"),
        NewsItem::new("금융 정책 변화", "#"),
    ]
}

/// 실적 발표 키워드 뉴스 폴백 목록.
pub fn earnings_news_fallback() -> Vec<NewsItem> {
    vec![
        NewsItem::new("삼성전자 3분기 실적 발표", "#"),
        NewsItem::new("SK하이닉스 매출 증가", "#"),
        NewsItem::new("LG화학 신사업 확장", "#"),
        NewsItem::new("현대차 전기차 판매 급증", "#"),
        NewsItem::new("네이버 클라우드 사업 성장", "#"),
    ]
}

/// 임의 키워드 뉴스 폴백 목록.
pub fn keyword_news_fallback(keyword: &str) -> Vec<NewsItem> {
    (1..=5)
        .map(|i| NewsItem::new(format!("{} 관련 뉴스 {}", keyword, i), "#"))
        .collect()
}

/// 전체 기업명 폴백 목록 (20개).
pub fn fallback_company_names() -> Vec<String> {
    [
        "삼성전자",
        "SK하이닉스",
        "LG화학",
        "현대차",
        "네이버",
        "카카오",
        "LG전자",
        "POSCO",
        "기아",
        "KB금융",
        "신한지주",
        "하나금융지주",
        "LG생활건강",
        "SK텔레콤",
        "KT",
        "CJ제일제당",
        "한국전력",
        "현대모비스",
        "LG디스플레이",
        "SK이노베이션",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// 축약 기업명 폴백 목록 (10개, 조회 결과가 비었을 때 사용).
pub fn fallback_company_names_short() -> Vec<String> {
    fallback_company_names().into_iter().take(10).collect()
}

/// 종목 코드별 기본 정보 (합성 리포트용).
fn company_info(code: &str) -> (&'static str, i64, &'static str) {
    match code {
        "A005930" => ("삼성전자", 70000, "반도체"),
        "A000660" => ("SK하이닉스", 120000, "반도체"),
        "A035420" => ("NAVER", 180000, "IT서비스"),
        "A035720" => ("카카오", 45000, "IT서비스"),
        "A051910" => ("LG화학", 400000, "화학"),
        _ => ("기업", 50000, "기타"),
    }
}

/// 합성 리포트 3건 생성 (최근 30일 내 랜덤 날짜, 날짜 내림차순).
pub fn synth_reports(code: &str) -> Vec<ReportItem> {
    let mut rng = rand::thread_rng();
    let (name, base_price, sector) = company_info(code);
    let base_date = Utc::now().with_timezone(&Seoul).date_naive() - Duration::days(30);

    let mut reports: Vec<ReportItem> = (0..3)
        .map(|_| {
            let report_date = base_date + Duration::days(rng.gen_range(0..=30));
            let opinion = OPINIONS[rng.gen_range(0..OPINIONS.len())];
            let analyst = ANALYSTS[rng.gen_range(0..ANALYSTS.len())];

            let target_price = (base_price as f64 * rng.gen_range(0.85..1.15)) as i64;
            let current_price = (target_price as f64 * rng.gen_range(0.95..1.05)) as i64;

            let titles = [
                format!("{} 투자 의견 분석", name),
                format!("{} 실적 전망 보고서", name),
                format!("{} 업종 전망 및 투자 전략", name),
            ];
            let summaries = [
                format!(
                    "투자 의견: {} / 목표주가: {}원 / 현재가: {}원",
                    opinion,
                    format_thousands(target_price),
                    format_thousands(current_price)
                ),
                format!(
                    "분석 결과: {} 추천 / 목표가: {}원 / {} 업종 상승 전망",
                    opinion,
                    format_thousands(target_price),
                    sector
                ),
                format!(
                    "투자 전략: {} / 목표주가: {}원 / 실적 개선 기대",
                    opinion,
                    format_thousands(target_price)
                ),
            ];

            ReportItem {
                date: report_date.format("%Y-%m-%d").to_string(),
                title: titles[rng.gen_range(0..titles.len())].clone(),
                summary: summaries[rng.gen_range(0..summaries.len())].clone(),
                opinion: opinion.to_string(),
                target_price: format_thousands(target_price),
                closing_price: format_thousands(current_price),
                analyst: analyst.to_string(),
            }
        })
        .collect();

    reports.sort_by(|a, b| b.date.cmp(&a.date));
    reports
}

/// 천 단위 쉼표 포맷.
fn format_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synth_index_series_weekdays_only() {
        let points = synth_index_series();
        assert!(!points.is_empty());
        assert!(points.len() <= 30);
        for point in &points {
            assert!(!matches!(
                point.date.weekday(),
                chrono::Weekday::Sat | chrono::Weekday::Sun
            ));
        }
        // 날짜 오름차순
        for window in points.windows(2) {
            assert!(window[0].date < window[1].date);
        }
    }

    #[test]
    fn test_synth_price_series_base_levels() {
        let samsung = synth_price_series("005930");
        assert_eq!(samsung.len(), 30);
        // 30일 랜덤워크 (±2000)라도 기준값에서 6만원 이상 벗어날 수 없음
        assert!(samsung[0].close > Decimal::from(10000));

        let other = synth_price_series("123456");
        assert_eq!(other.len(), 30);
    }

    #[test]
    fn test_synth_reports_shape() {
        let reports = synth_reports("A005930");
        assert_eq!(reports.len(), 3);
        for report in &reports {
            assert!(report.title.contains("삼성전자"));
            assert!(OPINIONS.contains(&report.opinion.as_str()));
            assert!(ANALYSTS.contains(&report.analyst.as_str()));
        }
        // 날짜 내림차순
        for window in reports.windows(2) {
            assert!(window[0].date >= window[1].date);
        }
    }

    #[test]
    fn test_synth_reports_unknown_code() {
        let reports = synth_reports("A999999");
        assert!(reports[0].title.contains("기업"));
    }

    #[test]
    fn test_keyword_news_fallback() {
        let items = keyword_news_fallback("카카오");
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].title, "카카오 관련 뉴스 1");
        assert!(items.iter().all(|i| i.link == "#"));
    }

    #[test]
    fn test_fallback_company_names_count() {
        assert_eq!(fallback_company_names().len(), 20);
        let short = fallback_company_names_short();
        assert_eq!(short.len(), 10);
        assert_eq!(short[0], "삼성전자");
        assert_eq!(short[9], "KB금융");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands(70000), "70,000");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(-1500), "-1,500");
    }
}
