//! 기업/뉴스/리포트 타입.
//!
//! 기업 레코드는 한국어 키(`기업명`, `종목코드`, `지표.<연도>/12_<지표명>` 등)를
//! 가진 느슨한 스키마의 문서입니다. 문서 저장소가 스키마를 소유하므로
//! 여기서는 JSON 객체 그대로 다룹니다.

use serde::{Deserialize, Serialize};

/// 느슨한 스키마의 기업 문서.
///
/// 저장소에서 읽은 그대로의 JSON 객체입니다. 속성 이름은 원본 데이터
/// 수집 파이프라인이 정하며 백엔드는 읽기와 재구성만 합니다.
pub type CompanyDocument = serde_json::Map<String, serde_json::Value>;

/// 뉴스 목록의 한 항목.
///
/// 스크래핑 또는 합성으로 만들어지며 절대 저장되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// 기사 제목
    pub title: String,
    /// 기사 링크 (없으면 "#")
    pub link: String,
}

impl NewsItem {
    /// 새로운 뉴스 항목 생성.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// 종목분석 리포트 요약의 한 항목.
///
/// 목표주가/전일종가는 콘센서스 페이지의 표시 문자열을 그대로 유지합니다
/// (쉼표 포함, 파싱 실패 시 "분석 중").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
    /// 리포트 작성일 (표시용 문자열)
    pub date: String,
    /// 리포트 제목
    pub title: String,
    /// 요약
    pub summary: String,
    /// 투자의견 (매수/보유/매도 등)
    pub opinion: String,
    /// 목표주가 (표시 문자열)
    pub target_price: String,
    /// 전일종가 (표시 문자열)
    pub closing_price: String,
    /// 증권사/작성자
    pub analyst: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_item_serialization() {
        let item = NewsItem::new("코스피 시장 동향 분석", "#");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains(r#""title":"코스피 시장 동향 분석""#));
        assert!(json.contains(r##""link":"#""##));
    }

    #[test]
    fn test_report_item_roundtrip() {
        let item = ReportItem {
            date: "2024-01-15".to_string(),
            title: "삼성전자 투자 의견 분석".to_string(),
            summary: "투자 의견: 매수".to_string(),
            opinion: "매수".to_string(),
            target_price: "85,000".to_string(),
            closing_price: "78,000".to_string(),
            analyst: "삼성증권".to_string(),
        };
        let json = serde_json::to_string(&item).unwrap();
        let back: ReportItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
