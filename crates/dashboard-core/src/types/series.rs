//! 시계열 타입.
//!
//! 대시보드가 제공하는 모든 가격/지수 시계열은 (날짜, 종가) 쌍의
//! 순서 있는 목록으로 표현됩니다. 프론트엔드 호환을 위해 JSON 필드명은
//! `Date`/`Close`를 사용합니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 시계열의 한 점 (일 단위 종가).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 거래일
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    /// 종가
    #[serde(rename = "Close")]
    pub close: Decimal,
}

impl PricePoint {
    /// 새로운 가격 포인트 생성.
    pub fn new(date: NaiveDate, close: Decimal) -> Self {
        Self { date, close }
    }
}

/// 시계열 데이터의 출처 태그.
///
/// 폴백 캐스케이드의 어느 단계에서 데이터가 나왔는지 표시합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    /// 신선도 윈도우 이내의 캐시
    CachedFresh,
    /// 1순위 라이브 소스
    Primary,
    /// 백업 라이브 소스
    Backup,
    /// 신선도 윈도우를 지난 캐시 (최후의 실데이터)
    StaleCache,
    /// 합성 플레이스홀더 데이터
    Synthetic,
}

impl SourceTag {
    /// 태그의 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CachedFresh => "cached-fresh",
            Self::Primary => "primary",
            Self::Backup => "backup",
            Self::StaleCache => "stale-cache",
            Self::Synthetic => "synthetic",
        }
    }

    /// 실제 관측 데이터인지 여부 (합성 데이터만 false).
    pub fn is_real(&self) -> bool {
        !matches!(self, Self::Synthetic)
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cached-fresh" => Ok(Self::CachedFresh),
            "primary" => Ok(Self::Primary),
            "backup" => Ok(Self::Backup),
            "stale-cache" => Ok(Self::StaleCache),
            "synthetic" => Ok(Self::Synthetic),
            _ => Err(format!("Unknown source tag: {}", s)),
        }
    }
}

/// 출처 태그가 붙은 시계열.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedSeries {
    /// 데이터 출처
    pub source: SourceTag,
    /// (날짜, 종가) 목록 (날짜 오름차순)
    pub points: Vec<PricePoint>,
}

impl TaggedSeries {
    /// 새로운 태그 시계열 생성.
    pub fn new(source: SourceTag, points: Vec<PricePoint>) -> Self {
        Self { source, points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_point_json_field_names() {
        let point = PricePoint::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Decimal::from(70000),
        );
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains(r#""Date":"2024-01-15""#));
        assert!(json.contains(r#""Close":70000"#));
    }

    #[test]
    fn test_source_tag_roundtrip() {
        for tag in [
            SourceTag::CachedFresh,
            SourceTag::Primary,
            SourceTag::Backup,
            SourceTag::StaleCache,
            SourceTag::Synthetic,
        ] {
            let parsed: SourceTag = tag.as_str().parse().unwrap();
            assert_eq!(parsed, tag);
        }
        assert!("unknown".parse::<SourceTag>().is_err());
    }

    #[test]
    fn test_source_tag_is_real() {
        assert!(SourceTag::StaleCache.is_real());
        assert!(!SourceTag::Synthetic.is_real());
    }
}
