//! 재무지표 랭킹 계산.
//!
//! 기업 문서의 `지표` 객체에서 값을 읽어 상위 N개 목록과
//! 보물찾기(연도별 가치지표) 테이블을 만듭니다.
//!
//! 지표 값은 숫자일 수도, "1,234" 또는 "12.5%" 같은 표시 문자열일 수도
//! 있습니다. 숫자로 강제 변환되지 않는 값은 랭킹에서 제외합니다.

use dashboard_core::CompanyDocument;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use std::str::FromStr;

/// 보물찾기 테이블이 다루는 연도.
const TREASURE_YEARS: &[&str] = &["2022", "2023", "2024"];

/// 보물찾기 테이블이 다루는 지표.
const TREASURE_METRICS: &[(&str, &str)] = &[
    ("PER", "PER"),
    ("PBR", "PBR"),
    ("ROE", "ROE"),
    ("시가총액", "시가총액"),
    ("지배주주지분", "지배주주지분"),
    ("지배주주순이익", "지배주주순이익"),
];

/// JSON 값을 숫자로 강제 변환.
///
/// 숫자 그대로, 또는 쉼표/% 를 제거한 문자열을 허용합니다.
pub fn coerce_numeric(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            n.as_f64().and_then(Decimal::from_f64_retain)
        }
        Value::String(s) => {
            let cleaned = s.trim().replace(',', "").replace('%', "");
            if cleaned.is_empty() || cleaned == "-" {
                return None;
            }
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

/// 문서의 `지표.<key>` 값 조회.
fn metric_value(doc: &CompanyDocument, key: &str) -> Option<Value> {
    doc.get("지표")?.as_object()?.get(key).cloned()
}

/// 지표 기준 상위 N개 기업 목록.
///
/// # 인자
/// - `metric_key`: `지표` 객체 내 키 (예: "2024/12_매출액")
/// - `label`: 결과 객체에 쓸 필드명 (예: "매출액")
///
/// 값이 없거나 숫자가 아닌 기업은 제외됩니다.
pub fn top_n(docs: &[CompanyDocument], metric_key: &str, label: &str, n: usize) -> Vec<Value> {
    let mut ranked: Vec<(String, Decimal)> = docs
        .iter()
        .filter_map(|doc| {
            let name = doc.get("기업명")?.as_str()?.to_string();
            let value = coerce_numeric(&metric_value(doc, metric_key)?)?;
            Some((name, value))
        })
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);

    ranked
        .into_iter()
        .map(|(name, value)| json!({"기업명": name, label: value}))
        .collect()
}

/// 보물찾기 행 생성.
///
/// 기업마다 PER/PBR/ROE/시가총액/지배주주지분/지배주주순이익을
/// 연도별 객체로 재구성합니다. 없는 값은 null로 남습니다.
pub fn treasure_rows(docs: &[CompanyDocument]) -> Vec<Value> {
    docs.iter()
        .map(|doc| {
            let name = doc
                .get("기업명")
                .and_then(|v| v.as_str())
                .unwrap_or("알 수 없음");
            let sector = doc
                .get("업종명")
                .and_then(|v| v.as_str())
                .unwrap_or("알 수 없음");

            let mut row = Map::new();
            row.insert("기업명".to_string(), json!(name));
            row.insert("업종명".to_string(), json!(sector));

            for (label, metric) in TREASURE_METRICS {
                let mut by_year = Map::new();
                for year in TREASURE_YEARS {
                    let key = format!("{}/12_{}", year, metric);
                    let value = metric_value(doc, &key).unwrap_or(Value::Null);
                    by_year.insert(year.to_string(), value);
                }
                row.insert(label.to_string(), Value::Object(by_year));
            }

            Value::Object(row)
        })
        .collect()
}
