//! 파일 기반 참조 데이터.
//!
//! 산업별 설명(JSON)과 사업부문별 매출 내역(CSV)은 배포 시 함께 실리는
//! 정적 파일에서 읽습니다. 파싱 로직은 Reader를 받는 동기 함수로 분리되어
//! 파일 없이 단위 테스트가 가능합니다.

use crate::error::{DataError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// 산업별 설명 JSON 파일의 후보 경로.
const INDUSTRY_FILE_CANDIDATES: &[&str] = &[
    "data/산업별설명.json",
    "산업별설명.json",
    "../FRONTEND/public/산업별설명.json",
];

/// 매출 내역 CSV 파일의 후보 경로.
const SALES_FILE_CANDIDATES: &[&str] = &[
    "data/NICE_내수수출_코스피.csv",
    "NICE_내수수출_코스피.csv",
];

/// 후보 경로 중 존재하는 첫 파일.
fn find_existing(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}

/// 산업별 설명 참조.
pub struct IndustryReference {
    entries: Vec<Value>,
}

impl IndustryReference {
    /// 후보 경로에서 JSON 파일을 찾아 로드.
    pub fn load() -> Result<Self> {
        let path = find_existing(INDUSTRY_FILE_CANDIDATES).ok_or_else(|| {
            DataError::ReferenceFileMissing("산업별설명.json".to_string())
        })?;

        let file = std::fs::File::open(&path)
            .map_err(|e| DataError::ReferenceFileMissing(format!("{}: {}", path.display(), e)))?;

        let reference = Self::from_reader(file)?;
        debug!(path = %path.display(), count = reference.entries.len(), "산업별 설명 로드");
        Ok(reference)
    }

    /// Reader에서 직접 파싱.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let entries: Vec<Value> = serde_json::from_reader(reader)?;
        Ok(Self { entries })
    }

    /// 산업명으로 설명 조회 (정확 일치, 앞뒤 공백 무시).
    pub fn find(&self, industry: &str) -> Option<&Value> {
        let needle = industry.trim();
        self.entries
            .iter()
            .find(|item| item.get("industry").and_then(|v| v.as_str()) == Some(needle))
    }
}

/// 매출 CSV의 한 행.
#[derive(Debug, Deserialize)]
struct SalesRecord {
    #[serde(rename = "종목명")]
    company: String,
    #[serde(rename = "사업부문")]
    division: String,
    #[serde(rename = "매출품목명")]
    product: String,
    #[serde(rename = "구분")]
    category: String,
    #[serde(rename = "2022_12 매출액", default)]
    sales_2022: String,
    #[serde(rename = "2023_12 매출액", default)]
    sales_2023: String,
    #[serde(rename = "2024_12 매출액", default)]
    sales_2024: String,
}

/// 사업부문별 매출 참조.
pub struct SalesReference {
    records: Vec<SalesRecord>,
}

impl SalesReference {
    /// 후보 경로에서 CSV 파일을 찾아 로드.
    pub fn load() -> Result<Self> {
        let path = find_existing(SALES_FILE_CANDIDATES).ok_or_else(|| {
            DataError::ReferenceFileMissing("NICE_내수수출_코스피.csv".to_string())
        })?;

        let file = std::fs::File::open(&path)
            .map_err(|e| DataError::ReferenceFileMissing(format!("{}: {}", path.display(), e)))?;

        let reference = Self::from_reader(file)?;
        debug!(path = %path.display(), count = reference.records.len(), "매출 내역 로드");
        Ok(reference)
    }

    /// Reader에서 직접 파싱.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();
        for result in csv_reader.deserialize() {
            let record: SalesRecord =
                result.map_err(|e| DataError::ParseError(format!("CSV 파싱 실패: {}", e)))?;
            records.push(record);
        }
        Ok(Self { records })
    }

    /// 기업의 사업부문별 매출 조회.
    ///
    /// (사업부문, 매출품목명, 구분) 단위로 연도별 매출액을 합산합니다.
    /// 해당 기업 행이 하나도 없으면 `NotFound`.
    pub fn sales_for(&self, company: &str) -> Result<Vec<Value>> {
        let mut grouped: BTreeMap<(String, String, String), [Decimal; 3]> = BTreeMap::new();
        let mut found = false;

        for record in &self.records {
            if record.company != company {
                continue;
            }
            found = true;

            let key = (
                record.division.clone(),
                record.product.clone(),
                record.category.clone(),
            );
            let sums = grouped.entry(key).or_insert([Decimal::ZERO; 3]);
            sums[0] += parse_sales_amount(&record.sales_2022);
            sums[1] += parse_sales_amount(&record.sales_2023);
            sums[2] += parse_sales_amount(&record.sales_2024);
        }

        if !found {
            return Err(DataError::NotFound(format!("해당 기업 없음: {}", company)));
        }

        Ok(grouped
            .into_iter()
            .map(|((division, product, category), sums)| {
                json!({
                    "사업부문": division,
                    "매출품목명": product,
                    "구분": category,
                    "2022_12 매출액": sums[0],
                    "2023_12 매출액": sums[1],
                    "2024_12 매출액": sums[2],
                })
            })
            .collect())
    }
}

/// 매출액 셀 파싱 (빈 값/쉼표 허용, 실패 시 0).
fn parse_sales_amount(s: &str) -> Decimal {
    let cleaned = s.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALES_CSV: &str = "\
종목명,사업부문,매출품목명,구분,2022_12 매출액,2023_12 매출액,2024_12 매출액
삼성전자,DX,스마트폰,수출,\"1,000\",1100,1200
삼성전자,DX,스마트폰,수출,500,400,300
삼성전자,DS,메모리,내수,2000,1800,2500
현대차,완성차,승용차,수출,3000,3200,3400
";

    #[test]
    fn test_sales_groups_and_sums() {
        let sales = SalesReference::from_reader(SALES_CSV.as_bytes()).unwrap();
        let rows = sales.sales_for("삼성전자").unwrap();
        assert_eq!(rows.len(), 2);

        // BTreeMap이라 사업부문 순으로 정렬됨 (DS < DX)
        assert_eq!(rows[0]["사업부문"], "DS");
        assert_eq!(rows[1]["사업부문"], "DX");
        // 같은 (부문, 품목, 구분) 행은 합산
        assert_eq!(rows[1]["2022_12 매출액"], json!(Decimal::from(1500)));
        assert_eq!(rows[1]["2024_12 매출액"], json!(Decimal::from(1500)));
    }

    #[test]
    fn test_sales_unknown_company_is_not_found() {
        let sales = SalesReference::from_reader(SALES_CSV.as_bytes()).unwrap();
        assert!(matches!(
            sales.sales_for("없는기업"),
            Err(DataError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_sales_amount() {
        assert_eq!(parse_sales_amount("1,234"), Decimal::from(1234));
        assert_eq!(parse_sales_amount(""), Decimal::ZERO);
        assert_eq!(parse_sales_amount("-"), Decimal::ZERO);
    }

    #[test]
    fn test_industry_reference_exact_match() {
        let json_data = r#"[
            {"industry": "반도체", "description": "메모리/비메모리 생산"},
            {"industry": "자동차", "description": "완성차 및 부품"}
        ]"#;
        let reference = IndustryReference::from_reader(json_data.as_bytes()).unwrap();

        let item = reference.find(" 반도체 ").unwrap();
        assert_eq!(item["description"], "메모리/비메모리 생산");

        assert!(reference.find("조선").is_none());
        assert!(reference.find("반도").is_none());
    }
}
