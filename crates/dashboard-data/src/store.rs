//! 기업 문서 저장소.
//!
//! 수집 파이프라인이 적재한 기업 문서(JSONB)를 읽습니다. 백엔드는
//! 읽기 전용이며, 짧은요약/개요 부가 문서를 본 문서에 병합해 돌려줍니다.

use crate::error::{DataError, Result};
use dashboard_core::CompanyDocument;
use serde_json::Value;
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::debug;

/// 기업 문서 저장소.
#[derive(Clone)]
pub struct CompanyStore {
    pool: PgPool,
}

impl CompanyStore {
    /// 새로운 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 저장소 테이블 생성 (없으면).
    ///
    /// 적재는 별도 파이프라인이 하므로 테이블 뼈대만 보장합니다.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                name TEXT PRIMARY KEY,
                doc  JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS company_summaries (
                name    TEXT PRIMARY KEY,
                summary TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS company_outlines (
                stock_code TEXT PRIMARY KEY,
                doc        JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 기업명으로 문서 조회 (짧은요약/개요 병합 포함).
    ///
    /// 정확 일치를 먼저 시도하고, 없으면 부분 일치(대소문자 무시)로
    /// 한 건을 찾습니다. 그래도 없으면 `NotFound`.
    pub async fn find_company(&self, name: &str) -> Result<CompanyDocument> {
        let row = sqlx::query("SELECT doc FROM companies WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        let row = match row {
            Some(r) => r,
            None => {
                debug!(name = name, "정확 일치 없음, 부분 일치 검색");
                sqlx::query("SELECT doc FROM companies WHERE name ILIKE '%' || $1 || '%' LIMIT 1")
                    .bind(name)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| DataError::NotFound(format!("기업을 찾을 수 없습니다: {}", name)))?
            }
        };

        let doc_json: Value = row.try_get("doc")?;
        let mut doc = match doc_json {
            Value::Object(map) => map,
            other => {
                return Err(DataError::InvalidData(format!(
                    "기업 문서가 객체가 아님: {}",
                    other
                )))
            }
        };

        let company_name = doc
            .get("기업명")
            .and_then(|v| v.as_str())
            .unwrap_or(name)
            .to_string();

        let summary = self.find_summary(&company_name).await?;
        let outline = match doc.get("종목코드").and_then(|v| v.as_str()) {
            Some(code) => self.find_outline(code).await?,
            None => None,
        };

        merge_auxiliary(&mut doc, summary, outline);

        Ok(doc)
    }

    /// 짧은요약 조회.
    async fn find_summary(&self, name: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT summary FROM company_summaries WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(r) => Some(r.try_get("summary")?),
            None => None,
        })
    }

    /// 개요 문서 조회 (종목코드 기준).
    async fn find_outline(&self, stock_code: &str) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT doc FROM company_outlines WHERE stock_code = $1")
            .bind(stock_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(r) => Some(r.try_get("doc")?),
            None => None,
        })
    }

    /// 전체 기업명 목록 조회.
    pub async fn company_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM companies ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            names.push(row.try_get("name")?);
        }
        Ok(names)
    }

    /// 전체 기업 문서 조회 (랭킹/보물찾기용).
    pub async fn metric_documents(&self) -> Result<Vec<CompanyDocument>> {
        let rows = sqlx::query("SELECT doc FROM companies")
            .fetch_all(&self.pool)
            .await?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let doc_json: Value = row.try_get("doc")?;
            if let Value::Object(map) = doc_json {
                docs.push(map);
            }
        }
        Ok(docs)
    }
}

/// 부가 문서를 본 문서에 병합.
fn merge_auxiliary(doc: &mut CompanyDocument, summary: Option<String>, outline: Option<Value>) {
    if let Some(summary) = summary {
        doc.insert("짧은요약".to_string(), Value::String(summary));
    }
    if let Some(outline) = outline {
        doc.insert("개요".to_string(), outline);
    }
}
