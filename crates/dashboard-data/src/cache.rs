//! Postgres 시계열 캐시.
//!
//! 폴백 캐스케이드가 사용하는 시계열 스냅샷 저장소입니다.
//! 키 하나당 마지막 스냅샷 하나만 유지합니다 (upsert).

use crate::cascade::SeriesStore;
use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashboard_core::{PricePoint, SourceTag};
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::debug;

/// 캐시에서 읽은 시계열 스냅샷.
#[derive(Debug, Clone)]
pub struct CachedSeries {
    /// 시계열 키 (예: "kospi", "price:005930")
    pub key: String,
    /// (날짜, 종가) 목록
    pub points: Vec<PricePoint>,
    /// 저장 당시의 출처 태그
    pub source: SourceTag,
    /// 저장 시각
    pub captured_at: DateTime<Utc>,
}

impl CachedSeries {
    /// 신선도 윈도우 이내인지 확인.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.captured_at < window
    }

    /// 실데이터 스냅샷인지 확인 (합성 데이터 제외).
    pub fn is_real(&self) -> bool {
        self.source.is_real()
    }
}

/// Postgres 기반 시계열 캐시.
#[derive(Clone)]
pub struct PgSeriesCache {
    pool: PgPool,
}

impl PgSeriesCache {
    /// 새로운 캐시 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 캐시 테이블 생성 (없으면).
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS series_cache (
                series_key  TEXT PRIMARY KEY,
                points      JSONB NOT NULL,
                source      TEXT NOT NULL,
                point_count INT NOT NULL,
                captured_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SeriesStore for PgSeriesCache {
    async fn load(&self, key: &str) -> Result<Option<CachedSeries>> {
        let row = sqlx::query(
            r#"
            SELECT series_key, points, source, captured_at
            FROM series_cache
            WHERE series_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let points_json: serde_json::Value = row.try_get("points")?;
        let points: Vec<PricePoint> = serde_json::from_value(points_json)?;

        let source_str: String = row.try_get("source")?;
        let source: SourceTag = source_str
            .parse()
            .map_err(|e: String| DataError::InvalidData(e))?;

        Ok(Some(CachedSeries {
            key: row.try_get("series_key")?,
            points,
            source,
            captured_at: row.try_get("captured_at")?,
        }))
    }

    async fn store(&self, key: &str, points: &[PricePoint], source: SourceTag) -> Result<()> {
        let points_json = serde_json::to_value(points)?;

        sqlx::query(
            r#"
            INSERT INTO series_cache (series_key, points, source, point_count, captured_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (series_key) DO UPDATE SET
                points = EXCLUDED.points,
                source = EXCLUDED.source,
                point_count = EXCLUDED.point_count,
                captured_at = NOW()
            "#,
        )
        .bind(key)
        .bind(points_json)
        .bind(source.as_str())
        .bind(points.len() as i32)
        .execute(&self.pool)
        .await?;

        debug!(key = key, count = points.len(), source = %source, "시계열 캐시 저장");

        Ok(())
    }
}
