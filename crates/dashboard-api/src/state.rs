//! 애플리케이션 상태 관리.
//!
//! DB 풀, 문서 저장소, 캐스케이드, 외부 클라이언트를 담습니다.
//! DB는 선택 사항입니다. 연결에 실패해도 서버는 기동하며, DB가 필요한
//! 엔드포인트는 503을, 캐스케이드 엔드포인트는 폴백 데이터를 반환합니다.

use chrono::{DateTime, Utc};
use dashboard_core::AppConfig;
use dashboard_data::provider::{DaumNewsScraper, FnGuideReportScraper, KrxClient, YahooProvider};
use dashboard_data::reference::{IndustryReference, SalesReference};
use dashboard_data::{CompanyStore, FetchCascade, PgSeriesCache, SeriesStore};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 공유 애플리케이션 상태.
pub struct AppState {
    /// 애플리케이션 설정
    pub config: AppConfig,
    /// DB 연결 풀 (없으면 DB 기능 비활성)
    pub db_pool: Option<PgPool>,
    /// 기업 문서 저장소
    pub company_store: Option<CompanyStore>,
    /// 시계열 폴백 캐스케이드
    pub cascade: FetchCascade,
    /// KRX 클라이언트
    pub krx: Arc<KrxClient>,
    /// Yahoo Finance 백업 소스 (커넥터 생성 실패 시 None)
    pub yahoo: Option<Arc<YahooProvider>>,
    /// 다음 뉴스 스크래퍼
    pub news: Arc<DaumNewsScraper>,
    /// FnGuide 리포트 스크래퍼
    pub reports: Arc<FnGuideReportScraper>,
    /// 산업별 설명 참조 (파일 없으면 None)
    pub industry: Option<IndustryReference>,
    /// 사업부문별 매출 참조 (파일 없으면 None)
    pub sales: Option<SalesReference>,
    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 상태 초기화.
    ///
    /// DB 연결과 참조 파일 로드는 실패해도 경고만 남기고 계속합니다.
    /// HTTP 클라이언트 생성 실패만 기동 실패로 취급합니다.
    pub async fn initialize(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = connect_database(&config).await;

        let company_store = db_pool.clone().map(CompanyStore::new);
        let series_store: Option<Arc<dyn SeriesStore>> = db_pool
            .clone()
            .map(|pool| Arc::new(PgSeriesCache::new(pool)) as Arc<dyn SeriesStore>);

        // 스키마 보장 (읽기 전용 테이블 포함, 적재는 별도 파이프라인)
        if let Some(store) = &company_store {
            if let Err(e) = store.ensure_schema().await {
                warn!(error = %e, "기업 저장소 스키마 생성 실패");
            }
        }
        if let Some(pool) = &db_pool {
            let cache = PgSeriesCache::new(pool.clone());
            if let Err(e) = cache.ensure_schema().await {
                warn!(error = %e, "시계열 캐시 스키마 생성 실패");
            }
        }

        let cascade = FetchCascade::new(series_store, config.fetch.freshness_window());

        let timeout = config.fetch.request_timeout();
        let krx = Arc::new(KrxClient::with_timeout(timeout)?);
        let news = Arc::new(DaumNewsScraper::with_timeout(timeout)?);
        let reports = Arc::new(FnGuideReportScraper::with_timeout(timeout)?);

        let yahoo = match YahooProvider::new() {
            Ok(provider) => Some(Arc::new(provider)),
            Err(e) => {
                warn!(error = %e, "Yahoo Finance 커넥터 생성 실패, 백업 소스 비활성");
                None
            }
        };

        let industry = match IndustryReference::load() {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!(error = %e, "산업별 설명 파일 로드 실패");
                None
            }
        };
        let sales = match SalesReference::load() {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!(error = %e, "매출 내역 파일 로드 실패");
                None
            }
        };

        Ok(Self {
            config,
            db_pool,
            company_store,
            cascade,
            krx,
            yahoo,
            news,
            reports,
            industry,
            sales,
            started_at: Utc::now(),
        })
    }

    /// DB 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            None => false,
        }
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// DB 연결 시도 (실패해도 None으로 계속).
async fn connect_database(config: &AppConfig) -> Option<PgPool> {
    let url = match &config.database.url {
        Some(url) => url,
        None => {
            warn!("DATABASE_URL 미설정, DB 기능 비활성");
            return None;
        }
    };

    match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.connect_timeout())
        .connect(url)
        .await
    {
        Ok(pool) => {
            if sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok() {
                info!("Postgres 연결 완료");
                Some(pool)
            } else {
                error!("DB 연결 검증 실패");
                None
            }
        }
        Err(e) => {
            error!(error = %e, "DB 연결 실패, DB 기능 없이 기동");
            None
        }
    }
}

/// 테스트용 상태 생성 (DB/참조 파일 없음).
#[cfg(test)]
pub fn create_test_state() -> AppState {
    let config = AppConfig::default();
    AppState {
        cascade: FetchCascade::new(None, config.fetch.freshness_window()),
        config,
        db_pool: None,
        company_store: None,
        krx: Arc::new(KrxClient::new().expect("KRX 클라이언트")),
        yahoo: None,
        news: Arc::new(DaumNewsScraper::new().expect("뉴스 스크래퍼")),
        reports: Arc::new(FnGuideReportScraper::new().expect("리포트 스크래퍼")),
        industry: None,
        sales: None,
        started_at: Utc::now(),
    }
}
