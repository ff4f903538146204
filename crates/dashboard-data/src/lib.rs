//! 대시보드 데이터 계층.
//!
//! 외부 데이터 소스(KRX, Yahoo Finance, 뉴스/리포트 스크래핑)와
//! Postgres 문서 저장소, 그리고 다단계 폴백 캐스케이드를 제공합니다.
//!
//! # 폴백 캐스케이드
//!
//! ```text
//! 요청 (시계열 키)
//!         │
//!         ▼
//! ┌─────────────────────┐
//! │ 1. 캐시 신선도 확인   │ ← 윈도우 이내의 실데이터면 즉시 반환
//! └─────────┬───────────┘
//!           │ miss
//! ┌─────────▼───────────┐
//! │ 2. 1순위 라이브 소스  │
//! └─────────┬───────────┘
//!           │ 실패/빈 결과
//! ┌─────────▼───────────┐
//! │ 3. 백업 소스 (순서대로)│
//! └─────────┬───────────┘
//!           │ 전부 실패
//! ┌─────────▼───────────┐
//! │ 4. 오래된 캐시        │ ← 마지막 실데이터
//! └─────────┬───────────┘
//!           │ 없음
//! ┌─────────▼───────────┐
//! │ 5. 합성 플레이스홀더  │ ← 항상 성공
//! └─────────────────────┘
//! ```

pub mod cache;
pub mod cascade;
pub mod error;
pub mod provider;
pub mod ranking;
pub mod reference;
pub mod store;
pub mod synthetic;

pub use cache::{CachedSeries, PgSeriesCache};
pub use cascade::{FetchCascade, FetchSource, SeriesStore};
pub use error::{DataError, Result};
pub use store::CompanyStore;
