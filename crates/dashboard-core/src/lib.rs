//! 주식 대시보드 백엔드의 핵심 도메인 타입.
//!
//! 이 crate는 다음을 제공합니다:
//! - 시계열/기업/뉴스 도메인 타입
//! - 공통 에러 타입
//! - 환경 변수 기반 설정
//! - tracing 로깅 초기화

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, FetchConfig, ServerConfig};
pub use error::{DashboardError, DashboardResult};
pub use types::company::{CompanyDocument, NewsItem, ReportItem};
pub use types::series::{PricePoint, SourceTag, TaggedSeries};
