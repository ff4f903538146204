//! 외부 데이터 소스.
//!
//! - [`krx`]: KRX 정보데이터시스템 (지수/시세/투자자 동향)
//! - [`yahoo`]: Yahoo Finance (백업 시세)
//! - [`news`]: 다음 뉴스 검색 스크래핑
//! - [`report`]: FnGuide 콘센서스 리포트 스크래핑

pub mod krx;
pub mod news;
pub mod report;
pub mod yahoo;

pub use krx::{InvestorFlow, InvestorValueRow, KrxClient, MarketSnapshotRow};
pub use news::DaumNewsScraper;
pub use report::FnGuideReportScraper;
pub use yahoo::YahooProvider;
