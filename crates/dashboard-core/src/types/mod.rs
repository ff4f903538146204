//! 도메인 타입.

pub mod company;
pub mod series;

pub use company::{CompanyDocument, NewsItem, ReportItem};
pub use series::{PricePoint, SourceTag, TaggedSeries};
