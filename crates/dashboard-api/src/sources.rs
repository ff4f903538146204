//! 캐스케이드용 라이브 소스 래퍼.
//!
//! 엔드포인트별 소스 우선순위는 라우트 핸들러가 조립합니다. 여기서는
//! KRX/Yahoo 클라이언트를 [`FetchSource`]에 맞게 감쌉니다.

use async_trait::async_trait;
use dashboard_core::{PricePoint, SourceTag};
use dashboard_data::provider::{KrxClient, YahooProvider};
use dashboard_data::{FetchSource, Result};
use std::sync::Arc;

/// KRX 지수 소스.
pub struct KrxIndexSource {
    krx: Arc<KrxClient>,
    index_code: String,
    days: i64,
}

impl KrxIndexSource {
    pub fn new(krx: Arc<KrxClient>, index_code: impl Into<String>, days: i64) -> Self {
        Self {
            krx,
            index_code: index_code.into(),
            days,
        }
    }
}

#[async_trait]
impl FetchSource for KrxIndexSource {
    fn name(&self) -> &str {
        "krx-index"
    }

    fn tag(&self) -> SourceTag {
        SourceTag::Primary
    }

    async fn fetch(&self) -> Result<Vec<PricePoint>> {
        self.krx.get_index_closes(&self.index_code, self.days).await
    }
}

/// KRX 개별 종목 소스.
pub struct KrxStockSource {
    krx: Arc<KrxClient>,
    stock_code: String,
    days: i64,
}

impl KrxStockSource {
    pub fn new(krx: Arc<KrxClient>, stock_code: impl Into<String>, days: i64) -> Self {
        Self {
            krx,
            stock_code: stock_code.into(),
            days,
        }
    }
}

#[async_trait]
impl FetchSource for KrxStockSource {
    fn name(&self) -> &str {
        "krx-stock"
    }

    fn tag(&self) -> SourceTag {
        SourceTag::Primary
    }

    async fn fetch(&self) -> Result<Vec<PricePoint>> {
        self.krx.get_stock_closes(&self.stock_code, self.days).await
    }
}

/// Yahoo Finance 소스 (심볼 + 기간 조합 하나).
pub struct YahooSource {
    yahoo: Arc<YahooProvider>,
    symbol: String,
    range: &'static str,
    tag: SourceTag,
}

impl YahooSource {
    pub fn new(
        yahoo: Arc<YahooProvider>,
        symbol: impl Into<String>,
        range: &'static str,
        tag: SourceTag,
    ) -> Self {
        Self {
            yahoo,
            symbol: symbol.into(),
            range,
            tag,
        }
    }
}

#[async_trait]
impl FetchSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn tag(&self) -> SourceTag {
        self.tag
    }

    async fn fetch(&self) -> Result<Vec<PricePoint>> {
        self.yahoo.get_daily_closes(&self.symbol, self.range).await
    }
}
