//! 다음 뉴스 검색 스크래핑.
//!
//! 다음(Daum) 뉴스 검색 결과 페이지에서 기사 제목/링크를 추출합니다.
//! 검색 페이지 마크업이 자주 바뀌므로 선택자 후보를 순서대로 시도합니다.
//!
//! `scraper::Html`은 `Send`가 아니므로 HTML 파싱은 동기 함수로 분리되어
//! 있습니다. HTTP 요청과 파싱이 나뉘어 정적 HTML로 단위 테스트가 가능합니다.

use crate::error::{DataError, Result};
use dashboard_core::NewsItem;
use scraper::{Html, Selector};
use tracing::{debug, warn};

/// 다음 뉴스 검색 URL.
const DAUM_SEARCH_URL: &str = "https://search.daum.net/nate";

/// HTTP 요청 기본 타임아웃.
const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// 제목 추출 선택자 후보 (순서대로 시도).
const TITLE_SELECTORS: &[&str] = &[
    "a.tit_main",
    ".tit_main",
    ".news_tit",
    ".news_area .news_tit",
    ".item-title > strong > a",
    "#dnsColl .item-title strong a",
];

/// 다음 뉴스 스크래퍼.
pub struct DaumNewsScraper {
    client: reqwest::Client,
}

impl DaumNewsScraper {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// 요청 타임아웃을 지정한 스크래퍼 생성.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
            )
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::ConnectionError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { client })
    }

    /// 키워드로 뉴스 검색.
    ///
    /// 최대 `limit`개의 (제목, 링크) 쌍을 반환합니다. 결과가 없으면 빈
    /// 목록을 반환하며, 폴백 처리는 호출자의 몫입니다.
    pub async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let response = self
            .client
            .get(DAUM_SEARCH_URL)
            .query(&[
                ("w", "news"),
                ("nil_search", "btn"),
                ("DA", "PGD"),
                ("enc", "utf8"),
                ("cluster", "y"),
                ("cluster_page", "1"),
                ("q", keyword),
            ])
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header("Accept-Language", "ko-KR,ko;q=0.8,en-US;q=0.5,en;q=0.3")
            .send()
            .await
            .map_err(|e| DataError::FetchError(format!("뉴스 검색 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            return Err(DataError::FetchError(format!(
                "뉴스 검색 오류: {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| DataError::FetchError(format!("응답 읽기 실패: {}", e)))?;

        let items = parse_news_html(&html, limit);
        if items.is_empty() {
            warn!(keyword = keyword, "뉴스 검색 결과 없음");
        } else {
            debug!(keyword = keyword, count = items.len(), "뉴스 스크래핑 완료");
        }

        Ok(items)
    }
}

/// 검색 결과 HTML에서 뉴스 항목 추출.
pub fn parse_news_html(html: &str, limit: usize) -> Vec<NewsItem> {
    let document = Html::parse_document(html);

    let mut anchors = Vec::new();
    for selector_str in TITLE_SELECTORS {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };
        anchors = document.select(&selector).collect();
        if !anchors.is_empty() {
            debug!(selector = selector_str, count = anchors.len(), "뉴스 선택자 매칭");
            break;
        }
    }

    // 선택자 전부 실패 시 뉴스 링크로 보이는 앵커라도 수집
    if anchors.is_empty() {
        if let Ok(selector) = Selector::parse("a[href*=\"news\"]") {
            anchors = document.select(&selector).collect();
        }
    }

    anchors
        .into_iter()
        .filter_map(|element| {
            let title: String = element.text().collect::<String>().trim().to_string();
            // 너무 짧은 텍스트는 내비게이션 링크일 가능성이 높음
            if title.chars().count() <= 5 {
                return None;
            }
            let link = element.value().attr("href").unwrap_or("#").to_string();
            Some(NewsItem::new(title, link))
        })
        .take(limit)
        .collect()
}
