//! 다단계 폴백 캐스케이드.
//!
//! 시계열 요청을 캐시 → 1순위 소스 → 백업 소스 → 오래된 캐시 → 합성
//! 순서로 해결합니다. 어떤 소스가 응답했는지는 [`SourceTag`]로 남습니다.
//!
//! 같은 키에 대한 동시 요청은 Lock으로 직렬화되어 외부 소스를 한 번만
//! 두드립니다.

use crate::cache::CachedSeries;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashboard_core::{PricePoint, SourceTag, TaggedSeries};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 키별 페칭 상태를 추적하는 Lock 맵.
type FetchLockMap = Arc<RwLock<HashMap<String, Arc<RwLock<()>>>>>;

/// Lock 맵에 유지할 최대 키 수.
///
/// 키에 사용자 입력 티커가 들어가므로 상한 없이는 요청마다 맵이 자랍니다.
/// 상한에 도달하면 사용 중이 아닌 Lock을 정리합니다.
const MAX_FETCH_LOCKS: usize = 1024;

/// 캐스케이드의 라이브 데이터 소스 한 단계.
///
/// 순서는 호출자가 정합니다. 첫 번째 소스가 1순위이고 나머지가 백업입니다.
#[async_trait]
pub trait FetchSource: Send + Sync {
    /// 로그용 소스 이름.
    fn name(&self) -> &str;

    /// 이 소스가 성공했을 때 붙일 태그.
    fn tag(&self) -> SourceTag;

    /// 시계열 조회. 빈 결과는 실패로 취급됩니다.
    async fn fetch(&self) -> Result<Vec<PricePoint>>;
}

/// 시계열 스냅샷 저장소.
///
/// 운영에서는 Postgres([`crate::cache::PgSeriesCache`]), 테스트에서는
/// 인메모리 구현을 사용합니다.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<CachedSeries>>;
    async fn store(&self, key: &str, points: &[PricePoint], source: SourceTag) -> Result<()>;
}

/// 폴백 캐스케이드 드라이버.
pub struct FetchCascade {
    /// 시계열 캐시 (DB가 없으면 None, 캐시 단계는 스킵)
    store: Option<Arc<dyn SeriesStore>>,
    /// 캐시 신선도 윈도우
    freshness: Duration,
    /// 키별 동시성 제어 Lock
    fetch_locks: FetchLockMap,
}

impl FetchCascade {
    /// 새로운 캐스케이드 생성.
    pub fn new(store: Option<Arc<dyn SeriesStore>>, freshness: Duration) -> Self {
        Self {
            store,
            freshness,
            fetch_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 시계열 요청 해결.
    ///
    /// 항상 시계열을 반환합니다. 모든 라이브 소스가 실패하고 캐시도
    /// 비어 있으면 `synth`로 합성 시계열을 만들어 캐시에 남깁니다.
    pub async fn resolve<F>(
        &self,
        key: &str,
        sources: &[Box<dyn FetchSource>],
        synth: F,
    ) -> TaggedSeries
    where
        F: FnOnce() -> Vec<PricePoint>,
    {
        // 1. 동시성 제어: 같은 키는 한 번에 하나만
        let lock = self.get_or_create_lock(key).await;
        let _guard = lock.write().await;

        // 2. 캐시 스냅샷 읽기 (읽기 실패는 캐시 없음으로 취급)
        let cached = match &self.store {
            Some(store) => match store.load(key).await {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(key = key, error = %e, "캐시 읽기 실패, 라이브 소스로 진행");
                    None
                }
            },
            None => None,
        };

        // 3. 신선한 실데이터면 즉시 반환
        if let Some(entry) = &cached {
            if entry.is_real() && entry.is_fresh(Utc::now(), self.freshness) {
                debug!(key = key, count = entry.points.len(), "신선한 캐시 사용");
                return TaggedSeries::new(SourceTag::CachedFresh, entry.points.clone());
            }
        }

        // 4. 라이브 소스 순회 (첫 번째 비어 있지 않은 성공이 승자)
        for source in sources {
            match source.fetch().await {
                Ok(points) if !points.is_empty() => {
                    info!(
                        key = key,
                        source = source.name(),
                        count = points.len(),
                        "라이브 소스 성공"
                    );
                    self.store_snapshot(key, &points, source.tag()).await;
                    return TaggedSeries::new(source.tag(), points);
                }
                Ok(_) => {
                    warn!(key = key, source = source.name(), "라이브 소스가 빈 결과 반환");
                }
                Err(e) => {
                    warn!(key = key, source = source.name(), error = %e, "라이브 소스 실패");
                }
            }
        }

        // 5. 오래된 캐시라도 실데이터면 사용
        if let Some(entry) = &cached {
            if entry.is_real() {
                info!(
                    key = key,
                    captured_at = %entry.captured_at,
                    "모든 라이브 소스 실패, 오래된 캐시 사용"
                );
                return TaggedSeries::new(SourceTag::StaleCache, entry.points.clone());
            }

            // 이전에 저장한 합성 시계열 재사용 (재생성하면 매 호출마다 모양이 바뀜)
            info!(key = key, "캐시된 합성 시계열 재사용");
            return TaggedSeries::new(SourceTag::Synthetic, entry.points.clone());
        }

        // 6. 최후: 합성 시계열 생성 후 캐시에 기록
        warn!(key = key, "모든 소스 실패, 합성 시계열 생성");
        let points = synth();
        self.store_snapshot(key, &points, SourceTag::Synthetic).await;
        TaggedSeries::new(SourceTag::Synthetic, points)
    }

    /// 스냅샷 저장 (실패해도 응답은 계속).
    async fn store_snapshot(&self, key: &str, points: &[PricePoint], source: SourceTag) {
        if let Some(store) = &self.store {
            if let Err(e) = store.store(key, points, source).await {
                warn!(key = key, error = %e, "캐시 저장 실패");
            }
        }
    }

    /// 동시성 제어를 위한 Lock 획득 또는 생성.
    async fn get_or_create_lock(&self, key: &str) -> Arc<RwLock<()>> {
        let locks = self.fetch_locks.read().await;
        if let Some(lock) = locks.get(key) {
            return lock.clone();
        }
        drop(locks);

        let mut locks = self.fetch_locks.write().await;
        if locks.len() >= MAX_FETCH_LOCKS {
            // strong_count 1이면 맵만 참조 중, 진행 중인 resolve가 없음
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use chrono::{DateTime, NaiveDate};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 테스트용 인메모리 저장소.
    struct MemorySeriesStore {
        entries: RwLock<HashMap<String, CachedSeries>>,
    }

    impl MemorySeriesStore {
        fn new() -> Self {
            Self {
                entries: RwLock::new(HashMap::new()),
            }
        }

        async fn seed(&self, key: &str, points: Vec<PricePoint>, source: SourceTag, captured_at: DateTime<Utc>) {
            let mut entries = self.entries.write().await;
            entries.insert(
                key.to_string(),
                CachedSeries {
                    key: key.to_string(),
                    points,
                    source,
                    captured_at,
                },
            );
        }
    }

    #[async_trait]
    impl SeriesStore for MemorySeriesStore {
        async fn load(&self, key: &str) -> Result<Option<CachedSeries>> {
            Ok(self.entries.read().await.get(key).cloned())
        }

        async fn store(&self, key: &str, points: &[PricePoint], source: SourceTag) -> Result<()> {
            let mut entries = self.entries.write().await;
            entries.insert(
                key.to_string(),
                CachedSeries {
                    key: key.to_string(),
                    points: points.to_vec(),
                    source,
                    captured_at: Utc::now(),
                },
            );
            Ok(())
        }
    }

    /// 고정 응답을 돌려주는 테스트 소스.
    struct StubSource {
        name: &'static str,
        tag: SourceTag,
        result: std::result::Result<Vec<PricePoint>, &'static str>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn ok(name: &'static str, tag: SourceTag, points: Vec<PricePoint>) -> Self {
            Self {
                name,
                tag,
                result: Ok(points),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(name: &'static str, tag: SourceTag) -> Self {
            Self {
                name,
                tag,
                result: Err("down"),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FetchSource for StubSource {
        fn name(&self) -> &str {
            self.name
        }

        fn tag(&self) -> SourceTag {
            self.tag
        }

        async fn fetch(&self) -> Result<Vec<PricePoint>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(points) => Ok(points.clone()),
                Err(msg) => Err(DataError::FetchError(msg.to_string())),
            }
        }
    }

    fn points(closes: &[i64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                PricePoint::new(
                    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap() + Duration::days(i as i64),
                    Decimal::from(*c),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_backup_wins_and_populates_cache() {
        let store = Arc::new(MemorySeriesStore::new());
        let cascade = FetchCascade::new(Some(store.clone()), Duration::hours(6));

        let sources: Vec<Box<dyn FetchSource>> = vec![
            Box::new(StubSource::failing("primary", SourceTag::Primary)),
            Box::new(StubSource::ok("backup", SourceTag::Backup, points(&[2600, 2610]))),
        ];

        let series = cascade.resolve("kospi", &sources, Vec::new).await;
        assert_eq!(series.source, SourceTag::Backup);
        assert_eq!(series.points.len(), 2);

        let cached = store.load("kospi").await.unwrap().unwrap();
        assert_eq!(cached.source, SourceTag::Backup);
        assert_eq!(cached.points, series.points);
    }

    #[tokio::test]
    async fn test_fresh_cache_short_circuits_live_sources() {
        let store = Arc::new(MemorySeriesStore::new());
        store
            .seed("kospi", points(&[2500]), SourceTag::Primary, Utc::now() - Duration::hours(1))
            .await;
        let cascade = FetchCascade::new(Some(store), Duration::hours(6));

        let primary = Arc::new(StubSource::ok("primary", SourceTag::Primary, points(&[9999])));
        struct ArcSource(Arc<StubSource>);
        #[async_trait]
        impl FetchSource for ArcSource {
            fn name(&self) -> &str {
                self.0.name()
            }
            fn tag(&self) -> SourceTag {
                self.0.tag()
            }
            async fn fetch(&self) -> Result<Vec<PricePoint>> {
                self.0.fetch().await
            }
        }
        let sources: Vec<Box<dyn FetchSource>> = vec![Box::new(ArcSource(primary.clone()))];

        let series = cascade.resolve("kospi", &sources, Vec::new).await;
        assert_eq!(series.source, SourceTag::CachedFresh);
        assert_eq!(series.points, points(&[2500]));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_real_cache_beats_synthetic() {
        let store = Arc::new(MemorySeriesStore::new());
        store
            .seed("kospi", points(&[2400]), SourceTag::Backup, Utc::now() - Duration::hours(48))
            .await;
        let cascade = FetchCascade::new(Some(store), Duration::hours(6));

        let sources: Vec<Box<dyn FetchSource>> =
            vec![Box::new(StubSource::failing("primary", SourceTag::Primary))];

        let series = cascade.resolve("kospi", &sources, || points(&[1])).await;
        assert_eq!(series.source, SourceTag::StaleCache);
        assert_eq!(series.points, points(&[2400]));
    }

    #[tokio::test]
    async fn test_synthetic_is_cached_and_reused() {
        let store = Arc::new(MemorySeriesStore::new());
        let cascade = FetchCascade::new(Some(store.clone()), Duration::hours(6));

        let sources: Vec<Box<dyn FetchSource>> =
            vec![Box::new(StubSource::failing("primary", SourceTag::Primary))];

        let first = cascade.resolve("kospi", &sources, || points(&[2500, 2510])).await;
        assert_eq!(first.source, SourceTag::Synthetic);

        let cached = store.load("kospi").await.unwrap().unwrap();
        assert_eq!(cached.source, SourceTag::Synthetic);

        // 두 번째 호출은 합성 재생성 대신 캐시된 합성을 재사용
        let second = cascade.resolve("kospi", &sources, || points(&[7777])).await;
        assert_eq!(second.source, SourceTag::Synthetic);
        assert_eq!(second.points, first.points);
    }

    #[tokio::test]
    async fn test_cached_synthetic_does_not_count_as_fresh() {
        let store = Arc::new(MemorySeriesStore::new());
        store
            .seed("kospi", points(&[1]), SourceTag::Synthetic, Utc::now())
            .await;
        let cascade = FetchCascade::new(Some(store.clone()), Duration::hours(6));

        // 합성 캐시가 신선해도 라이브 소스를 먼저 시도한다
        let sources: Vec<Box<dyn FetchSource>> = vec![Box::new(StubSource::ok(
            "primary",
            SourceTag::Primary,
            points(&[2650]),
        ))];

        let series = cascade.resolve("kospi", &sources, Vec::new).await;
        assert_eq!(series.source, SourceTag::Primary);

        // 라이브 성공이 합성 스냅샷을 덮어쓴다
        let cached = store.load("kospi").await.unwrap().unwrap();
        assert_eq!(cached.source, SourceTag::Primary);
    }

    #[tokio::test]
    async fn test_no_store_falls_back_to_synthetic() {
        let cascade = FetchCascade::new(None, Duration::hours(6));
        let sources: Vec<Box<dyn FetchSource>> =
            vec![Box::new(StubSource::failing("primary", SourceTag::Primary))];

        let series = cascade.resolve("price:005930", &sources, || points(&[70000])).await;
        assert_eq!(series.source, SourceTag::Synthetic);
        assert_eq!(series.points, points(&[70000]));
    }

    #[tokio::test]
    async fn test_lock_map_stays_bounded_with_many_keys() {
        let cascade = FetchCascade::new(None, Duration::hours(6));

        // 사용 중인 Lock은 정리 대상에서 제외되어야 함
        let held = cascade.get_or_create_lock("price:000001").await;

        for i in 0..(MAX_FETCH_LOCKS * 2) {
            let lock = cascade.get_or_create_lock(&format!("price:{:06}", i)).await;
            drop(lock);
        }

        let locks = cascade.fetch_locks.read().await;
        assert!(locks.len() <= MAX_FETCH_LOCKS);
        assert!(locks.contains_key("price:000001"));
        drop(held);
    }

    #[tokio::test]
    async fn test_empty_live_result_treated_as_failure() {
        let store = Arc::new(MemorySeriesStore::new());
        let cascade = FetchCascade::new(Some(store), Duration::hours(6));

        let sources: Vec<Box<dyn FetchSource>> = vec![
            Box::new(StubSource::ok("primary", SourceTag::Primary, Vec::new())),
            Box::new(StubSource::ok("backup", SourceTag::Backup, points(&[2620]))),
        ];

        let series = cascade.resolve("kospi", &sources, Vec::new).await;
        assert_eq!(series.source, SourceTag::Backup);
    }
}
