//! Typed read access to the datasets the refresh job caches
//!
//! Every accessor separates three outcomes: a hit, a miss (key absent) and an
//! error (backend or decoding failure). Callers decide how each degrades.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::cache::{CacheError, CacheKey, CacheService};
use crate::domain::{
    CardRecord, CaseRecord, CommentScope, CommentsByProduct, PlotSeries, Product, StatsSummary,
};

/// Outcome of a cache read that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum CacheRead<T> {
    Hit(T),
    Miss,
}

impl<T> CacheRead<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss => None,
        }
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheRead<U> {
        match self {
            Self::Hit(value) => CacheRead::Hit(f(value)),
            Self::Miss => CacheRead::Miss,
        }
    }
}

impl<T> From<Option<T>> for CacheRead<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Miss, Self::Hit)
    }
}

/// Read-only facade over the cached dashboard datasets
#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Cases for one product
    async fn cases(&self, product: Product) -> Result<CacheRead<Vec<CaseRecord>>, CacheError>;

    /// Comment groups for every product, in one scope
    async fn comments(
        &self,
        scope: CommentScope,
    ) -> Result<CacheRead<CommentsByProduct>, CacheError>;

    /// Cards labeled trending in the current quarter
    async fn trending_cards(&self) -> Result<CacheRead<Vec<CardRecord>>, CacheError>;

    /// Named plot series in the order the writer stored them
    async fn plot_series(&self) -> Result<CacheRead<Vec<PlotSeries>>, CacheError>;

    /// Any cached JSON value
    async fn cached_value(&self, key: &str) -> Result<CacheRead<Value>, CacheError>;

    /// Current stats summary for a case type
    async fn generate_stats(
        &self,
        case_type: Product,
    ) -> Result<CacheRead<StatsSummary>, CacheError>;

    /// Last refresh timestamp. Non-string scalars are stringified; null is a miss.
    async fn last_refresh(&self) -> Result<CacheRead<String>, CacheError> {
        let read = self.cached_value(CacheKey::timestamp()).await?;
        Ok(match read {
            CacheRead::Hit(Value::Null) | CacheRead::Miss => CacheRead::Miss,
            CacheRead::Hit(Value::String(s)) => CacheRead::Hit(s),
            CacheRead::Hit(other) => CacheRead::Hit(other.to_string()),
        })
    }

    /// Day-keyed stats history for a case type
    async fn stats_history(&self, case_type: Product) -> Result<CacheRead<Value>, CacheError> {
        self.cached_value(&CacheKey::stats_history(case_type)).await
    }
}

/// Accepts `[1, 2, 3]` and also a lone number for single-point series
#[derive(Deserialize)]
#[serde(untagged)]
enum PlotValues {
    Many(Vec<f64>),
    One(f64),
}

/// [`DashboardSource`] backed by the shared cache
#[derive(Debug, Clone)]
pub struct CachedDashboardSource {
    cache: Arc<CacheService>,
}

impl CachedDashboardSource {
    pub fn new(cache: Arc<CacheService>) -> Self {
        Self { cache }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<CacheRead<T>, CacheError> {
        let value: Option<T> = self.cache.get(key).await?;
        Ok(value.into())
    }
}

#[async_trait]
impl DashboardSource for CachedDashboardSource {
    async fn cases(&self, product: Product) -> Result<CacheRead<Vec<CaseRecord>>, CacheError> {
        self.read(&CacheKey::cases(product)).await
    }

    async fn comments(
        &self,
        scope: CommentScope,
    ) -> Result<CacheRead<CommentsByProduct>, CacheError> {
        self.read(&CacheKey::comments(scope)).await
    }

    async fn trending_cards(&self) -> Result<CacheRead<Vec<CardRecord>>, CacheError> {
        self.read(CacheKey::trending_cards()).await
    }

    async fn plot_series(&self) -> Result<CacheRead<Vec<PlotSeries>>, CacheError> {
        let read: CacheRead<Map<String, Value>> = self.read(CacheKey::plots()).await?;
        let CacheRead::Hit(named) = read else {
            return Ok(CacheRead::Miss);
        };

        let mut series = Vec::with_capacity(named.len());
        for (name, raw) in named {
            let values = match serde_json::from_value::<PlotValues>(raw) {
                Ok(PlotValues::Many(values)) => values,
                Ok(PlotValues::One(value)) => vec![value],
                Err(e) => {
                    return Err(CacheError::Decode(format!(
                        "{}: series {name}: {e}",
                        CacheKey::plots()
                    )));
                }
            };
            series.push(PlotSeries { name, values });
        }
        Ok(CacheRead::Hit(series))
    }

    async fn cached_value(&self, key: &str) -> Result<CacheRead<Value>, CacheError> {
        let Some(bytes) = self.cache.get_raw(key).await? else {
            return Ok(CacheRead::Miss);
        };
        // Some writers store bare strings without JSON quoting
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(CacheRead::Hit(value)),
            Err(_) => match String::from_utf8(bytes) {
                Ok(text) => Ok(CacheRead::Hit(Value::String(text))),
                Err(e) => Err(CacheError::Decode(format!("{key}: {e}"))),
            },
        }
    }

    async fn generate_stats(
        &self,
        case_type: Product,
    ) -> Result<CacheRead<StatsSummary>, CacheError> {
        self.read(&CacheKey::stats_summary(case_type)).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::cache::CacheBackend;

    /// Backend whose every call fails, for degrade-path tests
    pub(crate) struct FailingBackend;

    #[async_trait]
    impl CacheBackend for FailingBackend {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Connection("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), CacheError> {
            Err(CacheError::Connection("connection refused".to_string()))
        }

        async fn health_check(&self) -> Result<(), CacheError> {
            Err(CacheError::Connection("connection refused".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    pub(crate) async fn memory_cache() -> Arc<CacheService> {
        Arc::new(CacheService::new(&Default::default()).await.unwrap())
    }

    #[tokio::test]
    async fn test_reads_miss_on_empty_cache() {
        let source = CachedDashboardSource::new(memory_cache().await);

        assert!(source.cases(Product::Cnv).await.unwrap().is_miss());
        assert!(source.comments(CommentScope::All).await.unwrap().is_miss());
        assert!(source.trending_cards().await.unwrap().is_miss());
        assert!(source.plot_series().await.unwrap().is_miss());
        assert!(source.last_refresh().await.unwrap().is_miss());
        assert!(source.generate_stats(Product::Cnv).await.unwrap().is_miss());
        assert!(source.stats_history(Product::Cnv).await.unwrap().is_miss());
    }

    #[tokio::test]
    async fn test_cases_read_by_case_source_id() {
        let cache = memory_cache().await;
        cache
            .set(
                "cases:shift_telco5g",
                &json!([{ "case_number": "03123456", "account": "Acme" }]),
            )
            .await
            .unwrap();
        let source = CachedDashboardSource::new(cache);

        let cases = source.cases(Product::Telco5g).await.unwrap().into_option().unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].case_number, "03123456");
        assert!(source.cases(Product::Cnv).await.unwrap().is_miss());
    }

    #[tokio::test]
    async fn test_plot_series_keeps_names_and_order() {
        let cache = memory_cache().await;
        cache
            .set_raw(
                "plots",
                br#"{"urgent": [3, 1], "high": [5, 4], "low": 2}"#.to_vec(),
            )
            .await
            .unwrap();
        let source = CachedDashboardSource::new(cache);

        let series = source.plot_series().await.unwrap().into_option().unwrap();
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["urgent", "high", "low"]);
        assert_eq!(series[0].values, vec![3.0, 1.0]);
        assert_eq!(series[2].values, vec![2.0]);
    }

    #[tokio::test]
    async fn test_plot_series_rejects_non_numeric() {
        let cache = memory_cache().await;
        cache
            .set("plots", &json!({ "urgent": ["a"] }))
            .await
            .unwrap();
        let source = CachedDashboardSource::new(cache);

        let err = source.plot_series().await.unwrap_err();
        assert!(matches!(err, CacheError::Decode(ref m) if m.contains("urgent")));
    }

    #[tokio::test]
    async fn test_last_refresh_accepts_raw_and_scalar_values() {
        let cache = memory_cache().await;
        let source = CachedDashboardSource::new(cache.clone());

        cache
            .set_raw("timestamp", b"2024-01-02 08:00:00 UTC".to_vec())
            .await
            .unwrap();
        assert_eq!(
            source.last_refresh().await.unwrap(),
            CacheRead::Hit("2024-01-02 08:00:00 UTC".to_string())
        );

        cache.set("timestamp", &1_704_182_400).await.unwrap();
        assert_eq!(
            source.last_refresh().await.unwrap(),
            CacheRead::Hit("1704182400".to_string())
        );

        cache.set("timestamp", &Value::Null).await.unwrap();
        assert!(source.last_refresh().await.unwrap().is_miss());
    }

    #[tokio::test]
    async fn test_backend_failure_is_an_error_not_a_miss() {
        let cache = Arc::new(CacheService::from_backend(Arc::new(FailingBackend)));
        let source = CachedDashboardSource::new(cache);

        assert!(source.cases(Product::Cnv).await.is_err());
        assert!(source.last_refresh().await.is_err());
    }

    #[test]
    fn test_cache_read_helpers() {
        let hit: CacheRead<u32> = Some(2).into();
        assert_eq!(hit.clone().map(|v| v * 2), CacheRead::Hit(4));
        assert_eq!(hit.into_option(), Some(2));

        let miss: CacheRead<u32> = None.into();
        assert!(miss.is_miss());
        assert_eq!(miss.into_option(), None);
    }
}
