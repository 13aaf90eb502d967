use std::sync::Arc;

use formats::FeatureCollection;
use tracing::{info, warn};

use crate::fallback::fallback_collection;
use crate::source::{DatasetSource, SourceError};
use crate::tier::{Availability, DataTier, TierThresholds};

/// Whether the cached collection came from the primary source or the built-in fallback.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    Primary,
    Fallback,
}

#[derive(Debug, Clone)]
struct Loaded {
    collection: Arc<FeatureCollection>,
    origin: LoadOrigin,
}

/// Session-scoped dataset loader.
///
/// The first successful load (primary or fallback) is cached; later calls return the
/// cached collection without touching the source again. Loading never fails: any
/// read or parse error is logged and replaced by [`fallback_collection`].
#[derive(Debug, Default)]
pub struct DataLoader {
    thresholds: TierThresholds,
    loaded: Option<Loaded>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: TierThresholds) -> Self {
        Self {
            thresholds,
            loaded: None,
        }
    }

    pub fn load(&mut self, source: &dyn DatasetSource) -> Arc<FeatureCollection> {
        if let Some(cached) = self.cached() {
            return cached;
        }
        let origin = source.describe();
        info!(source = %origin, "loading mangrove dataset");
        self.ingest(source.read(), &origin)
    }

    /// Same as [`DataLoader::load`] for hosts that fetch the payload themselves.
    pub fn load_payload(
        &mut self,
        payload: Result<String, SourceError>,
    ) -> Arc<FeatureCollection> {
        if let Some(cached) = self.cached() {
            return cached;
        }
        self.ingest(payload, "payload")
    }

    pub fn cached(&self) -> Option<Arc<FeatureCollection>> {
        self.loaded.as_ref().map(|l| Arc::clone(&l.collection))
    }

    pub fn origin(&self) -> Option<LoadOrigin> {
        self.loaded.as_ref().map(|l| l.origin)
    }

    pub fn used_fallback(&self) -> bool {
        self.origin() == Some(LoadOrigin::Fallback)
    }

    /// Size tier of the cached collection; `Fallback` until something is loaded.
    pub fn tier(&self) -> DataTier {
        let count = self.loaded.as_ref().map_or(0, |l| l.collection.len());
        self.thresholds.classify(count)
    }

    pub fn check_availability(&self) -> Availability {
        Availability::for_tier(self.tier())
    }

    /// Drops the cached collection so the next load reads the source again.
    pub fn reset(&mut self) {
        self.loaded = None;
    }

    fn ingest(
        &mut self,
        payload: Result<String, SourceError>,
        origin: &str,
    ) -> Arc<FeatureCollection> {
        let parsed = payload.map_err(|e| e.to_string()).and_then(|text| {
            FeatureCollection::from_geojson_str(&text).map_err(|e| e.to_string())
        });

        let loaded = match parsed {
            Ok(collection) => {
                info!(
                    source = %origin,
                    features = collection.len(),
                    tier = %self.thresholds.classify(collection.len()),
                    "mangrove dataset loaded"
                );
                Loaded {
                    collection: Arc::new(collection),
                    origin: LoadOrigin::Primary,
                }
            }
            Err(reason) => {
                warn!(source = %origin, %reason, "primary dataset unavailable, using fallback");
                Loaded {
                    collection: Arc::new(fallback_collection()),
                    origin: LoadOrigin::Fallback,
                }
            }
        };

        let collection = Arc::clone(&loaded.collection);
        self.loaded = Some(loaded);
        collection
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{DataLoader, LoadOrigin};
    use crate::source::{DatasetSource, SourceError, StaticSource};
    use crate::tier::{DataTier, TierThresholds};

    struct CountingSource {
        payload: Result<String, String>,
        reads: Cell<usize>,
    }

    impl CountingSource {
        fn ok(payload: &str) -> Self {
            Self {
                payload: Ok(payload.to_string()),
                reads: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                payload: Err("connection refused".to_string()),
                reads: Cell::new(0),
            }
        }
    }

    impl DatasetSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        fn read(&self) -> Result<String, SourceError> {
            self.reads.set(self.reads.get() + 1);
            self.payload.clone().map_err(SourceError::Unavailable)
        }
    }

    fn polygon_collection(n: usize) -> String {
        let feature = r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}"#;
        let features = vec![feature; n].join(",");
        format!(r#"{{"type":"FeatureCollection","features":[{features}]}}"#)
    }

    #[test]
    fn caches_the_first_load() {
        let src = CountingSource::ok(&polygon_collection(2));
        let mut loader = DataLoader::new();
        let a = loader.load(&src);
        let b = loader.load(&src);
        assert_eq!(src.reads.get(), 1);
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(loader.origin(), Some(LoadOrigin::Primary));
    }

    #[test]
    fn read_failure_substitutes_fallback() {
        let src = CountingSource::failing();
        let mut loader = DataLoader::new();
        let fc = loader.load(&src);
        assert_eq!(fc.len(), 1);
        assert!(loader.used_fallback());
        assert_eq!(loader.check_availability().data_source, DataTier::Fallback);

        // The fallback is cached too.
        loader.load(&src);
        assert_eq!(src.reads.get(), 1);
    }

    #[test]
    fn parse_failure_substitutes_fallback() {
        let mut loader = DataLoader::new();
        let fc = loader.load(&StaticSource::new("broken", "{\"type\": \"Feature\""));
        assert_eq!(fc.len(), 1);
        assert_eq!(loader.origin(), Some(LoadOrigin::Fallback));
    }

    #[test]
    fn availability_is_classified_from_the_cached_size() {
        let mut loader = DataLoader::new();
        assert_eq!(loader.tier(), DataTier::Fallback);

        loader.load_payload(Ok(polygon_collection(1_001)));
        assert_eq!(loader.tier(), DataTier::Sample);
        let a = loader.check_availability();
        assert!(a.sample_data && !a.full_dataset);

        loader.reset();
        loader.load_payload(Ok(polygon_collection(1_000)));
        assert_eq!(loader.tier(), DataTier::Fallback);
        assert_eq!(loader.origin(), Some(LoadOrigin::Primary));
    }

    #[test]
    fn custom_thresholds_reclassify() {
        let mut loader = DataLoader::with_thresholds(TierThresholds {
            full_min: 10,
            sample_above: 2,
        });
        loader.load_payload(Ok(polygon_collection(3)));
        assert_eq!(loader.tier(), DataTier::Sample);
        loader.reset();
        loader.load_payload(Ok(polygon_collection(10)));
        assert_eq!(loader.tier(), DataTier::Full);
        assert!(loader.check_availability().full_dataset);
    }

    #[test]
    fn load_payload_respects_cache() {
        let mut loader = DataLoader::new();
        loader.load_payload(Ok(polygon_collection(3)));
        let again = loader.load_payload(Err(SourceError::Unavailable("offline".into())));
        assert_eq!(again.len(), 3);
        assert!(!loader.used_fallback());
    }
}
