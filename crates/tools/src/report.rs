use std::sync::Arc;

use dataset::{Availability, DataLoader, DataTier, LoadOrigin};
use formats::{FeatureCollection, Normalize, Region};
use layers::{RenderSet, health_ramp};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    pub features: usize,
    pub renderable: usize,
    pub centroids: usize,
    pub tier: DataTier,
    pub status: &'static str,
    pub used_fallback: bool,
    pub availability: Availability,
    /// `[[min_lng, min_lat], [max_lng, max_lat]]` of the rendered polygons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[[f64; 2]; 2]>,
}

impl DatasetReport {
    pub fn new(loader: &DataLoader, collection: &Arc<FeatureCollection>, cap: usize) -> Self {
        let render = RenderSet::prepare(Arc::clone(collection), cap);
        Self {
            features: collection.len(),
            renderable: render.len(),
            centroids: render.centroids().len(),
            tier: loader.tier(),
            status: loader.tier().status_label(),
            used_fallback: loader.origin() == Some(LoadOrigin::Fallback),
            availability: loader.check_availability(),
            bounds: render.bounds().map(|b| b.to_array()),
        }
    }
}

/// One marker as shown on the globe: its region plus the ramp color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerRow {
    pub color: String,
    #[serde(flatten)]
    pub region: Region,
}

/// Normalized regions for the first `limit` markers, positioned at their centroids.
pub fn marker_rows(render: &RenderSet, limit: usize) -> Vec<MarkerRow> {
    let ramp = health_ramp();
    render
        .centroids()
        .iter()
        .take(limit)
        .map(|c| {
            let raw_health = c.properties.get(ramp.property).and_then(|v| v.as_f64());
            MarkerRow {
                color: ramp.evaluate(raw_health).hex(),
                region: c
                    .properties
                    .normalize()
                    .with_position(c.position.lng, c.position.lat),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{DatasetReport, marker_rows};
    use dataset::{DataLoader, DataTier, StaticSource};
    use layers::RenderSet;

    #[test]
    fn fallback_report() {
        let mut loader = DataLoader::new();
        let fc = loader.load(&StaticSource::new("broken", "not json"));
        let report = DatasetReport::new(&loader, &fc, 25_000);
        assert!(report.used_fallback);
        assert_eq!(report.tier, DataTier::Fallback);
        assert_eq!(report.status, "Demo data loaded");
        assert_eq!((report.features, report.renderable, report.centroids), (1, 1, 1));
        assert!(report.bounds.is_some());
    }

    #[test]
    fn marker_rows_carry_color_and_position() {
        let mut loader = DataLoader::new();
        let fc = loader.load(&StaticSource::new("broken", ""));
        let rows = marker_rows(&RenderSet::prepare(Arc::clone(&fc), 10), 10);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.region.name, "Demo Mangrove Area");
        assert_eq!(row.region.health, 75.0);
        assert!(row.region.lng.is_some() && row.region.lat.is_some());
        // 0.75 sits between amber (0.7) and green (0.85).
        assert_ne!(row.color, "#F59E0B");
        assert_ne!(row.color, "#10B981");
    }
}
