use std::sync::Arc;

use formats::{Feature, FeatureCollection, Geometry, feature_to_geojson_value};
use foundation::bounds::LngLatBounds;
use foundation::geo::{LngLat, vertex_average};
use serde_json::{Map, Value, json};

/// Default upper bound on rendered polygons.
pub const DEFAULT_FEATURE_CAP: usize = 25_000;

/// Marker position for one polygon, carrying the polygon's raw properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidPoint {
    pub position: LngLat,
    pub properties: Map<String, Value>,
}

/// Filtered, capped polygons plus their centroid markers.
///
/// Derived from a shared [`FeatureCollection`] and never written back to it.
#[derive(Debug, Clone, Default)]
pub struct RenderSet {
    source: Arc<FeatureCollection>,
    /// Indices into `source.features`, in source order.
    kept: Vec<usize>,
    centroids: Vec<CentroidPoint>,
}

impl RenderSet {
    /// Keeps renderable features in source order, truncates to `cap` (no sampling),
    /// then computes one centroid per kept feature.
    pub fn prepare(source: Arc<FeatureCollection>, cap: usize) -> Self {
        let kept: Vec<usize> = source
            .features
            .iter()
            .enumerate()
            .filter(|(_, f)| is_renderable(f))
            .map(|(i, _)| i)
            .take(cap)
            .collect();

        let centroids = kept
            .iter()
            .filter_map(|&i| {
                let feature = &source.features[i];
                let position = feature.geometry.as_ref().and_then(centroid)?;
                Some(CentroidPoint {
                    position,
                    properties: feature.properties.clone(),
                })
            })
            .collect();

        let dropped = source.len() - kept.len();
        if dropped > 0 {
            tracing::debug!(
                total = source.len(),
                kept = kept.len(),
                cap,
                "excluded features from rendering"
            );
        }

        Self {
            source,
            kept,
            centroids,
        }
    }

    pub fn len(&self) -> usize {
        self.kept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.kept.iter().map(|&i| &self.source.features[i])
    }

    pub fn centroids(&self) -> &[CentroidPoint] {
        &self.centroids
    }

    /// Extent used to frame the data: outer rings of polygons, every ring of
    /// multipolygons.
    pub fn bounds(&self) -> Option<LngLatBounds> {
        let points = self
            .features()
            .filter_map(|f| f.geometry.as_ref())
            .flat_map(outline_points);
        LngLatBounds::from_points(points)
    }

    /// Source payload for the polygon fill layer.
    pub fn polygons_geojson(&self) -> Value {
        let features: Vec<Value> = self.features().map(feature_to_geojson_value).collect();
        json!({ "type": "FeatureCollection", "features": features })
    }

    /// Source payload for the centroid marker layer.
    pub fn centroids_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .centroids
            .iter()
            .map(|c| {
                json!({
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [c.position.lng, c.position.lat] },
                    "properties": c.properties,
                })
            })
            .collect();
        json!({ "type": "FeatureCollection", "features": features })
    }
}

/// Polygon or MultiPolygon with a non-empty first ring.
pub fn is_renderable(feature: &Feature) -> bool {
    feature.geometry.as_ref().and_then(first_ring).is_some()
}

/// Vertex average of the first ring (of the first polygon, for multipolygons).
///
/// This is an approximation: concave or holed shapes can put it outside the polygon.
pub fn centroid(geometry: &Geometry) -> Option<LngLat> {
    first_ring(geometry).and_then(vertex_average)
}

fn outline_points(geometry: &Geometry) -> Box<dyn Iterator<Item = &LngLat> + '_> {
    match geometry {
        Geometry::Polygon(rings) => Box::new(rings.iter().take(1).flatten()),
        Geometry::MultiPolygon(polys) => Box::new(polys.iter().flatten().flatten()),
        _ => Box::new(std::iter::empty()),
    }
}

fn first_ring(geometry: &Geometry) -> Option<&[LngLat]> {
    let ring = match geometry {
        Geometry::Polygon(rings) => rings.first()?,
        Geometry::MultiPolygon(polys) => polys.first()?.first()?,
        _ => return None,
    };
    (!ring.is_empty()).then_some(ring.as_slice())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{RenderSet, centroid, is_renderable};
    use formats::{Feature, FeatureCollection, Geometry};
    use foundation::geo::LngLat;
    use serde_json::{Map, json};

    fn square(lng: f64, lat: f64) -> Vec<LngLat> {
        vec![
            LngLat::new(lng, lat),
            LngLat::new(lng + 1.0, lat),
            LngLat::new(lng + 1.0, lat + 1.0),
            LngLat::new(lng, lat + 1.0),
        ]
    }

    fn polygon(lng: f64, lat: f64) -> Feature {
        let mut props = Map::new();
        props.insert("name".to_string(), json!(format!("sq {lng}")));
        Feature::new(props, Some(Geometry::Polygon(vec![square(lng, lat)])))
    }

    #[test]
    fn filters_to_polygonal_geometry() {
        let fc = FeatureCollection::new(vec![
            Feature::new(Map::new(), None),
            Feature::new(
                Map::new(),
                Some(Geometry::LineString(vec![LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)])),
            ),
            polygon(10.0, 10.0),
        ]);
        let set = RenderSet::prepare(Arc::new(fc), 25_000);
        assert_eq!(set.len(), 1);
        assert_eq!(set.centroids().len(), 1);
        assert_eq!(set.centroids()[0].position, LngLat::new(10.5, 10.5));
    }

    #[test]
    fn empty_rings_are_not_renderable() {
        assert!(!is_renderable(&Feature::new(
            Map::new(),
            Some(Geometry::Polygon(vec![]))
        )));
        assert!(!is_renderable(&Feature::new(
            Map::new(),
            Some(Geometry::MultiPolygon(vec![vec![vec![]]]))
        )));
        assert!(is_renderable(&Feature::new(
            Map::new(),
            Some(Geometry::MultiPolygon(vec![vec![square(0.0, 0.0)]]))
        )));
    }

    #[test]
    fn cap_truncates_in_source_order() {
        let fc = FeatureCollection::new((0..10).map(|i| polygon(i as f64, 0.0)).collect());
        let set = RenderSet::prepare(Arc::new(fc), 4);
        assert_eq!(set.len(), 4);
        let lngs: Vec<f64> = set.centroids().iter().map(|c| c.position.lng).collect();
        assert_eq!(lngs, vec![0.5, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn multipolygon_centroid_uses_first_ring_of_first_polygon() {
        let g = Geometry::MultiPolygon(vec![vec![square(0.0, 0.0)], vec![square(50.0, 50.0)]]);
        assert_eq!(centroid(&g), Some(LngLat::new(0.5, 0.5)));
    }

    #[test]
    fn bounds_cover_all_kept_polygons() {
        let fc = FeatureCollection::new(vec![polygon(-80.0, 25.0), polygon(103.0, 1.0)]);
        let set = RenderSet::prepare(Arc::new(fc), 25_000);
        let b = set.bounds().expect("bounds");
        assert_eq!(b.to_array(), [[-80.0, 1.0], [104.0, 26.0]]);
    }

    #[test]
    fn sources_are_feature_collections() {
        let fc = FeatureCollection::new(vec![polygon(1.0, 2.0)]);
        let set = RenderSet::prepare(Arc::new(fc), 25_000);
        let centroids = set.centroids_geojson();
        assert_eq!(centroids["features"][0]["geometry"]["coordinates"], json!([1.5, 2.5]));
        assert_eq!(centroids["features"][0]["properties"]["name"], json!("sq 1"));
        assert_eq!(set.polygons_geojson()["features"].as_array().map(Vec::len), Some(1));
    }
}
