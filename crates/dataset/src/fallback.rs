use formats::{Feature, FeatureCollection, Geometry};
use foundation::geo::LngLat;
use serde_json::{Map, Value, json};

/// Minimal demo collection used when the primary dataset cannot be loaded:
/// one small square in Biscayne Bay with fixed metrics.
pub fn fallback_collection() -> FeatureCollection {
    let properties: Map<String, Value> = match json!({
        "name": "Demo Mangrove Area",
        "country": "Demo Country",
        "area_hectares": 100,
        "health_index": 0.75,
        "health": 0.75,
        "flood_protection_m": 6.5,
        "carbon_sequestration_tpy": 150,
        "biodiversity_index": 0.75,
        "economic_value_usdpy": 45000,
        "protection_level": "medium"
    }) {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let ring = vec![
        LngLat::new(-80.1918, 25.7617),
        LngLat::new(-80.1818, 25.7617),
        LngLat::new(-80.1818, 25.7717),
        LngLat::new(-80.1918, 25.7717),
        LngLat::new(-80.1918, 25.7617),
    ];

    FeatureCollection::new(vec![Feature::new(
        properties,
        Some(Geometry::Polygon(vec![ring])),
    )])
}

#[cfg(test)]
mod tests {
    use super::fallback_collection;
    use formats::{Geometry, Normalize};

    #[test]
    fn fallback_is_a_single_closed_polygon() {
        let fc = fallback_collection();
        assert_eq!(fc.len(), 1);
        let Some(Geometry::Polygon(rings)) = &fc.features[0].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].first(), rings[0].last());
    }

    #[test]
    fn fallback_metrics_normalize_to_demo_values() {
        let region = fallback_collection().features[0].properties.normalize();
        assert_eq!(region.name, "Demo Mangrove Area");
        assert_eq!(region.health, 75.0);
        assert_eq!(region.flood_protection_m, 6.5);
        assert_eq!(region.economic_value_usd, 45000.0);
        assert_eq!(region.protection_level, "medium");
    }
}
