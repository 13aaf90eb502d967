use serde::Serialize;
use serde_json::{Value, json};

use crate::symbology::{Rgb, health_ramp};

pub const POLYGON_SOURCE_ID: &str = "mangroves-2d";
pub const CENTROID_SOURCE_ID: &str = "mangroves-centroids";
pub const FILL_LAYER_ID: &str = "mangroves-2d-fill";
pub const CENTROID_LAYER_ID: &str = "mangroves-centroid-circle";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LayerId(pub String);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerKind {
    Fill { paint: FillPaint },
    Circle { paint: CirclePaint },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillPaint {
    #[serde(rename = "fill-color")]
    pub color: String,
    #[serde(rename = "fill-opacity")]
    pub opacity: f64,
    #[serde(rename = "fill-outline-color")]
    pub outline_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CirclePaint {
    #[serde(rename = "circle-radius")]
    pub radius: f64,
    /// A literal color or a style expression.
    #[serde(rename = "circle-color")]
    pub color: Value,
    #[serde(rename = "circle-stroke-width")]
    pub stroke_width: f64,
    #[serde(rename = "circle-stroke-color")]
    pub stroke_color: String,
    #[serde(rename = "circle-blur")]
    pub blur: f64,
    #[serde(rename = "circle-opacity")]
    pub opacity: f64,
}

/// One style layer as handed to the map library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub id: LayerId,
    #[serde(flatten)]
    pub kind: LayerKind,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
}

impl LayerSpec {
    pub fn id(&self) -> &str {
        &self.id.0
    }

    /// Mapbox style-spec JSON for `map.addLayer`.
    pub fn to_style_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Translucent green fill for the mangrove polygons.
pub fn polygon_fill_layer() -> LayerSpec {
    LayerSpec {
        id: LayerId(FILL_LAYER_ID.to_string()),
        kind: LayerKind::Fill {
            paint: FillPaint {
                color: Rgb::GREEN.hex(),
                opacity: 0.6,
                outline_color: Rgb::WHITE.hex(),
            },
        },
        source: POLYGON_SOURCE_ID.to_string(),
        filter: Some(json!(["==", "$type", "Polygon"])),
    }
}

/// Health-colored click targets at each polygon centroid.
pub fn centroid_circle_layer() -> LayerSpec {
    LayerSpec {
        id: LayerId(CENTROID_LAYER_ID.to_string()),
        kind: LayerKind::Circle {
            paint: CirclePaint {
                radius: 8.0,
                color: health_ramp().to_expression(),
                stroke_width: 2.0,
                stroke_color: Rgb::WHITE.hex(),
                blur: 0.2,
                opacity: 0.85,
            },
        },
        source: CENTROID_SOURCE_ID.to_string(),
        filter: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{centroid_circle_layer, polygon_fill_layer};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn fill_layer_style_json() {
        assert_eq!(
            polygon_fill_layer().to_style_json(),
            json!({
                "id": "mangroves-2d-fill",
                "type": "fill",
                "source": "mangroves-2d",
                "paint": {
                    "fill-color": "#10B981",
                    "fill-opacity": 0.6,
                    "fill-outline-color": "#FFFFFF"
                },
                "filter": ["==", "$type", "Polygon"]
            })
        );
    }

    #[test]
    fn circle_layer_uses_health_ramp() {
        let style = centroid_circle_layer().to_style_json();
        assert_eq!(style["type"], json!("circle"));
        assert_eq!(style["source"], json!("mangroves-centroids"));
        assert_eq!(style["paint"]["circle-radius"], json!(8.0));
        assert_eq!(style["paint"]["circle-color"][0], json!("case"));
        assert!(style.get("filter").is_none());
    }
}
