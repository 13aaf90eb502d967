use serde::{Deserialize, Serialize};

/// WGS84 position in degrees, `[lng, lat]` order like GeoJSON.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

/// Vertex average of `points`. Not area-weighted.
pub fn vertex_average(points: &[LngLat]) -> Option<LngLat> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.lng, sy + p.lat));
    let n = points.len() as f64;
    Some(LngLat::new(sx / n, sy / n))
}

#[cfg(test)]
mod tests {
    use super::{LngLat, vertex_average};

    #[test]
    fn averages_vertices_including_closing_point() {
        let ring = [
            LngLat::new(0.0, 0.0),
            LngLat::new(4.0, 0.0),
            LngLat::new(4.0, 4.0),
            LngLat::new(0.0, 0.0),
        ];
        assert_eq!(vertex_average(&ring), Some(LngLat::new(2.0, 1.0)));
        assert_eq!(vertex_average(&[]), None);
    }

    #[test]
    fn serializes_as_coordinate_pair() {
        let json = serde_json::to_string(&LngLat::new(103.8, 1.3)).expect("serialize");
        assert_eq!(json, "[103.8,1.3]");
        let back: LngLat = serde_json::from_str("[30.0,15.0]").expect("deserialize");
        assert_eq!(back, LngLat::new(30.0, 15.0));
    }
}
