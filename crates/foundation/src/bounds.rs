use crate::geo::LngLat;

/// Axis-aligned lng/lat bounding box
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LngLatBounds {
    pub min: LngLat,
    pub max: LngLat,
}

impl LngLatBounds {
    pub fn new(min: LngLat, max: LngLat) -> Self {
        LngLatBounds { min, max }
    }

    /// Bounds of every finite point, or `None` when there is none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LngLat>) -> Option<Self> {
        let mut out: Option<Self> = None;
        for p in points {
            if !p.is_finite() {
                continue;
            }
            match &mut out {
                Some(b) => b.extend(*p),
                None => out = Some(Self::new(*p, *p)),
            }
        }
        out
    }

    pub fn extend(&mut self, p: LngLat) {
        self.min.lng = self.min.lng.min(p.lng);
        self.min.lat = self.min.lat.min(p.lat);
        self.max.lng = self.max.lng.max(p.lng);
        self.max.lat = self.max.lat.max(p.lat);
    }

    /// `[[min_lng, min_lat], [max_lng, max_lat]]`, the shape map libraries expect.
    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [self.min.into(), self.max.into()]
    }
}

#[cfg(test)]
mod tests {
    use super::LngLatBounds;
    use crate::geo::LngLat;

    #[test]
    fn collects_extent_and_skips_non_finite() {
        let pts = [
            LngLat::new(-80.19, 25.76),
            LngLat::new(f64::NAN, 0.0),
            LngLat::new(103.8, 1.3),
        ];
        let b = LngLatBounds::from_points(&pts).expect("bounds");
        assert_eq!(b.to_array(), [[-80.19, 1.3], [103.8, 25.76]]);
    }

    #[test]
    fn empty_input_has_no_bounds() {
        let empty: [LngLat; 0] = [];
        assert!(LngLatBounds::from_points(&empty).is_none());
    }
}
