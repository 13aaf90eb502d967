use serde_json::{Value, json};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(0xEF, 0x44, 0x44);
    pub const AMBER: Rgb = Rgb(0xF5, 0x9E, 0x0B);
    pub const GREEN: Rgb = Rgb(0x10, 0xB9, 0x81);
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);

    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub value: f64,
    pub color: Rgb,
}

/// Piecewise-linear color ramp over one numeric feature property.
///
/// Inputs below the first stop or above the last clamp to the end colors; a
/// missing property yields `fallback`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    pub property: &'static str,
    pub stops: Vec<ColorStop>,
    pub fallback: Rgb,
}

impl ColorRamp {
    pub fn evaluate(&self, value: Option<f64>) -> Rgb {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return self.fallback;
        };
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return self.fallback;
        };
        if v <= first.value {
            return first.color;
        }
        if v >= last.value {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if v <= b.value {
                let t = (v - a.value) / (b.value - a.value);
                return Rgb::lerp(a.color, b.color, t);
            }
        }
        last.color
    }

    /// The same ramp as a Mapbox style expression.
    pub fn to_expression(&self) -> Value {
        let mut interpolate = vec![
            json!("interpolate"),
            json!(["linear"]),
            json!(["get", self.property]),
        ];
        for stop in &self.stops {
            interpolate.push(json!(stop.value));
            interpolate.push(json!(stop.color.hex()));
        }
        json!([
            "case",
            ["has", self.property],
            interpolate,
            self.fallback.hex()
        ])
    }
}

/// Marker color by raw 0-1 health: red at 0.5, amber at 0.7, green at 0.85.
pub fn health_ramp() -> ColorRamp {
    ColorRamp {
        property: "health",
        stops: vec![
            ColorStop {
                value: 0.5,
                color: Rgb::RED,
            },
            ColorStop {
                value: 0.7,
                color: Rgb::AMBER,
            },
            ColorStop {
                value: 0.85,
                color: Rgb::GREEN,
            },
        ],
        fallback: Rgb::GREEN,
    }
}

#[cfg(test)]
mod tests {
    use super::{Rgb, health_ramp};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn stops_map_to_exact_colors() {
        let ramp = health_ramp();
        assert_eq!(ramp.evaluate(Some(0.5)), Rgb::RED);
        assert_eq!(ramp.evaluate(Some(0.7)), Rgb::AMBER);
        assert_eq!(ramp.evaluate(Some(0.85)), Rgb::GREEN);
    }

    #[test]
    fn clamps_outside_stops_and_falls_back_when_missing() {
        let ramp = health_ramp();
        assert_eq!(ramp.evaluate(Some(0.1)), Rgb::RED);
        assert_eq!(ramp.evaluate(Some(0.99)), Rgb::GREEN);
        assert_eq!(ramp.evaluate(None), Rgb::GREEN);
        assert_eq!(ramp.evaluate(Some(f64::NAN)), Rgb::GREEN);
    }

    #[test]
    fn interpolates_between_stops() {
        // Halfway between red (0xEF, 0x44, 0x44) and amber (0xF5, 0x9E, 0x0B).
        assert_eq!(health_ramp().evaluate(Some(0.6)), Rgb(0xF2, 0x71, 0x28));
    }

    #[test]
    fn expression_matches_mapbox_shape() {
        assert_eq!(
            health_ramp().to_expression(),
            json!([
                "case",
                ["has", "health"],
                ["interpolate", ["linear"], ["get", "health"],
                    0.5, "#EF4444", 0.7, "#F59E0B", 0.85, "#10B981"],
                "#10B981"
            ])
        );
    }
}
