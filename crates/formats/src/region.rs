//! Canonical mangrove region record and the property alias table that produces it.
//!
//! Datasets in the wild mix snake_case scientific keys (`health_index`,
//! `area_hectares`) with legacy camelCase/PascalCase keys (`healthIndex`,
//! `Area_Ha`). Every canonical field lists its source keys in priority order; the
//! first key that is present wins, otherwise the field default applies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a numeric source value maps onto the canonical scale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scale {
    AsIs,
    /// A 0-1 fraction promoted to 0-100.
    Fraction,
}

#[derive(Debug, Copy, Clone)]
pub struct NumericField {
    pub field: &'static str,
    pub aliases: &'static [(&'static str, Scale)],
    pub default: f64,
}

impl NumericField {
    /// Key a canonical value is written under so that it reads back unscaled.
    pub fn passthrough_key(&self) -> &'static str {
        if self.aliases.contains(&(self.field, Scale::AsIs)) {
            return self.field;
        }
        self.aliases
            .iter()
            .find(|(_, scale)| *scale == Scale::AsIs)
            .map_or(self.field, |(key, _)| *key)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TextField {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
    pub default: &'static str,
}

pub const NAME: TextField = TextField {
    field: "name",
    aliases: &["name", "Name"],
    default: "Unnamed Region",
};

pub const COUNTRY: TextField = TextField {
    field: "country",
    aliases: &["country", "Country"],
    default: "Unknown",
};

pub const PROTECTION_LEVEL: TextField = TextField {
    field: "protection_level",
    aliases: &["protection_level"],
    default: "Unknown",
};

pub const HEALTH: NumericField = NumericField {
    field: "health",
    aliases: &[
        ("health", Scale::Fraction),
        ("health_index", Scale::Fraction),
        ("healthIndex", Scale::AsIs),
    ],
    default: 75.0,
};

pub const FLOOD_PROTECTION_M: NumericField = NumericField {
    field: "flood_protection_m",
    aliases: &[
        ("flood_protection_m", Scale::AsIs),
        ("floodProtection", Scale::AsIs),
    ],
    default: 2.5,
};

pub const CARBON_SEQUESTRATION_TPY: NumericField = NumericField {
    field: "carbon_sequestration_tpy",
    aliases: &[
        ("carbon_sequestration_tpy", Scale::AsIs),
        ("carbonSequestration", Scale::AsIs),
    ],
    default: 50.0,
};

pub const BIODIVERSITY_INDEX: NumericField = NumericField {
    field: "biodiversity_index",
    aliases: &[
        ("biodiversity_index", Scale::AsIs),
        ("biodiversityIndex", Scale::AsIs),
    ],
    default: 0.7,
};

pub const ECONOMIC_VALUE_USD: NumericField = NumericField {
    field: "economic_value_usd",
    aliases: &[
        ("economic_value_usdpy", Scale::AsIs),
        ("economic_value_usd", Scale::AsIs),
        ("economicValue", Scale::AsIs),
    ],
    default: 100_000.0,
};

pub const AREA_HECTARES: NumericField = NumericField {
    field: "area_hectares",
    aliases: &[("area_hectares", Scale::AsIs), ("Area_Ha", Scale::AsIs)],
    default: 100.0,
};

const LAT_KEYS: &[(&str, Scale)] = &[("lat", Scale::AsIs)];
const LNG_KEYS: &[(&str, Scale)] = &[("lng", Scale::AsIs)];

/// Every numeric field of the canonical schema, in declaration order.
pub const NUMERIC_FIELDS: &[NumericField] = &[
    HEALTH,
    FLOOD_PROTECTION_M,
    CARBON_SEQUESTRATION_TPY,
    BIODIVERSITY_INDEX,
    ECONOMIC_VALUE_USD,
    AREA_HECTARES,
];

pub const TEXT_FIELDS: &[TextField] = &[NAME, COUNTRY, PROTECTION_LEVEL];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// 0-100.
    pub health: f64,
    pub flood_protection_m: f64,
    pub carbon_sequestration_tpy: f64,
    /// 0-1.
    pub biodiversity_index: f64,
    pub economic_value_usd: f64,
    pub area_hectares: f64,
    pub country: String,
    pub protection_level: String,
}

impl Region {
    /// Normalizes a raw property bag.
    pub fn from_properties(props: &Map<String, Value>) -> Self {
        Self {
            name: resolve_text(props, &NAME),
            lat: resolve_number(props, LAT_KEYS),
            lng: resolve_number(props, LNG_KEYS),
            health: resolve_numeric(props, &HEALTH),
            flood_protection_m: resolve_numeric(props, &FLOOD_PROTECTION_M),
            carbon_sequestration_tpy: resolve_numeric(props, &CARBON_SEQUESTRATION_TPY),
            biodiversity_index: resolve_numeric(props, &BIODIVERSITY_INDEX),
            economic_value_usd: resolve_numeric(props, &ECONOMIC_VALUE_USD),
            area_hectares: resolve_numeric(props, &AREA_HECTARES),
            country: resolve_text(props, &COUNTRY),
            protection_level: resolve_text(props, &PROTECTION_LEVEL),
        }
    }

    pub fn with_position(mut self, lng: f64, lat: f64) -> Self {
        self.lng = Some(lng);
        self.lat = Some(lat);
        self
    }

    /// Property bag that normalizes back to this exact region.
    ///
    /// Percent-scale fields are written under their unscaled alias (`health` goes out
    /// as `healthIndex`), so the fraction promotion is never applied twice.
    pub fn to_properties(&self) -> Map<String, Value> {
        let mut map = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for field in NUMERIC_FIELDS {
            let key = field.passthrough_key();
            if key != field.field
                && let Some(value) = map.remove(field.field)
            {
                map.insert(key.to_string(), value);
            }
        }
        map
    }
}

/// Anything that can be brought into canonical [`Region`] form.
///
/// A [`Region`] is already canonical, so normalizing it again is the identity and
/// never re-enters the alias chain.
pub trait Normalize {
    fn normalize(&self) -> Region;
}

impl Normalize for Map<String, Value> {
    fn normalize(&self) -> Region {
        Region::from_properties(self)
    }
}

impl Normalize for Region {
    fn normalize(&self) -> Region {
        self.clone()
    }
}

pub fn resolve_numeric(props: &Map<String, Value>, field: &NumericField) -> f64 {
    resolve_number(props, field.aliases).unwrap_or(field.default)
}

pub fn resolve_text(props: &Map<String, Value>, field: &TextField) -> String {
    field
        .aliases
        .iter()
        .find_map(|key| props.get(*key).and_then(text_value))
        .unwrap_or_else(|| field.default.to_string())
}

fn resolve_number(props: &Map<String, Value>, aliases: &[(&str, Scale)]) -> Option<f64> {
    aliases.iter().find_map(|(key, scale)| {
        let v = props.get(*key).and_then(numeric_value)?;
        Some(match scale {
            Scale::Fraction => v * 100.0,
            Scale::AsIs => v,
        })
    })
}

fn numeric_value(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn text_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{NUMERIC_FIELDS, Normalize, Region, TEXT_FIELDS};
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};

    fn props(v: Value) -> Map<String, Value> {
        v.as_object().cloned().expect("object")
    }

    #[test]
    fn first_alias_wins() {
        let r = Region::from_properties(&props(json!({"health": 0.9, "health_index": 0.4})));
        assert_eq!(r.health, 90.0);
    }

    #[test]
    fn falls_through_to_lower_priority_aliases() {
        let r = Region::from_properties(&props(json!({"health_index": 0.4})));
        assert_eq!(r.health, 40.0);
        let r = Region::from_properties(&props(json!({"healthIndex": 62.0})));
        assert_eq!(r.health, 62.0);
        let r = Region::from_properties(&props(json!({"health": null, "healthIndex": "81"})));
        assert_eq!(r.health, 81.0);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let r = Region::from_properties(&Map::new());
        assert_eq!(
            r,
            Region {
                name: "Unnamed Region".to_string(),
                lat: None,
                lng: None,
                health: 75.0,
                flood_protection_m: 2.5,
                carbon_sequestration_tpy: 50.0,
                biodiversity_index: 0.7,
                economic_value_usd: 100_000.0,
                area_hectares: 100.0,
                country: "Unknown".to_string(),
                protection_level: "Unknown".to_string(),
            }
        );
    }

    #[test]
    fn reads_legacy_keys() {
        let r = Region::from_properties(&props(json!({
            "Name": "Bhitarkanika",
            "Country": "India",
            "Area_Ha": 14500.0,
            "floodProtection": 3.1,
            "carbonSequestration": 820,
            "biodiversityIndex": 0.83,
            "economicValue": 2_500_000,
            "PXLVAL": 1
        })));
        assert_eq!(r.name, "Bhitarkanika");
        assert_eq!(r.country, "India");
        assert_eq!(r.area_hectares, 14500.0);
        assert_eq!(r.flood_protection_m, 3.1);
        assert_eq!(r.carbon_sequestration_tpy, 820.0);
        assert_eq!(r.biodiversity_index, 0.83);
        assert_eq!(r.economic_value_usd, 2_500_000.0);
    }

    #[test]
    fn empty_strings_are_absent() {
        let r = Region::from_properties(&props(json!({"name": "", "Name": "Fallback name"})));
        assert_eq!(r.name, "Fallback name");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            json!({"health": 0.9, "health_index": 0.4, "name": "A"}),
            json!({"health_index": 0.55, "economic_value_usdpy": 45000, "Country": "Brazil"}),
            json!({"healthIndex": 12, "Area_Ha": 3.5, "protection_level": "high"}),
            json!({"health": 1.0, "lat": 1.3, "lng": 103.8}),
            json!({}),
        ];
        for raw in samples {
            let once = Region::from_properties(&props(raw));
            let twice = Region::from_properties(&once.to_properties());
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn small_health_values_survive_renormalization() {
        for health in [0.0, 0.005, 0.5, 0.999, 1.0, 1.5, 5.0, 42.0, 100.0] {
            for key in ["health", "health_index", "healthIndex"] {
                let mut raw = Map::new();
                raw.insert(key.to_string(), json!(health));
                let once = Region::from_properties(&raw);
                let twice = Region::from_properties(&once.to_properties());
                let thrice = Region::from_properties(&twice.to_properties());
                assert_eq!(twice.health, once.health, "{key}={health}");
                assert_eq!(thrice, once, "{key}={health}");
            }
        }
    }

    #[test]
    fn fractions_are_always_promoted() {
        let r = Region::from_properties(&props(json!({"health": 5.0})));
        assert_eq!(r.health, 500.0);
        let r = Region::from_properties(&props(json!({"health_index": 0.005})));
        assert_eq!(r.health, 0.5);
    }

    #[test]
    fn normalizing_a_region_is_the_identity() {
        // healthIndex is already on the 0-100 scale, even when tiny.
        let raw = props(json!({"healthIndex": 0.5, "name": "Tiny"}));
        let once = raw.normalize();
        assert_eq!(once.health, 0.5);
        assert_eq!(once.normalize(), once);
    }

    #[test]
    fn canonical_properties_read_back_unscaled() {
        let r = Region::from_properties(&Map::new()).with_position(103.8, 1.3);
        let map = r.to_properties();
        for f in NUMERIC_FIELDS {
            assert!(map.contains_key(f.passthrough_key()), "missing {}", f.field);
        }
        assert!(!map.contains_key("health"));
        assert_eq!(map.get("healthIndex"), Some(&json!(75.0)));
        for f in TEXT_FIELDS {
            assert!(map.contains_key(f.field), "missing {}", f.field);
        }
        assert_eq!(map.get("lng"), Some(&json!(103.8)));
    }
}
