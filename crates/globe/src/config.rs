use std::path::{Path, PathBuf};

use foundation::geo::LngLat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Options the host passes to the map constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub style: String,
    pub projection: String,
    pub zoom: f64,
    pub center: LngLat,
    pub pitch: f64,
    pub bearing: f64,
    pub antialias: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            style: "mapbox://styles/mapbox/satellite-v9".to_string(),
            projection: "globe".to_string(),
            zoom: 2.0,
            center: LngLat::new(30.0, 15.0),
            pitch: 45.0,
            bearing: 0.0,
            antialias: true,
        }
    }
}

/// Auto-rotation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    /// Time for one full turn at full speed.
    pub seconds_per_revolution: f64,
    /// Each admitted frame advances by `360 / seconds_per_revolution / increment_divisor` degrees.
    pub increment_divisor: f64,
    /// Above this zoom the spin slows down linearly.
    pub slow_spin_zoom: f64,
    /// At or above this zoom the globe does not spin.
    pub max_spin_zoom: f64,
    /// A frame is admitted only when strictly more than this elapsed since the last one.
    pub frame_interval_ms: f64,
    /// Duration of each linear spin step.
    pub step_duration_ms: f64,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            seconds_per_revolution: 240.0,
            increment_divisor: 20.0,
            slow_spin_zoom: 3.0,
            max_spin_zoom: 5.0,
            frame_interval_ms: 40.0,
            step_duration_ms: 50.0,
        }
    }
}

/// Delays of the interaction and click sequences, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub loop_start_delay_ms: f64,
    /// Pointer release to spin re-enable.
    pub release_resume_ms: f64,
    /// Pause after a camera movement ends.
    pub move_pause_ms: f64,
    /// Freeze to fly-to.
    pub focus_delay_ms: f64,
    pub focus_duration_ms: f64,
    /// Fly-to start to transition settle.
    pub transition_resume_ms: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            loop_start_delay_ms: 1000.0,
            release_resume_ms: 1000.0,
            move_pause_ms: 1000.0,
            focus_delay_ms: 100.0,
            focus_duration_ms: 1500.0,
            transition_resume_ms: 2000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub feature_cap: usize,
    pub fit_padding_px: f64,
    /// Frame the data extent once the style has loaded.
    pub fit_to_data: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            feature_cap: layers::DEFAULT_FEATURE_CAP,
            fit_padding_px: 20.0,
            fit_to_data: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub map: MapOptions,
    pub spin: SpinConfig,
    pub timing: TimingConfig,
    pub render: RenderConfig,
}

impl GlobeConfig {
    /// Parses and validates a JSON config; omitted keys keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: GlobeConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let spin = &self.spin;
        if !(spin.seconds_per_revolution > 0.0) || !(spin.increment_divisor > 0.0) {
            return Err(ConfigError::Invalid(
                "seconds_per_revolution and increment_divisor must be positive".into(),
            ));
        }
        if !(spin.max_spin_zoom > spin.slow_spin_zoom) {
            return Err(ConfigError::Invalid(format!(
                "max_spin_zoom ({}) must exceed slow_spin_zoom ({})",
                spin.max_spin_zoom, spin.slow_spin_zoom
            )));
        }

        let timing = &self.timing;
        let delays = [
            timing.loop_start_delay_ms,
            timing.release_resume_ms,
            timing.move_pause_ms,
            timing.focus_delay_ms,
            timing.focus_duration_ms,
            spin.frame_interval_ms,
            spin.step_duration_ms,
        ];
        if delays.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(ConfigError::Invalid("delays must be finite and non-negative".into()));
        }
        // The spin must not come back while the fly-to is still easing.
        if !(timing.transition_resume_ms > timing.focus_duration_ms) {
            return Err(ConfigError::Invalid(format!(
                "transition_resume_ms ({}) must exceed focus_duration_ms ({})",
                timing.transition_resume_ms, timing.focus_duration_ms
            )));
        }

        if self.render.feature_cap == 0 {
            return Err(ConfigError::Invalid("feature_cap must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GlobeConfig};
    use foundation::geo::LngLat;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_globe_setup() {
        let cfg = GlobeConfig::default();
        assert_eq!(cfg.map.style, "mapbox://styles/mapbox/satellite-v9");
        assert_eq!(cfg.map.projection, "globe");
        assert_eq!(cfg.map.center, LngLat::new(30.0, 15.0));
        assert_eq!(cfg.map.pitch, 45.0);
        assert_eq!(cfg.render.feature_cap, 25_000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = GlobeConfig::from_json_str(r#"{"spin":{"seconds_per_revolution":120},"map":{"center":[0,0]}}"#)
            .expect("config");
        assert_eq!(cfg.spin.seconds_per_revolution, 120.0);
        assert_eq!(cfg.spin.max_spin_zoom, 5.0);
        assert_eq!(cfg.map.center, LngLat::new(0.0, 0.0));
        assert_eq!(cfg.timing, GlobeConfig::default().timing);
    }

    #[test]
    fn rejects_resume_before_fly_to_finishes() {
        let err = GlobeConfig::from_json_str(
            r#"{"timing":{"focus_duration_ms":1500,"transition_resume_ms":1200}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_inverted_zoom_band() {
        let mut cfg = GlobeConfig::default();
        cfg.spin.slow_spin_zoom = 6.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GlobeConfig::from_path("/nonexistent/globe.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
