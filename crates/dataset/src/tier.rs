use serde::{Deserialize, Serialize};

/// Which dataset size bracket was obtained.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataTier {
    Full,
    Sample,
    Fallback,
}

impl DataTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataTier::Full => "full",
            DataTier::Sample => "sample",
            DataTier::Fallback => "fallback",
        }
    }

    /// Text for the host's data status indicator.
    pub fn status_label(&self) -> &'static str {
        match self {
            DataTier::Full => "50K real GMW features",
            DataTier::Sample => "Sample dataset loaded",
            DataTier::Fallback => "Demo data loaded",
        }
    }
}

impl std::fmt::Display for DataTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// Collections at least this large are `Full`.
    pub full_min: usize,
    /// Collections strictly larger than this (and below `full_min`) are `Sample`.
    pub sample_above: usize,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            full_min: 50_000,
            sample_above: 1_000,
        }
    }
}

impl TierThresholds {
    pub fn classify(&self, feature_count: usize) -> DataTier {
        if feature_count >= self.full_min {
            DataTier::Full
        } else if feature_count > self.sample_above {
            DataTier::Sample
        } else {
            DataTier::Fallback
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub full_dataset: bool,
    pub sample_data: bool,
    pub data_source: DataTier,
}

impl Availability {
    pub fn for_tier(tier: DataTier) -> Self {
        Self {
            full_dataset: tier == DataTier::Full,
            sample_data: matches!(tier, DataTier::Full | DataTier::Sample),
            data_source: tier,
        }
    }
}
