//! Formation settings.

use crate::error::{Error, Result};

/// Members below this battery percentage are pruned by optimization.
pub const MIN_BATTERY_THRESHOLD: f64 = 20.0;

/// Default cluster size cap.
pub const DEFAULT_MAX_CLUSTER_SIZE: usize = 8;

/// Configuration for a [`ClusterFormer`](crate::ClusterFormer).
#[derive(Debug, Clone, PartialEq)]
pub struct FormationConfig {
    /// Size cap used by [`ClusterFormer::form`](crate::ClusterFormer::form)
    pub max_cluster_size: usize,

    /// Battery percentage below which optimization prunes a member
    pub min_battery_threshold: f64,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            max_cluster_size: DEFAULT_MAX_CLUSTER_SIZE,
            min_battery_threshold: MIN_BATTERY_THRESHOLD,
        }
    }
}

impl FormationConfig {
    /// Read `MESHNET_MAX_CLUSTER_SIZE` and `MESHNET_MIN_BATTERY`, falling
    /// back to the defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("MESHNET_MAX_CLUSTER_SIZE") {
            let size: usize = raw.trim().parse().map_err(|e| {
                Error::Config(format!("MESHNET_MAX_CLUSTER_SIZE={:?}: {}", raw, e))
            })?;
            if size == 0 {
                return Err(Error::Config("MESHNET_MAX_CLUSTER_SIZE must be at least 1".into()));
            }
            config.max_cluster_size = size;
        }

        if let Some(raw) = lookup("MESHNET_MIN_BATTERY") {
            let threshold: f64 = raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("MESHNET_MIN_BATTERY={:?}: {}", raw, e)))?;
            if !(0.0..=100.0).contains(&threshold) {
                return Err(Error::Config(format!(
                    "MESHNET_MIN_BATTERY must be within 0-100, got {}",
                    threshold
                )));
            }
            config.min_battery_threshold = threshold;
        }

        Ok(config)
    }
}
