//! Leadership scoring.
//!
//! Every candidate gets a weighted linear score in [0, 1]:
//!
//! ```text
//! score = 0.4 × battery + 0.3 × rssi + 0.2 × stability + 0.1 × capability
//! ```
//!
//! Each factor is normalized to [0, 1] before weighting, so the total stays
//! in [0, 1] for inputs within their documented domains.

use crate::device::Device;

/// Weight of the normalized battery level.
pub const BATTERY_WEIGHT: f64 = 0.4;

/// Weight of the normalized signal strength.
pub const RSSI_WEIGHT: f64 = 0.3;

/// Weight of historical connection stability.
pub const STABILITY_WEIGHT: f64 = 0.2;

/// Weight of hardware capability.
pub const CAPABILITY_WEIGHT: f64 = 0.1;

/// Reference core count; more cores than this add nothing.
pub const REFERENCE_CPU_CORES: f64 = 8.0;

/// Reference RAM in GB.
pub const REFERENCE_RAM_GB: f64 = 16.0;

/// Reference storage in GB.
pub const REFERENCE_STORAGE_GB: f64 = 512.0;

const CPU_SHARE: f64 = 0.3;
const RAM_SHARE: f64 = 0.3;
const STORAGE_SHARE: f64 = 0.2;

/// Per-factor breakdown of a leadership score.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeadershipScore {
    /// battery_level / 100
    pub battery: f64,
    /// max(0, (rssi + 100) / 100)
    pub rssi: f64,
    /// connection_stability as reported
    pub stability: f64,
    /// capability sub-score, clamped to [0, 1]
    pub capability: f64,
    /// Weighted total
    pub total: f64,
}

impl LeadershipScore {
    /// Score a device.
    pub fn of(device: &Device) -> Self {
        let battery = device.battery_level / 100.0;
        let rssi = ((device.rssi + 100.0) / 100.0).max(0.0);
        let stability = device.connection_stability;
        let capability = capability_score(device);

        let total = battery * BATTERY_WEIGHT
            + rssi * RSSI_WEIGHT
            + stability * STABILITY_WEIGHT
            + capability * CAPABILITY_WEIGHT;

        Self {
            battery,
            rssi,
            stability,
            capability,
            total,
        }
    }
}

/// Weighted leadership score of a device.
pub fn leadership_score(device: &Device) -> f64 {
    LeadershipScore::of(device).total
}

/// Hardware capability sub-score in [0, 1].
///
/// CPU, RAM and storage saturate at their reference values; the network
/// bonus comes from the single strongest radio the device supports.
pub fn capability_score(device: &Device) -> f64 {
    let cpu = (f64::from(device.cpu_cores) / REFERENCE_CPU_CORES).min(1.0);
    let ram = (device.ram_gb / REFERENCE_RAM_GB).min(1.0);
    let storage = (device.storage_gb / REFERENCE_STORAGE_GB).min(1.0);

    let score = cpu * CPU_SHARE
        + ram * RAM_SHARE
        + storage * STORAGE_SHARE
        + device.network_tier().bonus();

    score.min(1.0)
}
