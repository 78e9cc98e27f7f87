//! Neighbor device records as reported by discovery.
//!
//! A [`Device`] is a value snapshot of one peer at scan time: signal
//! strength, battery, link history, and hardware. The cluster core only
//! ever reads these; formation copies them into the resulting cluster.

use std::fmt;

/// Opaque device identifier supplied by discovery.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DeviceId(pub String);

impl DeviceId {
    /// Create from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Strongest wireless standard a device supports.
///
/// Only one tier counts toward the capability score, picked in priority
/// order 5G > WiFi 6 > WiFi 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NetworkTier {
    FiveG,
    WiFi6,
    WiFi5,
    None,
}

impl NetworkTier {
    /// Capability bonus granted by this tier.
    pub const fn bonus(self) -> f64 {
        match self {
            NetworkTier::FiveG => 0.2,
            NetworkTier::WiFi6 => 0.15,
            NetworkTier::WiFi5 => 0.1,
            NetworkTier::None => 0.0,
        }
    }
}

/// A discovered neighbor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Device {
    /// Unique identity
    pub id: DeviceId,

    /// Received signal strength in dBm, roughly [-100, 0]
    pub rssi: f64,

    /// Battery percentage [0, 100]
    pub battery_level: f64,

    /// Historical connection stability [0, 1]
    pub connection_stability: f64,

    /// Number of CPU cores
    pub cpu_cores: u32,

    /// Memory in GB
    pub ram_gb: f64,

    /// Storage in GB
    pub storage_gb: f64,

    #[cfg_attr(feature = "serde", serde(default))]
    pub supports_5g: bool,

    #[cfg_attr(feature = "serde", serde(default))]
    pub supports_wifi6: bool,

    #[cfg_attr(feature = "serde", serde(default))]
    pub supports_wifi5: bool,
}

impl Device {
    /// Create a device with the given proximity and battery and baseline
    /// hardware (1 core, 1 GB RAM, 16 GB storage, no fast radio, no history).
    pub fn new(id: impl Into<DeviceId>, rssi: f64, battery_level: f64) -> Self {
        Self {
            id: id.into(),
            rssi,
            battery_level,
            connection_stability: 0.0,
            cpu_cores: 1,
            ram_gb: 1.0,
            storage_gb: 16.0,
            supports_5g: false,
            supports_wifi6: false,
            supports_wifi5: false,
        }
    }

    pub fn with_stability(mut self, connection_stability: f64) -> Self {
        self.connection_stability = connection_stability;
        self
    }

    pub fn with_hardware(mut self, cpu_cores: u32, ram_gb: f64, storage_gb: f64) -> Self {
        self.cpu_cores = cpu_cores;
        self.ram_gb = ram_gb;
        self.storage_gb = storage_gb;
        self
    }

    /// Set the radio capability flags.
    pub fn with_radios(mut self, supports_5g: bool, supports_wifi6: bool, supports_wifi5: bool) -> Self {
        self.supports_5g = supports_5g;
        self.supports_wifi6 = supports_wifi6;
        self.supports_wifi5 = supports_wifi5;
        self
    }

    /// The single network tier that applies to this device.
    pub fn network_tier(&self) -> NetworkTier {
        if self.supports_5g {
            NetworkTier::FiveG
        } else if self.supports_wifi6 {
            NetworkTier::WiFi6
        } else if self.supports_wifi5 {
            NetworkTier::WiFi5
        } else {
            NetworkTier::None
        }
    }
}
