//! Meshnet Cluster Formation
//!
//! Groups discovered neighbors into a bounded cluster and elects its leader.
//! Each node runs this locally over its own neighbor list; the decision is
//! unilateral and is not reconciled with other nodes.
//!
//! # Pipeline
//!
//! ```text
//! neighbors ──sort by RSSI──▶ strongest N ──score──▶ argmax ──▶ Cluster
//! ```
//!
//! # Leadership Score
//!
//! ```text
//! score = 0.4 × battery + 0.3 × rssi + 0.2 × stability + 0.1 × capability
//! ```
//!
//! Every factor is normalized to [0, 1]. Capability blends CPU, RAM and
//! storage against reference hardware plus a bonus for the strongest radio.
//!
//! # Repair
//!
//! [`ClusterFormer::optimize_cluster`] prunes members with low battery and
//! re-elects only when the leader itself was pruned.
//!
//! # Example
//!
//! ```
//! use meshnet_cluster::{ClusterFormer, Device, FixedClock, FormationConfig, SequentialIdGenerator};
//!
//! let former = ClusterFormer::with_parts(
//!     FormationConfig::default(),
//!     SequentialIdGenerator::new("c"),
//!     FixedClock(0),
//! );
//! let devices = vec![
//!     Device::new("A", -40.0, 90.0),
//!     Device::new("B", -30.0, 20.0),
//!     Device::new("C", -80.0, 95.0),
//! ];
//!
//! let cluster = former.form_cluster(&devices, 2).unwrap();
//! let members: Vec<&str> = cluster.members().iter().map(|d| d.id.as_str()).collect();
//! assert_eq!(members, ["B", "A"]);
//! assert_eq!(cluster.leader().unwrap().id.as_str(), "A");
//! ```

mod cluster;
mod config;
mod device;
mod election;
mod error;
mod former;
mod id;
mod score;

pub use cluster::{average_rssi, total_battery_level, Cluster};
pub use config::{FormationConfig, DEFAULT_MAX_CLUSTER_SIZE, MIN_BATTERY_THRESHOLD};
pub use device::{Device, DeviceId, NetworkTier};
pub use election::{elect_leader, elect_leader_index, rank_candidates, RankedCandidate};
pub use error::{Error, Result};
pub use former::{ClusterFormer, LeaderChange, OptimizationReport};
pub use id::{ClusterId, Clock, FixedClock, IdGenerator, SequentialIdGenerator, SystemClock, TimestampIdGenerator};
pub use score::{
    capability_score, leadership_score, LeadershipScore, BATTERY_WEIGHT, CAPABILITY_WEIGHT,
    RSSI_WEIGHT, STABILITY_WEIGHT,
};
