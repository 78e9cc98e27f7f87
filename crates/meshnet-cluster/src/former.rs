//! Cluster formation and repair.
//!
//! # Formation
//!
//! 1. Copy the candidates (the caller's slice is never touched)
//! 2. Stable sort by RSSI, strongest first
//! 3. Keep the first `max_cluster_size`
//! 4. Elect a leader over what remains
//! 5. Stamp id and time, derive metrics
//!
//! # Repair
//!
//! Optimization drops members whose battery fell under the configured
//! threshold and re-elects only if the leader was among them. It always
//! returns a new value; an empty result is legal and carries no leader.

use tracing::{debug, info, warn};

use crate::cluster::Cluster;
use crate::config::FormationConfig;
use crate::device::{Device, DeviceId};
use crate::election::elect_leader_index;
use crate::error::{Error, Result};
use crate::id::{Clock, IdGenerator, SystemClock, TimestampIdGenerator};

/// What happened to leadership during optimization.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum LeaderChange {
    /// The leader survived pruning
    Retained,
    /// The leader was pruned and another member took over
    Reelected {
        previous: Option<DeviceId>,
        current: DeviceId,
    },
    /// Nobody is left to lead
    Vacated { previous: Option<DeviceId> },
}

/// Summary of an optimization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptimizationReport {
    /// Members removed for low battery, in member order
    pub pruned: Vec<DeviceId>,
    pub leader_change: LeaderChange,
}

/// Forms clusters from discovered neighbors and repairs them.
#[derive(Debug)]
pub struct ClusterFormer<G = TimestampIdGenerator, C = SystemClock> {
    config: FormationConfig,
    ids: G,
    clock: C,
}

impl Default for ClusterFormer {
    fn default() -> Self {
        Self::new(FormationConfig::default())
    }
}

impl ClusterFormer {
    /// Former with random timestamped ids and the wall clock.
    pub fn new(config: FormationConfig) -> Self {
        Self::with_parts(config, TimestampIdGenerator, SystemClock)
    }
}

impl<G: IdGenerator, C: Clock> ClusterFormer<G, C> {
    /// Former with an explicit id source and clock.
    pub fn with_parts(config: FormationConfig, ids: G, clock: C) -> Self {
        Self { config, ids, clock }
    }

    pub fn config(&self) -> &FormationConfig {
        &self.config
    }

    /// Form a cluster capped at the configured size.
    pub fn form(&self, devices: &[Device]) -> Result<Cluster> {
        self.form_cluster(devices, self.config.max_cluster_size)
    }

    /// Form a cluster of at most `max_cluster_size` of the strongest-signal
    /// devices and elect its leader.
    ///
    /// Fails with [`Error::InvalidInput`] when `devices` is empty or the cap
    /// is zero. Devices with equal RSSI keep their input order.
    pub fn form_cluster(&self, devices: &[Device], max_cluster_size: usize) -> Result<Cluster> {
        if devices.is_empty() {
            return Err(Error::InvalidInput(
                "Cannot form cluster with empty device list".into(),
            ));
        }
        if max_cluster_size == 0 {
            return Err(Error::InvalidInput(
                "Maximum cluster size must be at least 1".into(),
            ));
        }

        let mut members = devices.to_vec();
        members.sort_by(|a, b| b.rssi.total_cmp(&a.rssi));
        members.truncate(max_cluster_size);

        let leader_index = match elect_leader_index(&members) {
            Some(index) => index,
            None => {
                warn!("election over non-empty set yielded no leader, using strongest signal");
                0
            }
        };
        let leader = members[leader_index].clone();

        let formed_at = self.clock.now_millis();
        let id = self.ids.next_id(formed_at);

        let leader_id = leader.id.clone();
        let cluster = Cluster::new(id, Some(leader), members, formed_at, max_cluster_size);

        debug!(
            cluster = %cluster.id(),
            candidates = devices.len(),
            members = cluster.len(),
            leader = %leader_id,
            average_rssi = cluster.average_rssi(),
            total_battery = cluster.total_battery_level(),
            "formed cluster"
        );

        Ok(cluster)
    }

    /// Prune low-battery members and re-elect if the leader was pruned.
    pub fn optimize_cluster(&self, cluster: &Cluster) -> Cluster {
        self.optimize_cluster_with_report(cluster).0
    }

    /// [`optimize_cluster`](Self::optimize_cluster), also reporting what changed.
    pub fn optimize_cluster_with_report(&self, cluster: &Cluster) -> (Cluster, OptimizationReport) {
        let threshold = self.config.min_battery_threshold;

        let (members, removed): (Vec<Device>, Vec<Device>) = cluster
            .members()
            .iter()
            .cloned()
            .partition(|d| d.battery_level >= threshold);
        let pruned: Vec<DeviceId> = removed.into_iter().map(|d| d.id).collect();

        let previous = cluster.leader().map(|l| l.id.clone());
        let still_present = previous
            .as_ref()
            .is_some_and(|id| members.iter().any(|m| &m.id == id));

        let (leader, leader_change) = if still_present {
            (cluster.leader().cloned(), LeaderChange::Retained)
        } else {
            match elect_leader_index(&members) {
                Some(index) => {
                    let elected = members[index].clone();
                    let change = LeaderChange::Reelected {
                        previous,
                        current: elected.id.clone(),
                    };
                    (Some(elected), change)
                }
                None => (None, LeaderChange::Vacated { previous }),
            }
        };

        if !pruned.is_empty() {
            info!(
                cluster = %cluster.id(),
                pruned = pruned.len(),
                remaining = members.len(),
                threshold,
                "pruned low-battery members"
            );
        }
        match &leader_change {
            LeaderChange::Retained => {}
            LeaderChange::Reelected { current, .. } => {
                info!(cluster = %cluster.id(), leader = %current, "re-elected leader");
            }
            LeaderChange::Vacated { .. } => {
                info!(cluster = %cluster.id(), "cluster emptied, no leader");
            }
        }

        let optimized = Cluster::new(
            cluster.id().clone(),
            leader,
            members,
            cluster.formation_time(),
            cluster.max_size(),
        );

        (optimized, OptimizationReport { pruned, leader_change })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{FixedClock, SequentialIdGenerator};

    fn former() -> ClusterFormer<SequentialIdGenerator, FixedClock> {
        ClusterFormer::with_parts(
            FormationConfig::default(),
            SequentialIdGenerator::new("test"),
            FixedClock(1_000),
        )
    }

    fn ids(devices: &[Device]) -> Vec<&str> {
        devices.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn empty_list_is_invalid() {
        let result = former().form_cluster(&[], 4);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn zero_size_is_invalid() {
        let devices = vec![Device::new("a", -40.0, 50.0)];
        let result = former().form_cluster(&devices, 0);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn proximity_truncation() {
        let devices = vec![
            Device::new("A", -40.0, 90.0),
            Device::new("B", -30.0, 20.0),
            Device::new("C", -80.0, 95.0),
        ];
        let cluster = former().form_cluster(&devices, 2).unwrap();

        assert_eq!(ids(cluster.members()), vec!["B", "A"]);
        // A: 0.36 + 0.18 beats B: 0.08 + 0.21 with equal hardware
        assert!(cluster.is_leader(&DeviceId::new("A")));
        assert!(!cluster.contains(&DeviceId::new("C")));
        assert_eq!(cluster.max_size(), 2);
        assert!((cluster.average_rssi() - (-35.0)).abs() < 1e-9);
        assert!((cluster.total_battery_level() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn caller_slice_untouched() {
        let devices = vec![
            Device::new("far", -90.0, 50.0),
            Device::new("near", -10.0, 50.0),
        ];
        let before = devices.clone();
        let _ = former().form_cluster(&devices, 1).unwrap();
        assert_eq!(devices, before);
    }

    #[test]
    fn equal_rssi_keeps_input_order() {
        let devices = vec![
            Device::new("x", -50.0, 10.0),
            Device::new("y", -50.0, 20.0),
            Device::new("z", -50.0, 30.0),
            Device::new("w", -20.0, 30.0),
        ];
        let cluster = former().form_cluster(&devices, 4).unwrap();
        assert_eq!(ids(cluster.members()), vec!["w", "x", "y", "z"]);
    }

    #[test]
    fn single_weak_device_leads_itself() {
        let devices = vec![Device::new("lonely", -95.0, 3.0).with_hardware(1, 0.5, 4.0)];
        let cluster = former().form_cluster(&devices, 5).unwrap();

        assert_eq!(cluster.len(), 1);
        assert!(cluster.is_leader(&DeviceId::new("lonely")));
    }

    #[test]
    fn ids_and_time_come_from_injected_parts() {
        let former = former();
        let devices = vec![Device::new("a", -40.0, 50.0)];

        let first = former.form(&devices).unwrap();
        let second = former.form(&devices).unwrap();

        assert_eq!(first.id().as_str(), "test-0");
        assert_eq!(second.id().as_str(), "test-1");
        assert_eq!(first.formation_time(), 1_000);
    }

    #[test]
    fn form_uses_configured_cap() {
        let config = FormationConfig {
            max_cluster_size: 2,
            ..FormationConfig::default()
        };
        let former = ClusterFormer::with_parts(config, SequentialIdGenerator::default(), FixedClock(0));
        let devices: Vec<Device> = (0..5)
            .map(|i| Device::new(format!("d{}", i), -50.0 - i as f64, 60.0))
            .collect();

        let cluster = former.form(&devices).unwrap();
        assert_eq!(cluster.len(), 2);
        assert_eq!(ids(cluster.members()), vec!["d0", "d1"]);
    }

    #[test]
    fn optimize_keeps_healthy_leader() {
        let former = former();
        let devices = vec![
            Device::new("leader", -20.0, 95.0),
            Device::new("drained", -30.0, 5.0),
            Device::new("ok", -40.0, 60.0),
        ];
        let cluster = former.form_cluster(&devices, 3).unwrap();
        assert!(cluster.is_leader(&DeviceId::new("leader")));

        let (optimized, report) = former.optimize_cluster_with_report(&cluster);

        assert_eq!(ids(optimized.members()), vec!["leader", "ok"]);
        assert_eq!(report.pruned, vec![DeviceId::new("drained")]);
        assert_eq!(report.leader_change, LeaderChange::Retained);
        assert!(optimized.is_leader(&DeviceId::new("leader")));
        assert_eq!(optimized.id(), cluster.id());
        assert!((optimized.total_battery_level() - 155.0).abs() < 1e-9);
        assert!((optimized.average_rssi() - (-30.0)).abs() < 1e-9);

        // Input cluster unchanged
        assert_eq!(cluster.len(), 3);
    }

    #[test]
    fn optimize_reelects_when_leader_pruned() {
        // Leader chosen at formation, then the caller lowers the bar under it.
        let devices = vec![
            Device::new("boss", -10.0, 30.0).with_stability(1.0).with_hardware(8, 16.0, 512.0),
            Device::new("spare", -60.0, 50.0),
            Device::new("other", -70.0, 45.0),
        ];
        let cluster = former().form_cluster(&devices, 3).unwrap();
        assert!(cluster.is_leader(&DeviceId::new("boss")));

        let strict = ClusterFormer::with_parts(
            FormationConfig {
                min_battery_threshold: 40.0,
                ..FormationConfig::default()
            },
            SequentialIdGenerator::default(),
            FixedClock(0),
        );
        let (optimized, report) = strict.optimize_cluster_with_report(&cluster);

        assert_eq!(ids(optimized.members()), vec!["spare", "other"]);
        assert_eq!(
            report.leader_change,
            LeaderChange::Reelected {
                previous: Some(DeviceId::new("boss")),
                current: DeviceId::new("spare"),
            }
        );
        assert!(optimized.is_leader(&DeviceId::new("spare")));
    }

    #[test]
    fn optimize_to_empty() {
        let former = former();
        let devices = vec![Device::new("a", -30.0, 10.0), Device::new("b", -40.0, 19.9)];
        let cluster = former.form_cluster(&devices, 2).unwrap();

        let (optimized, report) = former.optimize_cluster_with_report(&cluster);

        assert!(optimized.is_empty());
        assert!(optimized.leader().is_none());
        assert_eq!(optimized.average_rssi(), 0.0);
        assert_eq!(optimized.total_battery_level(), 0.0);
        assert_eq!(report.pruned.len(), 2);
        assert!(matches!(report.leader_change, LeaderChange::Vacated { previous: Some(_) }));

        // Optimizing the empty result again is a no-op.
        let again = former.optimize_cluster(&optimized);
        assert!(again.is_empty());
        assert!(again.leader().is_none());
    }

    #[test]
    fn battery_at_threshold_survives() {
        let former = former();
        let devices = vec![Device::new("edge", -30.0, 20.0)];
        let cluster = former.form_cluster(&devices, 1).unwrap();

        let optimized = former.optimize_cluster(&cluster);
        assert_eq!(optimized.len(), 1);
        assert!(optimized.is_leader(&DeviceId::new("edge")));
    }
}
