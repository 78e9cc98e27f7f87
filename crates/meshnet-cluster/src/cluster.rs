//! The formed cluster value.
//!
//! A [`Cluster`] is a frozen snapshot: owned copies of its members, the
//! elected leader, and summary metrics that always match the member list.
//! Fields are private; the only ways to obtain one are formation and
//! optimization, which both rebuild the metrics.

use crate::device::{Device, DeviceId};
use crate::id::ClusterId;

/// A bounded group of devices with one designated leader.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cluster {
    id: ClusterId,
    leader: Option<Device>,
    members: Vec<Device>,
    formation_time: u64,
    max_size: usize,
    average_rssi: f64,
    total_battery_level: f64,
}

impl Cluster {
    /// Assemble a cluster, deriving its metrics from `members`.
    pub(crate) fn new(
        id: ClusterId,
        leader: Option<Device>,
        members: Vec<Device>,
        formation_time: u64,
        max_size: usize,
    ) -> Self {
        debug_assert!(members.len() <= max_size);
        debug_assert!(match &leader {
            Some(l) => members.iter().any(|m| m.id == l.id),
            None => members.is_empty(),
        });

        let average_rssi = average_rssi(&members);
        let total_battery_level = total_battery_level(&members);

        Self {
            id,
            leader,
            members,
            formation_time,
            max_size,
            average_rssi,
            total_battery_level,
        }
    }

    pub fn id(&self) -> &ClusterId {
        &self.id
    }

    /// The elected leader. `None` only when every member has been pruned.
    pub fn leader(&self) -> Option<&Device> {
        self.leader.as_ref()
    }

    /// Members in descending RSSI order.
    pub fn members(&self) -> &[Device] {
        &self.members
    }

    /// Formation timestamp in unix milliseconds.
    pub fn formation_time(&self) -> u64 {
        self.formation_time
    }

    /// Size cap applied at formation.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Mean member RSSI, 0 for an empty cluster.
    pub fn average_rssi(&self) -> f64 {
        self.average_rssi
    }

    /// Sum of member battery levels, 0 for an empty cluster.
    pub fn total_battery_level(&self) -> f64 {
        self.total_battery_level
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether a device with this id is a member.
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.members.iter().any(|m| &m.id == id)
    }

    /// Whether a device with this id leads the cluster.
    pub fn is_leader(&self, id: &DeviceId) -> bool {
        self.leader.as_ref().is_some_and(|l| &l.id == id)
    }
}

/// Arithmetic mean of member RSSI; 0 with no members.
pub fn average_rssi(members: &[Device]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    members.iter().map(|d| d.rssi).sum::<f64>() / members.len() as f64
}

/// Sum of member battery levels; 0 with no members.
pub fn total_battery_level(members: &[Device]) -> f64 {
    members.iter().map(|d| d.battery_level).sum()
}
