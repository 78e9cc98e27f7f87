//! Leader election over a candidate set.
//!
//! # Deterministic Selection
//!
//! ```text
//! leader = argmax_{d ∈ candidates} leadership_score(d)
//! ```
//!
//! Comparison is strict, so on equal scores the earliest candidate wins.
//! Formation feeds candidates in descending RSSI order, which makes the
//! closer device the tie winner.

use crate::device::{Device, DeviceId};
use crate::score::LeadershipScore;
use tracing::{debug, trace};

/// A candidate paired with its score.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedCandidate {
    pub id: DeviceId,
    pub score: LeadershipScore,
}

/// Index of the best leadership candidate, or `None` for an empty slice.
pub fn elect_leader_index(candidates: &[Device]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (index, device) in candidates.iter().enumerate() {
        let score = LeadershipScore::of(device).total;
        trace!(device = %device.id, score, "scored leadership candidate");

        let better = match best {
            None => true,
            Some((_, best_score)) => score > best_score,
        };
        if better {
            best = Some((index, score));
        }
    }

    if let Some((index, score)) = best {
        debug!(
            leader = %candidates[index].id,
            score,
            candidates = candidates.len(),
            "elected leader"
        );
    }

    best.map(|(index, _)| index)
}

/// Elect the best leadership candidate.
///
/// Returns `None` only when `candidates` is empty.
pub fn elect_leader(candidates: &[Device]) -> Option<&Device> {
    elect_leader_index(candidates).map(|index| &candidates[index])
}

/// Every candidate with its score, best first.
///
/// Sorting is stable, so the first entry always matches [`elect_leader`].
pub fn rank_candidates(candidates: &[Device]) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|device| RankedCandidate {
            id: device.id.clone(),
            score: LeadershipScore::of(device),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total.total_cmp(&a.score.total));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, rssi: f64, battery: f64) -> Device {
        Device::new(id, rssi, battery)
    }

    #[test]
    fn empty_candidates_returns_none() {
        let candidates: Vec<Device> = vec![];
        assert!(elect_leader(&candidates).is_none());
        assert!(elect_leader_index(&candidates).is_none());
    }

    #[test]
    fn single_candidate_wins() {
        let candidates = vec![candidate("solo", -90.0, 5.0)];
        assert_eq!(elect_leader(&candidates).map(|d| d.id.as_str()), Some("solo"));
    }

    #[test]
    fn highest_score_wins() {
        let candidates = vec![
            candidate("weak", -30.0, 20.0),
            candidate("strong", -40.0, 90.0),
        ];
        // weak: 0.08 + 0.21 = 0.29 plus capability; strong: 0.36 + 0.18
        assert_eq!(elect_leader_index(&candidates), Some(1));
    }

    #[test]
    fn first_candidate_wins_ties() {
        let candidates = vec![
            candidate("first", -50.0, 50.0),
            candidate("second", -50.0, 50.0),
            candidate("third", -50.0, 50.0),
        ];
        assert_eq!(elect_leader_index(&candidates), Some(0));
    }

    #[test]
    fn zero_score_candidate_still_elected() {
        let candidates = vec![Device::new("dead", -120.0, 0.0).with_hardware(0, 0.0, 0.0)];
        assert_eq!(elect_leader_index(&candidates), Some(0));
    }

    #[test]
    fn ranking_matches_election() {
        let candidates = vec![
            candidate("a", -60.0, 40.0),
            candidate("b", -20.0, 80.0),
            candidate("c", -90.0, 95.0),
            candidate("d", -20.0, 80.0),
        ];
        let ranked = rank_candidates(&candidates);
        let leader = elect_leader(&candidates).map(|d| d.id.clone());

        assert_eq!(ranked.len(), candidates.len());
        assert_eq!(Some(ranked[0].id.clone()), leader);
        // b and d tie; b came first
        assert_eq!(ranked[0].id.as_str(), "b");
        assert_eq!(ranked[1].id.as_str(), "d");

        for pair in ranked.windows(2) {
            assert!(pair[0].score.total >= pair[1].score.total);
        }
    }
}
