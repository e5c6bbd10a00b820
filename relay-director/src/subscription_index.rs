/*
    This file is part of the relay-director workspace.

    relay-director is free software; you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License,
    as published by the Free Software Foundation, either version 3
    of the License, or (at your option) any later version.

    relay-director is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public
    License along with relay-director. If not, see <https://www.gnu.org/licenses/>.
*/

//! Maps a channel to the set of participants subscribed to it, via a
//! point map (exact channels) combined with an aggregating interval
//! map (closed ranges).
//!
//! Convention: an interval with an empty participant set is never
//! stored in the interval map, and a channel is never stored in the
//! point map with an empty set. Absence means "no subscribers" — this
//! keeps every coverage check a presence check instead of an
//! emptiness check, and realizes invariant 4 (the full `[0, u64::MAX]`
//! span starts "covered" by zero stored entries rather than one
//! explicit empty-set entry).

use crate::participant::ParticipantId;
use rangemap::RangeInclusiveMap;
use relay_core::Channel;
use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;

#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    point_map: BTreeMap<Channel, HashSet<ParticipantId>>,
    interval_map: RangeInclusiveMap<Channel, HashSet<ParticipantId>>,
}

impl SubscriptionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `pid` is covered for `channel` by some range subscription.
    fn covered_by_range(&self, channel: Channel, pid: ParticipantId) -> bool {
        self.interval_map
            .get(&channel)
            .is_some_and(|set| set.contains(&pid))
    }

    /// Adds a single-channel subscription. No-op (returns `false`) if
    /// `pid` is already covered by a range subscription on `channel`;
    /// this realizes invariant 3 at insertion time rather than relying
    /// on a later subsumption pass.
    pub fn add_single(&mut self, pid: ParticipantId, channel: Channel) -> bool {
        if self.covered_by_range(channel, pid) {
            return false;
        }
        self.point_map.entry(channel).or_default().insert(pid)
    }

    /// Removes a single-channel subscription. Returns `true` if it was present.
    pub fn remove_single(&mut self, pid: ParticipantId, channel: Channel) -> bool {
        let Some(set) = self.point_map.get_mut(&channel) else {
            return false;
        };
        let removed = set.remove(&pid);
        if set.is_empty() {
            self.point_map.remove(&channel);
        }
        removed
    }

    /// Unions `{pid}` into every interval of `range`, splitting
    /// boundary intervals as needed. Returns `true` if this introduced
    /// coverage over at least one previously-uncovered sub-range (used
    /// by the caller to decide whether to propagate interest upstream).
    pub fn add_range(&mut self, pid: ParticipantId, range: RangeInclusive<Channel>) -> bool {
        let (lo, hi) = (*range.start(), *range.end());
        let introduced_new_coverage = self.has_gap(lo, hi);

        let existing: Vec<(RangeInclusive<Channel>, HashSet<ParticipantId>)> = self
            .interval_map
            .overlapping(&range)
            .map(|(r, s)| (r.clone(), s.clone()))
            .collect();

        let mut cursor = lo;
        for (r, set) in existing {
            let seg_start = (*r.start()).max(lo);
            if seg_start > cursor {
                let mut fresh = HashSet::new();
                fresh.insert(pid);
                self.interval_map.insert(cursor..=(seg_start - 1), fresh);
            }
            let seg_end = (*r.end()).min(hi);
            let mut unioned = set;
            unioned.insert(pid);
            self.interval_map.insert(seg_start..=seg_end, unioned);

            if seg_end >= hi {
                return introduced_new_coverage;
            }
            cursor = seg_end + 1;
        }
        if cursor <= hi {
            let mut fresh = HashSet::new();
            fresh.insert(pid);
            self.interval_map.insert(cursor..=hi, fresh);
        }
        introduced_new_coverage
    }

    /// Subtracts `{pid}` from every interval of `range`, dropping any
    /// sub-interval whose set becomes empty.
    pub fn remove_range(&mut self, pid: ParticipantId, range: RangeInclusive<Channel>) {
        let (lo, hi) = (*range.start(), *range.end());
        let existing: Vec<(RangeInclusive<Channel>, HashSet<ParticipantId>)> = self
            .interval_map
            .overlapping(&range)
            .map(|(r, s)| (r.clone(), s.clone()))
            .collect();

        for (r, mut set) in existing {
            let seg_start = (*r.start()).max(lo);
            let seg_end = (*r.end()).min(hi);
            set.remove(&pid);
            if set.is_empty() {
                self.interval_map.remove(seg_start..=seg_end);
            } else {
                self.interval_map.insert(seg_start..=seg_end, set);
            }
        }
    }

    /// Returns whether `[lo, hi]` contains at least one channel not
    /// currently covered by any (non-empty) interval. Computed before
    /// mutation so the caller can decide whether an `add_range` is
    /// newsworthy upstream.
    fn has_gap(&self, lo: Channel, hi: Channel) -> bool {
        let mut cursor = lo;
        for (r, _set) in self.interval_map.overlapping(&(lo..=hi)) {
            if *r.start() > cursor {
                return true;
            }
            if *r.end() >= hi {
                return false;
            }
            cursor = *r.end() + 1; // r.end() < hi <= Channel::MAX here, so no overflow
        }
        true
    }

    /// Union of the point-map and interval-map subscribers for `channel`.
    pub fn recipients(&self, channel: Channel) -> HashSet<ParticipantId> {
        let mut out = self
            .point_map
            .get(&channel)
            .cloned()
            .unwrap_or_default();
        if let Some(set) = self.interval_map.get(&channel) {
            out.extend(set.iter().copied());
        }
        out
    }

    /// Post-condition check for an `ADD_CHANNEL` upstream decision:
    /// the channel has exactly one point subscriber and no range
    /// subscription already covers it.
    pub fn is_first_point_subscriber(&self, channel: Channel) -> bool {
        self.point_map.get(&channel).is_some_and(|s| s.len() == 1)
            && self.interval_map.get(&channel).is_none()
    }

    /// Post-condition check for a `REMOVE_CHANNEL` upstream decision:
    /// no point subscriber and no covering range remain for `channel`.
    pub fn is_uncovered(&self, channel: Channel) -> bool {
        !self.point_map.contains_key(&channel) && self.interval_map.get(&channel).is_none()
    }

    /// Post-condition check for a `REMOVE_RANGE` upstream decision: no
    /// interval overlapping `[lo, hi]` still has subscribers, and no
    /// point subscription falls within `[lo, hi]` either.
    pub fn is_range_uncovered(&self, lo: Channel, hi: Channel) -> bool {
        self.interval_map.overlapping(&(lo..=hi)).next().is_none()
            && self.point_map.range(lo..=hi).next().is_none()
    }
}
