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

//! The participant abstraction: anything a [`crate::director::MessageDirector`]
//! can deliver a datagram to.

use relay_core::{Channel, Datagram};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Opaque handle identifying a registered participant. Used as the
/// hash-set element type inside [`crate::subscription_index::SubscriptionIndex`]
/// so the index never needs `Arc<dyn Participant>` to be hashable by
/// pointer itself.
pub type ParticipantId = u64;

static NEXT_PARTICIPANT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a fresh, process-unique [`ParticipantId`].
pub fn next_participant_id() -> ParticipantId {
    NEXT_PARTICIPANT_ID.fetch_add(1, Ordering::Relaxed)
}

/// An endpoint that can receive datagrams. Implementors must not block
/// inside [`Self::deliver`] — the director calls it while holding its
/// internal lock, so delivery must be a cheap hand-off (e.g. an mpsc
/// channel send to a task that owns the actual socket write).
pub trait Participant: Send + Sync {
    /// Stable identity for this participant, assigned at registration.
    fn id(&self) -> ParticipantId;

    /// Hands a datagram to this participant for delivery. The reader's
    /// cursor is positioned at the start of the payload (just past the
    /// recipient list) for locally fanned-out datagrams.
    fn deliver(&self, dg: Datagram);
}

/// A subscription unit: either a single channel or a closed inclusive
/// range. Two `ChannelList`s are equal iff both are single with equal
/// value, or both are a range with an equal bound pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelList {
    Single(Channel),
    Range(RangeInclusive<Channel>),
}

impl ChannelList {
    pub fn qualifies(&self, channel: Channel) -> bool {
        match self {
            ChannelList::Single(a) => *a == channel,
            ChannelList::Range(r) => r.contains(&channel),
        }
    }
}

/// Per-participant bookkeeping owned by the
/// [`crate::director::MessageDirector`]: the participant's live handle,
/// its subscription list (insertion-ordered, duplicate-avoided per
/// invariant 3 of the subscription model), and its post-remove
/// trailer.
pub struct ParticipantRecord {
    pub handle: Arc<dyn Participant>,
    pub channels: Vec<ChannelList>,
    pub post_remove: Option<Datagram>,
}

impl ParticipantRecord {
    pub fn new(handle: Arc<dyn Participant>) -> Self {
        Self {
            handle,
            channels: Vec::new(),
            post_remove: None,
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.handle.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_list_qualifies_single() {
        let c = ChannelList::Single(100);
        assert!(c.qualifies(100));
        assert!(!c.qualifies(101));
    }

    #[test]
    fn channel_list_qualifies_range() {
        let c = ChannelList::Range(100..=200);
        assert!(c.qualifies(100));
        assert!(c.qualifies(150));
        assert!(c.qualifies(200));
        assert!(!c.qualifies(201));
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        let a = next_participant_id();
        let b = next_participant_id();
        assert!(b > a);
    }
}
