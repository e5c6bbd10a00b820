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

//! The routing orchestrator: inbound datagram handling, the
//! control-message state machine, fan-out, upstream interest
//! propagation, and participant lifecycle.

use crate::error::DirectorError;
use crate::participant::{next_participant_id, ChannelList, Participant, ParticipantId, ParticipantRecord};
use crate::protocol::ControlMessage;
use crate::subscription_index::SubscriptionIndex;
use crate::upstream::UpstreamLink;
use relay_core::{Channel, Datagram, DatagramReader, CONTROL_MESSAGE};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

struct Inner {
    index: SubscriptionIndex,
    participants: HashMap<ParticipantId, ParticipantRecord>,
    upstream: Option<Arc<dyn UpstreamLink>>,
}

/// Cheap-to-clone handle to the shared routing state. Every mutating
/// operation acquires the single internal mutex for its full duration
/// (see `SPEC_FULL.md` §5) — two concurrent `route` calls never
/// interleave their index or participant-set mutations.
#[derive(Clone)]
pub struct MessageDirector {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MessageDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageDirector {
    /// Creates a root director with no upstream link.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                index: SubscriptionIndex::new(),
                participants: HashMap::new(),
                upstream: None,
            })),
        }
    }

    /// Creates a director with an upstream link, for a non-root node in the MD tree.
    pub fn with_upstream(upstream: Arc<dyn UpstreamLink>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                index: SubscriptionIndex::new(),
                participants: HashMap::new(),
                upstream: Some(upstream),
            })),
        }
    }

    /// Registers a new participant and returns its assigned id.
    pub async fn register_participant(&self, handle: Arc<dyn Participant>) -> ParticipantId {
        let pid = next_participant_id();
        let mut inner = self.inner.lock().await;
        inner.participants.insert(pid, ParticipantRecord::new(handle));
        pid
    }

    /// Tears a participant down: delivers its post-remove trailer (if
    /// any), synthesizes unsubscribes for every channel it still
    /// holds, then removes it. Unconditional — a routing failure in
    /// either of the first two steps does not abort the removal.
    pub async fn unregister_participant(&self, pid: ParticipantId) {
        let snapshot = {
            let inner = self.inner.lock().await;
            inner.participants.get(&pid).map(|r| (r.post_remove.clone(), r.channels.clone()))
        };
        let Some((post_remove, channels)) = snapshot else {
            return;
        };

        if let Some(trailer) = post_remove {
            if let Err(err) = self.route(trailer, Some(pid)).await {
                log::error!("post-remove routing failed for participant {pid}: {err}");
            }
        }

        for channel in channels {
            let dg = match Self::build_unsubscribe(&channel) {
                Ok(dg) => dg,
                Err(err) => {
                    log::error!("failed to build unsubscribe datagram: {err}");
                    continue;
                }
            };
            if let Err(err) = self.route(dg, Some(pid)).await {
                log::error!("unsubscribe routing failed for participant {pid}: {err}");
            }
        }

        let mut inner = self.inner.lock().await;
        inner.participants.remove(&pid);
    }

    /// Builds the control datagram synthesized for each ChannelList a
    /// participant still holds at unregister time. A fresh, tiny
    /// datagram cannot overflow, so append failures are unreachable.
    fn build_unsubscribe(channel: &ChannelList) -> Result<Datagram, DirectorError> {
        let mut dg = Datagram::new();
        match channel {
            ChannelList::Single(a) => {
                dg.add_control_header(ControlMessage::RemoveChannel.into())
                    .expect("fresh datagram cannot overflow");
                dg.add_channel(*a).expect("fresh datagram cannot overflow");
            }
            ChannelList::Range(r) => {
                dg.add_control_header(ControlMessage::RemoveRange.into())
                    .expect("fresh datagram cannot overflow");
                dg.add_channel(*r.start()).expect("fresh datagram cannot overflow");
                dg.add_channel(*r.end()).expect("fresh datagram cannot overflow");
            }
        }
        Ok(dg)
    }

    /// Routes a single inbound datagram. `sender` is the originating
    /// local participant, or `None` when the datagram arrived from
    /// upstream.
    pub async fn route(&self, dg: Datagram, sender: Option<ParticipantId>) -> Result<(), DirectorError> {
        let mut reader = DatagramReader::from(dg.clone());
        let count = reader.read_recipient_count()?;

        let mut inner = self.inner.lock().await;

        if count == 1 {
            let rewind_to = reader.tell();
            let only = reader.read_channel()?;
            if only == CONTROL_MESSAGE {
                if let Some(sid) = sender {
                    let msg_type = reader.read_msg_type()?;
                    return Self::handle_control(&mut inner, sid, msg_type, &mut reader);
                }
            }
            reader.seek(rewind_to);
        }

        let mut recipient_channels = Vec::with_capacity(count as usize);
        for _ in 0..count {
            recipient_channels.push(reader.read_channel()?);
        }
        let payload_offset = reader.tell();

        let mut recipients = std::collections::HashSet::new();
        for channel in &recipient_channels {
            recipients.extend(inner.index.recipients(*channel));
        }
        if let Some(sid) = sender {
            recipients.remove(&sid);
        }

        for pid in &recipients {
            if let Some(record) = inner.participants.get(pid) {
                let mut payload_reader = DatagramReader::from(dg.clone());
                payload_reader.seek(payload_offset);
                match payload_reader.remaining_as_datagram() {
                    Ok(payload) => record.handle.deliver(payload),
                    Err(err) => log::error!("failed to slice payload for participant {pid}: {err}"),
                }
            }
        }

        if sender.is_some() {
            if let Some(upstream) = &inner.upstream {
                upstream.forward(dg);
            }
        }

        Ok(())
    }

    fn handle_control(
        inner: &mut Inner,
        sender: ParticipantId,
        msg_type: relay_core::MsgType,
        reader: &mut DatagramReader,
    ) -> Result<(), DirectorError> {
        let Some(control) = ControlMessage::from_msg_type(msg_type) else {
            return Err(DirectorError::UnknownControlMessage(msg_type));
        };

        match control {
            ControlMessage::AddChannel => {
                let channel = reader.read_channel()?;
                let added = inner.index.add_single(sender, channel);
                if added {
                    if let Some(record) = inner.participants.get_mut(&sender) {
                        record.channels.push(ChannelList::Single(channel));
                    }
                }
                if inner.index.is_first_point_subscriber(channel) {
                    if let Some(up) = &inner.upstream {
                        up.stage_add_channel(channel);
                    }
                }
            }
            ControlMessage::RemoveChannel => {
                let channel = reader.read_channel()?;
                inner.index.remove_single(sender, channel);
                if let Some(record) = inner.participants.get_mut(&sender) {
                    record.channels.retain(|c| c != &ChannelList::Single(channel));
                }
                if inner.index.is_uncovered(channel) {
                    if let Some(up) = &inner.upstream {
                        up.stage_remove_channel(channel);
                    }
                }
            }
            ControlMessage::AddRange => {
                let lo = reader.read_channel()?;
                let hi = reader.read_channel()?;
                if lo > hi {
                    return Err(DirectorError::InvalidRange(lo, hi));
                }
                let introduced = inner.index.add_range(sender, lo..=hi);
                if let Some(record) = inner.participants.get_mut(&sender) {
                    record.channels.push(ChannelList::Range(lo..=hi));

                    let subsumed: Vec<Channel> = record
                        .channels
                        .iter()
                        .filter_map(|c| match c {
                            ChannelList::Single(v) if *v >= lo && *v <= hi => Some(*v),
                            _ => None,
                        })
                        .collect();

                    record
                        .channels
                        .retain(|c| !matches!(c, ChannelList::Single(v) if *v >= lo && *v <= hi));

                    for channel in subsumed {
                        inner.index.remove_single(sender, channel);
                    }
                }
                if introduced {
                    if let Some(up) = &inner.upstream {
                        up.stage_add_range(lo, hi);
                    }
                }
            }
            ControlMessage::RemoveRange => {
                let lo = reader.read_channel()?;
                let hi = reader.read_channel()?;
                if lo > hi {
                    return Err(DirectorError::InvalidRange(lo, hi));
                }
                inner.index.remove_range(sender, lo..=hi);
                if let Some(record) = inner.participants.get_mut(&sender) {
                    record.channels.retain(|c| c != &ChannelList::Range(lo..=hi));
                }
                if inner.index.is_range_uncovered(lo, hi) {
                    if let Some(up) = &inner.upstream {
                        up.stage_remove_range(lo, hi);
                    }
                }
            }
            ControlMessage::AddPostRemove => {
                let payload = reader.read_datagram()?;
                if let Some(record) = inner.participants.get_mut(&sender) {
                    record.post_remove = Some(payload);
                }
            }
            ControlMessage::ClearPostRemove => {
                if let Some(record) = inner.participants.get_mut(&sender) {
                    record.post_remove = None;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct MockParticipant {
        id: ParticipantId,
        received: StdMutex<Vec<Datagram>>,
    }

    impl MockParticipant {
        fn new(id: ParticipantId) -> Arc<Self> {
            Arc::new(Self {
                id,
                received: StdMutex::new(Vec::new()),
            })
        }

        fn received_count(&self) -> usize {
            self.received.lock().unwrap().len()
        }
    }

    impl Participant for MockParticipant {
        fn id(&self) -> ParticipantId {
            self.id
        }

        fn deliver(&self, dg: Datagram) {
            self.received.lock().unwrap().push(dg);
        }
    }

    #[derive(Default)]
    struct MockUpstream {
        events: StdMutex<Vec<String>>,
    }

    impl MockUpstream {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl UpstreamLink for MockUpstream {
        fn stage_add_channel(&self, channel: Channel) {
            self.events.lock().unwrap().push(format!("add_channel {channel}"));
        }
        fn stage_remove_channel(&self, channel: Channel) {
            self.events.lock().unwrap().push(format!("remove_channel {channel}"));
        }
        fn stage_add_range(&self, lo: Channel, hi: Channel) {
            self.events.lock().unwrap().push(format!("add_range {lo} {hi}"));
        }
        fn stage_remove_range(&self, lo: Channel, hi: Channel) {
            self.events.lock().unwrap().push(format!("remove_range {lo} {hi}"));
        }
        fn forward(&self, _dg: Datagram) {
            self.events.lock().unwrap().push("forward".to_string());
        }
    }

    fn datagram_for(recipients: &[Channel]) -> Datagram {
        let mut dg = Datagram::new();
        dg.add_server_header(recipients, 0, 1234).unwrap();
        dg
    }

    fn control_add_channel(channel: Channel) -> Datagram {
        let mut dg = Datagram::new();
        dg.add_control_header(ControlMessage::AddChannel.into()).unwrap();
        dg.add_channel(channel).unwrap();
        dg
    }

    fn control_remove_channel(channel: Channel) -> Datagram {
        let mut dg = Datagram::new();
        dg.add_control_header(ControlMessage::RemoveChannel.into()).unwrap();
        dg.add_channel(channel).unwrap();
        dg
    }

    fn control_add_range(lo: Channel, hi: Channel) -> Datagram {
        let mut dg = Datagram::new();
        dg.add_control_header(ControlMessage::AddRange.into()).unwrap();
        dg.add_channel(lo).unwrap();
        dg.add_channel(hi).unwrap();
        dg
    }

    // Scenario 1: exact channel delivery.
    #[tokio::test]
    async fn exact_channel_delivery() {
        let md = MessageDirector::new();
        let p1 = MockParticipant::new(1);
        let p2 = MockParticipant::new(2);
        let pid1 = md.register_participant(p1.clone()).await;
        let pid2 = md.register_participant(p2.clone()).await;

        md.route(control_add_channel(100), Some(pid1)).await.unwrap();
        md.route(datagram_for(&[100]), Some(pid2)).await.unwrap();

        assert_eq!(p1.received_count(), 1);
        assert_eq!(p2.received_count(), 0);
    }

    // Scenario 2: range delivery.
    #[tokio::test]
    async fn range_delivery() {
        let md = MessageDirector::new();
        let p1 = MockParticipant::new(1);
        let pid1 = md.register_participant(p1.clone()).await;

        md.route(control_add_range(100, 200), Some(pid1)).await.unwrap();
        md.route(datagram_for(&[150]), None).await.unwrap();

        assert_eq!(p1.received_count(), 1);
    }

    // Scenario 3: subsumption.
    #[tokio::test]
    async fn range_subscription_subsumes_single_channel() {
        let md = MessageDirector::new();
        let p1 = MockParticipant::new(1);
        let pid1 = md.register_participant(p1.clone()).await;

        md.route(control_add_channel(150), Some(pid1)).await.unwrap();
        md.route(control_add_range(100, 200), Some(pid1)).await.unwrap();

        let inner = md.inner.lock().await;
        let record = inner.participants.get(&pid1).unwrap();
        assert_eq!(record.channels, vec![ChannelList::Range(100..=200)]);
        assert!(inner.index.recipients(150).contains(&pid1));
        drop(inner);
    }

    // Scenario 4: de-duplication.
    #[tokio::test]
    async fn deduplicates_recipient_matched_by_two_channels() {
        let md = MessageDirector::new();
        let p1 = MockParticipant::new(1);
        let pid1 = md.register_participant(p1.clone()).await;

        md.route(control_add_channel(100), Some(pid1)).await.unwrap();
        md.route(control_add_channel(200), Some(pid1)).await.unwrap();
        md.route(datagram_for(&[100, 200]), None).await.unwrap();

        assert_eq!(p1.received_count(), 1);
    }

    // Scenario 5: upstream add/remove coalescing.
    #[tokio::test]
    async fn upstream_add_coalescing() {
        let upstream = MockUpstream::new();
        let md = MessageDirector::with_upstream(upstream.clone());
        let p1 = MockParticipant::new(1);
        let p2 = MockParticipant::new(2);
        let pid1 = md.register_participant(p1).await;
        let pid2 = md.register_participant(p2).await;

        md.route(control_add_channel(100), Some(pid1)).await.unwrap();
        md.route(control_add_channel(100), Some(pid2)).await.unwrap();
        md.route(control_remove_channel(100), Some(pid1)).await.unwrap();
        md.route(control_remove_channel(100), Some(pid2)).await.unwrap();

        assert_eq!(
            upstream.events(),
            vec!["add_channel 100".to_string(), "remove_channel 100".to_string()]
        );
    }

    // Scenario 6: post-remove delivery.
    #[tokio::test]
    async fn post_remove_trailer_delivered_before_teardown() {
        let md = MessageDirector::new();
        let p1 = MockParticipant::new(1);
        let p2 = MockParticipant::new(2);
        let pid1 = md.register_participant(p1.clone()).await;
        let pid2 = md.register_participant(p2.clone()).await;

        md.route(control_add_channel(500), Some(pid2)).await.unwrap();

        let mut trailer = Datagram::new();
        trailer.add_control_header(ControlMessage::AddPostRemove.into()).unwrap();
        let mut payload = Datagram::new();
        payload.add_server_header(&[500], 0, 1).unwrap();
        trailer.add_datagram(&payload).unwrap();
        md.route(trailer, Some(pid1)).await.unwrap();

        md.unregister_participant(pid1).await;

        assert_eq!(p2.received_count(), 1);
        assert_eq!(p1.received_count(), 0);
    }

    #[tokio::test]
    async fn no_self_delivery() {
        let md = MessageDirector::new();
        let p1 = MockParticipant::new(1);
        let pid1 = md.register_participant(p1.clone()).await;

        md.route(control_add_channel(100), Some(pid1)).await.unwrap();
        md.route(datagram_for(&[100]), Some(pid1)).await.unwrap();

        assert_eq!(p1.received_count(), 0);
    }

    #[tokio::test]
    async fn unregister_cleans_up_subscriptions_without_upstream() {
        let upstream = MockUpstream::new();
        let md = MessageDirector::with_upstream(upstream.clone());
        let p1 = MockParticipant::new(1);
        let pid1 = md.register_participant(p1).await;

        md.route(control_add_channel(100), Some(pid1)).await.unwrap();
        md.unregister_participant(pid1).await;

        let inner = md.inner.lock().await;
        assert!(!inner.participants.contains_key(&pid1));
        assert!(inner.index.recipients(100).is_empty());
        drop(inner);

        assert!(upstream.events().contains(&"remove_channel 100".to_string()));
    }

    #[tokio::test]
    async fn unrecognized_control_message_is_rejected() {
        let md = MessageDirector::new();
        let p1 = MockParticipant::new(1);
        let pid1 = md.register_participant(p1).await;

        let mut dg = Datagram::new();
        dg.add_control_header(9001).unwrap();

        let err = md.route(dg, Some(pid1)).await.unwrap_err();
        assert!(matches!(err, DirectorError::UnknownControlMessage(9001)));
    }
}

