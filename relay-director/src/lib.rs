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

//! The hierarchical publish/subscribe routing engine: subscription
//! index, participant lifecycle, and the message director orchestrator.

pub mod director;
pub mod error;
pub mod participant;
pub mod protocol;
pub mod subscription_index;
pub mod upstream;

pub use director::MessageDirector;
pub use error::DirectorError;
pub use participant::{ChannelList, Participant, ParticipantId, ParticipantRecord};
pub use protocol::ControlMessage;
pub use subscription_index::SubscriptionIndex;
pub use upstream::UpstreamLink;
