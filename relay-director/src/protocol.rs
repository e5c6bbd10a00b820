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

//! Control-message type identifiers exchanged over the reserved
//! [`relay_core::CONTROL_MESSAGE`] channel.

use relay_core::MsgType;

/// The six control operations a [`crate::director::MessageDirector`]
/// understands. Values are stable across the cluster; any other
/// `msg_type` read from a control datagram is unknown and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMessage {
    AddChannel,
    RemoveChannel,
    AddRange,
    RemoveRange,
    AddPostRemove,
    ClearPostRemove,
}

impl ControlMessage {
    pub fn from_msg_type(v: MsgType) -> Option<Self> {
        Some(match v {
            9000 => Self::AddChannel,
            9001 => Self::RemoveChannel,
            9002 => Self::AddRange,
            9003 => Self::RemoveRange,
            9010 => Self::AddPostRemove,
            9011 => Self::ClearPostRemove,
            _ => return None,
        })
    }
}

impl From<ControlMessage> for MsgType {
    fn from(value: ControlMessage) -> MsgType {
        match value {
            ControlMessage::AddChannel => 9000,
            ControlMessage::RemoveChannel => 9001,
            ControlMessage::AddRange => 9002,
            ControlMessage::RemoveRange => 9003,
            ControlMessage::AddPostRemove => 9010,
            ControlMessage::ClearPostRemove => 9011,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        let all = [
            ControlMessage::AddChannel,
            ControlMessage::RemoveChannel,
            ControlMessage::AddRange,
            ControlMessage::RemoveRange,
            ControlMessage::AddPostRemove,
            ControlMessage::ClearPostRemove,
        ];
        for msg in all {
            let v: MsgType = msg.into();
            assert_eq!(ControlMessage::from_msg_type(v), Some(msg));
        }
    }

    #[test]
    fn unknown_type_is_none() {
        assert_eq!(ControlMessage::from_msg_type(1234), None);
    }
}
