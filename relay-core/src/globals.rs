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

//! Shared type aliases and wire-format constants.

/// A 64-bit channel address. The whole `[0, CHANNEL_MAX]` space is
/// partitioned by the subscription index.
pub type Channel = u64;

/// A 32-bit distributed object id, carried for collocated roles built
/// on top of the message director (state-server/DBSS participants).
pub type DoId = u32;

/// A 32-bit zone id, carried alongside a [`DoId`] via [`crate::datagram::Datagram::add_location`].
pub type Zone = u32;

/// Length-tag type used for strings, blobs, and the wire frame length prefix.
pub type DgSizeTag = u16;

/// Message type identifier carried in server and control headers.
pub type MsgType = u16;

/// Maximum size in bytes of a single datagram, bounded by the 16-bit
/// length tag used on the wire (see `relay-net::framing`).
pub const DG_SIZE_MAX: DgSizeTag = DgSizeTag::MAX;

pub const CHANNEL_MAX: Channel = Channel::MAX;
pub const DOID_MAX: DoId = DoId::MAX;
pub const ZONE_MAX: Zone = Zone::MAX;

/// Reserved channel that marks a datagram as control-plane traffic for
/// the message director handling it. Never carries application payload.
pub const CONTROL_MESSAGE: Channel = 1;
