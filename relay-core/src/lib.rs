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

//! Wire-level primitives: channel/message-type aliases, the datagram
//! write buffer, and the datagram read cursor.

pub mod byte_order;
pub mod datagram;
pub mod globals;

pub use datagram::{Datagram, DatagramError, DatagramReader, ReaderError};
pub use globals::{Channel, DgSizeTag, DoId, MsgType, Zone, CONTROL_MESSAGE};
