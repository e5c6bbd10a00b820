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

//! TCP transport binding for `relay-director`: wire framing, an
//! inbound connection listener, and the link to an upstream director.

pub mod error;
pub mod framing;
pub mod listener;
pub mod tcp_participant;
pub mod tcp_upstream;

pub use error::NetError;
pub use listener::Listener;
pub use tcp_participant::{serve_connection, TcpParticipant};
pub use tcp_upstream::{connect as connect_upstream, PendingUpstream, TcpUpstreamLink};
