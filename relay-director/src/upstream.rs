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

//! The link to a parent director in the MD tree. Not a [`crate::participant::Participant`]
//! — it is a direct sink/source owned by the [`crate::director::MessageDirector`]
//! itself, per the network-adapter summary.

use relay_core::{Channel, Datagram};

/// Sink for subscription-interest propagation and frame forwarding
/// toward the upstream director. Implementors stage each call as a
/// write to the upstream connection; a write failure is a fatal
/// upstream error (§7 of the routing specification), not something
/// this trait's methods report — implementors log and terminate the
/// process rather than returning an error here, since by the time a
/// caller could react the datagram has already been synthesized and
/// there is nothing sensible to roll back.
pub trait UpstreamLink: Send + Sync {
    fn stage_add_channel(&self, channel: Channel);
    fn stage_remove_channel(&self, channel: Channel);
    fn stage_add_range(&self, lo: Channel, hi: Channel);
    fn stage_remove_range(&self, lo: Channel, hi: Channel);
    /// Forwards a full frame upstream verbatim (header included).
    fn forward(&self, dg: Datagram);
}
