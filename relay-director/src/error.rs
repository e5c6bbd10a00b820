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

use relay_core::ReaderError;
use thiserror::Error;

/// Errors surfaced while routing a single datagram. None of these are
/// process-fatal on their own — see [`crate::director::MessageDirector::route`]
/// for how each is handled (dropped-and-logged vs. participant removal).
#[derive(Debug, Error)]
pub enum DirectorError {
    /// The datagram's header or a control message's payload could not
    /// be decoded (short read, empty recipient list on the control path).
    #[error("malformed datagram: {0}")]
    MalformedDatagram(#[from] ReaderError),
    /// A control message carried a `msg_type` this director does not
    /// recognize.
    #[error("unknown control message type {0}")]
    UnknownControlMessage(u16),
    /// `add_range`/`remove_range` was called with `a > b`.
    #[error("invalid range: lower bound {0} is greater than upper bound {1}")]
    InvalidRange(u64, u64),
}
