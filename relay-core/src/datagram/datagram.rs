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

//! Write-side binary buffer for Astron-style wire frames.

use super::error::DatagramError;
use crate::byte_order as endianness;
use crate::globals::{self, Channel, DgSizeTag, DoId, MsgType, Zone};

/// A datagram under construction: a growable little-endian byte buffer
/// with typed append methods and an upper bound of [`globals::DG_SIZE_MAX`]
/// bytes (imposed by the 16-bit length prefix used on the wire).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Datagram {
    buffer: Vec<u8>,
}

/// Concatenates the binary contents of two datagrams.
impl std::ops::Add for Datagram {
    type Output = Result<Datagram, DatagramError>;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.add_data(&rhs.buffer)?;
        Ok(self)
    }
}

impl Datagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocates `capacity` bytes of buffer space.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    fn check_add_length(&self, length: usize) -> Result<(), DatagramError> {
        if self.buffer.len() + length > usize::from(globals::DG_SIZE_MAX) {
            return Err(DatagramError::Overflow(
                "tried to add data past the maximum datagram size",
            ));
        }
        Ok(())
    }

    pub fn add_bool(&mut self, v: bool) -> Result<(), DatagramError> {
        self.add_u8(v as u8)
    }

    pub fn add_u8(&mut self, v: u8) -> Result<(), DatagramError> {
        self.check_add_length(1)?;
        self.buffer.push(v);
        Ok(())
    }

    pub fn add_u16(&mut self, v: u16) -> Result<(), DatagramError> {
        self.check_add_length(2)?;
        self.buffer
            .extend_from_slice(&endianness::swap_le_16(v).to_ne_bytes());
        Ok(())
    }

    pub fn add_u32(&mut self, v: u32) -> Result<(), DatagramError> {
        self.check_add_length(4)?;
        self.buffer
            .extend_from_slice(&endianness::swap_le_32(v).to_ne_bytes());
        Ok(())
    }

    pub fn add_u64(&mut self, v: u64) -> Result<(), DatagramError> {
        self.check_add_length(8)?;
        self.buffer
            .extend_from_slice(&endianness::swap_le_64(v).to_ne_bytes());
        Ok(())
    }

    #[inline(always)]
    pub fn add_i8(&mut self, v: i8) -> Result<(), DatagramError> {
        self.add_u8(v as u8)
    }

    #[inline(always)]
    pub fn add_i16(&mut self, v: i16) -> Result<(), DatagramError> {
        self.add_u16(v as u16)
    }

    #[inline(always)]
    pub fn add_i32(&mut self, v: i32) -> Result<(), DatagramError> {
        self.add_u32(v as u32)
    }

    #[inline(always)]
    pub fn add_i64(&mut self, v: i64) -> Result<(), DatagramError> {
        self.add_u64(v as u64)
    }

    #[inline(always)]
    pub fn add_f32(&mut self, v: f32) -> Result<(), DatagramError> {
        self.add_u32(v.to_bits())
    }

    #[inline(always)]
    pub fn add_f64(&mut self, v: f64) -> Result<(), DatagramError> {
        self.add_u64(v.to_bits())
    }

    /// Appends a length tag (used as the prefix for strings/blobs).
    #[inline(always)]
    pub fn add_size(&mut self, v: DgSizeTag) -> Result<(), DatagramError> {
        self.add_u16(v)
    }

    /// Appends a channel; always use this over [`Self::add_u64`] for
    /// channel values so a future change to the channel width only
    /// touches this one method.
    #[inline(always)]
    pub fn add_channel(&mut self, v: Channel) -> Result<(), DatagramError> {
        self.add_u64(v)
    }

    #[inline(always)]
    pub fn add_doid(&mut self, v: DoId) -> Result<(), DatagramError> {
        self.add_u32(v)
    }

    #[inline(always)]
    pub fn add_zone(&mut self, v: Zone) -> Result<(), DatagramError> {
        self.add_u32(v)
    }

    /// Convenience for appending a (doid, zone) pair, slightly cheaper
    /// than adding each field separately.
    #[inline(always)]
    pub fn add_location(&mut self, parent: DoId, zone: Zone) -> Result<(), DatagramError> {
        self.add_u32(parent)?;
        self.add_u32(zone)
    }

    /// Appends raw bytes with no length prefix.
    pub fn add_data(&mut self, v: &[u8]) -> Result<(), DatagramError> {
        self.check_add_length(v.len())?;
        self.buffer.extend_from_slice(v);
        Ok(())
    }

    /// Appends a UTF-8 string with a 16-bit length prefix.
    pub fn add_string(&mut self, v: &str) -> Result<(), DatagramError> {
        let len: u16 = v
            .len()
            .try_into()
            .map_err(|_| DatagramError::Overflow("string is too long for a 16-bit length tag"))?;
        self.add_u16(len)?;
        self.add_data(v.as_bytes())
    }

    /// Appends an opaque blob with a 16-bit length prefix.
    pub fn add_blob(&mut self, v: &[u8]) -> Result<(), DatagramError> {
        let len: u16 = v
            .len()
            .try_into()
            .map_err(|_| DatagramError::Overflow("blob is too long for a 16-bit length tag"))?;
        self.add_size(len)?;
        self.add_data(v)
    }

    /// Appends another datagram's binary data as a length-prefixed blob.
    pub fn add_datagram(&mut self, dg: &Datagram) -> Result<(), DatagramError> {
        self.add_blob(&dg.buffer)
    }

    /// Reserves `bytes` zeroed bytes at the end of the buffer and
    /// returns the offset they start at.
    pub fn add_buffer(&mut self, bytes: DgSizeTag) -> Result<usize, DatagramError> {
        self.check_add_length(bytes.into())?;
        let start = self.buffer.len();
        self.buffer.resize(start + usize::from(bytes), 0);
        Ok(start)
    }

    /// Appends a server-message header:
    /// `(u8 count, count x channel recipients, channel sender, u16 msg_type)`.
    pub fn add_server_header(
        &mut self,
        to: &[Channel],
        from: Channel,
        msg_type: MsgType,
    ) -> Result<(), DatagramError> {
        let count: u8 = to
            .len()
            .try_into()
            .map_err(|_| DatagramError::Overflow("too many recipients for a server header"))?;
        self.add_u8(count)?;
        for recipient in to {
            self.add_channel(*recipient)?;
        }
        self.add_channel(from)?;
        self.add_u16(msg_type)
    }

    /// Appends a control-message header:
    /// `(u8 1, channel CONTROL_MESSAGE, u16 msg_type)` — no sender.
    pub fn add_control_header(&mut self, msg_type: MsgType) -> Result<(), DatagramError> {
        self.add_u8(1)?;
        self.add_channel(globals::CONTROL_MESSAGE)?;
        self.add_u16(msg_type)
    }

    /// Current size of the datagram in bytes.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Borrowed view of the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the datagram, returning the underlying byte buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl From<Vec<u8>> for Datagram {
    fn from(buffer: Vec<u8>) -> Self {
        Self { buffer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_boolean() {
        let mut dg = Datagram::new();
        assert!(dg.add_bool(true).is_ok());
        assert!(dg.add_bool(false).is_ok());
        assert_eq!(dg.as_bytes(), &[1, 0]);
    }

    #[test]
    #[rustfmt::skip]
    fn add_integers_and_types() {
        let mut dg = Datagram::new();
        let mut results = vec![];

        results.push(dg.add_i8(i8::MAX));
        results.push(dg.add_i16(i16::MAX));
        results.push(dg.add_i32(i32::MAX));
        results.push(dg.add_i64(i64::MAX));
        results.push(dg.add_u8(u8::MAX));
        results.push(dg.add_u16(u16::MAX));
        results.push(dg.add_u32(u32::MAX));
        results.push(dg.add_u64(u64::MAX));
        results.push(dg.add_f32(f32::MAX));
        results.push(dg.add_f64(f64::MAX));
        results.push(dg.add_channel(globals::CHANNEL_MAX));
        results.push(dg.add_doid(globals::DOID_MAX));
        results.push(dg.add_zone(globals::ZONE_MAX));
        results.push(dg.add_location(globals::DOID_MAX, globals::ZONE_MAX));
        results.push(dg.add_string("TEST"));
        results.push(dg.add_blob(&[u8::MAX, u8::MAX]));

        for res in &results {
            assert!(res.is_ok());
        }
        // 1+2+4+8 + 1+2+4+8 + 4+8 + 8+4+4 + (4+4) + (2+4) + (2+2)
        assert_eq!(dg.size(), 76);
    }

    #[test]
    fn add_datagram_concatenates() {
        let mut dg = Datagram::new();
        let mut dg2 = Datagram::new();
        assert!(dg.add_channel(globals::CHANNEL_MAX).is_ok());
        assert!(dg2.add_u8(7).is_ok());

        let combined = (dg + dg2).unwrap();
        assert_eq!(combined.size(), 9);
        assert_eq!(combined.as_bytes()[8], 7);
    }

    #[test]
    fn message_headers() {
        let mut dg = Datagram::new();
        assert!(dg.add_server_header(&[globals::CHANNEL_MAX], 0, 9000).is_ok());
        assert!(dg.add_control_header(9001).is_ok());

        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            1, 255, 255, 255, 255, 255, 255, 255, 255, // recipients
            0, 0, 0, 0, 0, 0, 0, 0, // sender
            0x28, 0x23, // message type 9000
            1, 1, 0, 0, 0, 0, 0, 0, 0, // control recipient
            0x29, 0x23, // message type 9001
        ];
        assert_eq!(dg.as_bytes(), expected.as_slice());
    }

    #[test]
    fn overflow_is_reported() {
        let mut dg = Datagram::new();
        assert!(dg.add_buffer(globals::DG_SIZE_MAX).is_ok());
        assert_eq!(
            dg.add_u16(0),
            Err(DatagramError::Overflow(
                "tried to add data past the maximum datagram size"
            ))
        );
    }
}
