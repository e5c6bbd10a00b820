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

//! Read-side cursor over a [`super::Datagram`].

use super::datagram::Datagram;
use super::error::ReaderError;
use crate::byte_order as endianness;
use crate::globals::{Channel, DgSizeTag, DoId, MsgType, Zone};
use std::mem::size_of;

/// Steps value-by-value through a [`Datagram`]'s buffer. Reads never
/// move backward except via explicit [`Self::seek`].
#[derive(Debug, Clone)]
pub struct DatagramReader {
    datagram: Datagram,
    index: usize,
}

impl From<Datagram> for DatagramReader {
    fn from(datagram: Datagram) -> Self {
        Self { datagram, index: 0 }
    }
}

impl DatagramReader {
    fn check_read_length(&self, bytes: usize) -> Result<(), ReaderError> {
        if self.index + bytes > self.datagram.size() {
            return Err(ReaderError::EndOfFile);
        }
        Ok(())
    }

    /// Current cursor position, in bytes.
    #[inline]
    pub fn tell(&self) -> usize {
        self.index
    }

    /// Moves the cursor to an absolute byte offset. Does not validate
    /// that `index` is within bounds; the next read will fail instead.
    #[inline]
    pub fn seek(&mut self, index: usize) {
        self.index = index;
    }

    /// Positions the cursor just past the recipient list, at the start
    /// of the payload, given the already-known recipient `count`.
    pub fn seek_payload(&mut self, count: u8) {
        self.index = 1 + usize::from(count) * size_of::<Channel>();
    }

    pub fn skip(&mut self, bytes: usize) -> Result<(), ReaderError> {
        self.check_read_length(bytes)?;
        self.index += bytes;
        Ok(())
    }

    /// Number of unread bytes left in the datagram.
    pub fn get_remaining(&self) -> usize {
        self.datagram.size() - self.index
    }

    pub fn read_data(&mut self, bytes: usize) -> Result<Vec<u8>, ReaderError> {
        self.check_read_length(bytes)?;
        let slice = &self.datagram.as_bytes()[self.index..self.index + bytes];
        let data = slice.to_vec();
        self.index += bytes;
        Ok(data)
    }

    /// Reads every remaining byte as a fresh [`Datagram`] with the
    /// cursor left exhausted. Used to reconstruct a payload-only
    /// datagram when fanning out to local participants.
    pub fn remaining_as_datagram(&mut self) -> Result<Datagram, ReaderError> {
        let bytes = self.get_remaining();
        Ok(Datagram::from(self.read_data(bytes)?))
    }

    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        self.check_read_length(1)?;
        let v = self.datagram.as_bytes()[self.index];
        self.index += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16, ReaderError> {
        self.check_read_length(2)?;
        let bytes = &self.datagram.as_bytes()[self.index..self.index + 2];
        let v = u16::from_ne_bytes(bytes.try_into().unwrap());
        self.index += 2;
        Ok(endianness::swap_le_16(v))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReaderError> {
        self.check_read_length(4)?;
        let bytes = &self.datagram.as_bytes()[self.index..self.index + 4];
        let v = u32::from_ne_bytes(bytes.try_into().unwrap());
        self.index += 4;
        Ok(endianness::swap_le_32(v))
    }

    pub fn read_u64(&mut self) -> Result<u64, ReaderError> {
        self.check_read_length(8)?;
        let bytes = &self.datagram.as_bytes()[self.index..self.index + 8];
        let v = u64::from_ne_bytes(bytes.try_into().unwrap());
        self.index += 8;
        Ok(endianness::swap_le_64(v))
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, ReaderError> {
        self.read_u8().map(|v| v as i8)
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16, ReaderError> {
        self.read_u16().map(|v| v as i16)
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, ReaderError> {
        self.read_u32().map(|v| v as i32)
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, ReaderError> {
        self.read_u64().map(|v| v as i64)
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, ReaderError> {
        self.read_u32().map(f32::from_bits)
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, ReaderError> {
        self.read_u64().map(f64::from_bits)
    }

    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, ReaderError> {
        Ok(self.read_u8()? == 1)
    }

    /// Reads a UTF-8 string with a 16-bit length prefix.
    pub fn read_string(&mut self) -> Result<String, ReaderError> {
        let len = self.read_size()?;
        let bytes = self.read_data(usize::from(len))?;
        Ok(String::from_utf8(bytes)?)
    }

    #[inline]
    pub fn read_size(&mut self) -> Result<DgSizeTag, ReaderError> {
        self.read_u16()
    }

    #[inline]
    pub fn read_channel(&mut self) -> Result<Channel, ReaderError> {
        self.read_u64()
    }

    #[inline]
    pub fn read_doid(&mut self) -> Result<DoId, ReaderError> {
        self.read_u32()
    }

    #[inline]
    pub fn read_zone(&mut self) -> Result<Zone, ReaderError> {
        self.read_u32()
    }

    /// Reads a length-prefixed blob and returns it as a nested [`Datagram`].
    pub fn read_datagram(&mut self) -> Result<Datagram, ReaderError> {
        let len = self.read_size()?;
        let bytes = self.read_data(usize::from(len))?;
        Ok(Datagram::from(bytes))
    }

    /// Reads the recipient count. Alias of [`Self::read_u8`] kept for
    /// readability at call sites that decode a header.
    #[inline(always)]
    pub fn read_recipient_count(&mut self) -> Result<u8, ReaderError> {
        self.read_u8()
    }

    #[inline(always)]
    pub fn read_msg_type(&mut self) -> Result<MsgType, ReaderError> {
        self.read_u16()
    }

    /// Returns the recipient count without moving the cursor.
    pub fn peek_recipient_count(&mut self) -> Result<u8, ReaderError> {
        let saved = self.index;
        let v = self.read_u8()?;
        self.index = saved;
        Ok(v)
    }

    /// Returns the sender channel without moving the cursor. Callers
    /// are expected to have already positioned the cursor at the
    /// sender field (just past the recipient list).
    pub fn peek_sender(&mut self) -> Result<Channel, ReaderError> {
        let saved = self.index;
        let v = self.read_channel()?;
        self.index = saved;
        Ok(v)
    }

    /// Returns the message type without moving the cursor. Callers
    /// are expected to have already positioned the cursor at the
    /// message type field (just past the sender channel).
    pub fn peek_message_type(&mut self) -> Result<MsgType, ReaderError> {
        let saved = self.index;
        let v = self.read_msg_type()?;
        self.index = saved;
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[rustfmt::skip]
    fn reads_integers_and_types() -> Result<(), ReaderError> {
        let mut dg = Datagram::new();
        dg.add_u8(u8::MAX).unwrap();
        dg.add_u16(u16::MAX).unwrap();
        dg.add_u32(u32::MAX).unwrap();
        dg.add_u64(u64::MAX).unwrap();
        dg.add_i8(-1).unwrap();
        dg.add_i16(i16::MIN).unwrap();
        dg.add_i32(-1).unwrap();
        dg.add_i64(i64::MIN).unwrap();

        let mut reader: DatagramReader = dg.into();

        assert_eq!(reader.read_u8()?, u8::MAX);
        assert_eq!(reader.read_u16()?, u16::MAX);
        assert_eq!(reader.read_u32()?, u32::MAX);
        assert_eq!(reader.read_u64()?, u64::MAX);
        assert_eq!(reader.read_i8()?, -1);
        assert_eq!(reader.read_i16()?, i16::MIN);
        assert_eq!(reader.read_i32()?, -1);
        assert_eq!(reader.read_i64()?, i64::MIN);
        assert_eq!(reader.get_remaining(), 0);
        Ok(())
    }

    #[test]
    fn reads_dc_types_and_strings() -> Result<(), ReaderError> {
        let mut dg = Datagram::new();
        dg.add_bool(true).unwrap();
        dg.add_channel(42).unwrap();
        dg.add_doid(7).unwrap();
        dg.add_zone(9).unwrap();
        dg.add_string("hi").unwrap();

        let mut reader: DatagramReader = dg.into();
        assert!(reader.read_bool()?);
        assert_eq!(reader.read_channel()?, 42);
        assert_eq!(reader.read_doid()?, 7);
        assert_eq!(reader.read_zone()?, 9);
        assert_eq!(reader.read_string()?, "hi");
        assert_eq!(reader.get_remaining(), 0);
        Ok(())
    }

    #[test]
    fn read_past_end_is_end_of_file() {
        let dg = Datagram::new();
        let mut reader: DatagramReader = dg.into();
        assert_eq!(reader.read_u8(), Err(ReaderError::EndOfFile));
    }

    #[test]
    fn seek_payload_skips_recipients() {
        let mut dg = Datagram::new();
        dg.add_server_header(&[1, 2, 3], 99, 5).unwrap();
        let mut reader: DatagramReader = dg.into();
        let count = reader.read_recipient_count().unwrap();
        assert_eq!(count, 3);
        reader.seek_payload(count);
        assert_eq!(reader.read_channel().unwrap(), 99);
        assert_eq!(reader.read_msg_type().unwrap(), 5);
    }

    #[test]
    fn peeks_do_not_move_the_cursor() {
        let mut dg = Datagram::new();
        dg.add_server_header(&[1, 2, 3], 99, 5).unwrap();
        let mut reader: DatagramReader = dg.into();

        assert_eq!(reader.peek_recipient_count().unwrap(), 3);
        assert_eq!(reader.peek_recipient_count().unwrap(), 3);
        let count = reader.read_recipient_count().unwrap();
        reader.seek_payload(count);

        assert_eq!(reader.peek_sender().unwrap(), 99);
        assert_eq!(reader.peek_sender().unwrap(), 99);
        assert_eq!(reader.read_channel().unwrap(), 99);

        assert_eq!(reader.peek_message_type().unwrap(), 5);
        assert_eq!(reader.peek_message_type().unwrap(), 5);
        assert_eq!(reader.read_msg_type().unwrap(), 5);
    }
}
