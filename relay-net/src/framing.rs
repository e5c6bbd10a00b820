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

//! Wire framing: a little-endian 16-bit length prefix followed by the
//! datagram payload. Mirrors the two-state receive loop (read the size
//! tag, then read exactly that many bytes) of the datagram protocol
//! this transport carries.

use crate::error::NetError;
use relay_core::Datagram;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reads one length-prefixed frame. Returns `Err(NetError::ConnectionClosed)`
/// if the peer closes before a single byte of the size tag arrives;
/// any other short read is an `io::Error` bubbled up via `read_exact`.
pub async fn read_frame<R>(reader: &mut R) -> Result<Datagram, NetError>
where
    R: AsyncRead + Unpin,
{
    let mut size_buf = [0u8; 2];
    match reader.read_exact(&mut size_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(NetError::ConnectionClosed)
        }
        Err(e) => return Err(e.into()),
    }
    let size = u16::from_le_bytes(size_buf) as usize;

    let mut payload = vec![0u8; size];
    reader.read_exact(&mut payload).await?;
    Ok(Datagram::from(payload))
}

/// Writes one length-prefixed frame.
pub async fn write_frame<W>(writer: &mut W, dg: &Datagram) -> Result<(), NetError>
where
    W: AsyncWrite + Unpin,
{
    let size = dg.size() as u16;
    writer.write_all(&size.to_le_bytes()).await?;
    writer.write_all(dg.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::Datagram;

    #[tokio::test]
    async fn round_trips_a_frame() {
        let mut dg = Datagram::default();
        dg.add_channel(100);
        dg.add_u16(42);

        let mut buf = Vec::new();
        write_frame(&mut buf, &dg).await.unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        let read_back = read_frame(&mut cursor).await.unwrap();
        assert_eq!(read_back.as_bytes(), dg.as_bytes());
    }

    #[tokio::test]
    async fn empty_stream_is_connection_closed() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, NetError::ConnectionClosed));
    }
}
