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

//! A [`Participant`] backed by a live TCP connection: one task reads
//! frames off the socket and routes them, another owns the write half
//! and drains an mpsc queue so [`Participant::deliver`] never blocks
//! on I/O.

use crate::framing::{read_frame, write_frame};
use log::{debug, info, warn};
use relay_core::Datagram;
use relay_director::{MessageDirector, Participant, ParticipantId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Depth of the per-connection outbound queue. A slow reader backs up
/// here rather than stalling the director's lock.
const OUTBOUND_QUEUE_DEPTH: usize = 256;

/// Wraps a connection's outbound queue. The director assigns the
/// participant id only once registration completes, so `id` starts at
/// 0 (never a real id — allocation starts at 1) and is filled in right
/// after; it is read back only for logging, never to key routing
/// state, so the brief window before it is set is harmless.
pub struct TcpParticipant {
    id: AtomicU64,
    outbound: mpsc::Sender<Datagram>,
}

impl Participant for TcpParticipant {
    fn id(&self) -> ParticipantId {
        self.id.load(Ordering::Relaxed)
    }

    fn deliver(&self, dg: Datagram) {
        if self.outbound.try_send(dg).is_err() {
            warn!("participant {} outbound queue full or closed; dropping datagram", self.id());
        }
    }
}

/// Registers `socket` as a participant of `director`, spawns its
/// reader and writer tasks, and returns once the connection has
/// closed (either direction) and the participant has been torn down.
pub async fn serve_connection(director: MessageDirector, socket: TcpStream, peer: std::net::SocketAddr) {
    let (read_half, write_half) = tokio::io::split(socket);
    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_DEPTH);

    let participant: Arc<TcpParticipant> = Arc::new(TcpParticipant {
        id: AtomicU64::new(0),
        outbound: tx,
    });
    let pid = director.register_participant(participant.clone()).await;
    participant.id.store(pid, Ordering::Relaxed);
    info!("registered participant {pid} for connection from {peer}");

    let writer_task = tokio::spawn(run_writer(write_half, rx));
    run_reader(director.clone(), read_half, pid).await;

    writer_task.abort();
    director.unregister_participant(pid).await;
    debug!("unregistered participant {pid} for connection from {peer}");
}

async fn run_reader<R>(director: MessageDirector, mut reader: R, pid: ParticipantId)
where
    R: AsyncRead + Unpin,
{
    loop {
        match read_frame(&mut reader).await {
            Ok(dg) => {
                if let Err(err) = director.route(dg, Some(pid)).await {
                    warn!("participant {pid} sent an unroutable datagram: {err}");
                }
            }
            Err(err) => {
                debug!("participant {pid} read loop ending: {err}");
                return;
            }
        }
    }
}

async fn run_writer<W>(mut writer: W, mut rx: mpsc::Receiver<Datagram>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(dg) = rx.recv().await {
        if let Err(err) = write_frame(&mut writer, &dg).await {
            warn!("write to participant failed, closing connection: {err}");
            return;
        }
    }
}
