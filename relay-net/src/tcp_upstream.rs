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

//! The connection to a parent director: an [`UpstreamLink`] that
//! stages control datagrams onto an outbound queue, plus the reader
//! loop that feeds frames arriving from the parent back into the
//! local [`MessageDirector`] with `sender = None`.

use crate::framing::{read_frame, write_frame};
use log::{error, info, warn};
use relay_core::{Channel, Datagram};
use relay_director::protocol::ControlMessage;
use relay_director::{MessageDirector, UpstreamLink};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

const UPSTREAM_QUEUE_DEPTH: usize = 256;

/// Sends staged control datagrams and forwarded frames to a parent
/// director's outbound queue. The paired writer task treats any send
/// failure as fatal (§7 of the routing specification: losing upstream
/// connectivity must not leave local subscription state silently
/// diverged from what the parent believes), so it exits the process
/// rather than swallow the error.
pub struct TcpUpstreamLink {
    outbound: mpsc::Sender<Datagram>,
}

impl UpstreamLink for TcpUpstreamLink {
    fn stage_add_channel(&self, channel: Channel) {
        let mut dg = Datagram::new();
        dg.add_control_header(ControlMessage::AddChannel.into()).expect("fresh datagram cannot overflow");
        dg.add_channel(channel).expect("fresh datagram cannot overflow");
        self.send(dg);
    }

    fn stage_remove_channel(&self, channel: Channel) {
        let mut dg = Datagram::new();
        dg.add_control_header(ControlMessage::RemoveChannel.into()).expect("fresh datagram cannot overflow");
        dg.add_channel(channel).expect("fresh datagram cannot overflow");
        self.send(dg);
    }

    fn stage_add_range(&self, lo: Channel, hi: Channel) {
        let mut dg = Datagram::new();
        dg.add_control_header(ControlMessage::AddRange.into()).expect("fresh datagram cannot overflow");
        dg.add_channel(lo).expect("fresh datagram cannot overflow");
        dg.add_channel(hi).expect("fresh datagram cannot overflow");
        self.send(dg);
    }

    fn stage_remove_range(&self, lo: Channel, hi: Channel) {
        let mut dg = Datagram::new();
        dg.add_control_header(ControlMessage::RemoveRange.into()).expect("fresh datagram cannot overflow");
        dg.add_channel(lo).expect("fresh datagram cannot overflow");
        dg.add_channel(hi).expect("fresh datagram cannot overflow");
        self.send(dg);
    }

    fn forward(&self, dg: Datagram) {
        self.send(dg);
    }
}

impl TcpUpstreamLink {
    fn send(&self, dg: Datagram) {
        if self.outbound.try_send(dg).is_err() {
            error!("upstream outbound queue full or closed; terminating");
            std::process::exit(1);
        }
    }
}

/// Half of a connected upstream link that still needs a
/// [`MessageDirector`] to route into — the director can't be built
/// until the link itself exists (it is staged into the director's
/// `Inner`), so connecting and running the reader loop are split into
/// two steps.
pub struct PendingUpstream {
    read_half: tokio::io::ReadHalf<TcpStream>,
}

impl PendingUpstream {
    /// Drives the reader loop against `director` until the connection
    /// closes. Run this as its own task once `director` has been
    /// built with this link wired in as its upstream.
    pub async fn run(self, director: MessageDirector) {
        run_reader(director, self.read_half).await;
    }
}

/// Connects to `addr` and spawns the writer task. Returns the link
/// (to be wired into a [`MessageDirector`] via `with_upstream`) and
/// the pending reader half (to be run once that director exists).
pub async fn connect(addr: &str) -> std::io::Result<(TcpUpstreamLink, PendingUpstream)> {
    let stream = TcpStream::connect(addr).await?;
    info!("connected to upstream director at {addr}");
    let (read_half, write_half) = tokio::io::split(stream);
    let (tx, rx) = mpsc::channel(UPSTREAM_QUEUE_DEPTH);

    tokio::spawn(run_writer(write_half, rx));

    Ok((TcpUpstreamLink { outbound: tx }, PendingUpstream { read_half }))
}

async fn run_reader<R>(director: MessageDirector, mut reader: R)
where
    R: AsyncRead + Unpin,
{
    loop {
        match read_frame(&mut reader).await {
            Ok(dg) => {
                if let Err(err) = director.route(dg, None).await {
                    warn!("unroutable datagram from upstream: {err}");
                }
            }
            Err(err) => {
                error!("lost connection to upstream director: {err}; terminating");
                std::process::exit(1);
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
            error!("write to upstream director failed: {err}; terminating");
            std::process::exit(1);
        }
    }
}
