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

//! Accepts inbound connections and hands each one to
//! [`crate::tcp_participant::serve_connection`] on its own task.

use crate::tcp_participant::serve_connection;
use log::{error, info};
use relay_director::MessageDirector;
use tokio::net::TcpListener;

pub struct Listener {
    socket: TcpListener,
    pub address: String,
}

impl Listener {
    pub async fn bind(uri: &str) -> std::io::Result<Self> {
        let socket = TcpListener::bind(uri).await?;
        info!("listening for connections on {uri}");
        Ok(Self {
            socket,
            address: String::from(uri),
        })
    }

    /// Accepts connections in a loop, spawning a task per connection.
    /// Never returns under normal operation; an `accept` failure is
    /// logged and the loop continues, since it is almost always
    /// transient (e.g. too many open files) rather than fatal.
    pub async fn run(&self, director: MessageDirector) -> std::io::Result<()> {
        loop {
            match self.socket.accept().await {
                Ok((socket, peer)) => {
                    let director = director.clone();
                    tokio::spawn(async move {
                        serve_connection(director, socket, peer).await;
                    });
                }
                Err(err) => error!("failed to accept connection: {err}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_and_records_address() {
        let listener = Listener::bind("127.0.0.1:0").await.unwrap();
        assert!(listener.address.starts_with("127.0.0.1"));
    }
}
