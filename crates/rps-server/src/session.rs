//! Per-connection session handler.
//!
//! Reads one client message per `read`, forwards it to the coordinator
//! task and writes the acknowledgement back. In the same loop it writes
//! whatever the round clock pushes (countdowns, outcomes). Whatever ends
//! the loop, the session removes itself from the registry.

use std::net::SocketAddr;

use bytes::BytesMut;
use rps_core::{ClientMessage, RoundError, ServerMessage};
use rps_protocol::{encode_server_message, parse_client_message};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::types::{OutboundRx, RoundRequest, RoundTx, SessionId, SessionRegistry};

/// Largest message accepted in a single read.
const READ_BUFFER_SIZE: usize = 1024;

/// Run the session I/O loop for a single connection, then tear it down.
pub async fn run_session(
    session_id: SessionId,
    stream: TcpStream,
    peer_addr: SocketAddr,
    round_tx: RoundTx,
    out_rx: OutboundRx,
    sessions: SessionRegistry,
) -> Result<(), SessionError> {
    let mut session = Session {
        id: session_id,
        peer_addr,
        alias: None,
        round_tx,
    };

    let result = session.serve(stream, out_rx).await;

    // Remove session from registry
    {
        let mut guard = sessions.write().await;
        guard.remove(&session_id);
    }

    result
}

struct Session {
    id: SessionId,
    peer_addr: SocketAddr,
    /// Bound by the first successful `connect`, never changed after.
    alias: Option<String>,
    round_tx: RoundTx,
}

impl Session {
    async fn serve(&mut self, stream: TcpStream, mut out_rx: OutboundRx) -> Result<(), SessionError> {
        let (mut read_stream, mut write_stream) = stream.into_split();
        let mut buffer = BytesMut::with_capacity(READ_BUFFER_SIZE);

        loop {
            tokio::select! {
                read = read_stream.read_buf(&mut buffer) => {
                    if read? == 0 {
                        // EOF - client disconnected
                        info!(session = self.id.0, peer = %self.peer_addr, alias = ?self.alias, "session disconnected");
                        return Ok(());
                    }

                    {
                        let raw = String::from_utf8_lossy(&buffer);
                        debug!(session = self.id.0, raw = %raw.trim(), "received");
                    }
                    let reply = self.handle_message(&buffer).await?;
                    buffer.clear();
                    write_message(&mut write_stream, &reply).await?;
                }
                pushed = out_rx.recv() => match pushed {
                    Some(msg) => write_message(&mut write_stream, &msg).await?,
                    None => {
                        // Registry dropped our sender; treat as shutdown.
                        debug!(session = self.id.0, "outbound channel closed");
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Decode one message and produce its acknowledgement.
    ///
    /// Only a dead coordinator is an error here; every protocol problem
    /// becomes an error acknowledgement.
    async fn handle_message(&mut self, bytes: &[u8]) -> Result<ServerMessage, SessionError> {
        let msg = match parse_client_message(bytes) {
            Ok(msg) => msg,
            Err(error) => {
                warn!(session = self.id.0, peer = %self.peer_addr, %error, "undecodable message");
                return Ok(ServerMessage::WrongFields);
            }
        };

        let result = match msg {
            ClientMessage::Connect { alias } => self.connect(alias).await?,
            ClientMessage::Play { alias, answer } => self.play(alias, answer).await?,
        };

        Ok(match result {
            Ok(ack) => ack,
            Err(error) => {
                warn!(
                    session = self.id.0,
                    peer = %self.peer_addr,
                    alias = ?self.alias,
                    %error,
                    "message rejected"
                );
                ServerMessage::ErrorInMsg
            }
        })
    }

    async fn connect(&mut self, alias: String) -> Result<Result<ServerMessage, RoundError>, SessionError> {
        if let Some(bound) = &self.alias {
            if *bound != alias {
                return Ok(Err(RoundError::AliasAlreadySet {
                    bound: bound.clone(),
                    requested: alias,
                }));
            }
        }

        let session_id = self.id;
        let remote_ip = self.peer_addr.ip();
        let requested = alias.clone();
        let result = self
            .request(|reply| RoundRequest::Connect {
                session_id,
                alias: requested,
                remote_ip,
                reply,
            })
            .await?;

        Ok(result.map(|()| {
            if self.alias.is_none() {
                info!(session = session_id.0, peer = %self.peer_addr, %alias, "session bound to alias");
                self.alias = Some(alias);
            }
            ServerMessage::ConnectAck
        }))
    }

    async fn play(
        &mut self,
        alias: String,
        answer: String,
    ) -> Result<Result<ServerMessage, RoundError>, SessionError> {
        if self.alias.as_deref() != Some(alias.as_str()) {
            return Ok(Err(RoundError::UnknownAlias(alias)));
        }

        let session_id = self.id;
        let result = self
            .request(|reply| RoundRequest::Play {
                session_id,
                alias,
                answer,
                reply,
            })
            .await?;

        Ok(result.map(|choice| {
            debug!(session = session_id.0, %choice, "play accepted");
            ServerMessage::PlayAck
        }))
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RoundRequest,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.round_tx
            .send(make(reply))
            .map_err(|_| SessionError::CoordinatorGone)?;
        response.await.map_err(|_| SessionError::CoordinatorGone)
    }
}

async fn write_message(stream: &mut OwnedWriteHalf, msg: &ServerMessage) -> Result<(), SessionError> {
    let line = format!("{}\n", encode_server_message(msg));

    stream.write_all(line.as_bytes()).await?;
    stream.flush().await?;

    Ok(())
}
