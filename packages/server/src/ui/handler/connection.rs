//! Connection handler: one task per accepted TCP connection.
//!
//! A connection moves through `JOINING → ACTIVE → LEAVING → CLOSED`:
//!
//! - `JOINING`: the first line is the display name; the connection is then
//!   registered, welcomed privately, and announced to everyone else
//! - `ACTIVE`: every non-empty line is relayed as a chat message
//! - `LEAVING`: entered on EOF, read error or draining; the departure is
//!   announced (unless the server is draining) and the connection unregistered
//! - `CLOSED`: the last handle is dropped, so the writer flushes and closes

use std::{net::SocketAddr, sync::Arc};

use futures_util::StreamExt;
use tokio::{
    net::{TcpStream, tcp::OwnedReadHalf},
    sync::mpsc,
};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use chatrelay_shared::{protocol, time::timestamp_to_rfc3339};

use crate::{
    domain::{ConnectionHandle, RelayMessage},
    ui::state::ServerState,
};

use super::writer::write_outbound;

type LineReader = FramedRead<OwnedReadHalf, LinesCodec>;

/// Why a connection left the `ACTIVE` state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeaveReason {
    /// The peer closed its side of the connection
    PeerClosed,
    /// Reading failed (reset, invalid UTF-8, over-long line)
    ReadError,
    /// The server is shutting down
    Draining,
    /// The handshake could not be completed after the name was read
    Aborted,
}

impl LeaveReason {
    fn announces_departure(self) -> bool {
        matches!(self, Self::PeerClosed | Self::ReadError)
    }
}

pub(crate) async fn handle_connection(
    state: Arc<ServerState>,
    stream: TcpStream,
    peer_addr: SocketAddr,
) {
    let (read_half, write_half) = stream.into_split();
    let mut lines = FramedRead::new(
        read_half,
        LinesCodec::new_with_max_length(state.config.max_line_length),
    );

    let (tx, rx) = mpsc::unbounded_channel();
    state.shutdown.tracker().spawn(write_outbound(
        FramedWrite::new(write_half, LinesCodec::new()),
        rx,
        peer_addr,
    ));

    let Some(name) = read_display_name(&state, &mut lines, peer_addr).await else {
        return;
    };
    let connection = ConnectionHandle::new(name, peer_addr, tx);

    let reason = match join(&state, &connection).await {
        Ok(()) => relay_lines(&state, &connection, &mut lines).await,
        Err(reason) => reason,
    };

    leave(&state, connection, reason).await;
}

/// JOINING: the first frame is the display name, taken verbatim
async fn read_display_name(
    state: &ServerState,
    lines: &mut LineReader,
    peer_addr: SocketAddr,
) -> Option<String> {
    let token = state.shutdown.token();
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!("Dropping {} before it joined: server is draining", peer_addr);
            None
        }
        read = tokio::time::timeout(state.config.join_timeout, lines.next()) => match read {
            Ok(Some(Ok(name))) => Some(name),
            Ok(Some(Err(e))) => {
                tracing::warn!("Failed to read display name from {}: {}", peer_addr, e);
                None
            }
            Ok(None) => {
                tracing::info!("{} disconnected before joining", peer_addr);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "{} sent no display name within {:?}, dropping it",
                    peer_addr,
                    state.config.join_timeout
                );
                None
            }
        }
    }
}

/// JOINING → ACTIVE: register and welcome privately, then announce to the others
async fn join(state: &ServerState, connection: &ConnectionHandle) -> Result<(), LeaveReason> {
    let welcome = |others: &[String]| {
        vec![
            protocol::connected_line(state.local_addr.ip(), state.local_addr.port()),
            protocol::welcome_line(connection.name(), others),
        ]
    };
    if let Err(e) = state
        .registry
        .register_with_greeting(connection.clone(), welcome)
        .await
    {
        tracing::warn!("Failed to register '{}': {}", connection.name(), e);
        return Err(LeaveReason::Aborted);
    }

    // a connection registered after the coordinator's snapshot closes itself
    if state.shutdown.is_draining() {
        return Err(LeaveReason::Draining);
    }

    tracing::info!(
        "Client: {} with address: {} has connected",
        connection.name(),
        connection.peer_addr()
    );

    state
        .broadcast_usecase
        .execute(&RelayMessage::joined(connection.name()), Some(connection.id()))
        .await;
    Ok(())
}

/// ACTIVE: relay each line until EOF, a read error, or draining
async fn relay_lines(
    state: &ServerState,
    connection: &ConnectionHandle,
    lines: &mut LineReader,
) -> LeaveReason {
    let token = state.shutdown.token();
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return LeaveReason::Draining,
            frame = lines.next() => match frame {
                Some(Ok(text)) => {
                    if text.is_empty() {
                        continue;
                    }
                    tracing::debug!("Received from '{}': {}", connection.name(), text);
                    state
                        .broadcast_usecase
                        .execute(&RelayMessage::chat(connection.name(), text), Some(connection.id()))
                        .await;
                }
                Some(Err(e)) => {
                    tracing::warn!("Failed to read from '{}': {}", connection.name(), e);
                    return LeaveReason::ReadError;
                }
                None => return LeaveReason::PeerClosed,
            }
        }
    }
}

/// LEAVING → CLOSED
async fn leave(state: &ServerState, connection: ConnectionHandle, reason: LeaveReason) {
    if reason == LeaveReason::Draining {
        connection.force_close(&RelayMessage::ShutdownNotice.render());
    } else if reason.announces_departure() {
        state
            .broadcast_usecase
            .execute(&RelayMessage::left(connection.name()), Some(connection.id()))
            .await;
    }

    state.registry.unregister(connection.id()).await;

    let peer_addr = connection.peer_addr();
    tracing::info!(
        "{} (IP: {}, port: {}) has disconnected ({:?}, joined at {})",
        connection.name(),
        peer_addr.ip(),
        peer_addr.port(),
        reason,
        timestamp_to_rfc3339(connection.connected_at())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ServerConfig,
        domain::{Outbound, TranscriptBuffer},
        infrastructure::ConnectionRegistry,
        usecase::{BroadcastUseCase, ShutdownContext, ShutdownCoordinator},
    };

    fn create_state() -> (ServerState, ShutdownCoordinator) {
        let registry = Arc::new(ConnectionRegistry::new());
        let shutdown = ShutdownContext::new();
        let broadcast_usecase = Arc::new(BroadcastUseCase::new(
            registry.clone(),
            Arc::new(TranscriptBuffer::new()),
        ));
        let coordinator = ShutdownCoordinator::new(shutdown.clone(), registry.clone());
        let state = ServerState {
            config: ServerConfig::default(),
            local_addr: "127.0.0.1:4321".parse().unwrap(),
            registry,
            broadcast_usecase,
            shutdown,
        };
        (state, coordinator)
    }

    fn create_connection(name: &str) -> (ConnectionHandle, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = ConnectionHandle::new(name, "127.0.0.1:40000".parse().unwrap(), tx);
        (connection, rx)
    }

    fn received(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> Vec<Outbound> {
        let mut out = Vec::new();
        while let Ok(o) = rx.try_recv() {
            out.push(o);
        }
        out
    }

    #[test]
    fn test_only_peer_initiated_exits_announce_departure() {
        // テスト項目: 退室アナウンスはピア起因の切断でのみ行われる
        // given (前提条件):
        let reasons = [
            LeaveReason::PeerClosed,
            LeaveReason::ReadError,
            LeaveReason::Draining,
            LeaveReason::Aborted,
        ];

        // when (操作):
        let announced: Vec<bool> = reasons.iter().map(|r| r.announces_departure()).collect();

        // then (期待する結果):
        assert_eq!(announced, vec![true, true, false, false]);
    }

    #[tokio::test]
    async fn test_join_welcomes_then_announces() {
        // テスト項目: 参加時は本人に接続通知と歓迎メッセージが届き、他の参加者には入室アナウンスが届く
        // given (前提条件):
        let (state, _coordinator) = create_state();
        let (alice, mut alice_rx) = create_connection("alice");
        join(&state, &alice).await.unwrap();
        let _ = received(&mut alice_rx);
        let (bob, mut bob_rx) = create_connection("bob");

        // when (操作):
        let result = join(&state, &bob).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            received(&mut bob_rx),
            vec![
                Outbound::Line(
                    "Connected to the server with IP: 127.0.0.1 and Port: 4321".to_string()
                ),
                Outbound::Line("You joined the chat as bob. Others in the chat: alice".to_string()),
            ]
        );
        assert_eq!(
            received(&mut alice_rx),
            vec![Outbound::Line("bob has joined the chat".to_string())]
        );
    }

    #[tokio::test]
    async fn test_draining_leave_is_not_announced_to_live_peers() {
        // テスト項目: シャットダウンによる退出では、生存中の他の参加者に退室アナウンスが届かない
        // given (前提条件):
        let (state, _coordinator) = create_state();
        let (alice, mut alice_rx) = create_connection("alice");
        let (bob, mut bob_rx) = create_connection("bob");
        join(&state, &alice).await.unwrap();
        join(&state, &bob).await.unwrap();
        let _ = received(&mut alice_rx);
        let _ = received(&mut bob_rx);

        // when (操作):
        leave(&state, alice.clone(), LeaveReason::Draining).await;

        // then (期待する結果):
        assert!(bob.is_alive());
        assert!(received(&mut bob_rx).is_empty());
        assert_eq!(
            received(&mut alice_rx),
            vec![
                Outbound::Line(RelayMessage::ShutdownNotice.render()),
                Outbound::Close,
            ]
        );
        assert!(!state.registry.contains(alice.id()).await);
    }

    #[tokio::test]
    async fn test_peer_closed_leave_is_announced() {
        // テスト項目: ピアが切断した場合は他の参加者に退室アナウンスが届く
        // given (前提条件):
        let (state, _coordinator) = create_state();
        let (alice, _alice_rx) = create_connection("alice");
        let (bob, mut bob_rx) = create_connection("bob");
        join(&state, &alice).await.unwrap();
        join(&state, &bob).await.unwrap();
        let _ = received(&mut bob_rx);

        // when (操作):
        leave(&state, alice.clone(), LeaveReason::PeerClosed).await;

        // then (期待する結果):
        assert_eq!(
            received(&mut bob_rx),
            vec![Outbound::Line("alice has left the chat".to_string())]
        );
        assert!(!state.registry.contains(alice.id()).await);
    }

    #[tokio::test]
    async fn test_late_joiner_during_draining_is_closed_and_unregistered() {
        // テスト項目: シャットダウン開始後に参加したコネクションは通知を受けて閉じられ、登録が残らない
        // given (前提条件):
        let (state, coordinator) = create_state();
        let (early, mut early_rx) = create_connection("early");
        join(&state, &early).await.unwrap();
        let _ = received(&mut early_rx);
        coordinator.initiate().await;
        let _ = received(&mut early_rx);
        let (late, mut late_rx) = create_connection("late");

        // when (操作):
        let reason = join(&state, &late).await.unwrap_err();
        leave(&state, late.clone(), reason).await;

        // then (期待する結果):
        assert_eq!(reason, LeaveReason::Draining);
        let outbound = received(&mut late_rx);
        assert_eq!(
            outbound[outbound.len() - 2..],
            [
                Outbound::Line(RelayMessage::ShutdownNotice.render()),
                Outbound::Close,
            ]
        );
        assert!(!state.registry.contains(late.id()).await);
        assert!(received(&mut early_rx).is_empty());
    }
}
