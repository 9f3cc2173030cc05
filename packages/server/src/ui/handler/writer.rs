//! Outbound writer: the only task that writes to a connection's socket.

use std::net::SocketAddr;

use futures_util::SinkExt;
use tokio::{io::AsyncWrite, sync::mpsc};
use tokio_util::codec::{FramedWrite, LinesCodec};

use crate::domain::Outbound;

/// Drain `rx` into `sink` until a close command, a write error, or every
/// sender is dropped, then shut the write half down.
pub(super) async fn write_outbound<W>(
    mut sink: FramedWrite<W, LinesCodec>,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    peer_addr: SocketAddr,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Line(line) => {
                if let Err(e) = sink.send(line).await {
                    tracing::warn!("Failed to write to {}: {}", peer_addr, e);
                    return;
                }
            }
            Outbound::Close => break,
        }
    }

    if let Err(e) = SinkExt::<String>::close(&mut sink).await {
        tracing::debug!("Failed to shut down write half for {}: {}", peer_addr, e);
    }
}
