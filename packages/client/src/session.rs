//! A single connection to the relay server.

use chatrelay_shared::protocol::left_line;
use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use super::{
    domain::{Incoming, SessionEnd, classify, outgoing_text},
    error::ClientError,
    ui::print_incoming,
};

/// Run one session over an established connection.
///
/// Sends `name` as the first frame, then relays lines from `input_rx` to the
/// server and prints whatever the server sends until one side ends the session.
pub async fn run_session(
    stream: TcpStream,
    name: &str,
    mut input_rx: mpsc::UnboundedReceiver<String>,
) -> Result<SessionEnd, ClientError> {
    let (read_half, write_half) = stream.into_split();
    let mut lines = FramedRead::new(read_half, LinesCodec::new());
    let mut sink = FramedWrite::new(write_half, LinesCodec::new());

    sink.send(name.to_string()).await?;

    loop {
        tokio::select! {
            incoming = lines.next() => match incoming {
                Some(Ok(line)) => match classify(&line) {
                    Incoming::ShutdownNotice => {
                        print_incoming(&line, name);
                        // The server may already have closed its side
                        if let Err(e) = sink.send(left_line(name)).await {
                            tracing::debug!("Failed to send departure line: {}", e);
                        }
                        if let Err(e) = SinkExt::<String>::close(&mut sink).await {
                            tracing::debug!("Failed to close connection: {}", e);
                        }
                        return Ok(SessionEnd::ServerShutdown);
                    }
                    Incoming::Line(text) => print_incoming(text, name),
                },
                Some(Err(e)) => {
                    tracing::warn!("Read error: {}", e);
                    return Ok(SessionEnd::ConnectionLost);
                }
                None => return Ok(SessionEnd::ConnectionLost),
            },
            input = input_rx.recv() => match input {
                Some(input) => {
                    if let Some(text) = outgoing_text(&input) {
                        sink.send(text).await?;
                    }
                }
                None => {
                    SinkExt::<String>::close(&mut sink).await?;
                    return Ok(SessionEnd::UserExit);
                }
            },
        }
    }
}
