//! Client execution logic.

use tokio::net::TcpStream;

use super::{domain::SessionEnd, error::ClientError, session::run_session, ui::spawn_readline};

/// Connect to the server at `host:port` and chat as `name` until the session ends
pub async fn run_client(host: String, port: u16, name: String) -> Result<SessionEnd, ClientError> {
    let addr = format!("{}:{}", host, port);
    tracing::info!("Connecting to {} as '{}'", addr, name);

    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.clone(),
            source,
        })?;

    let input_rx = spawn_readline(&name);
    let end = run_session(stream, &name, input_rx).await?;

    match end {
        SessionEnd::ServerShutdown => tracing::info!("Server shut down"),
        SessionEnd::ConnectionLost => println!("\nLost connection to server"),
        SessionEnd::UserExit => tracing::info!("Client session ended normally"),
    }

    Ok(end)
}
