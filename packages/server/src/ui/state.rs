//! Server state shared by the accept loop and every connection task.

use std::{net::SocketAddr, sync::Arc};

use crate::{
    config::ServerConfig,
    infrastructure::ConnectionRegistry,
    usecase::{BroadcastUseCase, ShutdownContext},
};

/// Shared application state
pub struct ServerState {
    pub config: ServerConfig,
    /// Address the listener actually bound to
    pub local_addr: SocketAddr,
    pub registry: Arc<ConnectionRegistry>,
    pub broadcast_usecase: Arc<BroadcastUseCase>,
    pub shutdown: ShutdownContext,
}
