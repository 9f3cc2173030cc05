//! UseCase layer: broadcast, transcript flush and shutdown coordination.

pub mod broadcast;
pub mod flush_transcript;
pub mod shutdown;

pub use broadcast::BroadcastUseCase;
pub use flush_transcript::FlushTranscriptUseCase;
pub use shutdown::{ShutdownContext, ShutdownCoordinator};
