//! Worker side of the pipeline: engine ownership and the batch loop

mod handle;
mod host;
mod messages;

pub use handle::WorkerHandle;
pub use host::WorkerHost;
pub use messages::{ControlMessage, CreateRequest, EngineEvent, Frame};
