//! Coordinator side of the pipeline: state machine, intents, frame slot

mod core;
mod error;
mod state;

pub use core::Pipeline;
pub use error::PipelineError;
pub use state::PipelineState;
