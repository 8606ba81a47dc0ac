//! Limner - compute-render coordination pipeline for approximate image search
//!
//! A background engine iteratively refines a candidate image toward a target
//! image; a foreground surface shows progressively improving results in real
//! time. Limner is the plumbing between the two: the lifecycle state machine,
//! the message protocol across the task boundary, the cooperative batch loop
//! that drives the engine, and the frame-delivery policy that keeps the
//! foreground responsive while the loop runs indefinitely.
//!
//! # Core Concepts
//!
//! - **Single owner per buffer**: pixel buffers move across the task boundary,
//!   they are never shared or cloned
//! - **At most one frame in flight**: the coordinator buffers exactly one
//!   unconsumed frame; newer frames overwrite older ones (dropping is policy)
//! - **Cooperative cancellation**: the worker observes stop requests at batch
//!   boundaries only, never mid-batch
//! - **Faults propagate, never crash**: engine failures surface as one error
//!   event; recovery is always user-initiated
//!
//! # Modules
//!
//! - [`worker`] - Worker host actor, control/event message protocol
//! - [`pipeline`] - Coordinator-side state machine and frame buffering
//! - [`render`] - Display-paced frame consumer
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod render;
pub mod worker;

// Re-export commonly used types
pub use config::{Config, SessionConfig, WorkerConfig};
pub use pipeline::{Pipeline, PipelineError, PipelineState};
pub use render::{FrameSink, RenderLoop, StatsSink};
pub use worker::{ControlMessage, CreateRequest, EngineEvent, Frame, WorkerHandle, WorkerHost};
