//! Engine and EngineSession trait definitions

use super::EngineError;

/// Opaque compute engine - proposes and scores candidate images
///
/// This is the seam between the coordination pipeline and the search
/// algorithm. The pipeline never learns how candidates are produced; it only
/// drives sessions in bounded step batches. Implementations own whatever
/// native or in-process resources they need and release them when the last
/// session drops.
pub trait Engine: Send {
    /// Prepare the engine for use (load code, probe backends)
    ///
    /// Must complete before any session is created. Idempotent: preparing an
    /// already-prepared engine is a no-op.
    fn prepare(&mut self) -> Result<(), EngineError>;

    /// Create a session binding dimensions, pool capacity, and a seed
    ///
    /// The returned session is exclusively owned by the caller. Engine
    /// resources held by the session are released when it is dropped.
    fn create_session(
        &mut self,
        width: u32,
        height: u32,
        capacity: u32,
        seed: u64,
    ) -> Result<Box<dyn EngineSession>, EngineError>;
}

/// One engine run against a single target image
///
/// The expected call sequence is: write the target through [`target_mut`],
/// score the initial state with [`evaluate_best`], then drive
/// [`run_steps`] / [`best_image`] / [`iterations`] in a loop. Any call may
/// fail with [`EngineError::Failed`] carrying the engine-reported message;
/// a failed session must be discarded, not retried.
///
/// [`target_mut`]: EngineSession::target_mut
/// [`evaluate_best`]: EngineSession::evaluate_best
/// [`run_steps`]: EngineSession::run_steps
/// [`best_image`]: EngineSession::best_image
/// [`iterations`]: EngineSession::iterations
pub trait EngineSession: Send {
    /// Writable view of the engine-owned target buffer (RGBA8, row-major)
    fn target_mut(&mut self) -> Result<&mut [u8], EngineError>;

    /// Score the current best candidate against the target
    ///
    /// Called once after the target is written so a fitness value exists
    /// before any iteration. Returns the fitness (lower is better).
    fn evaluate_best(&mut self) -> Result<u64, EngineError>;

    /// Run a batch of `steps` iterations; returns the fitness afterwards
    fn run_steps(&mut self, steps: u32) -> Result<u64, EngineError>;

    /// Readable view of the current best candidate (RGBA8, row-major)
    fn best_image(&self) -> Result<&[u8], EngineError>;

    /// Total iterations executed so far (monotonically non-decreasing)
    fn iterations(&self) -> Result<u64, EngineError>;
}
