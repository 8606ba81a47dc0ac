//! Evolver - engine contract for approximate image search
//!
//! An engine iteratively refines candidate images toward a target image.
//! This crate defines the capability interface the coordination pipeline
//! drives ([`Engine`] / [`EngineSession`]) plus a deterministic reference
//! implementation ([`HillClimbEngine`]) for demos and tests.
//!
//! # Core Concepts
//!
//! - **Session**: one engine run binding image dimensions, a candidate-pool
//!   capacity, and a random seed. Exactly one owner for its whole lifetime.
//! - **Fitness**: scalar approximation error of the current best candidate;
//!   lower is better.
//! - **Steps**: engines run in caller-bounded step batches and must return
//!   control after each batch; they never spawn threads of their own.
//!
//! # Modules
//!
//! - [`contract`] - The `Engine`/`EngineSession` traits
//! - [`error`] - `EngineError`
//! - [`hillclimb`] - Seeded random-mutation hill climber

pub mod contract;
pub mod error;
pub mod hillclimb;

pub use contract::{Engine, EngineSession};
pub use error::EngineError;
pub use hillclimb::HillClimbEngine;

/// Bytes per pixel for all image buffers (RGBA8, row-major).
pub const BYTES_PER_PIXEL: usize = 4;

/// Length in bytes of an RGBA8 buffer for the given dimensions.
pub fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_len() {
        assert_eq!(buffer_len(4, 4), 64);
        assert_eq!(buffer_len(1, 1), 4);
        assert_eq!(buffer_len(0, 16), 0);
    }
}
