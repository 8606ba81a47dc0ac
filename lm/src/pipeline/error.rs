//! Pipeline error types

use thiserror::Error;

use super::state::PipelineState;

/// Errors surfaced by pipeline intent methods
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Operation '{operation}' is not valid in state '{state}'")]
    InvalidTransition {
        operation: &'static str,
        state: PipelineState,
    },

    #[error("Target buffer length {actual} does not match {width}x{height} ({expected} bytes)")]
    TargetSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Worker channel closed; the worker task has exited")]
    WorkerGone,
}

impl PipelineError {
    /// Check if this error is a lifecycle ordering violation
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Check if this error means the worker task is gone
    pub fn is_worker_gone(&self) -> bool {
        matches!(self, Self::WorkerGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PipelineError::InvalidTransition {
            operation: "start",
            state: PipelineState::Uninitialized,
        };
        assert_eq!(
            err.to_string(),
            "Operation 'start' is not valid in state 'uninitialized'"
        );

        let err = PipelineError::TargetSizeMismatch {
            width: 4,
            height: 4,
            expected: 64,
            actual: 10,
        };
        assert!(err.to_string().contains("64 bytes"));
    }

    #[test]
    fn test_error_predicates() {
        let err = PipelineError::InvalidTransition {
            operation: "stop",
            state: PipelineState::EngineReady,
        };
        assert!(err.is_invalid_transition());
        assert!(!err.is_worker_gone());

        assert!(PipelineError::WorkerGone.is_worker_gone());
    }
}
