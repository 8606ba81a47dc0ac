//! Engine error types

use thiserror::Error;

/// Errors reported by an engine or one of its sessions
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Engine not prepared; call prepare() before creating sessions")]
    NotPrepared,

    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid capacity {0}; candidate pool must hold at least one candidate")]
    InvalidCapacity(u32),

    #[error("Target buffer length {actual} does not match expected {expected}")]
    TargetSizeMismatch { expected: usize, actual: usize },

    #[error("Engine failure: {0}")]
    Failed(String),
}

impl EngineError {
    /// Check whether retrying session creation with corrected inputs can succeed
    ///
    /// Initialization failures are fatal to the pipeline; everything else is
    /// recoverable by issuing a fresh create.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::Unavailable(_))
    }

    /// Engine-reported text without the variant prefix
    ///
    /// Consumers that surface failures downstream must pass the engine's own
    /// words through unaltered; the structured variants fall back to their
    /// display form.
    pub fn message(&self) -> String {
        match self {
            EngineError::Unavailable(msg) | EngineError::Failed(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_recoverable() {
        assert!(!EngineError::Unavailable("no backend".to_string()).is_recoverable());

        assert!(EngineError::NotPrepared.is_recoverable());
        assert!(EngineError::InvalidDimensions { width: 0, height: 8 }.is_recoverable());
        assert!(EngineError::InvalidCapacity(0).is_recoverable());
        assert!(
            EngineError::TargetSizeMismatch {
                expected: 64,
                actual: 32
            }
            .is_recoverable()
        );
        assert!(EngineError::Failed("step overflow".to_string()).is_recoverable());
    }

    #[test]
    fn test_message_is_engine_text_without_prefix() {
        let err = EngineError::Failed("scripted step failure".to_string());
        assert_eq!(err.message(), "scripted step failure");
        assert_ne!(err.message(), err.to_string());

        let err = EngineError::Unavailable("no backend".to_string());
        assert_eq!(err.message(), "no backend");

        // Structured variants have no separate engine text.
        assert_eq!(EngineError::NotPrepared.message(), EngineError::NotPrepared.to_string());
    }

    #[test]
    fn test_display_carries_engine_message() {
        let err = EngineError::Failed("candidate pool corrupted".to_string());
        assert!(err.to_string().contains("candidate pool corrupted"));
    }
}
