//! Coordinator-side lifecycle state

/// Observable lifecycle state of the pipeline
///
/// Start and stop transitions happen immediately on intent; the other
/// transitions wait for the worker's confirmation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No initialize has been confirmed yet
    Uninitialized,
    /// Engine prepared, no session exists
    EngineReady,
    /// Session created and scored, batch loop not running
    ContextReady,
    /// Batch loop running
    Running,
    /// Batch loop stopped after having run
    Paused,
    /// An error event arrived; only create recovers
    Faulted,
}

impl PipelineState {
    /// True while an engine session is associated with the pipeline
    pub fn has_context(&self) -> bool {
        matches!(self, Self::ContextReady | Self::Running | Self::Paused)
    }

    /// States from which a create intent is accepted
    ///
    /// Faulted is included: the worker drops a faulted session, so a fresh
    /// create is the recovery path.
    pub fn can_create(&self) -> bool {
        matches!(self, Self::EngineReady | Self::Faulted)
    }

    /// States from which a start intent is accepted (no-op while Running)
    pub fn can_start(&self) -> bool {
        matches!(self, Self::ContextReady | Self::Paused | Self::Running)
    }

    /// States from which a stop intent is accepted (no-op unless Running)
    pub fn can_stop(&self) -> bool {
        matches!(self, Self::ContextReady | Self::Paused | Self::Running)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::EngineReady => "engine-ready",
            Self::ContextReady => "context-ready",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Faulted => "faulted",
        };
        write!(f, "{name}")
    }
}
