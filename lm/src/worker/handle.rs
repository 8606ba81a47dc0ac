//! WorkerHandle - client interface to the worker host actor

use tokio::sync::mpsc;
use tracing::debug;

use crate::pipeline::PipelineError;

use super::messages::{ControlMessage, CreateRequest};

/// Handle for issuing control messages to the worker host
///
/// Cloneable; every clone feeds the same worker. All operations are async
/// sends that return once the message is queued, not once it is acted on -
/// outcomes arrive as [`EngineEvent`]s on the event channel.
///
/// [`EngineEvent`]: super::messages::EngineEvent
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<ControlMessage>,
}

impl WorkerHandle {
    pub(crate) fn new(tx: mpsc::Sender<ControlMessage>) -> Self {
        debug!("WorkerHandle::new: called");
        Self { tx }
    }

    /// Ask the worker to prepare its engine
    pub async fn initialize(&self) -> Result<(), PipelineError> {
        debug!("WorkerHandle::initialize: called");
        self.send(ControlMessage::Initialize).await
    }

    /// Ask the worker to create a session for a new target image
    pub async fn create(&self, request: CreateRequest) -> Result<(), PipelineError> {
        debug!(?request, "WorkerHandle::create: called");
        self.send(ControlMessage::Create(request)).await
    }

    /// Ask the worker to begin (or resume) the batch loop
    pub async fn start(&self) -> Result<(), PipelineError> {
        debug!("WorkerHandle::start: called");
        self.send(ControlMessage::Start).await
    }

    /// Ask the worker to halt the batch loop at the next batch boundary
    pub async fn stop(&self) -> Result<(), PipelineError> {
        debug!("WorkerHandle::stop: called");
        self.send(ControlMessage::Stop).await
    }

    /// Ask the worker to release the session
    pub async fn destroy(&self) -> Result<(), PipelineError> {
        debug!("WorkerHandle::destroy: called");
        self.send(ControlMessage::Destroy).await
    }

    async fn send(&self, msg: ControlMessage) -> Result<(), PipelineError> {
        self.tx.send(msg).await.map_err(|_| PipelineError::WorkerGone)
    }
}
