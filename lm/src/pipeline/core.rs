//! Pipeline coordinator: lifecycle intents, event folding, frame slot

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::worker::{CreateRequest, EngineEvent, Frame, WorkerHandle};

use super::error::PipelineError;
use super::state::PipelineState;

/// Coordinator-side view of the worker
///
/// Owns the event receiver and folds confirmations into [`PipelineState`].
/// Callers drive it with intent methods, then either poll events with
/// [`pump_events`](Self::pump_events) (as the render loop does each tick) or
/// park on [`wait_event`](Self::wait_event).
///
/// Holds at most one unconsumed frame. A newer frame replaces an unpainted
/// older one; display always shows the freshest result and memory stays
/// bounded no matter how far compute outpaces paint.
pub struct Pipeline {
    state: PipelineState,
    worker: WorkerHandle,
    events: mpsc::Receiver<EngineEvent>,
    frame: Option<Frame>,
    last_error: Option<String>,
    baseline_fitness: Option<u64>,
    worker_gone: bool,
}

impl Pipeline {
    pub fn new(worker: WorkerHandle, events: mpsc::Receiver<EngineEvent>) -> Self {
        Self {
            state: PipelineState::Uninitialized,
            worker,
            events,
            frame: None,
            last_error: None,
            baseline_fitness: None,
            worker_gone: false,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Message from the most recent error event, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fitness of the best pool candidate at create time
    pub fn baseline_fitness(&self) -> Option<u64> {
        self.baseline_fitness
    }

    /// False once the worker task has exited
    pub fn is_connected(&self) -> bool {
        !self.worker_gone
    }

    /// Ask the worker to prepare the engine; confirmed by a Ready event
    pub async fn initialize(&mut self) -> Result<(), PipelineError> {
        if self.state != PipelineState::Uninitialized {
            return Err(PipelineError::InvalidTransition {
                operation: "initialize",
                state: self.state,
            });
        }
        self.worker.initialize().await
    }

    /// Ask the worker to create a session for the given target image
    ///
    /// Confirmed by a Created event. The target buffer length is validated
    /// here so an obviously malformed request never reaches the worker.
    pub async fn create(
        &mut self,
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        target_fps: u32,
        capacity: u32,
        seed: u64,
    ) -> Result<(), PipelineError> {
        if !self.state.can_create() {
            return Err(PipelineError::InvalidTransition {
                operation: "create",
                state: self.state,
            });
        }

        let request = CreateRequest {
            pixels,
            width,
            height,
            target_fps,
            capacity,
            seed,
        };
        if request.pixels.len() != request.expected_len() {
            return Err(PipelineError::TargetSizeMismatch {
                width,
                height,
                expected: request.expected_len(),
                actual: request.pixels.len(),
            });
        }

        self.worker.create(request).await
    }

    /// Start the batch loop; the state flips to Running immediately
    pub async fn start(&mut self) -> Result<(), PipelineError> {
        if !self.state.can_start() {
            return Err(PipelineError::InvalidTransition {
                operation: "start",
                state: self.state,
            });
        }
        self.worker.start().await?;
        self.state = PipelineState::Running;
        Ok(())
    }

    /// Stop the batch loop; the state flips immediately
    ///
    /// The worker honors the stop at the next batch boundary, so at most one
    /// further frame may still arrive afterwards.
    pub async fn stop(&mut self) -> Result<(), PipelineError> {
        if !self.state.can_stop() {
            return Err(PipelineError::InvalidTransition {
                operation: "stop",
                state: self.state,
            });
        }
        self.worker.stop().await?;
        if self.state == PipelineState::Running {
            self.state = PipelineState::Paused;
        }
        Ok(())
    }

    /// Ask the worker to tear down the session; confirmed by Destroyed
    pub async fn destroy(&mut self) -> Result<(), PipelineError> {
        if !self.state.has_context() {
            return Err(PipelineError::InvalidTransition {
                operation: "destroy",
                state: self.state,
            });
        }
        self.worker.destroy().await
    }

    /// Drain every queued event without blocking; returns how many were folded
    pub fn pump_events(&mut self) -> usize {
        let mut folded = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply(event);
                    folded += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.worker_gone = true;
                    break;
                }
            }
        }
        folded
    }

    /// Wait for one event and fold it; None once the worker is gone
    pub async fn wait_event(&mut self) -> Option<PipelineState> {
        match self.events.recv().await {
            Some(event) => {
                self.apply(event);
                Some(self.state)
            }
            None => {
                self.worker_gone = true;
                None
            }
        }
    }

    /// Take the buffered frame, leaving the slot empty
    pub fn take_frame(&mut self) -> Option<Frame> {
        self.frame.take()
    }

    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }

    fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Ready => {
                if self.state == PipelineState::Uninitialized {
                    info!("Engine ready");
                    self.state = PipelineState::EngineReady;
                } else {
                    debug!(state = %self.state, "ready re-confirmed");
                }
            }

            EngineEvent::Created { fitness } => {
                info!(fitness, "Session confirmed");
                self.baseline_fitness = Some(fitness);
                self.last_error = None;
                self.state = PipelineState::ContextReady;
            }

            EngineEvent::Frame(frame) => {
                if self.frame.is_some() {
                    debug!("unpainted frame overwritten by a newer one");
                }
                self.frame = Some(frame);
            }

            EngineEvent::Destroyed => {
                info!("Session torn down");
                self.frame = None;
                self.baseline_fitness = None;
                if self.state.has_context() {
                    self.state = PipelineState::EngineReady;
                }
            }

            EngineEvent::Error { message } => {
                warn!(error = %message, "Worker reported a failure");
                self.last_error = Some(message);
                self.state = PipelineState::Faulted;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::ControlMessage;

    /// Pipeline wired to bare channels so tests can script worker behavior
    fn test_pipeline() -> (
        Pipeline,
        mpsc::Receiver<ControlMessage>,
        mpsc::Sender<EngineEvent>,
    ) {
        let (ctl_tx, ctl_rx) = mpsc::channel(16);
        let (ev_tx, ev_rx) = mpsc::channel(16);
        (Pipeline::new(WorkerHandle::new(ctl_tx), ev_rx), ctl_rx, ev_tx)
    }

    fn frame(fitness: u64, iterations: u64) -> EngineEvent {
        EngineEvent::Frame(Frame {
            pixels: vec![0; 64],
            fitness,
            iterations,
        })
    }

    #[tokio::test]
    async fn test_initial_state_rejects_everything_but_initialize() {
        let (mut pipeline, _ctl, _ev) = test_pipeline();

        assert_eq!(pipeline.state(), PipelineState::Uninitialized);
        assert!(pipeline.start().await.unwrap_err().is_invalid_transition());
        assert!(pipeline.stop().await.unwrap_err().is_invalid_transition());
        assert!(pipeline.destroy().await.unwrap_err().is_invalid_transition());
        assert!(
            pipeline
                .create(vec![0; 64], 4, 4, 30, 1, 42)
                .await
                .unwrap_err()
                .is_invalid_transition()
        );
    }

    #[tokio::test]
    async fn test_ready_event_confirms_initialize() {
        let (mut pipeline, mut ctl, ev) = test_pipeline();

        pipeline.initialize().await.unwrap();
        assert!(matches!(ctl.recv().await, Some(ControlMessage::Initialize)));
        // Still pending until the worker confirms.
        assert_eq!(pipeline.state(), PipelineState::Uninitialized);

        ev.send(EngineEvent::Ready).await.unwrap();
        assert_eq!(pipeline.pump_events(), 1);
        assert_eq!(pipeline.state(), PipelineState::EngineReady);
    }

    #[tokio::test]
    async fn test_create_validates_buffer_length_locally() {
        let (mut pipeline, mut ctl, ev) = test_pipeline();
        pipeline.initialize().await.unwrap();
        ev.send(EngineEvent::Ready).await.unwrap();
        pipeline.pump_events();

        let err = pipeline.create(vec![0; 10], 4, 4, 30, 1, 42).await.unwrap_err();
        match err {
            PipelineError::TargetSizeMismatch { expected, actual, .. } => {
                assert_eq!(expected, 64);
                assert_eq!(actual, 10);
            }
            other => panic!("expected TargetSizeMismatch, got {other:?}"),
        }

        // Nothing beyond the initialize reached the worker.
        ctl.recv().await.unwrap();
        assert!(ctl.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_created_event_records_baseline() {
        let (mut pipeline, _ctl, ev) = test_pipeline();
        pipeline.initialize().await.unwrap();
        ev.send(EngineEvent::Ready).await.unwrap();
        pipeline.pump_events();

        pipeline.create(vec![0; 64], 4, 4, 30, 1, 42).await.unwrap();
        ev.send(EngineEvent::Created { fitness: 123 }).await.unwrap();
        pipeline.pump_events();

        assert_eq!(pipeline.state(), PipelineState::ContextReady);
        assert_eq!(pipeline.baseline_fitness(), Some(123));
    }

    #[tokio::test]
    async fn test_start_stop_flip_state_immediately() {
        let (mut pipeline, _ctl, ev) = test_pipeline();
        pipeline.initialize().await.unwrap();
        ev.send(EngineEvent::Ready).await.unwrap();
        ev.send(EngineEvent::Created { fitness: 0 }).await.unwrap();
        pipeline.pump_events();

        // Stop before any start is a tolerated no-op.
        pipeline.stop().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::ContextReady);

        pipeline.start().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Running);
        pipeline.start().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Running);

        pipeline.stop().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Paused);
        pipeline.stop().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Paused);

        pipeline.start().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Running);
    }

    #[tokio::test]
    async fn test_newer_frame_replaces_unpainted_one() {
        let (mut pipeline, _ctl, ev) = test_pipeline();

        ev.send(frame(500, 1000)).await.unwrap();
        ev.send(frame(400, 2000)).await.unwrap();
        assert_eq!(pipeline.pump_events(), 2);

        let frame = pipeline.take_frame().unwrap();
        assert_eq!(frame.iterations, 2000);
        assert!(pipeline.take_frame().is_none());
        assert!(!pipeline.has_frame());
    }

    #[tokio::test]
    async fn test_error_faults_and_create_recovers() {
        let (mut pipeline, _ctl, ev) = test_pipeline();
        pipeline.initialize().await.unwrap();
        ev.send(EngineEvent::Ready).await.unwrap();
        ev.send(EngineEvent::Created { fitness: 9 }).await.unwrap();
        pipeline.pump_events();
        pipeline.start().await.unwrap();

        ev.send(EngineEvent::Error {
            message: "engine fault".to_string(),
        })
        .await
        .unwrap();
        pipeline.pump_events();

        assert_eq!(pipeline.state(), PipelineState::Faulted);
        assert_eq!(pipeline.last_error(), Some("engine fault"));
        assert!(pipeline.start().await.unwrap_err().is_invalid_transition());

        // Recovery: create is accepted from Faulted and a confirmation
        // clears the recorded error.
        pipeline.create(vec![0; 64], 4, 4, 30, 1, 42).await.unwrap();
        ev.send(EngineEvent::Created { fitness: 5 }).await.unwrap();
        pipeline.pump_events();

        assert_eq!(pipeline.state(), PipelineState::ContextReady);
        assert_eq!(pipeline.last_error(), None);
        assert_eq!(pipeline.baseline_fitness(), Some(5));
    }

    #[tokio::test]
    async fn test_destroyed_event_resets_session_artifacts() {
        let (mut pipeline, _ctl, ev) = test_pipeline();
        pipeline.initialize().await.unwrap();
        ev.send(EngineEvent::Ready).await.unwrap();
        ev.send(EngineEvent::Created { fitness: 0 }).await.unwrap();
        ev.send(frame(100, 1000)).await.unwrap();
        pipeline.pump_events();
        assert!(pipeline.has_frame());

        pipeline.destroy().await.unwrap();
        ev.send(EngineEvent::Destroyed).await.unwrap();
        pipeline.pump_events();

        assert_eq!(pipeline.state(), PipelineState::EngineReady);
        assert!(!pipeline.has_frame());
        assert_eq!(pipeline.baseline_fitness(), None);
    }

    #[tokio::test]
    async fn test_disconnect_marks_worker_gone() {
        let (mut pipeline, _ctl, ev) = test_pipeline();
        assert!(pipeline.is_connected());

        drop(ev);
        pipeline.pump_events();
        assert!(!pipeline.is_connected());
    }
}
