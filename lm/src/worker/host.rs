//! Worker host actor - exclusive owner of the engine and its live session

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use evolver::{Engine, EngineError, EngineSession};

use crate::config::WorkerConfig;

use super::handle::WorkerHandle;
use super::messages::{ControlMessage, CreateRequest, EngineEvent, Frame};

/// The live engine session plus the parameters bound at create time
///
/// Exists only inside the worker host; no other component ever holds a
/// reference to the session.
struct EngineContext {
    session: Box<dyn EngineSession>,
    width: u32,
    height: u32,
    target_fps: u32,
    running: bool,
}

/// The worker host actor
///
/// Translates [`ControlMessage`]s into engine calls and runs the cooperative
/// batch loop. While running, queued control messages are drained before each
/// batch and the task yields between batches, so a stop takes effect within
/// one batch of latency and never mid-batch. While idle, the actor parks on
/// the control channel. Closing the control channel shuts the worker down.
pub struct WorkerHost {
    config: WorkerConfig,
    engine: Box<dyn Engine>,
    rx: mpsc::Receiver<ControlMessage>,
    events: mpsc::Sender<EngineEvent>,
    context: Option<EngineContext>,
    prepared: bool,
}

impl WorkerHost {
    /// Create a worker host with its control handle and event receiver
    ///
    /// The host holds only the receiving end of the control channel; once
    /// the returned handle (and all its clones) drop, the channel closes
    /// and [`run`](Self::run) exits.
    pub fn new(
        config: WorkerConfig,
        engine: Box<dyn Engine>,
    ) -> (Self, WorkerHandle, mpsc::Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel(config.control_buffer);
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer);

        let host = Self {
            config,
            engine,
            rx,
            events: event_tx,
            context: None,
            prepared: false,
        };
        (host, WorkerHandle::new(tx), event_rx)
    }

    /// Run the worker host task
    ///
    /// Consumes the host and runs until the control channel closes or the
    /// event receiver is dropped.
    pub async fn run(mut self) {
        info!("Worker host started");

        loop {
            let msg = if self.running() {
                match self.rx.try_recv() {
                    Ok(msg) => Some(msg),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => break,
                }
            } else {
                match self.rx.recv().await {
                    Some(msg) => Some(msg),
                    None => break,
                }
            };

            match msg {
                Some(msg) => {
                    if !self.handle_message(msg).await {
                        break;
                    }
                }
                None => {
                    if !self.run_batch().await {
                        break;
                    }
                    // Deferred reschedule: the only suspension point of the
                    // batch loop, and the only place cancellation is observed.
                    tokio::task::yield_now().await;
                }
            }
        }

        info!("Worker host stopped");
    }

    fn running(&self) -> bool {
        self.context.as_ref().is_some_and(|ctx| ctx.running)
    }

    /// Send an event to the coordinator; false means the receiver is gone
    ///
    /// Takes `&mut self` so the borrow held across the send is exclusive;
    /// a shared borrow here would demand `Sync` of the boxed engine.
    async fn emit(&mut self, event: EngineEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    async fn handle_message(&mut self, msg: ControlMessage) -> bool {
        match msg {
            ControlMessage::Initialize => {
                debug!(already_prepared = self.prepared, "initialize requested");
                match self.engine.prepare() {
                    Ok(()) => {
                        self.prepared = true;
                        info!("Engine prepared");
                        self.emit(EngineEvent::Ready).await
                    }
                    Err(e) => {
                        warn!(error = %e, "Engine preparation failed");
                        self.emit(EngineEvent::Error { message: e.message() }).await
                    }
                }
            }

            ControlMessage::Create(request) => self.handle_create(request).await,

            ControlMessage::Start => {
                match self.context.as_mut() {
                    Some(ctx) if ctx.running => debug!("start ignored; already running"),
                    Some(ctx) => {
                        ctx.running = true;
                        info!(target_fps = ctx.target_fps, "Batch loop started");
                    }
                    None => warn!("start ignored; no session exists"),
                }
                true
            }

            ControlMessage::Stop => {
                match self.context.as_mut() {
                    Some(ctx) if ctx.running => {
                        ctx.running = false;
                        info!("Batch loop stopping at the batch boundary");
                    }
                    Some(_) => debug!("stop ignored; not running"),
                    None => warn!("stop ignored; no session exists"),
                }
                true
            }

            ControlMessage::Destroy => {
                match self.context.take() {
                    Some(ctx) => {
                        // Dropping the session releases engine resources.
                        drop(ctx);
                        info!("Session destroyed");
                    }
                    // Confirm anyway so the coordinator can treat Destroyed
                    // as an acknowledgement either way.
                    None => debug!("destroy with no session; confirming anyway"),
                }
                self.emit(EngineEvent::Destroyed).await
            }
        }
    }

    async fn handle_create(&mut self, request: CreateRequest) -> bool {
        debug!(?request, "create requested");

        if !self.prepared {
            warn!("create rejected; engine not initialized");
            return self
                .emit(EngineEvent::Error {
                    message: "engine not initialized".to_string(),
                })
                .await;
        }
        if self.context.is_some() {
            warn!("create rejected; a session already exists");
            return self
                .emit(EngineEvent::Error {
                    message: "a session already exists; destroy it first".to_string(),
                })
                .await;
        }
        if request.pixels.len() != request.expected_len() {
            warn!(
                actual = request.pixels.len(),
                expected = request.expected_len(),
                "create rejected; target buffer length mismatch"
            );
            return self
                .emit(EngineEvent::Error {
                    message: format!(
                        "target buffer length {} does not match {}x{}",
                        request.pixels.len(),
                        request.width,
                        request.height
                    ),
                })
                .await;
        }

        match self.create_session(&request) {
            Ok((session, fitness)) => {
                self.context = Some(EngineContext {
                    session,
                    width: request.width,
                    height: request.height,
                    target_fps: request.target_fps,
                    running: false,
                });
                info!(
                    width = request.width,
                    height = request.height,
                    capacity = request.capacity,
                    seed = request.seed,
                    fitness,
                    "Session created"
                );
                self.emit(EngineEvent::Created { fitness }).await
            }
            Err(e) => {
                // No context is installed on any failure in this sequence.
                warn!(error = %e, "Session creation failed");
                self.emit(EngineEvent::Error { message: e.message() }).await
            }
        }
    }

    /// Create a session, upload the target, and run the initial scoring pass
    fn create_session(&mut self, request: &CreateRequest) -> Result<(Box<dyn EngineSession>, u64), EngineError> {
        let mut session =
            self.engine
                .create_session(request.width, request.height, request.capacity, request.seed)?;

        let target = session.target_mut()?;
        if target.len() != request.pixels.len() {
            return Err(EngineError::TargetSizeMismatch {
                expected: target.len(),
                actual: request.pixels.len(),
            });
        }
        target.copy_from_slice(&request.pixels);

        let fitness = session.evaluate_best()?;
        Ok((session, fitness))
    }

    /// Run one batch and emit a frame, or halt the loop on engine failure
    async fn run_batch(&mut self) -> bool {
        let steps = self.config.batch_size;
        let Some(ctx) = self.context.as_mut() else {
            return true;
        };

        match capture_frame(ctx, steps) {
            Ok(frame) => {
                debug!(fitness = frame.fitness, iterations = frame.iterations, "batch complete");
                self.emit(EngineEvent::Frame(frame)).await
            }
            Err(e) => {
                warn!(error = %e, "Engine failure; halting batch loop");
                // The faulted session is unusable; dropping it lets a later
                // create install a fresh one without a destroy round-trip.
                self.context = None;
                self.emit(EngineEvent::Error { message: e.message() }).await
            }
        }
    }
}

/// Run one batch of steps and snapshot the best candidate into a frame
///
/// The pixel copy out of the engine buffer is the single per-batch copy;
/// from here the frame moves by ownership all the way to the sink.
fn capture_frame(ctx: &mut EngineContext, steps: u32) -> Result<Frame, EngineError> {
    let fitness = ctx.session.run_steps(steps)?;
    let pixels = ctx.session.best_image()?.to_vec();
    debug_assert_eq!(pixels.len(), evolver::buffer_len(ctx.width, ctx.height));
    let iterations = ctx.session.iterations()?;

    Ok(Frame {
        pixels,
        fitness,
        iterations,
    })
}
