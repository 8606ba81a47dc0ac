//! Display-paced frame consumption

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::pipeline::Pipeline;
use crate::worker::Frame;

/// Consumer of painted frames
///
/// Takes the frame by value; the pixel buffer moves here from the pipeline
/// slot without another copy.
pub trait FrameSink: Send {
    fn present(&mut self, frame: Frame);
}

/// Sink that records progress counters instead of painting pixels
#[derive(Debug, Default)]
pub struct StatsSink {
    frames_presented: u64,
    last_fitness: Option<u64>,
    last_iterations: u64,
}

impl StatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn last_fitness(&self) -> Option<u64> {
        self.last_fitness
    }

    pub fn last_iterations(&self) -> u64 {
        self.last_iterations
    }
}

impl FrameSink for StatsSink {
    fn present(&mut self, frame: Frame) {
        self.frames_presented += 1;
        self.last_fitness = Some(frame.fitness);
        self.last_iterations = frame.iterations;
        debug!(
            fitness = frame.fitness,
            iterations = frame.iterations,
            "frame presented"
        );
    }
}

/// Display-synchronized consumer loop
///
/// Fires once per refresh interval: drains worker events, then paints the
/// buffered frame if one is pending. Missed ticks are skipped rather than
/// queued, so at most one paint is in flight per interval even when a sink
/// paints slower than the refresh rate.
pub struct RenderLoop {
    period: Duration,
}

impl RenderLoop {
    /// Create a loop paced at `target_fps` refreshes per second
    pub fn new(target_fps: u32) -> Self {
        let fps = target_fps.max(1);
        Self {
            period: Duration::from_secs_f64(1.0 / f64::from(fps)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Drive the pipeline until the worker disconnects
    ///
    /// Callers wanting a bounded run race this against a timer.
    pub async fn run(&self, pipeline: &mut Pipeline, sink: &mut dyn FrameSink) {
        info!(period_ms = self.period.as_millis() as u64, "Render loop started");

        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            pipeline.pump_events();
            if let Some(frame) = pipeline.take_frame() {
                sink.present(frame);
            }
            if !pipeline.is_connected() {
                break;
            }
        }

        info!("Render loop stopped");
    }
}
