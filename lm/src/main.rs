//! Limner - interactive approximate image search
//!
//! CLI entry point wiring the hill-climb engine to the coordination pipeline.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{CommandFactory, Parser};
use eyre::{Context, Result, eyre};
use tracing::info;

use evolver::{BYTES_PER_PIXEL, HillClimbEngine, buffer_len};
use limner::cli::{Cli, Command};
use limner::config::Config;
use limner::pipeline::{Pipeline, PipelineState};
use limner::render::{RenderLoop, StatsSink};
use limner::worker::WorkerHost;

fn setup_logging(verbose: bool) -> Result<()> {
    // Log to stderr so the progress summary on stdout stays clean
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Some(Command::Run {
            width,
            height,
            fps,
            capacity,
            seed,
            duration,
        }) => {
            let fps = fps.unwrap_or(config.session.target_fps);
            let capacity = capacity.unwrap_or(config.session.capacity);
            let seed = seed.unwrap_or_else(clock_seed);
            cmd_run(&config, width, height, fps, capacity, seed, duration).await
        }
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Millisecond clock seed for runs that did not pin one
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Gradient test pattern standing in for a user-supplied target image
fn test_pattern(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(buffer_len(width, height));
    for y in 0..height {
        for x in 0..width {
            pixels.push((x / 2).min(255) as u8);
            pixels.push((y / 2).min(255) as u8);
            pixels.push(128);
            pixels.push(255);
        }
    }
    debug_assert_eq!(pixels.len(), (width * height) as usize * BYTES_PER_PIXEL);
    pixels
}

/// Run the full lifecycle against a generated target for a bounded duration
async fn cmd_run(
    config: &Config,
    width: u32,
    height: u32,
    fps: u32,
    capacity: u32,
    seed: u64,
    duration: u64,
) -> Result<()> {
    println!("Running limner");
    println!("  Target:   {}x{} gradient", width, height);
    println!("  Capacity: {}", capacity);
    println!("  Seed:     {}", seed);
    println!("  Duration: {}s at {} fps", duration, fps);
    println!();

    let (host, handle, events) =
        WorkerHost::new(config.worker.clone(), Box::new(HillClimbEngine::new()));
    let worker_task = tokio::spawn(host.run());
    info!("Worker spawned");

    let mut pipeline = Pipeline::new(handle, events);

    pipeline.initialize().await?;
    wait_for(&mut pipeline, PipelineState::EngineReady).await?;

    pipeline
        .create(test_pattern(width, height), width, height, fps, capacity, seed)
        .await?;
    wait_for(&mut pipeline, PipelineState::ContextReady).await?;
    info!(baseline = pipeline.baseline_fitness(), "Session ready");

    pipeline.start().await?;

    let mut sink = StatsSink::new();
    let render = RenderLoop::new(fps);

    tokio::select! {
        _ = render.run(&mut pipeline, &mut sink) => {
            return Err(eyre!("worker exited before the run finished"));
        }
        _ = tokio::time::sleep(Duration::from_secs(duration)) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted; shutting down");
        }
    }

    pipeline.stop().await?;
    pipeline.destroy().await?;
    wait_for(&mut pipeline, PipelineState::EngineReady).await?;

    // Dropping the pipeline closes the control channel and the worker exits.
    drop(pipeline);
    worker_task.await.map_err(|e| eyre!("worker task panicked: {e}"))?;

    println!("Frames painted: {}", sink.frames_presented());
    println!("Iterations:     {}", sink.last_iterations());
    match sink.last_fitness() {
        Some(fitness) => println!("Final fitness:  {}", fitness),
        None => println!("Final fitness:  (no frame painted)"),
    }

    Ok(())
}

/// Fold events until the pipeline reaches the wanted state
async fn wait_for(pipeline: &mut Pipeline, want: PipelineState) -> Result<()> {
    let fold = async {
        loop {
            if pipeline.state() == want {
                return Ok(());
            }
            if pipeline.state() == PipelineState::Faulted {
                return Err(eyre!(
                    "pipeline faulted: {}",
                    pipeline.last_error().unwrap_or("unknown error")
                ));
            }
            if pipeline.wait_event().await.is_none() {
                return Err(eyre!("worker exited unexpectedly"));
            }
        }
    };

    tokio::time::timeout(Duration::from_secs(10), fold)
        .await
        .map_err(|_| eyre!("timed out waiting for state '{want}'"))?
}
