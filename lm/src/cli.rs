//! CLI command definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Interactive approximate image search pipeline
#[derive(Parser)]
#[command(name = "lm", about = "Evolve an approximation of a target image", version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the pipeline against a generated test pattern
    Run {
        /// Target image width in pixels
        #[arg(long, default_value_t = 128)]
        width: u32,

        /// Target image height in pixels
        #[arg(long, default_value_t = 128)]
        height: u32,

        /// Display refresh rate in frames per second (default from config)
        #[arg(long)]
        fps: Option<u32>,

        /// Candidate pool capacity (default from config)
        #[arg(long)]
        capacity: Option<u32>,

        /// Engine random seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,

        /// How long to run before stopping, in seconds
        #[arg(long, default_value_t = 5)]
        duration: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["lm", "run"]).unwrap();
        match cli.command {
            Some(Command::Run {
                width,
                height,
                fps,
                capacity,
                seed,
                duration,
            }) => {
                assert_eq!(width, 128);
                assert_eq!(height, 128);
                assert_eq!(fps, None);
                assert_eq!(capacity, None);
                assert_eq!(seed, None);
                assert_eq!(duration, 5);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from([
            "lm", "-v", "run", "--width", "64", "--height", "48", "--fps", "60", "--seed", "7",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Some(Command::Run {
                width,
                height,
                fps,
                seed,
                ..
            }) => {
                assert_eq!(width, 64);
                assert_eq!(height, 48);
                assert_eq!(fps, Some(60));
                assert_eq!(seed, Some(7));
            }
            _ => panic!("expected run command"),
        }
    }
}
