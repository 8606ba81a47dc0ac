//! Seeded random-mutation hill climber
//!
//! Reference [`Engine`] implementation: keeps a pool of candidate images,
//! proposes single-pixel mutations, and accepts only strict improvements.
//! Deterministic for a given seed, which is what the pipeline tests need;
//! the search itself is deliberately naive.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::contract::{Engine, EngineSession};
use super::error::EngineError;
use super::{BYTES_PER_PIXEL, buffer_len};

/// Largest edge length a session will accept.
///
/// Guards against accidental multi-gigabyte allocations from a bad create;
/// real targets in this pipeline are downscaled well below this.
const MAX_DIMENSION: u32 = 8192;

/// Hill-climbing engine factory
#[derive(Debug, Default)]
pub struct HillClimbEngine {
    prepared: bool,
}

impl HillClimbEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Engine for HillClimbEngine {
    fn prepare(&mut self) -> Result<(), EngineError> {
        debug!(already_prepared = self.prepared, "HillClimbEngine::prepare: called");
        self.prepared = true;
        Ok(())
    }

    fn create_session(
        &mut self,
        width: u32,
        height: u32,
        capacity: u32,
        seed: u64,
    ) -> Result<Box<dyn EngineSession>, EngineError> {
        debug!(width, height, capacity, seed, "HillClimbEngine::create_session: called");

        if !self.prepared {
            return Err(EngineError::NotPrepared);
        }
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        if capacity == 0 {
            return Err(EngineError::InvalidCapacity(capacity));
        }

        let len = buffer_len(width, height);
        let pool = (0..capacity)
            .map(|_| Candidate {
                pixels: vec![0; len],
                fitness: u64::MAX,
            })
            .collect();

        Ok(Box::new(HillClimbSession {
            width,
            height,
            target: vec![0; len],
            pool,
            best: 0,
            iterations: 0,
            rng: StdRng::seed_from_u64(seed),
            scored: false,
        }))
    }
}

/// One candidate image and its cached fitness
struct Candidate {
    pixels: Vec<u8>,
    fitness: u64,
}

/// One hill-climbing run against a single target
struct HillClimbSession {
    width: u32,
    height: u32,
    target: Vec<u8>,
    pool: Vec<Candidate>,
    /// Index of the lowest-fitness candidate. Only valid once `scored`.
    best: usize,
    iterations: u64,
    rng: StdRng,
    scored: bool,
}

/// Sum of absolute channel differences between two equal-length RGBA buffers.
fn pixel_error(a: &[u8], b: &[u8]) -> u64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum()
}

impl HillClimbSession {
    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Recompute `best` as the argmin over the pool.
    fn reindex_best(&mut self) {
        self.best = self
            .pool
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.fitness)
            .map(|(i, _)| i)
            .unwrap_or(0);
    }
}

impl EngineSession for HillClimbSession {
    fn target_mut(&mut self) -> Result<&mut [u8], EngineError> {
        // Writing a new target invalidates all cached fitness values.
        self.scored = false;
        Ok(&mut self.target)
    }

    fn evaluate_best(&mut self) -> Result<u64, EngineError> {
        for candidate in &mut self.pool {
            candidate.fitness = pixel_error(&candidate.pixels, &self.target);
        }
        self.reindex_best();
        self.scored = true;

        let fitness = self.pool[self.best].fitness;
        debug!(fitness, pool = self.pool.len(), "HillClimbSession::evaluate_best: scored");
        Ok(fitness)
    }

    fn run_steps(&mut self, steps: u32) -> Result<u64, EngineError> {
        if !self.scored {
            return Err(EngineError::Failed(
                "session not scored; evaluate_best must run before stepping".to_string(),
            ));
        }

        let pixels = self.pixel_count();
        for _ in 0..steps {
            let who = self.rng.random_range(0..self.pool.len());
            let at = self.rng.random_range(0..pixels) * BYTES_PER_PIXEL;
            let proposal: [u8; BYTES_PER_PIXEL] = self.rng.random();

            let before = pixel_error(
                &self.pool[who].pixels[at..at + BYTES_PER_PIXEL],
                &self.target[at..at + BYTES_PER_PIXEL],
            );
            let after = pixel_error(&proposal, &self.target[at..at + BYTES_PER_PIXEL]);

            // Strict improvement only, so per-candidate fitness never rises.
            if after < before {
                let candidate = &mut self.pool[who];
                candidate.pixels[at..at + BYTES_PER_PIXEL].copy_from_slice(&proposal);
                candidate.fitness = candidate.fitness - before + after;
                let fitness = candidate.fitness;
                if fitness < self.pool[self.best].fitness {
                    self.best = who;
                }
            }

            self.iterations += 1;
        }

        Ok(self.pool[self.best].fitness)
    }

    fn best_image(&self) -> Result<&[u8], EngineError> {
        Ok(&self.pool[self.best].pixels)
    }

    fn iterations(&self) -> Result<u64, EngineError> {
        Ok(self.iterations)
    }
}
