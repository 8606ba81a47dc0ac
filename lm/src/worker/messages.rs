//! Message types for the worker host
//!
//! The protocol is a closed, versionless set of tags. Every message is
//! self-contained: the receiver acts on it without reading any state other
//! than its own. Pixel buffers are moved, never cloned, so the per-batch cost
//! stays proportional to the image size exactly once.

use std::fmt;

use evolver::buffer_len;

/// Control messages sent coordinator -> worker host
#[derive(Debug)]
pub enum ControlMessage {
    /// Prepare the engine; must precede any create
    Initialize,

    /// Create an engine session for a new target image
    Create(CreateRequest),

    /// Begin (or resume) the batch loop
    Start,

    /// Halt the batch loop at the next batch boundary
    Stop,

    /// Release the session and confirm
    Destroy,
}

/// Payload for [`ControlMessage::Create`]
pub struct CreateRequest {
    /// Target image, RGBA8 row-major, `width * height * 4` bytes
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Display refresh rate the frames are destined for
    pub target_fps: u32,
    /// Candidate-pool capacity handed to the engine
    pub capacity: u32,
    /// Engine random seed
    pub seed: u64,
}

impl CreateRequest {
    /// Expected pixel-buffer length for the requested dimensions
    pub fn expected_len(&self) -> usize {
        buffer_len(self.width, self.height)
    }
}

impl fmt::Debug for CreateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Elide the pixel payload; dumping megabytes into logs helps no one.
        f.debug_struct("CreateRequest")
            .field("pixels_len", &self.pixels.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("target_fps", &self.target_fps)
            .field("capacity", &self.capacity)
            .field("seed", &self.seed)
            .finish()
    }
}

/// Events sent worker host -> coordinator
#[derive(Debug)]
pub enum EngineEvent {
    /// Engine prepared; creates are now accepted
    Ready,

    /// Session created; `fitness` is the creation-time baseline score
    Created { fitness: u64 },

    /// One batch completed; ownership of the frame moves to the receiver
    Frame(Frame),

    /// Session released (or there was none to release)
    Destroyed,

    /// Engine failure; the batch loop has halted
    Error { message: String },
}

/// One emitted snapshot of the best candidate image
pub struct Frame {
    /// RGBA8 row-major pixels, `width * height * 4` bytes of the session
    pub pixels: Vec<u8>,
    /// Approximation error of this candidate; lower is better
    pub fitness: u64,
    /// Total engine iterations executed when this frame was captured
    pub iterations: u64,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("pixels_len", &self.pixels.len())
            .field("fitness", &self.fitness)
            .field("iterations", &self.iterations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_expected_len() {
        let req = CreateRequest {
            pixels: vec![0; 64],
            width: 4,
            height: 4,
            target_fps: 30,
            capacity: 1,
            seed: 42,
        };
        assert_eq!(req.expected_len(), 64);
        assert_eq!(req.pixels.len(), req.expected_len());
    }

    #[test]
    fn test_debug_elides_pixels() {
        let frame = Frame {
            pixels: vec![7; 4096],
            fitness: 1234,
            iterations: 5000,
        };
        let rendered = format!("{frame:?}");
        assert!(rendered.contains("pixels_len: 4096"));
        assert!(rendered.contains("fitness: 1234"));
        assert!(!rendered.contains("7, 7"));
    }
}
