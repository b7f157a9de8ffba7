//! Error types.

use std::io;

use thiserror::Error;

/// Invalid run configuration, detected before the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },

    /// Thread count outside `1..=height`.
    #[error("thread count {threads} must be between 1 and the image height {height}")]
    BadThreadCount { threads: usize, height: usize },

    /// Distributed mode needs one worker address per thread.
    #[error("distributed mode needs {threads} worker addresses, got {addresses}")]
    WorkerCountMismatch { threads: usize, addresses: usize },
}

/// A band the slice stepper cannot evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("band [{start_y}, {start_y}+{height}) does not fit an image of height {image_height}")]
    OutOfBounds { start_y: usize, height: usize, image_height: usize },

    #[error("expected {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },

    #[error("row {row} has width {actual}, expected {expected}")]
    RowWidth { row: usize, expected: usize, actual: usize },

    #[error("{which} halo has width {actual}, expected {expected}")]
    HaloWidth { which: &'static str, expected: usize, actual: usize },

    /// A band that does not cover the whole grid cannot wrap onto itself.
    #[error("{which} halo missing for a partial band")]
    MissingHalo { which: &'static str },
}

/// Failure while computing a band, locally or on a remote worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker {band} at {addr}: connection failed: {source}")]
    Connect { band: usize, addr: String, source: io::Error },

    #[error("worker call failed: {0}")]
    Io(#[from] io::Error),

    #[error("malformed frame: {0}")]
    Codec(#[from] bincode::Error),

    #[error("frame of {0} bytes exceeds the limit")]
    FrameTooLarge(usize),

    #[error("worker rejected the request: {0}")]
    Rejected(String),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error("no worker address configured for band {0}")]
    NoAddress(usize),

    #[error("band task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Image load/save failure.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image i/o on {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("bad image header: {0}")]
    Header(String),

    #[error("image is {actual_width}x{actual_height}, expected {width}x{height}")]
    Dimensions { width: usize, height: usize, actual_width: usize, actual_height: usize },

    #[error("expected {expected} pixels, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("pixel {offset} has value {value:#04x}; cells must be 0x00 or 0xFF")]
    BadPixel { offset: usize, value: u8 },

    #[error("no image named {0}")]
    Missing(String),
}

/// Anything that halts a run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("band {band}: {source}")]
    Worker { band: usize, source: WorkerError },

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("band results do not assemble into a {width}x{height} grid")]
    Assembly { width: usize, height: usize },
}
