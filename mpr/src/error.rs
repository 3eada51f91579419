//! Module containing the universal error type
use thiserror::Error;

/// Universal error type for this crate
#[derive(Error, Debug)]
pub enum Error {
    /// Tape contains no clauses
    #[error("tape is empty")]
    EmptyTape,

    /// A clause refers to an operand which does not precede it
    #[error("clause {0} refers to operand {1}, which does not precede it")]
    BadOperand(usize, u32),

    /// Output index is outside of the tape
    #[error("output index ({0}) exceeds tape length ({1})")]
    BadOutput(usize, usize),

    /// Tape does not fit into the per-lane register budget
    #[error("tape length ({0}) exceeds the per-lane register budget ({1})")]
    TapeTooLong(usize, usize),

    /// Choice slice length does not match choice count
    #[error("choice slice length ({0}) does not match choice count ({1})")]
    BadChoiceSlice(usize, usize),

    /// The per-frame subtape store ran out of space
    #[error("subtape store is full (capacity: {0} clauses)")]
    SubtapeStoreFull(usize),

    /// The subtape store cannot hold even one subtape of the root tape
    #[error("subtape store capacity ({0}) is smaller than the tape ({1})")]
    SubtapeStoreTooSmall(usize, usize),

    /// Each tile must be divisible by subsequent tiles
    #[error("bad tile sizes; {0} is not divisible by {1}")]
    BadTileSize(u32, u32),

    /// Tile sizes must be in descending order
    #[error("bad tile order; {0} is not larger than {1}")]
    BadTileOrder(u32, u32),

    /// Image size must be non-zero
    #[error("image size must be non-zero")]
    BadImageSize,

    /// Only 2D and 3D rendering is supported
    #[error("unsupported dimension {0}; expected 2 or 3")]
    BadDimension(usize),

    /// A stage was configured without any lanes
    #[error("lane count for the {0} stage must be non-zero")]
    NoLanes(&'static str),

    /// The frame has not been rendered yet
    #[error("frame is not complete")]
    FrameIncomplete,

    /// Texture does not match the image size
    #[error("texture size ({0}×{1}) does not match image size ({2}×{2})")]
    BadTextureSize(u32, u32, u32),

    /// Could not build the worker thread pool
    #[error("could not build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
