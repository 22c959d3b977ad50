use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid record for track {track_id}: {reason}")]
    InvalidRecord { track_id: u32, reason: InvalidReason },

    #[error("zone configuration requested before any frame height is known")]
    ConfigurationMissing,

    #[error("reset requested while a frame is being processed, retry once it completes")]
    ConcurrentResetConflict,

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config Error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Why a single detection record was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidReason {
    #[error("class id {0} is outside the class table of {1} names")]
    UnknownClass(i32, usize),

    #[error("degenerate bounding box {0:?}")]
    DegenerateBox([f32; 4]),
}
