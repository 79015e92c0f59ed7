use thiserror::Error;

/// Invalid world parameters. Fatal at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("chunk size must be positive")]
    ZeroChunkSize,
    #[error("chunk size {0} is too large")]
    ChunkSizeTooLarge(u32),
    #[error("world height {height} is below the minimum of {min}")]
    WorldHeightTooSmall { height: u32, min: u32 },
    #[error("world height {0} is too large")]
    WorldHeightTooLarge(u32),
    #[error("sea level {sea_level} must be below world height {height}")]
    SeaLevelOutOfRange { sea_level: u32, height: u32 },
}

/// Errors surfaced by the block mutation API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("y = {y} is outside the world height range 0..{height}")]
    OutOfWorld { y: i32, height: i32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
