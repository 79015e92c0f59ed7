//! World parameters supplied by the embedding application.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest world height that leaves room for bedrock, a surface and a sky.
pub const MIN_WORLD_HEIGHT: u32 = 8;

/// Default chunk edge length in blocks.
pub const DEFAULT_CHUNK_SIZE: u32 = 16;

/// Default world height in blocks.
pub const DEFAULT_WORLD_HEIGHT: u32 = 256;

/// Default sea level.
pub const DEFAULT_SEA_LEVEL: u32 = 64;

/// Process-wide constants for one world instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed. Every noise table and placement hash derives from it.
    pub seed: u64,
    /// Chunk edge length (X and Z) in blocks.
    pub chunk_size: u32,
    /// Number of block layers; valid y is `0..world_height`.
    pub world_height: u32,
    /// Water fills columns below this height.
    pub sea_level: u32,
    /// Maximum number of resident chunks before clean chunks are evicted.
    pub cache_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            world_height: DEFAULT_WORLD_HEIGHT,
            sea_level: DEFAULT_SEA_LEVEL,
            cache_capacity: 1024,
        }
    }
}

impl WorldConfig {
    /// Default configuration with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Reject parameters the generator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.chunk_size > i32::MAX as u32 / 2 {
            return Err(ConfigError::ChunkSizeTooLarge(self.chunk_size));
        }
        if self.world_height < MIN_WORLD_HEIGHT {
            return Err(ConfigError::WorldHeightTooSmall {
                height: self.world_height,
                min: MIN_WORLD_HEIGHT,
            });
        }
        if self.world_height > i32::MAX as u32 {
            return Err(ConfigError::WorldHeightTooLarge(self.world_height));
        }
        if self.sea_level >= self.world_height {
            return Err(ConfigError::SeaLevelOutOfRange {
                sea_level: self.sea_level,
                height: self.world_height,
            });
        }
        Ok(())
    }

    /// Chunk and height extents as signed integers for coordinate math.
    pub fn dims(&self) -> ChunkDims {
        ChunkDims {
            size: self.chunk_size as i32,
            height: self.world_height as i32,
        }
    }
}

/// Chunk extents shared by every chunk of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDims {
    /// Edge length in X and Z.
    pub size: i32,
    /// World height; valid y is `0..height`.
    pub height: i32,
}

impl ChunkDims {
    /// Blocks per horizontal layer.
    pub fn columns(self) -> usize {
        (self.size as usize) * (self.size as usize)
    }
}
