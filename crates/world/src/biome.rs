//! Biome system for terrain generation.
//!
//! Assigns biomes from three climate signals: temperature, humidity and the
//! continental elevation that also drives terrain height. Classification is a
//! fixed, ordered rule list so every climate maps to exactly one biome.

use crate::noise::{fold_seed, NoiseConfig, NoiseGenerator};
use serde::{Deserialize, Serialize};
use voxelgen_core::BlockType;

/// Below this elevation a column is ocean.
pub const OCEAN_ELEVATION: f64 = -0.2;
/// Above this elevation a column is mountains.
pub const MOUNTAIN_ELEVATION: f64 = 0.45;
/// Below this temperature a column is tundra.
pub const COLD_TEMPERATURE: f64 = 0.35;
/// Above this temperature a dry column is desert.
pub const HOT_TEMPERATURE: f64 = 0.65;
/// Below this humidity a hot column is desert.
pub const DRY_HUMIDITY: f64 = 0.4;
/// At or above this humidity a column is forest.
pub const WET_HUMIDITY: f64 = 0.5;
/// Standing water in biomes colder than this freezes at the top.
pub const FREEZING_TEMPERATURE: f32 = 0.2;

/// Humidity is sampled at a shifted coordinate so it does not track temperature.
const HUMIDITY_OFFSET: f64 = 7919.0;

/// Biome identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomeId {
    Plains,
    Forest,
    Desert,
    Mountains,
    Ocean,
    Tundra,
}

impl BiomeId {
    /// Get all biome IDs (for iteration).
    pub fn all() -> &'static [BiomeId] {
        &[
            BiomeId::Plains,
            BiomeId::Forest,
            BiomeId::Desert,
            BiomeId::Mountains,
            BiomeId::Ocean,
            BiomeId::Tundra,
        ]
    }

    /// Static generation parameters for this biome.
    pub fn descriptor(self) -> &'static BiomeDescriptor {
        match self {
            BiomeId::Plains => &PLAINS,
            BiomeId::Forest => &FOREST,
            BiomeId::Desert => &DESERT,
            BiomeId::Mountains => &MOUNTAINS,
            BiomeId::Ocean => &OCEAN,
            BiomeId::Tundra => &TUNDRA,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BiomeId::Plains => "plains",
            BiomeId::Forest => "forest",
            BiomeId::Desert => "desert",
            BiomeId::Mountains => "mountains",
            BiomeId::Ocean => "ocean",
            BiomeId::Tundra => "tundra",
        }
    }
}

/// Generation parameters for one biome.
#[derive(Debug, Clone, PartialEq)]
pub struct BiomeDescriptor {
    pub id: BiomeId,
    /// Block at the column's surface height
    pub surface_block: BlockType,
    /// Block for the band just below the surface
    pub subsurface_block: BlockType,
    /// Thickness of the subsurface band
    pub subsurface_depth: i32,
    /// Per-column probability of a tree anchor
    pub tree_chance: f64,
    /// Per-region probability of a village
    pub village_chance: f64,
    /// Nominal temperature [0.0, 1.0] (0=cold, 1=hot)
    pub temperature: f32,
    /// Nominal humidity [0.0, 1.0] (0=dry, 1=wet)
    pub humidity: f32,
    /// Surfaces this many blocks above sea level turn to snow
    pub snow_line: Option<i32>,
}

pub const PLAINS: BiomeDescriptor = BiomeDescriptor {
    id: BiomeId::Plains,
    surface_block: BlockType::Grass,
    subsurface_block: BlockType::Dirt,
    subsurface_depth: 3,
    tree_chance: 0.004,
    village_chance: 0.35,
    temperature: 0.5,
    humidity: 0.4,
    snow_line: None,
};

pub const FOREST: BiomeDescriptor = BiomeDescriptor {
    id: BiomeId::Forest,
    surface_block: BlockType::Grass,
    subsurface_block: BlockType::Dirt,
    subsurface_depth: 3,
    tree_chance: 0.05,
    village_chance: 0.1,
    temperature: 0.5,
    humidity: 0.7,
    snow_line: None,
};

pub const DESERT: BiomeDescriptor = BiomeDescriptor {
    id: BiomeId::Desert,
    surface_block: BlockType::Sand,
    subsurface_block: BlockType::Sand,
    subsurface_depth: 4,
    tree_chance: 0.0,
    village_chance: 0.2,
    temperature: 0.9,
    humidity: 0.1,
    snow_line: None,
};

pub const MOUNTAINS: BiomeDescriptor = BiomeDescriptor {
    id: BiomeId::Mountains,
    surface_block: BlockType::Grass,
    subsurface_block: BlockType::Dirt,
    subsurface_depth: 2,
    tree_chance: 0.01,
    village_chance: 0.0,
    temperature: 0.3,
    humidity: 0.3,
    snow_line: Some(36),
};

pub const OCEAN: BiomeDescriptor = BiomeDescriptor {
    id: BiomeId::Ocean,
    surface_block: BlockType::Sand,
    subsurface_block: BlockType::Sand,
    subsurface_depth: 3,
    tree_chance: 0.0,
    village_chance: 0.0,
    temperature: 0.5,
    humidity: 0.5,
    snow_line: None,
};

pub const TUNDRA: BiomeDescriptor = BiomeDescriptor {
    id: BiomeId::Tundra,
    surface_block: BlockType::Snow,
    subsurface_block: BlockType::Dirt,
    subsurface_depth: 2,
    tree_chance: 0.008,
    village_chance: 0.1,
    temperature: 0.1,
    humidity: 0.3,
    snow_line: None,
};

impl BiomeDescriptor {
    /// Whether standing water in this biome freezes at the top.
    pub fn freezes(&self) -> bool {
        self.temperature < FREEZING_TEMPERATURE
    }
}

/// Climate signals at one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Climate {
    /// [0.0, 1.0]
    pub temperature: f64,
    /// [0.0, 1.0]
    pub humidity: f64,
    /// Continental noise in [-1.0, 1.0]
    pub elevation: f64,
}

/// Map a climate to a biome.
///
/// Rules are checked in order and the last one is a catch-all, so NaN inputs
/// (which fail every comparison) land on plains.
pub fn select_biome(climate: &Climate) -> BiomeId {
    if climate.elevation < OCEAN_ELEVATION {
        BiomeId::Ocean
    } else if climate.elevation > MOUNTAIN_ELEVATION {
        BiomeId::Mountains
    } else if climate.temperature < COLD_TEMPERATURE {
        BiomeId::Tundra
    } else if climate.temperature > HOT_TEMPERATURE && climate.humidity < DRY_HUMIDITY {
        BiomeId::Desert
    } else if climate.humidity >= WET_HUMIDITY {
        BiomeId::Forest
    } else {
        BiomeId::Plains
    }
}

/// Biome classifier that generates biomes from world coordinates.
#[derive(Clone)]
pub struct BiomeClassifier {
    temperature_noise: NoiseGenerator,
    humidity_noise: NoiseGenerator,
    elevation_noise: NoiseGenerator,
}

impl BiomeClassifier {
    /// Create a new classifier from world seed.
    pub fn new(world_seed: u64) -> Self {
        let seed = fold_seed(world_seed);

        Self {
            temperature_noise: NoiseGenerator::new(NoiseConfig::temperature(seed)),
            humidity_noise: NoiseGenerator::new(NoiseConfig::humidity(seed)),
            elevation_noise: NoiseGenerator::new(NoiseConfig::continental(seed)),
        }
    }

    /// Sample the three climate signals at a column.
    pub fn climate(&self, world_x: i32, world_z: i32) -> Climate {
        let x = world_x as f64;
        let z = world_z as f64;

        // Map from [-1, 1] to [0, 1]
        let temperature = (self.temperature_noise.sample_2d(x, z) + 1.0) * 0.5;
        let humidity = (self
            .humidity_noise
            .sample_2d(x + HUMIDITY_OFFSET, z - HUMIDITY_OFFSET)
            + 1.0)
            * 0.5;

        Climate {
            temperature,
            humidity,
            elevation: self.elevation_noise.sample_2d(x, z),
        }
    }

    /// Get biome at world coordinates.
    pub fn classify(&self, world_x: i32, world_z: i32) -> BiomeId {
        select_biome(&self.climate(world_x, world_z))
    }

    /// Get biome descriptor at world coordinates.
    pub fn descriptor(&self, world_x: i32, world_z: i32) -> &'static BiomeDescriptor {
        self.classify(world_x, world_z).descriptor()
    }
}
