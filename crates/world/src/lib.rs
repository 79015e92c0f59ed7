//! Deterministic voxel terrain generation and chunk storage.
//!
//! Terrain is a pure function of the world seed and block position. A
//! [`ChunkStore`] generates chunks on demand, layers player edits on top and
//! persists those edits to a world file.

pub mod biome;
pub mod caves;
mod chunk;
pub mod column;
mod config;
mod error;
pub mod heightmap;
pub mod noise;
pub mod ore;
pub mod persist;
pub mod pregen;
mod storage;
pub mod structure_template;
pub mod structures;
mod terrain;
pub mod trees;
pub mod village;

pub use biome::{BiomeClassifier, BiomeDescriptor, BiomeId, Climate};
pub use caves::{CaveCarver, CaveParams};
pub use chunk::*;
pub use column::{Column, ColumnSynthesizer, Surface};
pub use config::*;
pub use error::*;
pub use heightmap::{HeightSampler, Heightmap};
pub use noise::{NoiseConfig, NoiseField, NoiseGenerator};
pub use ore::{OrePlacer, OreRule};
pub use persist::{WorldFile, WorldRecord};
pub use pregen::{pregenerate, PregenReport};
pub use storage::*;
pub use terrain::*;
pub use trees::{Tree, TreePlacer};
pub use village::{VillageGenerator, VillagePlan};

pub use voxelgen_core::{BlockType, WorldPos};
