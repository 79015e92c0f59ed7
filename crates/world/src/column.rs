//! Per-column block layering.
//!
//! A column is a pure function of (seed, x, z): bedrock floor, stone body
//! with caves and ores, a biome-specific subsurface band, the surface block
//! and standing water up to sea level. Vegetation and structures are added
//! later at chunk scope.

use voxelgen_core::BlockType;

use crate::biome::{BiomeClassifier, BiomeDescriptor, BiomeId};
use crate::caves::CaveCarver;
use crate::config::WorldConfig;
use crate::heightmap::HeightSampler;
use crate::ore::OrePlacer;

/// Non-air blocks of one column, ascending by Y.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub height: i32,
    pub biome: BiomeId,
    pub blocks: Vec<(i32, BlockType)>,
}

impl Column {
    /// Block at `y`, air when the column holds nothing there.
    pub fn block_at(&self, y: i32) -> BlockType {
        self.blocks
            .binary_search_by_key(&y, |&(by, _)| by)
            .map(|idx| self.blocks[idx].1)
            .unwrap_or(BlockType::Air)
    }
}

/// Top of a column, for vegetation and structure placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub height: i32,
    pub biome: BiomeId,
    pub block: BlockType,
}

/// Builds columns from the world's noise layers.
#[derive(Clone)]
pub struct ColumnSynthesizer {
    heights: HeightSampler,
    biomes: BiomeClassifier,
    caves: CaveCarver,
    ores: OrePlacer,
    sea_level: i32,
}

impl ColumnSynthesizer {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            heights: HeightSampler::new(config),
            biomes: BiomeClassifier::new(config.seed),
            caves: CaveCarver::new(config),
            ores: OrePlacer::new(config.seed),
            sea_level: config.sea_level as i32,
        }
    }

    pub fn sea_level(&self) -> i32 {
        self.sea_level
    }

    pub fn heights(&self) -> &HeightSampler {
        &self.heights
    }

    pub fn biomes(&self) -> &BiomeClassifier {
        &self.biomes
    }

    pub fn biome_at(&self, x: i32, z: i32) -> BiomeId {
        self.biomes.classify(x, z)
    }

    /// Surface height, biome and surface block without building the column.
    pub fn surface(&self, x: i32, z: i32) -> Surface {
        let height = self.heights.surface_height(x, z);
        let biome = self.biomes.classify(x, z);
        Surface {
            height,
            biome,
            block: self.surface_block(biome.descriptor(), height),
        }
    }

    pub fn surface_block_at(&self, x: i32, z: i32) -> BlockType {
        self.surface(x, z).block
    }

    fn surface_block(&self, descriptor: &BiomeDescriptor, height: i32) -> BlockType {
        if descriptor.id == BiomeId::Ocean && height < self.sea_level {
            return BlockType::Water;
        }
        match descriptor.snow_line {
            Some(offset) if height > self.sea_level + offset => BlockType::Snow,
            _ => descriptor.surface_block,
        }
    }

    pub fn synthesize(&self, x: i32, z: i32) -> Column {
        let height = self.heights.surface_height(x, z);
        let biome = self.biomes.classify(x, z);
        let descriptor = biome.descriptor();

        let mut blocks = Vec::with_capacity((height.max(self.sea_level) + 1) as usize);
        blocks.push((0, BlockType::Bedrock));

        let band_start = (height - descriptor.subsurface_depth).max(1);
        for y in 1..band_start {
            if self.caves.is_cavity(x, y, z, height) {
                continue;
            }
            let block = self.ores.ore_at(x, y, z).unwrap_or(BlockType::Stone);
            blocks.push((y, block));
        }
        for y in band_start..height {
            blocks.push((y, descriptor.subsurface_block));
        }

        if height > 0 {
            blocks.push((height, self.surface_block(descriptor, height)));
        }

        for y in (height + 1)..=self.sea_level {
            let block = if y == self.sea_level && descriptor.freezes() {
                BlockType::Ice
            } else {
                BlockType::Water
            };
            blocks.push((y, block));
        }

        Column {
            height,
            biome,
            blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth(seed: u64) -> ColumnSynthesizer {
        ColumnSynthesizer::new(&WorldConfig::with_seed(seed))
    }

    #[test]
    fn test_bedrock_floor() {
        let synth = synth(12345);
        for x in -8..8 {
            for z in -8..8 {
                let column = synth.synthesize(x * 13, z * 13);
                assert_eq!(column.blocks[0], (0, BlockType::Bedrock));
                assert_eq!(column.block_at(0), BlockType::Bedrock);
            }
        }
    }

    #[test]
    fn test_blocks_are_sorted_and_never_air() {
        let synth = synth(7);
        for x in 0..16 {
            let column = synth.synthesize(x * 101, -x * 57);
            assert!(column.blocks.windows(2).all(|w| w[0].0 < w[1].0));
            assert!(column.blocks.iter().all(|&(_, b)| !b.is_air()));
        }
    }

    #[test]
    fn test_surface_matches_column_top() {
        let synth = synth(42);
        for x in 0..32 {
            let (wx, wz) = (x * 29, x * 7 - 100);
            let column = synth.synthesize(wx, wz);
            let surface = synth.surface(wx, wz);
            assert_eq!(column.height, surface.height);
            assert_eq!(column.biome, surface.biome);
            assert_eq!(column.block_at(surface.height), surface.block);
        }
    }

    #[test]
    fn test_caves_never_reach_surface() {
        let synth = synth(2024);
        for x in 0..24 {
            for z in 0..24 {
                let column = synth.synthesize(x, z);
                assert!(
                    !column.block_at(column.height).is_air(),
                    "surface at ({}, {}) was carved",
                    x,
                    z
                );
            }
        }
    }

    #[test]
    fn test_water_fills_to_sea_level() {
        let synth = synth(31337);
        let sea = synth.sea_level();
        for x in -64..64 {
            let column = synth.synthesize(x * 41, x * 23);
            if column.height >= sea {
                continue;
            }
            for y in (column.height + 1)..=sea {
                let block = column.block_at(y);
                assert!(
                    matches!(block, BlockType::Water | BlockType::Ice),
                    "expected water at y={} got {:?}",
                    y,
                    block
                );
            }
            assert!(column.block_at(sea + 1).is_air());
        }
    }

    #[test]
    fn test_ocean_floor_surface_is_water() {
        let synth = synth(5);
        let desc = BiomeId::Ocean.descriptor();
        assert_eq!(synth.surface_block(desc, synth.sea_level() - 5), BlockType::Water);
        assert_eq!(synth.surface_block(desc, synth.sea_level()), BlockType::Sand);
    }

    #[test]
    fn test_snow_above_snow_line() {
        let synth = synth(5);
        let desc = BiomeId::Mountains.descriptor();
        let line = synth.sea_level() + desc.snow_line.unwrap_or(0);
        assert_eq!(synth.surface_block(desc, line + 1), BlockType::Snow);
        assert_eq!(synth.surface_block(desc, line), desc.surface_block);
    }

    #[test]
    fn test_column_determinism() {
        let a = synth(99);
        let b = synth(99);
        for x in 0..8 {
            assert_eq!(a.synthesize(x, -x), b.synthesize(x, -x));
        }
    }
}
