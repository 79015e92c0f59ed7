//! Tree generation for biome decoration.
//!
//! Anchors are decided per column from a hash of (seed, x, z), so a tree is
//! the same no matter which chunk asks. Chunks scan a margin of
//! [`TREE_RADIUS`] columns around themselves and keep the blocks that land
//! inside, which lets canopies cross chunk seams without gaps.

use voxelgen_core::{BlockType, WorldPos};

use crate::biome::BiomeId;
use crate::chunk::{Chunk, ChunkPos};
use crate::column::ColumnSynthesizer;
use crate::structures::StructureBounds;

/// Horizontal reach of a canopy from its trunk.
pub const TREE_RADIUS: i32 = 2;

const TREE_ANCHOR_SALT: u64 = 0x5452_4545; // "TREE"
const TREE_HEIGHT_SALT: u64 = 0x5452_4548;

const MIN_TRUNK_HEIGHT: i32 = 4;
const MAX_TRUNK_HEIGHT: i32 = 6;

/// Mix a world position into a 64-bit hash (splitmix64 finalizer).
pub fn position_seed(world_seed: u64, x: i32, y: i32, z: i32, salt: u64) -> u64 {
    let mut h = world_seed
        ^ (x as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as i64 as u64).wrapping_mul(0xD6E8_FEB8_6659_FD93)
        ^ (z as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ salt;
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

/// Map a hash onto [0.0, 1.0) using its top 53 bits.
pub fn unit_fraction(hash: u64) -> f64 {
    (hash >> 11) as f64 / (1u64 << 53) as f64
}

fn max_tree_chance() -> f64 {
    BiomeId::all()
        .iter()
        .map(|id| id.descriptor().tree_chance)
        .fold(0.0, f64::max)
}

/// Tree structure with position and trunk height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tree {
    /// World X coordinate of trunk base
    pub world_x: i32,
    /// World Y coordinate of trunk base
    pub world_y: i32,
    /// World Z coordinate of trunk base
    pub world_z: i32,
    pub trunk_height: i32,
}

impl Tree {
    /// Bottom block of the trunk.
    pub const fn base(&self) -> WorldPos {
        WorldPos::new(self.world_x, self.world_y, self.world_z)
    }

    /// Highest Y any block of this tree reaches.
    pub fn top_y(&self) -> i32 {
        self.world_y + self.trunk_height + 1
    }

    /// Generate tree structure into a chunk.
    ///
    /// Only places blocks that fall within the chunk bounds. The trunk may
    /// replace leaves of a neighbour; leaves only grow into air.
    pub fn generate_into_chunk(&self, chunk: &mut Chunk) {
        for dy in 0..self.trunk_height {
            self.place_block(chunk, 0, dy, 0, BlockType::Wood, |current| {
                current.is_air() || current == BlockType::Leaves
            });
        }

        // Two wide layers around the top of the trunk, then two narrow ones.
        let canopy_base = self.trunk_height - 2;
        for dy in canopy_base..canopy_base + 4 {
            let radius = if dy < canopy_base + 2 { TREE_RADIUS } else { 1 };
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    // Round off the corners of wide layers.
                    if radius == TREE_RADIUS && dx.abs() == radius && dz.abs() == radius {
                        continue;
                    }
                    // Skip trunk.
                    if dx == 0 && dz == 0 && dy < self.trunk_height {
                        continue;
                    }
                    self.place_block(chunk, dx, dy, dz, BlockType::Leaves, BlockType::is_air);
                }
            }
        }
    }

    fn place_block(
        &self,
        chunk: &mut Chunk,
        dx: i32,
        dy: i32,
        dz: i32,
        block: BlockType,
        replaceable: impl Fn(BlockType) -> bool,
    ) {
        let pos = self.base().offset(dx, dy, dz);
        if pos.y < 1 || !chunk.contains(pos) {
            return;
        }
        if replaceable(chunk.get(pos)) {
            chunk.place(pos, block);
        }
    }
}

/// Decides where trees grow.
#[derive(Debug, Clone, Copy)]
pub struct TreePlacer {
    world_seed: u64,
    world_height: i32,
}

impl TreePlacer {
    pub fn new(world_seed: u64, world_height: i32) -> Self {
        Self {
            world_seed,
            world_height,
        }
    }

    /// The tree anchored at column `(x, z)`, if any.
    pub fn tree_at(&self, x: i32, z: i32, columns: &ColumnSynthesizer) -> Option<Tree> {
        let roll = unit_fraction(position_seed(self.world_seed, x, 0, z, TREE_ANCHOR_SALT));
        // Cheap rejection before sampling the column.
        if roll >= max_tree_chance() {
            return None;
        }

        let surface = columns.surface(x, z);
        if roll >= surface.biome.descriptor().tree_chance {
            return None;
        }
        if !matches!(surface.block, BlockType::Grass | BlockType::Dirt) {
            return None;
        }
        if surface.height < columns.sea_level() {
            return None;
        }

        let span = (MAX_TRUNK_HEIGHT - MIN_TRUNK_HEIGHT + 1) as u64;
        let height_hash = position_seed(self.world_seed, x, 0, z, TREE_HEIGHT_SALT);
        let trunk_height = MIN_TRUNK_HEIGHT + (height_hash % span) as i32;

        let tree = Tree {
            world_x: x,
            world_y: surface.height + 1,
            world_z: z,
            trunk_height,
        };
        (tree.top_y() < self.world_height).then_some(tree)
    }

    /// Trees that can reach into the chunk, in z-then-x anchor order.
    ///
    /// Anchors inside any of `excluded` footprints are skipped.
    pub fn trees_for_chunk(
        &self,
        chunk_pos: ChunkPos,
        chunk_size: i32,
        columns: &ColumnSynthesizer,
        excluded: &[StructureBounds],
    ) -> Vec<Tree> {
        let (origin_x, origin_z) = chunk_pos.origin(chunk_size);
        let mut trees = Vec::new();
        for z in (origin_z - TREE_RADIUS)..(origin_z + chunk_size + TREE_RADIUS) {
            for x in (origin_x - TREE_RADIUS)..(origin_x + chunk_size + TREE_RADIUS) {
                if excluded.iter().any(|b| b.contains_column(x, z)) {
                    continue;
                }
                if let Some(tree) = self.tree_at(x, z, columns) {
                    trees.push(tree);
                }
            }
        }
        trees
    }

    /// Plant every tree reaching into this chunk. Returns how many were planted.
    pub fn generate_into_chunk(
        &self,
        chunk: &mut Chunk,
        columns: &ColumnSynthesizer,
        excluded: &[StructureBounds],
    ) -> usize {
        let trees = self.trees_for_chunk(chunk.position(), chunk.dims().size, columns, excluded);
        for tree in &trees {
            tree.generate_into_chunk(chunk);
        }
        trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChunkDims, WorldConfig};

    const DIMS: ChunkDims = ChunkDims {
        size: 16,
        height: 256,
    };

    #[test]
    fn test_position_seed_is_stable_and_spread() {
        assert_eq!(position_seed(1, 2, 3, 4, 5), position_seed(1, 2, 3, 4, 5));
        assert_ne!(position_seed(1, 2, 3, 4, 5), position_seed(1, 2, 3, 4, 6));
        assert_ne!(position_seed(1, 2, 3, 4, 5), position_seed(1, -2, 3, 4, 5));
        assert_ne!(position_seed(1, 2, 3, 4, 5), position_seed(2, 2, 3, 4, 5));
    }

    #[test]
    fn test_unit_fraction_range() {
        assert_eq!(unit_fraction(0), 0.0);
        assert!(unit_fraction(u64::MAX) < 1.0);
        for i in 0..1000 {
            let f = unit_fraction(position_seed(9, i, 0, -i, 1));
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_tree_shape() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), DIMS);
        let tree = Tree {
            world_x: 8,
            world_y: 65,
            world_z: 8,
            trunk_height: 5,
        };
        tree.generate_into_chunk(&mut chunk);

        for dy in 0..5 {
            assert_eq!(chunk.get(WorldPos::new(8, 65 + dy, 8)), BlockType::Wood);
        }
        assert_eq!(chunk.get(WorldPos::new(8, 70, 8)), BlockType::Leaves);
        assert_eq!(chunk.get(WorldPos::new(10, 68, 8)), BlockType::Leaves);
        // Rounded corners
        assert_eq!(chunk.get(WorldPos::new(10, 68, 10)), BlockType::Air);
        assert!(chunk.iter().all(|(pos, _)| pos.y <= tree.top_y()));
    }

    #[test]
    fn test_leaves_do_not_replace_solid_blocks() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), DIMS);
        let blocker = WorldPos::new(9, 68, 8);
        chunk.place(blocker, BlockType::Stone);
        Tree {
            world_x: 8,
            world_y: 65,
            world_z: 8,
            trunk_height: 5,
        }
        .generate_into_chunk(&mut chunk);
        assert_eq!(chunk.get(blocker), BlockType::Stone);
    }

    #[test]
    fn test_canopy_is_clipped_at_chunk_edge() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), DIMS);
        Tree {
            world_x: 0,
            world_y: 65,
            world_z: 0,
            trunk_height: 4,
        }
        .generate_into_chunk(&mut chunk);
        assert!(chunk.iter().all(|(pos, _)| pos.x >= 0 && pos.z >= 0));
        assert!(!chunk.is_empty());
    }

    #[test]
    fn test_tree_anchors_are_deterministic_and_valid() {
        let config = WorldConfig::with_seed(2468);
        let columns = ColumnSynthesizer::new(&config);
        let placer = TreePlacer::new(config.seed, config.world_height as i32);

        let mut found = 0;
        for z in -100..100 {
            for x in -100..100 {
                let tree = placer.tree_at(x, z, &columns);
                assert_eq!(tree, placer.tree_at(x, z, &columns));
                if let Some(tree) = tree {
                    found += 1;
                    let surface = columns.surface(x, z);
                    assert!(matches!(surface.block, BlockType::Grass | BlockType::Dirt));
                    assert!(surface.height >= columns.sea_level());
                    assert!((MIN_TRUNK_HEIGHT..=MAX_TRUNK_HEIGHT).contains(&tree.trunk_height));
                }
            }
        }
        assert!(found > 0, "no trees in a 200x200 area");
    }

    #[test]
    fn test_excluded_footprints_have_no_anchors() {
        let config = WorldConfig::with_seed(2468);
        let columns = ColumnSynthesizer::new(&config);
        let placer = TreePlacer::new(config.seed, config.world_height as i32);
        let everything = StructureBounds {
            min_x: -1000,
            max_x: 1000,
            min_y: 0,
            max_y: 255,
            min_z: -1000,
            max_z: 1000,
        };
        assert!(placer
            .trees_for_chunk(ChunkPos::new(0, 0), 16, &columns, &[everything])
            .is_empty());
    }
}
