use voxelgen_core::{BlockType, WorldPos};

use crate::chunk::{Chunk, ChunkPos};

/// Edge length of a structure region in world blocks.
pub const STRUCTURE_REGION_SIZE: i32 = 128;

/// Region containing world column `(x, z)`.
pub fn region_coords_for_world(world_x: i32, world_z: i32) -> (i32, i32) {
    (
        world_x.div_euclid(STRUCTURE_REGION_SIZE),
        world_z.div_euclid(STRUCTURE_REGION_SIZE),
    )
}

/// Inclusive world bounds `(min_x, max_x, min_z, max_z)` of a region.
pub fn region_world_bounds(region_x: i32, region_z: i32) -> (i32, i32, i32, i32) {
    let min_x = region_x * STRUCTURE_REGION_SIZE;
    let min_z = region_z * STRUCTURE_REGION_SIZE;
    let max_x = min_x + STRUCTURE_REGION_SIZE - 1;
    let max_z = min_z + STRUCTURE_REGION_SIZE - 1;

    (min_x, max_x, min_z, max_z)
}

/// Inclusive world bounds `(min_x, max_x, min_z, max_z)` of a chunk.
pub fn chunk_world_bounds(chunk_pos: ChunkPos, chunk_size: i32) -> (i32, i32, i32, i32) {
    let (min_x, min_z) = chunk_pos.origin(chunk_size);
    let max_x = min_x + chunk_size - 1;
    let max_z = min_z + chunk_size - 1;

    (min_x, max_x, min_z, max_z)
}

/// Every region touched by the given inclusive world rectangle, in
/// z-then-x order.
pub fn regions_overlapping(
    min_x: i32,
    max_x: i32,
    min_z: i32,
    max_z: i32,
) -> impl Iterator<Item = (i32, i32)> {
    let (rx0, rz0) = region_coords_for_world(min_x, min_z);
    let (rx1, rz1) = region_coords_for_world(max_x, max_z);
    (rz0..=rz1).flat_map(move |rz| (rx0..=rx1).map(move |rx| (rx, rz)))
}

/// Inclusive world-space box occupied by a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl StructureBounds {
    pub fn intersects_chunk(self, chunk_pos: ChunkPos, chunk_size: i32) -> bool {
        let (chunk_min_x, chunk_max_x, chunk_min_z, chunk_max_z) =
            chunk_world_bounds(chunk_pos, chunk_size);

        ranges_intersect(self.min_x, self.max_x, chunk_min_x, chunk_max_x)
            && ranges_intersect(self.min_z, self.max_z, chunk_min_z, chunk_max_z)
    }

    pub fn intersects_bounds(self, other: StructureBounds) -> bool {
        ranges_intersect(self.min_x, self.max_x, other.min_x, other.max_x)
            && ranges_intersect(self.min_z, self.max_z, other.min_z, other.max_z)
            && ranges_intersect(self.min_y, self.max_y, other.min_y, other.max_y)
    }

    /// Whether the column `(x, z)` lies inside the footprint.
    pub fn contains_column(self, world_x: i32, world_z: i32) -> bool {
        (self.min_x..=self.max_x).contains(&world_x) && (self.min_z..=self.max_z).contains(&world_z)
    }

    pub fn contains(self, world_x: i32, world_y: i32, world_z: i32) -> bool {
        self.contains_column(world_x, world_z) && (self.min_y..=self.max_y).contains(&world_y)
    }
}

pub fn region_seed(world_seed: u64, region_x: i32, region_z: i32, salt: u64) -> u64 {
    world_seed
        ^ (region_x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (region_z as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ salt
}

/// Write a structure block if the position belongs to this chunk.
///
/// The bedrock layer is never touched, and writing air removes the entry.
pub fn set_world_block_if_in_chunk(
    chunk: &mut Chunk,
    world_x: i32,
    world_y: i32,
    world_z: i32,
    block: BlockType,
) -> bool {
    if world_y < 1 {
        return false;
    }
    chunk.place(WorldPos::new(world_x, world_y, world_z), block)
}

pub fn clear_world_block_if_in_chunk(
    chunk: &mut Chunk,
    world_x: i32,
    world_y: i32,
    world_z: i32,
) -> bool {
    set_world_block_if_in_chunk(chunk, world_x, world_y, world_z, BlockType::Air)
}

/// Fill from the first solid block below `floor_y` up to `floor_y` so a
/// structure does not float over dips in the terrain.
pub fn fill_foundation_rect(
    chunk: &mut Chunk,
    floor_y: i32,
    origin_x: i32,
    origin_z: i32,
    size_x: i32,
    size_z: i32,
    block: BlockType,
) {
    if floor_y <= 0 {
        return;
    }

    let scan_start_y = (floor_y - 1).min(chunk.dims().height - 1);
    for dz in 0..size_z {
        for dx in 0..size_x {
            let world_x = origin_x + dx;
            let world_z = origin_z + dz;
            let column = WorldPos::new(world_x, 0, world_z);
            if !chunk.contains(column) {
                continue;
            }

            let ground_y = (0..=scan_start_y).rev().find(|&y| {
                let current = chunk.get(column.with_y(y));
                !current.is_air() && !current.is_liquid()
            });

            let Some(ground_y) = ground_y else {
                continue;
            };

            for y in (ground_y + 1)..=floor_y {
                set_world_block_if_in_chunk(chunk, world_x, y, world_z, block);
            }
        }
    }
}

fn ranges_intersect(a_min: i32, a_max: i32, b_min: i32, b_max: i32) -> bool {
    a_min <= b_max && b_min <= a_max
}
