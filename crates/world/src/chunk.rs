use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use voxelgen_core::{BlockType, WorldPos};

use crate::config::ChunkDims;

/// Chunk coordinate (X,Z) in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk owning world column `(x, z)`. Floors toward negative infinity.
    pub fn containing(world_x: i32, world_z: i32, chunk_size: i32) -> Self {
        Self {
            x: world_x.div_euclid(chunk_size),
            z: world_z.div_euclid(chunk_size),
        }
    }

    /// World coordinates of the chunk's minimum corner.
    pub fn origin(self, chunk_size: i32) -> (i32, i32) {
        (self.x * chunk_size, self.z * chunk_size)
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Lifecycle flags for a chunk.
    pub struct ChunkFlags: u8 {
        /// Terrain generation has been applied.
        const GENERATED = 0b0000_0001;
        /// Holds player edits not yet written to disk.
        const DIRTY = 0b0000_0010;
    }
}

impl Default for ChunkFlags {
    fn default() -> Self {
        ChunkFlags::empty()
    }
}

/// Sparse block storage for one chunk column.
///
/// Absent positions are air. `overrides` remembers every player-edited
/// position, so an override with no entry in `blocks` is an explicit air
/// edit rather than an ungenerated hole.
#[derive(Debug, Clone)]
pub struct Chunk {
    position: ChunkPos,
    dims: ChunkDims,
    blocks: HashMap<WorldPos, BlockType>,
    overrides: HashSet<WorldPos>,
    flags: ChunkFlags,
}

impl Chunk {
    /// Allocate an empty, ungenerated chunk.
    pub fn new(position: ChunkPos, dims: ChunkDims) -> Self {
        Self {
            position,
            dims,
            blocks: HashMap::new(),
            overrides: HashSet::new(),
            flags: ChunkFlags::empty(),
        }
    }

    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn flags(&self) -> ChunkFlags {
        self.flags
    }

    /// Whether `pos` lies inside this chunk and the world's height range.
    pub fn contains(&self, pos: WorldPos) -> bool {
        let (ox, oz) = self.position.origin(self.dims.size);
        (ox..ox + self.dims.size).contains(&pos.x)
            && (oz..oz + self.dims.size).contains(&pos.z)
            && (0..self.dims.height).contains(&pos.y)
    }

    /// Block at `pos`; air when nothing is stored.
    pub fn get(&self, pos: WorldPos) -> BlockType {
        self.blocks.get(&pos).copied().unwrap_or(BlockType::Air)
    }

    /// Generation write. Skips positions outside the chunk and positions a
    /// player has edited. Placing air removes the entry.
    pub fn place(&mut self, pos: WorldPos, block: BlockType) -> bool {
        if !self.contains(pos) || self.overrides.contains(&pos) {
            return false;
        }
        if block.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
        true
    }

    /// Generation removal, with the same skipping rules as [`Chunk::place`].
    pub fn clear(&mut self, pos: WorldPos) -> bool {
        self.place(pos, BlockType::Air)
    }

    /// Player edit: records an override and marks the chunk dirty.
    pub fn set_block(&mut self, pos: WorldPos, block: BlockType) -> bool {
        if !self.apply_override(pos, block) {
            return false;
        }
        self.flags.insert(ChunkFlags::DIRTY);
        true
    }

    /// Record an override restored from disk without marking the chunk dirty.
    pub fn apply_override(&mut self, pos: WorldPos, block: BlockType) -> bool {
        if !self.contains(pos) {
            return false;
        }
        self.overrides.insert(pos);
        if block.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
        true
    }

    /// Merge a freshly generated chunk for the same position.
    ///
    /// Player overrides win over generated blocks. Returns `false` and leaves
    /// the chunk untouched if it was already generated.
    pub fn apply_generated(&mut self, generated: Chunk) -> bool {
        if self.is_generated() {
            return false;
        }
        debug_assert_eq!(self.position, generated.position);
        for (pos, block) in generated.blocks {
            if !self.overrides.contains(&pos) {
                self.blocks.insert(pos, block);
            }
        }
        self.flags.insert(ChunkFlags::GENERATED);
        true
    }

    pub fn is_override(&self, pos: WorldPos) -> bool {
        self.overrides.contains(&pos)
    }

    /// Every override and its current block, air included, sorted by position.
    pub fn override_entries(&self) -> BTreeMap<WorldPos, BlockType> {
        self.overrides
            .iter()
            .map(|&pos| (pos, self.get(pos)))
            .collect()
    }

    pub fn is_generated(&self) -> bool {
        self.flags.contains(ChunkFlags::GENERATED)
    }

    pub fn mark_generated(&mut self) {
        self.flags.insert(ChunkFlags::GENERATED);
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.contains(ChunkFlags::DIRTY)
    }

    /// Clear the dirty flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.flags.remove(ChunkFlags::DIRTY);
    }

    /// Number of stored (non-air) blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Stored blocks in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (WorldPos, BlockType)> + '_ {
        self.blocks.iter().map(|(&pos, &block)| (pos, block))
    }

    /// Stored blocks sorted by position, for comparisons and hashing.
    pub fn sorted_blocks(&self) -> BTreeMap<WorldPos, BlockType> {
        self.iter().collect()
    }
}
