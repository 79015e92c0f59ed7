//! ASCII block templates stamped into chunks with a quarter-turn rotation.
//!
//! A template is a stack of layers, bottom first. Each layer is a list of
//! rows along Z and each row is a byte string along X. A palette maps bytes to
//! blocks; `None` leaves the terrain untouched at that cell.

use voxelgen_core::{BlockType, WorldPos};

use crate::chunk::Chunk;
use crate::structures::{fill_foundation_rect, set_world_block_if_in_chunk};

/// Clockwise quarter turns around the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YRotation {
    R0,
    R90,
    R180,
    R270,
}

impl YRotation {
    pub const ALL: [YRotation; 4] = [Self::R0, Self::R90, Self::R180, Self::R270];

    const fn swaps_axes(self) -> bool {
        matches!(self, Self::R90 | Self::R270)
    }

    /// Map a cell of an `width x depth` footprint into the rotated footprint.
    const fn turn(self, x: i32, z: i32, width: i32, depth: i32) -> (i32, i32) {
        match self {
            Self::R0 => (x, z),
            Self::R90 => (depth - 1 - z, x),
            Self::R180 => (width - 1 - x, depth - 1 - z),
            Self::R270 => (z, width - 1 - x),
        }
    }
}

/// Static block volume plus the palette that decodes it.
#[derive(Clone, Copy)]
pub struct StructureTemplate {
    layers: &'static [&'static [&'static str]],
    palette: fn(u8) -> Option<BlockType>,
    foundation: Option<BlockType>,
}

impl StructureTemplate {
    pub const fn new(
        layers: &'static [&'static [&'static str]],
        palette: fn(u8) -> Option<BlockType>,
    ) -> Self {
        Self {
            layers,
            palette,
            foundation: None,
        }
    }

    /// Fill dips under the footprint with `block` before stamping.
    pub const fn with_foundation(self, block: BlockType) -> Self {
        Self {
            foundation: Some(block),
            ..self
        }
    }

    /// Unrotated `(width, height, depth)`.
    pub fn size(&self) -> (i32, i32, i32) {
        let depth = self.layers.first().map_or(0, |layer| layer.len());
        let width = self
            .layers
            .first()
            .and_then(|layer| layer.first())
            .map_or(0, |row| row.len());
        (width as i32, self.layers.len() as i32, depth as i32)
    }

    /// `(x, z)` extent once rotated.
    pub fn footprint(&self, rotation: YRotation) -> (i32, i32) {
        let (width, _, depth) = self.size();
        if rotation.swaps_axes() {
            (depth, width)
        } else {
            (width, depth)
        }
    }

    /// Every palette-mapped cell as `(offset, block)` after rotation.
    pub fn blocks(&self, rotation: YRotation) -> impl Iterator<Item = (WorldPos, BlockType)> + '_ {
        let (width, _, depth) = self.size();
        debug_assert!(
            self.layers.iter().all(|layer| layer.len() as i32 == depth
                && layer.iter().all(|row| row.len() as i32 == width)),
            "template layers must share one footprint"
        );

        self.layers.iter().enumerate().flat_map(move |(y, layer)| {
            layer.iter().enumerate().flat_map(move |(z, row)| {
                row.bytes().enumerate().filter_map(move |(x, byte)| {
                    let block = (self.palette)(byte)?;
                    let (rx, rz) = rotation.turn(x as i32, z as i32, width, depth);
                    Some((WorldPos::new(rx, y as i32, rz), block))
                })
            })
        })
    }

    /// Stamp the part of the template that falls inside `chunk`.
    ///
    /// `origin` is the minimum corner of the rotated footprint at the bottom
    /// layer. Returns the number of blocks written.
    pub fn stamp(&self, chunk: &mut Chunk, origin: WorldPos, rotation: YRotation) -> usize {
        if let Some(block) = self.foundation {
            let (width, depth) = self.footprint(rotation);
            fill_foundation_rect(chunk, origin.y, origin.x, origin.z, width, depth, block);
        }

        let mut written = 0;
        for (offset, block) in self.blocks(rotation) {
            let pos = origin.offset(offset.x, offset.y, offset.z);
            if set_world_block_if_in_chunk(chunk, pos.x, pos.y, pos.z, block) {
                written += 1;
            }
        }
        written
    }
}

const HOUSE_FOUNDATION: [&str; 7] = [
    "CCCCCCC", "CCCCCCC", "CCCCCCC", "CCCCCCC", "CCCCCCC", "CCCCCCC", "CCCCCCC",
];
const HOUSE_FLOOR: [&str; 7] = [
    "PPPPPPP", "PPPPPPP", "PPPPPPP", "PPPPPPP", "PPPPPPP", "PPPPPPP", "PPPPPPP",
];
const HOUSE_WALL_LOW: [&str; 7] = [
    "WPPPPPW", "P.....P", "P.....P", "P.....P", "P.....P", "P.....P", "WPP.PPW",
];
const HOUSE_WALL_WINDOWS: [&str; 7] = [
    "WPGPGPW", "P.....P", "G.....G", "P.....P", "G.....G", "P.....P", "WPP.PPW",
];
const HOUSE_WALL_TOP: [&str; 7] = [
    "WPPPPPW", "P.....P", "P.....P", "P.....P", "P.....P", "P.....P", "WPPPPPW",
];

/// Door gap in the south wall before rotation.
const HOUSE_LAYERS: [&[&str]; 6] = [
    &HOUSE_FOUNDATION,
    &HOUSE_FLOOR,
    &HOUSE_WALL_LOW,
    &HOUSE_WALL_WINDOWS,
    &HOUSE_WALL_TOP,
    &HOUSE_FLOOR,
];

fn house_palette(byte: u8) -> Option<BlockType> {
    match byte {
        b'C' => Some(BlockType::Cobblestone),
        b'P' => Some(BlockType::Planks),
        b'W' => Some(BlockType::Wood),
        b'G' => Some(BlockType::Glass),
        b'.' => Some(BlockType::Air),
        _ => None,
    }
}

/// Village house, stamped from one block below the village floor.
pub const HOUSE: StructureTemplate =
    StructureTemplate::new(&HOUSE_LAYERS, house_palette).with_foundation(BlockType::Cobblestone);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkPos;
    use crate::config::ChunkDims;

    const LAYER0: [&str; 2] = ["ab", "cd"];
    const VOLUME: [&[&str]; 1] = [&LAYER0];

    const DIMS: ChunkDims = ChunkDims {
        size: 16,
        height: 256,
    };

    fn palette(byte: u8) -> Option<BlockType> {
        match byte {
            b'a' => Some(BlockType::Stone),
            b'b' => Some(BlockType::Dirt),
            b'c' => Some(BlockType::Planks),
            b'd' => Some(BlockType::Glass),
            _ => None,
        }
    }

    const SQUARE: StructureTemplate = StructureTemplate::new(&VOLUME, palette);

    #[test]
    fn quarter_turn_maps_cells() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), DIMS);
        SQUARE.stamp(&mut chunk, WorldPos::new(0, 64, 0), YRotation::R90);

        // a b      c a
        // c d  ->  d b
        let expected = [
            (0, 0, BlockType::Planks),
            (1, 0, BlockType::Stone),
            (0, 1, BlockType::Glass),
            (1, 1, BlockType::Dirt),
        ];
        for (x, z, block) in expected {
            assert_eq!(chunk.get(WorldPos::new(x, 64, z)), block, "at ({x},64,{z})");
        }
    }

    #[test]
    fn every_rotation_writes_every_cell() {
        for rotation in YRotation::ALL {
            let mut chunk = Chunk::new(ChunkPos::new(0, 0), DIMS);
            assert_eq!(SQUARE.stamp(&mut chunk, WorldPos::new(4, 10, 4), rotation), 4);
            assert_eq!(chunk.len(), 4, "{rotation:?}");
        }
    }

    #[test]
    fn stamp_is_clipped_to_the_chunk() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), DIMS);
        SQUARE.stamp(&mut chunk, WorldPos::new(15, 10, 0), YRotation::R0);
        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.get(WorldPos::new(15, 10, 0)), BlockType::Stone);
        assert_eq!(chunk.get(WorldPos::new(15, 10, 1)), BlockType::Planks);
    }

    #[test]
    fn empty_template_is_noop() {
        let empty = StructureTemplate::new(&[], palette);
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), DIMS);
        assert_eq!(empty.size(), (0, 0, 0));
        assert_eq!(empty.stamp(&mut chunk, WorldPos::new(0, 10, 0), YRotation::R0), 0);
        assert!(chunk.is_empty());
    }

    #[test]
    fn rotated_footprint_swaps_axes() {
        const WIDE_LAYER: [&str; 1] = ["abc"];
        const WIDE: [&[&str]; 1] = [&WIDE_LAYER];
        let wide = StructureTemplate::new(&WIDE, palette);
        assert_eq!(wide.footprint(YRotation::R0), (3, 1));
        assert_eq!(wide.footprint(YRotation::R90), (1, 3));
        assert!(wide
            .blocks(YRotation::R270)
            .all(|(pos, _)| pos.x == 0 && (0..3).contains(&pos.z)));
    }

    #[test]
    fn house_door_faces_south_unrotated() {
        assert_eq!(HOUSE.size(), (7, 6, 7));
        let door: Vec<_> = HOUSE
            .blocks(YRotation::R0)
            .filter(|(pos, block)| pos.z == 6 && pos.y == 2 && block.is_air())
            .collect();
        assert_eq!(door.len(), 1);
        assert_eq!(door[0].0.x, 3);
    }

    #[test]
    fn foundation_fills_down_to_ground() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), DIMS);
        for x in 0..7 {
            for z in 0..7 {
                chunk.place(WorldPos::new(x, 60, z), BlockType::Stone);
            }
        }
        HOUSE.stamp(&mut chunk, WorldPos::new(0, 63, 0), YRotation::R180);
        assert_eq!(chunk.get(WorldPos::new(3, 61, 3)), BlockType::Cobblestone);
        assert_eq!(chunk.get(WorldPos::new(3, 62, 3)), BlockType::Cobblestone);
        assert_eq!(chunk.get(WorldPos::new(3, 64, 3)), BlockType::Planks);
    }
}
