//! Block type tags.
//!
//! Blocks carry no embedded state; anything mutable (crop growth timers, tool
//! wear) is keyed by position in the gameplay layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Closed set of block types produced by world generation or written by players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Empty space. Never stored by generation; only appears as an explicit player edit.
    Air,
    /// Terminal floor at y = 0.
    Bedrock,
    /// Default underground fill.
    Stone,
    /// Subsurface soil.
    Dirt,
    /// Surface soil for temperate biomes.
    Grass,
    /// Desert surface and ocean floor.
    Sand,
    /// Village paths.
    Gravel,
    /// Sea and lake fill.
    Water,
    /// Frozen water surface.
    Ice,
    /// Cold or high-altitude surface.
    Snow,
    /// Common shallow ore.
    CoalOre,
    /// Mid-depth ore.
    IronOre,
    /// Rare deep ore.
    DiamondOre,
    /// Tree trunk.
    Wood,
    /// Tree canopy.
    Leaves,
    /// Building floors and walls.
    Planks,
    /// Building foundations.
    Cobblestone,
    /// Building windows.
    Glass,
    /// Tilled soil.
    Farmland,
    /// Freshly planted wheat.
    WheatSeedling,
    /// Half-grown wheat.
    WheatGrowing,
    /// Harvestable wheat.
    WheatRipe,
}

impl BlockType {
    /// Every block type, in declaration order.
    pub const ALL: [BlockType; 22] = [
        BlockType::Air,
        BlockType::Bedrock,
        BlockType::Stone,
        BlockType::Dirt,
        BlockType::Grass,
        BlockType::Sand,
        BlockType::Gravel,
        BlockType::Water,
        BlockType::Ice,
        BlockType::Snow,
        BlockType::CoalOre,
        BlockType::IronOre,
        BlockType::DiamondOre,
        BlockType::Wood,
        BlockType::Leaves,
        BlockType::Planks,
        BlockType::Cobblestone,
        BlockType::Glass,
        BlockType::Farmland,
        BlockType::WheatSeedling,
        BlockType::WheatGrowing,
        BlockType::WheatRipe,
    ];

    /// Canonical snake_case name used in save files and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            BlockType::Air => "air",
            BlockType::Bedrock => "bedrock",
            BlockType::Stone => "stone",
            BlockType::Dirt => "dirt",
            BlockType::Grass => "grass",
            BlockType::Sand => "sand",
            BlockType::Gravel => "gravel",
            BlockType::Water => "water",
            BlockType::Ice => "ice",
            BlockType::Snow => "snow",
            BlockType::CoalOre => "coal_ore",
            BlockType::IronOre => "iron_ore",
            BlockType::DiamondOre => "diamond_ore",
            BlockType::Wood => "wood",
            BlockType::Leaves => "leaves",
            BlockType::Planks => "planks",
            BlockType::Cobblestone => "cobblestone",
            BlockType::Glass => "glass",
            BlockType::Farmland => "farmland",
            BlockType::WheatSeedling => "wheat_seedling",
            BlockType::WheatGrowing => "wheat_growing",
            BlockType::WheatRipe => "wheat_ripe",
        }
    }

    /// True for the empty block.
    #[inline]
    pub fn is_air(self) -> bool {
        self == BlockType::Air
    }

    /// Liquids do not support structures or vegetation.
    #[inline]
    pub fn is_liquid(self) -> bool {
        self == BlockType::Water
    }

    /// True for any ore variant.
    pub fn is_ore(self) -> bool {
        matches!(
            self,
            BlockType::CoalOre | BlockType::IronOre | BlockType::DiamondOre
        )
    }

    /// Wheat growth stage in `0..=2`, if this is a crop block.
    pub fn crop_stage(self) -> Option<u8> {
        match self {
            BlockType::WheatSeedling => Some(0),
            BlockType::WheatGrowing => Some(1),
            BlockType::WheatRipe => Some(2),
            _ => None,
        }
    }

    /// Wheat block for a growth stage, saturating at ripe.
    pub fn wheat_at_stage(stage: u8) -> Self {
        match stage {
            0 => BlockType::WheatSeedling,
            1 => BlockType::WheatGrowing,
            _ => BlockType::WheatRipe,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .copied()
            .find(|block| block.as_str() == s)
            .ok_or_else(|| ParseError::UnknownBlock(s.to_string()))
    }
}
