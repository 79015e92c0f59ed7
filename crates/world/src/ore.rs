//! Ore distribution for underground stone.
//!
//! Each ore type has its own 3D noise field and an absolute Y band. Rules are
//! checked rarest first and the first match wins, so a position holds at most
//! one ore.

use voxelgen_core::BlockType;

use crate::noise::{fold_seed, NoiseField};

/// Distribution of one ore type.
#[derive(Clone, Debug, PartialEq)]
pub struct OreRule {
    pub ore: BlockType,
    /// Lowest Y (inclusive) where this ore can appear.
    pub min_y: i32,
    /// Y (exclusive) above which this ore never appears.
    pub max_y: i32,
    /// Normalized noise above this becomes ore. Higher is rarer.
    pub threshold: f64,
    /// Spatial scale of veins; larger values give smaller veins.
    pub vein_scale: f64,
    /// Decorrelates this ore's field from the others.
    pub seed_offset: u32,
}

/// Ore rules in priority order: diamond, iron, coal.
pub fn default_ore_rules() -> Vec<OreRule> {
    vec![
        OreRule {
            ore: BlockType::DiamondOre,
            min_y: 1,
            max_y: 16,
            threshold: 0.82,
            vein_scale: 0.12,
            seed_offset: 0x0D1A_0000,
        },
        OreRule {
            ore: BlockType::IronOre,
            min_y: 1,
            max_y: 64,
            threshold: 0.8,
            vein_scale: 0.1,
            seed_offset: 0x0001_7077,
        },
        OreRule {
            ore: BlockType::CoalOre,
            min_y: 5,
            max_y: 128,
            threshold: 0.75,
            vein_scale: 0.08,
            seed_offset: 0x00C0_A100,
        },
    ]
}

#[derive(Clone)]
struct OreRuntime {
    rule: OreRule,
    field: NoiseField,
}

/// Decides which ore, if any, replaces stone at a position.
#[derive(Clone)]
pub struct OrePlacer {
    ores: Vec<OreRuntime>,
}

impl OrePlacer {
    pub fn new(world_seed: u64) -> Self {
        Self::with_rules(world_seed, default_ore_rules())
    }

    pub fn with_rules(world_seed: u64, rules: Vec<OreRule>) -> Self {
        let seed = fold_seed(world_seed);
        let ores = rules
            .into_iter()
            .map(|rule| OreRuntime {
                field: NoiseField::new(seed.wrapping_add(rule.seed_offset)),
                rule,
            })
            .collect();
        Self { ores }
    }

    /// Ore at a stone position, or `None` if it stays stone.
    pub fn ore_at(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        for ore in &self.ores {
            let rule = &ore.rule;
            if y < rule.min_y || y >= rule.max_y {
                continue;
            }

            let noise = ore.field.noise_3d(
                x as f64 * rule.vein_scale,
                y as f64 * rule.vein_scale,
                z as f64 * rule.vein_scale,
            );
            // Normalize from [-1, 1] to [0, 1].
            if (noise + 1.0) * 0.5 > rule.threshold {
                return Some(rule.ore);
            }
        }
        None
    }

    pub fn rules(&self) -> impl Iterator<Item = &OreRule> {
        self.ores.iter().map(|ore| &ore.rule)
    }
}
