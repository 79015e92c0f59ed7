//! Terrain generation integrating heightmap, biome, cave, ore and structure systems.
//!
//! Generates chunk terrain in three passes: columns, villages, trees.

use tracing::{debug, instrument};
use voxelgen_core::{BlockType, WorldPos};

use crate::biome::BiomeId;
use crate::chunk::{Chunk, ChunkPos};
use crate::column::{Column, ColumnSynthesizer};
use crate::config::WorldConfig;
use crate::error::ConfigError;
use crate::structures::chunk_world_bounds;
use crate::trees::{TreePlacer, TREE_RADIUS};
use crate::village::VillageGenerator;

/// Terrain generator that fills chunks with blocks.
#[derive(Clone)]
pub struct TerrainGenerator {
    config: WorldConfig,
    columns: ColumnSynthesizer,
    villages: VillageGenerator,
    trees: TreePlacer,
}

impl TerrainGenerator {
    /// Create a new terrain generator, rejecting unusable parameters.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let world_height = config.world_height as i32;
        Ok(Self {
            columns: ColumnSynthesizer::new(&config),
            villages: VillageGenerator::new(config.seed, world_height),
            trees: TreePlacer::new(config.seed, world_height),
            config,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn columns(&self) -> &ColumnSynthesizer {
        &self.columns
    }

    pub fn villages(&self) -> &VillageGenerator {
        &self.villages
    }

    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        self.columns.heights().surface_height(world_x, world_z)
    }

    pub fn biome_at(&self, world_x: i32, world_z: i32) -> BiomeId {
        self.columns.biome_at(world_x, world_z)
    }

    /// Column layering before vegetation and structures.
    pub fn column(&self, world_x: i32, world_z: i32) -> Column {
        self.columns.synthesize(world_x, world_z)
    }

    /// Generate terrain for a chunk at the given position.
    ///
    /// Pure function of (seed, position): calling it twice yields identical chunks.
    #[instrument(skip(self), fields(chunk_pos = %chunk_pos, world_seed = self.config.seed))]
    pub fn generate_chunk(&self, chunk_pos: ChunkPos) -> Chunk {
        debug!("Starting terrain generation");
        let dims = self.config.dims();
        let mut chunk = Chunk::new(chunk_pos, dims);
        let (origin_x, origin_z) = chunk_pos.origin(dims.size);

        for local_z in 0..dims.size {
            for local_x in 0..dims.size {
                let world_x = origin_x + local_x;
                let world_z = origin_z + local_z;
                let column = self.columns.synthesize(world_x, world_z);
                for (y, block) in column.blocks {
                    chunk.place(WorldPos::new(world_x, y, world_z), block);
                }
            }
        }

        let villages = self.villages.generate_into_chunk(&mut chunk, &self.columns);

        // Tree anchors near the chunk may belong to villages in other regions.
        let (min_x, max_x, min_z, max_z) = chunk_world_bounds(chunk_pos, dims.size);
        let excluded: Vec<_> = self
            .villages
            .plans_overlapping(
                min_x - TREE_RADIUS,
                max_x + TREE_RADIUS,
                min_z - TREE_RADIUS,
                max_z + TREE_RADIUS,
                &self.columns,
            )
            .into_iter()
            .map(|plan| plan.bounds)
            .collect();
        let trees = self
            .trees
            .generate_into_chunk(&mut chunk, &self.columns, &excluded);

        chunk.mark_generated();
        debug!(
            blocks = chunk.len(),
            villages,
            trees,
            "Terrain generation complete"
        );
        chunk
    }

    /// Block a freshly generated world would hold at `pos`.
    pub fn generated_block(&self, pos: WorldPos) -> BlockType {
        let chunk_pos = ChunkPos::containing(pos.x, pos.z, self.config.dims().size);
        self.generate_chunk(chunk_pos).get(pos)
    }
}
