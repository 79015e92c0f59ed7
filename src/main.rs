mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use voxelgen_world::{BlockType, ChunkStore, TerrainGenerator};

use crate::config::{AppConfig, ConfigSource, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(author, version, about = "Deterministic voxel world generator", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Override the configured world seed
    #[arg(long)]
    seed: Option<u64>,
    /// Override the configured world file
    #[arg(long)]
    world_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pregenerate chunks around the origin and save
    Generate {
        /// Chunk radius around the origin
        #[arg(long, default_value_t = 4)]
        radius: i32,
        /// Worker threads (defaults to the config, then one per CPU)
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Print one column's biome, climate and block layers
    #[command(allow_negative_numbers = true)]
    Inspect {
        #[arg(long)]
        x: i32,
        #[arg(long)]
        z: i32,
    },
    /// Print an ASCII biome map, one character per chunk
    Biomes {
        #[arg(long, default_value_t = 24)]
        radius: i32,
    },
    /// Check terrain height continuity across chunk seams
    ValidateSeams {
        #[arg(long, default_value_t = 8)]
        radius: i32,
    },
    /// Place a block and save the world
    #[command(allow_negative_numbers = true)]
    SetBlock {
        x: i32,
        y: i32,
        z: i32,
        /// Block name, e.g. `stone` or `wheat_ripe`
        block: BlockType,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (mut config, source) = AppConfig::load_from_path(&args.config)?;

    // RUST_LOG wins over the configured filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    if source == ConfigSource::Defaults {
        warn!(
            "Config file {} not found. Using defaults",
            args.config.display()
        );
    }
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if let Some(path) = args.world_file {
        config.world_file = Some(path);
    }
    info!(seed = config.world.seed, "Starting voxelgen");

    match args.command {
        Command::Generate { radius, workers } => {
            let store = open_store(&config)?;
            commands::generate(&store, radius, workers.or(config.workers))?;
            store.shutdown()?;
        }
        Command::Inspect { x, z } => {
            let store = open_store(&config)?;
            commands::inspect(&store, x, z)?;
        }
        Command::Biomes { radius } => {
            let generator = TerrainGenerator::new(config.world.clone())?;
            commands::biomes(&generator, radius)?;
        }
        Command::ValidateSeams { radius } => {
            let generator = TerrainGenerator::new(config.world.clone())?;
            commands::validate_seams(&generator, radius)?;
        }
        Command::SetBlock { x, y, z, block } => {
            let store = open_store(&config)?;
            commands::set_block(&store, x, y, z, block)?;
        }
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> Result<ChunkStore> {
    let store = ChunkStore::new(config.world.clone()).context("Invalid world configuration")?;
    Ok(match &config.world_file {
        Some(path) => store.with_world_file(path),
        None => store,
    })
}
