//! Concurrent chunk store with on-demand generation and persistence.
//!
//! Each chunk coordinate owns a slot holding the chunk behind an `RwLock`
//! plus a `OnceLock` gate, so concurrent requests for the same coordinate run
//! the generator at most once. Player overrides are mirrored into a
//! persisted record that is merged into chunks whenever they are (re)created.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use dashmap::DashMap;
use lru::LruCache;
use tracing::{debug, info, warn};
use voxelgen_core::{BlockType, WorldPos};

use crate::chunk::{Chunk, ChunkPos};
use crate::config::WorldConfig;
use crate::error::{ConfigError, WorldError};
use crate::persist::{WorldFile, WorldRecord};
use crate::terrain::TerrainGenerator;

/// Handle to a resident chunk shared between the store and its callers.
pub type SharedChunk = Arc<RwLock<Chunk>>;

type PersistedOverrides = HashMap<ChunkPos, BTreeMap<WorldPos, BlockType>>;

const UNLOAD_ATTEMPTS: usize = 4;

/// Lifecycle state of a chunk coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// No slot in memory.
    Unloaded,
    /// Slot exists (e.g. restored overrides) but terrain has not been generated.
    Pending,
    /// A caller is running the generator for this chunk.
    Generating,
    /// Generated with no unsaved edits.
    Clean,
    /// Generated with edits not yet written to disk.
    Dirty,
}

/// Snapshot of store counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub resident: usize,
    pub dirty: usize,
    pub generated: u64,
    pub evicted: u64,
    pub persisted_overrides: usize,
}

fn read_chunk(chunk: &RwLock<Chunk>) -> RwLockReadGuard<'_, Chunk> {
    chunk.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_chunk(chunk: &RwLock<Chunk>) -> RwLockWriteGuard<'_, Chunk> {
    chunk.write().unwrap_or_else(PoisonError::into_inner)
}

struct ChunkSlot {
    chunk: SharedChunk,
    generated: OnceLock<()>,
    generating: AtomicBool,
}

impl ChunkSlot {
    fn new(chunk: Chunk) -> Self {
        Self {
            chunk: Arc::new(RwLock::new(chunk)),
            generated: OnceLock::new(),
            generating: AtomicBool::new(false),
        }
    }

    fn state(&self) -> ChunkState {
        if self.generating.load(Ordering::Acquire) {
            return ChunkState::Generating;
        }
        if self.generated.get().is_none() {
            return ChunkState::Pending;
        }
        if read_chunk(&self.chunk).is_dirty() {
            ChunkState::Dirty
        } else {
            ChunkState::Clean
        }
    }

    /// No unsaved edits and no chunk handle outside the store.
    fn is_idle_and_clean(&self) -> bool {
        if self.generating.load(Ordering::Acquire) || Arc::strong_count(&self.chunk) > 1 {
            return false;
        }
        match self.chunk.try_read() {
            Ok(chunk) => !chunk.is_dirty(),
            Err(_) => false,
        }
    }

    fn is_evictable(&self) -> bool {
        self.generated.get().is_some() && self.is_idle_and_clean()
    }

    fn is_held(slot: &Arc<ChunkSlot>) -> bool {
        Arc::strong_count(slot) > 1 || Arc::strong_count(&slot.chunk) > 1
    }
}

/// Thread-safe chunk cache backed by a [`TerrainGenerator`].
pub struct ChunkStore {
    generator: TerrainGenerator,
    slots: DashMap<ChunkPos, Arc<ChunkSlot>>,
    lru: Mutex<LruCache<ChunkPos, ()>>,
    capacity: usize,
    persisted: RwLock<PersistedOverrides>,
    world_file: Option<WorldFile>,
    /// Set once the world file has been read (or written) by this store.
    file_synced: AtomicBool,
    save_lock: Mutex<()>,
    generations: AtomicU64,
    evictions: AtomicU64,
}

impl ChunkStore {
    /// Create a store with no backing file.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        let capacity = config.cache_capacity.max(1);
        Ok(Self {
            generator: TerrainGenerator::new(config)?,
            slots: DashMap::new(),
            lru: Mutex::new(LruCache::unbounded()),
            capacity,
            persisted: RwLock::new(HashMap::new()),
            world_file: None,
            file_synced: AtomicBool::new(false),
            save_lock: Mutex::new(()),
            generations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        })
    }

    /// Persist overrides to `path` on save and read them back on load.
    pub fn with_world_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.world_file = Some(WorldFile::new(path));
        self
    }

    pub fn config(&self) -> &WorldConfig {
        self.generator.config()
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn world_file(&self) -> Option<&WorldFile> {
        self.world_file.as_ref()
    }

    fn chunk_size(&self) -> i32 {
        self.generator.config().dims().size
    }

    fn world_height(&self) -> i32 {
        self.generator.config().dims().height
    }

    /// Resident chunk at `pos`, without generating or touching the LRU.
    pub fn get_chunk(&self, pos: ChunkPos) -> Option<SharedChunk> {
        self.slots.get(&pos).map(|slot| Arc::clone(&slot.chunk))
    }

    /// Chunk at `pos`, generating it on first request.
    ///
    /// Concurrent callers for the same coordinate block until the first one
    /// finishes and then share its chunk.
    pub fn get_or_generate_chunk(&self, pos: ChunkPos) -> SharedChunk {
        let (slot, created) = self.slot(pos);
        slot.generated.get_or_init(|| {
            slot.generating.store(true, Ordering::Release);
            let generated = self.generator.generate_chunk(pos);
            write_chunk(&slot.chunk).apply_generated(generated);
            self.generations.fetch_add(1, Ordering::Relaxed);
            slot.generating.store(false, Ordering::Release);
        });

        let chunk = Arc::clone(&slot.chunk);
        self.touch(pos);
        if created {
            self.evict_if_needed();
        }
        chunk
    }

    /// Block at world position; air outside the height range.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockType {
        if !(0..self.world_height()).contains(&y) {
            return BlockType::Air;
        }
        let chunk = self.get_or_generate_chunk(ChunkPos::containing(x, z, self.chunk_size()));
        let block = read_chunk(&chunk).get(WorldPos::new(x, y, z));
        block
    }

    /// Player edit. Generates the owning chunk first so the edit is never
    /// overwritten by later generation.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: BlockType) -> Result<(), WorldError> {
        let height = self.world_height();
        if !(0..height).contains(&y) {
            return Err(WorldError::OutOfWorld { y, height });
        }
        let chunk = self.get_or_generate_chunk(ChunkPos::containing(x, z, self.chunk_size()));
        write_chunk(&chunk).set_block(WorldPos::new(x, y, z), block);
        Ok(())
    }

    pub fn chunk_state(&self, pos: ChunkPos) -> ChunkState {
        self.slots
            .get(&pos)
            .map(|slot| slot.state())
            .unwrap_or(ChunkState::Unloaded)
    }

    pub fn stats(&self) -> StoreStats {
        let dirty = self
            .slots
            .iter()
            .filter(|slot| read_chunk(&slot.chunk).is_dirty())
            .count();
        let persisted_overrides = self
            .persisted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(BTreeMap::len)
            .sum();
        StoreStats {
            resident: self.slots.len(),
            dirty,
            generated: self.generations.load(Ordering::Relaxed),
            evicted: self.evictions.load(Ordering::Relaxed),
            persisted_overrides,
        }
    }

    /// Resident chunk coordinates, sorted.
    pub fn resident_chunks(&self) -> Vec<ChunkPos> {
        let mut positions: Vec<_> = self.slots.iter().map(|slot| *slot.key()).collect();
        positions.sort();
        positions
    }

    /// Write overrides of every dirty chunk. Returns how many chunks were saved.
    ///
    /// On failure the chunks stay dirty and the error is returned.
    pub fn save_dirty_chunks(&self) -> Result<usize> {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let dirty: Vec<(ChunkPos, SharedChunk)> = self
            .slots
            .iter()
            .filter(|slot| read_chunk(&slot.chunk).is_dirty())
            .map(|slot| (*slot.key(), Arc::clone(&slot.chunk)))
            .collect();
        if dirty.is_empty() {
            return Ok(0);
        }

        let Some(file) = &self.world_file else {
            warn!(
                chunks = dirty.len(),
                "No world file configured; dirty chunks not saved"
            );
            return Ok(0);
        };

        // Snapshot under read locks; edits landing after this stay dirty.
        let snapshots: Vec<_> = dirty
            .iter()
            .map(|(pos, chunk)| (*pos, read_chunk(chunk).override_entries()))
            .collect();

        // Edits saved by an earlier session that this store never loaded.
        let mut merged = if self.file_synced.load(Ordering::Acquire) {
            PersistedOverrides::new()
        } else {
            self.read_world_file(file)
        };
        for (pos, entries) in self
            .persisted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            merged.entry(*pos).or_default().extend(entries.clone());
        }
        for (pos, overrides) in &snapshots {
            merged.entry(*pos).or_default().extend(overrides.clone());
        }

        let flat: BTreeMap<WorldPos, BlockType> = merged
            .values()
            .flat_map(|entries| entries.iter().map(|(&pos, &block)| (pos, block)))
            .collect();
        file.save(&WorldRecord::new(self.config().seed, &flat))?;
        self.file_synced.store(true, Ordering::Release);

        *self.persisted.write().unwrap_or_else(PoisonError::into_inner) = merged;
        for ((_, chunk), (_, saved)) in dirty.iter().zip(&snapshots) {
            let mut chunk = write_chunk(chunk);
            if chunk.override_entries() == *saved {
                chunk.mark_saved();
            }
        }

        info!(
            chunks = dirty.len(),
            overrides = flat.len(),
            path = %file.path().display(),
            "Saved dirty chunks"
        );
        Ok(dirty.len())
    }

    /// Read persisted overrides into chunk slots. Returns the number of
    /// overrides restored.
    ///
    /// A missing, unreadable or corrupt file leaves the world empty of
    /// overrides; the failure is logged rather than returned.
    pub fn load_world(&self) -> usize {
        let Some(file) = &self.world_file else {
            return 0;
        };
        let by_chunk = self.read_world_file(file);
        self.file_synced.store(true, Ordering::Release);

        let restored: usize = by_chunk.values().map(BTreeMap::len).sum();
        {
            let mut persisted = self.persisted.write().unwrap_or_else(PoisonError::into_inner);
            for (pos, entries) in &by_chunk {
                persisted.entry(*pos).or_default().extend(entries.clone());
            }
        }

        for (pos, entries) in &by_chunk {
            let (slot, _) = self.slot(*pos);
            let mut chunk = write_chunk(&slot.chunk);
            for (&world_pos, &block) in entries {
                chunk.apply_override(world_pos, block);
            }
        }

        info!(
            overrides = restored,
            chunks = by_chunk.len(),
            path = %file.path().display(),
            "Loaded world"
        );
        restored
    }

    /// Overrides stored in `file`, grouped by chunk. Anything unreadable is
    /// logged and treated as an empty world.
    fn read_world_file(&self, file: &WorldFile) -> PersistedOverrides {
        let overrides = match file.load() {
            Ok(Some(record)) => {
                if record.seed != self.config().seed {
                    warn!(
                        file_seed = record.seed,
                        world_seed = self.config().seed,
                        "World file was saved with a different seed"
                    );
                }
                match record.overrides() {
                    Ok(overrides) => overrides,
                    Err(err) => {
                        warn!(error = %format!("{err:#}"), "Ignoring unreadable world file");
                        return PersistedOverrides::new();
                    }
                }
            }
            Ok(None) => {
                debug!(path = %file.path().display(), "No world file yet");
                return PersistedOverrides::new();
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "Failed to load world; starting empty");
                return PersistedOverrides::new();
            }
        };

        let size = self.chunk_size();
        let height = self.world_height();
        let mut by_chunk = PersistedOverrides::new();
        let mut skipped = 0usize;
        for (pos, block) in overrides {
            if !(0..height).contains(&pos.y) {
                skipped += 1;
                continue;
            }
            by_chunk
                .entry(ChunkPos::containing(pos.x, pos.z, size))
                .or_default()
                .insert(pos, block);
        }
        if skipped > 0 {
            warn!(skipped, "Dropped overrides outside the world height range");
        }
        by_chunk
    }

    /// Save the chunk if dirty, then drop it from memory.
    ///
    /// Returns `false` when the chunk was not resident or a caller still holds
    /// a handle to it. A held chunk stays resident so later edits through that
    /// handle are saved with it.
    pub fn unload_chunk(&self, pos: ChunkPos) -> Result<bool> {
        for _ in 0..UNLOAD_ATTEMPTS {
            let Some(chunk) = self.get_chunk(pos) else {
                return Ok(false);
            };
            let dirty = read_chunk(&chunk).is_dirty();
            drop(chunk);

            if dirty {
                if self.world_file.is_none() {
                    anyhow::bail!("Cannot unload dirty chunk {pos} without a world file");
                }
                self.save_dirty_chunks()?;
            }

            if self
                .slots
                .remove_if(&pos, |_, slot| {
                    !ChunkSlot::is_held(slot) && slot.is_idle_and_clean()
                })
                .is_some()
            {
                self.lru
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop(&pos);
                debug!(chunk_pos = %pos, "Unloaded chunk");
                return Ok(true);
            }

            let held = self
                .slots
                .get(&pos)
                .is_some_and(|slot| ChunkSlot::is_held(slot.value()));
            if held {
                debug!(chunk_pos = %pos, "Chunk still in use; not unloaded");
                return Ok(false);
            }
            // Edited between the save and the removal; save again.
        }
        Ok(false)
    }

    /// Flush dirty chunks before the store goes away.
    pub fn shutdown(&self) -> Result<usize> {
        let saved = self.save_dirty_chunks()?;
        info!(saved, "Chunk store shut down");
        Ok(saved)
    }

    /// Existing slot for `pos`, or a new one seeded with persisted overrides.
    fn slot(&self, pos: ChunkPos) -> (Arc<ChunkSlot>, bool) {
        if let Some(slot) = self.slots.get(&pos) {
            return (Arc::clone(&slot), false);
        }
        let mut created = false;
        let slot = self
            .slots
            .entry(pos)
            .or_insert_with(|| {
                created = true;
                let mut chunk = Chunk::new(pos, self.generator.config().dims());
                let persisted = self.persisted.read().unwrap_or_else(PoisonError::into_inner);
                if let Some(entries) = persisted.get(&pos) {
                    for (&world_pos, &block) in entries {
                        chunk.apply_override(world_pos, block);
                    }
                }
                Arc::new(ChunkSlot::new(chunk))
            })
            .clone();
        (slot, created)
    }

    fn touch(&self, pos: ChunkPos) {
        self.lru
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(pos, ());
    }

    fn evict_if_needed(&self) {
        if self.slots.len() <= self.capacity {
            return;
        }
        // Least recently used first.
        let candidates: Vec<ChunkPos> = self
            .lru
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .map(|(pos, _)| *pos)
            .collect();

        for pos in candidates {
            if self.slots.len() <= self.capacity {
                break;
            }
            if self
                .slots
                .remove_if(&pos, |_, slot| !ChunkSlot::is_held(slot) && slot.is_evictable())
                .is_some()
            {
                self.lru
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop(&pos);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(chunk_pos = %pos, "Evicted chunk");
            }
        }
    }
}
