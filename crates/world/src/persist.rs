//! World file persistence with zstd compression.
//!
//! A world file stores every player override as a JSON record, compressed
//! with zstd and guarded by a CRC32 header. Writes go to a temporary file
//! that is renamed into place, so a crash mid-save never leaves a torn file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use voxelgen_core::{BlockType, WorldPos};

/// Magic number for world file identification.
const WORLD_MAGIC: u32 = u32::from_le_bytes(*b"VXGW");

/// Current world file format version.
const WORLD_VERSION: u16 = 1;

const HEADER_LEN: usize = 14;

/// World file header structure.
#[derive(Debug, Clone)]
struct WorldHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl WorldHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: WORLD_MAGIC,
            version: WORLD_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.extend_from_slice(&self.magic.to_le_bytes());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.crc32.to_le_bytes());
        bytes.extend_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            anyhow::bail!("World header too short");
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != WORLD_MAGIC {
            anyhow::bail!(
                "Invalid world magic: expected 0x{:08X}, got 0x{:08X}",
                WORLD_MAGIC,
                magic
            );
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version > WORLD_VERSION {
            anyhow::bail!(
                "Unsupported world file version {} (newest known is {})",
                version,
                WORLD_VERSION
            );
        }
        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

/// One persisted override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    /// `"x,y,z"`
    pub pos: String,
    pub block: BlockType,
}

/// Everything a world file holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub saved_at: DateTime<Utc>,
    pub seed: u64,
    pub blocks: Vec<BlockEntry>,
}

impl WorldRecord {
    /// Snapshot of the given overrides, stamped with the current time.
    pub fn new(seed: u64, overrides: &BTreeMap<WorldPos, BlockType>) -> Self {
        Self {
            saved_at: Utc::now(),
            seed,
            blocks: overrides
                .iter()
                .map(|(pos, &block)| BlockEntry {
                    pos: pos.to_string(),
                    block,
                })
                .collect(),
        }
    }

    /// Parse entries back into positions. Later duplicates win.
    pub fn overrides(&self) -> Result<BTreeMap<WorldPos, BlockType>> {
        self.blocks
            .iter()
            .map(|entry| {
                let pos = entry
                    .pos
                    .parse::<WorldPos>()
                    .with_context(|| format!("Invalid block position {:?}", entry.pos))?;
                Ok((pos, entry.block))
            })
            .collect()
    }
}

/// Serialize, compress and frame a record.
pub fn encode_record(record: &WorldRecord) -> Result<Vec<u8>> {
    let serialized = serde_json::to_vec(record).context("Failed to serialize world record")?;

    // Compress with zstd (level 3 for balanced speed/compression).
    let compressed =
        zstd::encode_all(&serialized[..], 3).context("Failed to compress world record")?;

    let mut hasher = Hasher::new();
    hasher.update(&compressed);
    let crc32 = hasher.finalize();

    let payload_len =
        u32::try_from(compressed.len()).context("World record too large for header")?;
    let mut bytes = WorldHeader::new(crc32, payload_len).to_bytes();
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

/// Validate, decompress and parse a framed record.
pub fn decode_record(bytes: &[u8]) -> Result<WorldRecord> {
    let header = WorldHeader::from_bytes(bytes)?;

    let payload = &bytes[HEADER_LEN..];
    let payload_len = header.payload_len as usize;
    if payload.len() < payload_len {
        anyhow::bail!(
            "World payload truncated: expected {} bytes, got {}",
            payload_len,
            payload.len()
        );
    }
    let compressed = &payload[..payload_len];

    // Verify CRC32.
    let mut hasher = Hasher::new();
    hasher.update(compressed);
    let computed_crc = hasher.finalize();
    if computed_crc != header.crc32 {
        anyhow::bail!(
            "CRC32 mismatch: expected {:08X}, got {:08X}",
            header.crc32,
            computed_crc
        );
    }

    let decompressed = zstd::decode_all(compressed).context("Failed to decompress world")?;
    serde_json::from_slice(&decompressed).context("Failed to deserialize world record")
}

/// A world file on disk.
#[derive(Debug, Clone)]
pub struct WorldFile {
    path: PathBuf,
}

impl WorldFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the record, or `None` when no file has been written yet.
    pub fn load(&self) -> Result<Option<WorldRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Failed to read world file {}", self.path.display()))?;
        decode_record(&bytes)
            .with_context(|| format!("Corrupt world file {}", self.path.display()))
            .map(Some)
    }

    /// Atomically replace the file with `record`.
    pub fn save(&self, record: &WorldRecord) -> Result<()> {
        let bytes = encode_record(record)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create world directory")?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, &bytes)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
