#![warn(missing_docs)]
//! Shared helpers for world tests: temp world files and metrics reports.

mod metrics;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub use metrics::*;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique path in the system temp dir; nothing is created.
pub fn temp_path(prefix: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "{prefix}-{}-{nanos}-{n}.{extension}",
        std::process::id()
    ))
}

/// Directory where world tests drop their metrics reports.
pub fn metrics_dir() -> PathBuf {
    std::env::temp_dir().join("voxelgen-metrics")
}

/// A world file path that is removed (with its temp sibling) on drop.
pub struct TempWorld {
    path: PathBuf,
}

impl TempWorld {
    /// Reserve a fresh path.
    pub fn new(name: &str) -> Self {
        Self {
            path: temp_path(&format!("voxelgen-{name}"), "vxw"),
        }
    }

    /// The world file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempWorld {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let _ = std::fs::remove_file(PathBuf::from(tmp));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_paths_are_unique() {
        assert_ne!(temp_path("a", "json"), temp_path("a", "json"));
    }

    #[test]
    fn temp_world_cleans_up() {
        let path = {
            let world = TempWorld::new("cleanup");
            std::fs::write(world.path(), b"x").unwrap();
            assert!(world.path().exists());
            world.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
