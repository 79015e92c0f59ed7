//! Metrics reports written by world tests for CI artifacts.
//!
//! Reports are exported as pretty JSON so generation throughput and seam
//! quality can be compared between runs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use voxelgen_core::BlockType;

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test identifier
    pub test_name: String,

    /// Timestamp when metrics were collected (RFC 3339)
    pub timestamp: String,

    /// World seed the test ran with
    pub seed: u64,

    /// Overall test result
    pub result: TestResult,

    /// Terrain generation metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainMetrics>,

    /// Persistence/save metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistenceMetrics>,

    /// Test execution metrics
    pub test_execution: TestExecutionMetrics,
}

/// Overall test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Test passed all validations
    Pass,
    /// Test failed
    Fail,
}

impl TestResult {
    /// `Pass` when `ok`, otherwise `Fail`.
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            TestResult::Pass
        } else {
            TestResult::Fail
        }
    }
}

/// Terrain generation throughput and quality
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainMetrics {
    /// Total chunks generated
    pub chunks_generated: usize,

    /// Total non-air blocks generated
    pub blocks_generated: usize,

    /// Average generation time per chunk (microseconds)
    pub avg_gen_time_us: f64,

    /// Max generation time (microseconds)
    pub max_gen_time_us: u128,

    /// Chunks per second throughput
    pub chunks_per_second: f64,

    /// Number of unique biomes present
    pub unique_biomes: usize,

    /// Block counts keyed by block name
    pub block_counts: BTreeMap<String, usize>,

    /// Chunk seam validation results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seam_validation: Option<SeamValidation>,
}

/// Chunk boundary seam validation metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeamValidation {
    /// Total seams checked
    pub total_seams: usize,

    /// Seams that passed validation
    pub seams_valid: usize,

    /// Maximum height difference observed at seams
    pub max_seam_diff: i32,
}

/// Save/load metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetrics {
    /// Overrides written
    pub overrides_saved: usize,

    /// Overrides restored on load
    pub overrides_loaded: usize,

    /// Size of the world file on disk
    pub bytes_written: u64,

    /// Save time (microseconds)
    pub save_time_us: u128,

    /// Load time (microseconds)
    pub load_time_us: u128,
}

/// Test execution metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Total test duration (seconds)
    pub duration_seconds: f64,

    /// Number of validations passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations_passed: Option<usize>,
}

/// Tally of block types, keyed by stable block name.
#[derive(Debug, Clone, Default)]
pub struct BlockHistogram {
    counts: BTreeMap<String, usize>,
}

impl BlockHistogram {
    /// Empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one block.
    pub fn record(&mut self, block: BlockType) {
        *self.counts.entry(block.as_str().to_string()).or_insert(0) += 1;
    }

    /// Count for `block`.
    pub fn count(&self, block: BlockType) -> usize {
        self.counts.get(block.as_str()).copied().unwrap_or(0)
    }

    /// Sum over all block types.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Counts keyed by block name.
    pub fn into_counts(self) -> BTreeMap<String, usize> {
        self.counts
    }
}

impl Extend<BlockType> for BlockHistogram {
    fn extend<I: IntoIterator<Item = BlockType>>(&mut self, iter: I) {
        for block in iter {
            self.record(block);
        }
    }
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with test name and seed
    pub fn new(test_name: impl Into<String>, seed: u64) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                seed,
                result: TestResult::Pass,
                terrain: None,
                persistence: None,
                test_execution: TestExecutionMetrics::default(),
            },
        }
    }

    /// Set test result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set terrain metrics
    pub fn terrain(mut self, metrics: TerrainMetrics) -> Self {
        self.report.terrain = Some(metrics);
        self
    }

    /// Set persistence metrics
    pub fn persistence(mut self, metrics: PersistenceMetrics) -> Self {
        self.report.persistence = Some(metrics);
        self
    }

    /// Set test execution metrics
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: std::path::PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn histogram_counts_by_name() {
        let mut histogram = BlockHistogram::new();
        histogram.extend([BlockType::Stone, BlockType::Stone, BlockType::CoalOre]);

        assert_eq!(histogram.count(BlockType::Stone), 2);
        assert_eq!(histogram.count(BlockType::DiamondOre), 0);
        assert_eq!(histogram.total(), 3);
        assert_eq!(histogram.into_counts().get("coal_ore"), Some(&1));
    }

    #[test]
    fn metrics_report_roundtrip() {
        let report = MetricsReportBuilder::new("test_example", 12345)
            .terrain(TerrainMetrics {
                chunks_generated: 100,
                blocks_generated: 409600,
                avg_gen_time_us: 3970.0,
                max_gen_time_us: 8000,
                chunks_per_second: 252.0,
                unique_biomes: 4,
                block_counts: BTreeMap::new(),
                seam_validation: Some(SeamValidation {
                    total_seams: 400,
                    seams_valid: 400,
                    max_seam_diff: 12,
                }),
            })
            .execution(TestExecutionMetrics {
                duration_seconds: 2.5,
                validations_passed: Some(500),
            })
            .build();

        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: MetricsReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.test_name, "test_example");
        assert_eq!(parsed.seed, 12345);
        assert_eq!(parsed.result, TestResult::Pass);
        assert_eq!(parsed.terrain.as_ref().unwrap().chunks_generated, 100);
        assert!(parsed.persistence.is_none());
    }

    #[test]
    fn metrics_sink_writes_file() {
        let path = std::env::temp_dir().join(format!(
            "metrics-{}.json",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let report = MetricsReportBuilder::new("sink_test", 0)
            .result(TestResult::from_bool(true))
            .build();

        let sink = MetricsSink::create(&path).unwrap();
        sink.write(&report).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("sink_test"));
        assert!(contents.contains("\"result\": \"pass\""));

        fs::remove_file(&path).ok();
    }
}
