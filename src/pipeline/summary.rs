//! Run summaries

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::pipeline::merger::MergeSummary;
use crate::utils::logger::Logger;

/// Outcome of the extraction and merge stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub output: PathBuf,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Tiles that failed, with their cause
    pub failures: Vec<(PathBuf, String)>,
    pub workers: usize,
    pub merge: MergeSummary,
    pub features_written: usize,
    pub epsg: Option<u32>,
    pub extraction_elapsed: Duration,
    pub merge_elapsed: Duration,
}

impl PipelineSummary {
    pub fn total_elapsed(&self) -> Duration {
        self.extraction_elapsed + self.merge_elapsed
    }

    /// Writes the summary to the run journal
    pub fn log_to(&self, logger: &Logger) -> io::Result<()> {
        logger.log_section("Patch extraction")?;
        logger.log(&self.to_string())?;
        for (tile, cause) in &self.failures {
            logger.log(&format!("  failed: {} ({})", tile.display(), cause))?;
        }
        logger.log_json("merge", &self.merge)?;
        logger.log_timing("extraction", self.extraction_elapsed)?;
        logger.log_timing("merge and write", self.merge_elapsed)
    }
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} tiles succeeded ({} failed), {} features written to {} in {:.2}s",
               self.succeeded, self.attempted, self.failed, self.features_written,
               self.output.display(), self.total_elapsed().as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_journal() {
        let summary = PipelineSummary {
            output: PathBuf::from("out/patches.gpkg"),
            attempted: 4,
            succeeded: 3,
            failed: 1,
            failures: vec![(PathBuf::from("tiles/tile_0001_0001.tif"), "Invalid TIFF header".to_string())],
            workers: 2,
            merge: MergeSummary { input: 10, non_merged: 6, merged_inputs: 4, merged_outputs: 2 },
            features_written: 8,
            epsg: Some(32633),
            extraction_elapsed: Duration::from_millis(1250),
            merge_elapsed: Duration::from_millis(250),
        };
        let text = summary.to_string();
        assert!(text.starts_with("3/4 tiles succeeded (1 failed), 8 features written"));
        assert!(text.ends_with("in 1.50s"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let logger = Logger::new(&path).unwrap();
        summary.log_to(&logger).unwrap();
        let journal = std::fs::read_to_string(&path).unwrap();
        assert!(journal.contains("failed: tiles/tile_0001_0001.tif (Invalid TIFF header)"));
        assert!(journal.contains("\"merged_outputs\":2"));
    }
}
