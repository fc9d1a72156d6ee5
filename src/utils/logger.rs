//! Run journal
//!
//! The `Logger` keeps a plain-text record of a run (configuration, per-stage
//! timings, failed tiles) next to the console diagnostics that go through the
//! `log` crate. Writes are serialised through a mutex so worker threads can
//! share one journal.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

/// Journal writer shared by the pipeline stages
pub struct Logger {
    /// File handle for journal output, `None` for a disabled journal
    file: Mutex<Option<File>>,
}

impl Logger {
    /// Creates a journal at the given path, truncating an existing file
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the journal file; missing parent directories are created
    pub fn new(log_file: &Path) -> io::Result<Self> {
        if let Some(parent) = log_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(log_file)?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
        })
    }

    /// A journal that drops every message
    pub fn disabled() -> Self {
        Logger {
            file: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().is_some()
    }

    // A panicking writer cannot leave the file half-owned, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends one line to the journal
    pub fn log(&self, message: &str) -> io::Result<()> {
        if let Some(file) = &mut *self.lock() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Writes a section heading
    pub fn log_section(&self, title: &str) -> io::Result<()> {
        self.log("")?;
        self.log(&format!("== {} ==", title))
    }

    /// Records a serialisable value as a single JSON line
    ///
    /// # Arguments
    ///
    /// * `label` - Prefix identifying the value
    /// * `value` - Anything serde can turn into JSON (run configs, summaries)
    pub fn log_json<T: Serialize>(&self, label: &str, value: &T) -> io::Result<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.log(&format!("{}: {}", label, json))
    }

    /// Records how long a stage took
    pub fn log_timing(&self, stage: &str, elapsed: Duration) -> io::Result<()> {
        self.log(&format!("{} completed in {:.3}s", stage, elapsed.as_secs_f64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_journal_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.log");
        let logger = Logger::new(&path).unwrap();

        let mut config = BTreeMap::new();
        config.insert("tile_size", 2000);
        logger.log_section("Tiling").unwrap();
        logger.log_json("config", &config).unwrap();
        logger.log_timing("tiling", Duration::from_millis(1500)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("== Tiling =="));
        assert!(text.contains("config: {\"tile_size\":2000}"));
        assert!(text.contains("tiling completed in 1.500s"));
    }

    #[test]
    fn test_disabled_journal_accepts_writes() {
        let logger = Logger::disabled();
        assert!(!logger.is_enabled());
        logger.log("dropped").unwrap();
    }

    #[test]
    fn test_shared_between_threads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("threads.log");
        let logger = Logger::new(&path).unwrap();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let logger = &logger;
                scope.spawn(move || {
                    for i in 0..10 {
                        logger.log(&format!("worker {} line {}", worker, i)).unwrap();
                    }
                });
            }
        });

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 40);
    }
}
