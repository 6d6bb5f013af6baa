//! Batch processing: apply one rule set to many files.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{ExtractionError, KwexError, Result};
use crate::extract::resolve;
use crate::models::config::BatchConfig;
use crate::rules::ExtractionRules;
use crate::source::{FormatLoader, InputFile, SourceLoader};
use crate::table::{OutputRow, OutputTable, assemble};

/// Result of processing a single file.
pub type FileResult = std::result::Result<OutputRow, ExtractionError>;

/// A batch input, or the error that kept it from being opened.
pub type FileEntry = std::result::Result<InputFile, ExtractionError>;

/// Rows for the files that succeeded, plus the failures that were skipped.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One row per successfully processed file, in input order.
    pub table: OutputTable,
    /// Files that contributed no row, in input order.
    pub failures: Vec<ExtractionError>,
}

impl BatchReport {
    /// Number of files the batch was given.
    pub fn processed(&self) -> usize {
        self.table.len() + self.failures.len()
    }

    pub fn succeeded(&self) -> usize {
        self.table.len()
    }
}

/// Load, resolve and assemble one file.
pub fn extract_file<L>(loader: &L, rules: &ExtractionRules, file: &InputFile) -> FileResult
where
    L: SourceLoader + ?Sized,
{
    let source = loader.load(file)?;
    let resolution = resolve(&source, rules);
    Ok(assemble(&resolution, rules.columns(), &file.name))
}

/// Drives a batch run.
///
/// Rules are shared read-only across files. Per-file failures never abort
/// the batch; rows keep the input order whatever the worker count.
pub struct BatchDriver<L = FormatLoader> {
    loader: Arc<L>,
    rules: Arc<ExtractionRules>,
    jobs: usize,
    timeout: Option<Duration>,
}

impl BatchDriver<FormatLoader> {
    /// Create a driver reading files with the built-in format readers.
    pub fn new(rules: ExtractionRules) -> Self {
        Self::with_loader(rules, FormatLoader::new())
    }
}

impl<L: SourceLoader + 'static> BatchDriver<L> {
    /// Create a driver with a custom loader.
    pub fn with_loader(rules: ExtractionRules, loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            rules: Arc::new(rules),
            jobs: 1,
            timeout: None,
        }
    }

    /// Number of files processed concurrently (minimum 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Per-file deadline for load and resolution.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Apply batch settings from configuration.
    pub fn with_config(self, config: &BatchConfig) -> Self {
        self.with_jobs(config.jobs).with_timeout(config.timeout())
    }

    pub fn rules(&self) -> &ExtractionRules {
        &self.rules
    }

    /// Process every file and collect the table.
    pub fn run(&self, files: Vec<InputFile>) -> Result<BatchReport> {
        self.run_with_progress(files, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `progress` on the calling thread as
    /// each file finishes (in completion order).
    pub fn run_with_progress<F>(&self, files: Vec<InputFile>, progress: F) -> Result<BatchReport>
    where
        F: FnMut(&str, &FileResult),
    {
        self.run_entries(files.into_iter().map(Ok).collect(), progress)
    }

    /// Like [`run_with_progress`](Self::run_with_progress), for inputs that
    /// may already have failed to open. Such entries are reported as
    /// failures at their input position.
    pub fn run_entries<F>(&self, entries: Vec<FileEntry>, mut progress: F) -> Result<BatchReport>
    where
        F: FnMut(&str, &FileResult),
    {
        if entries.is_empty() {
            return Err(KwexError::EmptyBatch);
        }

        let start = Instant::now();
        let total = entries.len();
        let mut slots: Vec<Option<FileResult>> = (0..total).map(|_| None).collect();

        let mut pending = Vec::with_capacity(total);
        for (index, entry) in entries.into_iter().enumerate() {
            match entry {
                Ok(file) => pending.push((index, file)),
                Err(e) => {
                    let name = e.file.clone();
                    let result = Err(e);
                    progress(&name, &result);
                    slots[index] = Some(result);
                }
            }
        }

        let jobs = self.jobs.min(pending.len()).max(1);
        info!("Processing {} files with {} worker(s)", pending.len(), jobs);

        if jobs == 1 {
            for (index, file) in pending {
                let name = file.name.clone();
                let result = self.process(file);
                progress(&name, &result);
                slots[index] = Some(result);
            }
        } else {
            let mut buckets: Vec<Vec<(usize, InputFile)>> = (0..jobs).map(|_| Vec::new()).collect();
            for (position, entry) in pending.into_iter().enumerate() {
                buckets[position % jobs].push(entry);
            }

            thread::scope(|scope| {
                let (tx, rx) = mpsc::channel();
                for bucket in buckets {
                    let tx = tx.clone();
                    scope.spawn(move || {
                        for (index, file) in bucket {
                            let name = file.name.clone();
                            let result = self.process(file);
                            if tx.send((index, name, result)).is_err() {
                                break;
                            }
                        }
                    });
                }
                drop(tx);

                for (index, name, result) in rx {
                    progress(&name, &result);
                    slots[index] = Some(result);
                }
            });
        }

        let mut report = BatchReport {
            table: OutputTable::new(self.rules.header()),
            failures: Vec::new(),
        };

        for result in slots.into_iter().flatten() {
            match result {
                Ok(row) => report.table.push(row),
                Err(e) => {
                    warn!("Skipping {}", e);
                    report.failures.push(e);
                }
            }
        }

        info!(
            "Batch finished in {:?}: {} rows, {} failed",
            start.elapsed(),
            report.succeeded(),
            report.failures.len()
        );
        Ok(report)
    }

    fn process(&self, file: InputFile) -> FileResult {
        let file_start = Instant::now();
        let name = file.name.clone();
        let result = match self.timeout {
            None => extract_file(self.loader.as_ref(), &self.rules, &file),
            Some(limit) => self.process_with_deadline(file, limit),
        };
        debug!("{} done in {:?} (ok={})", name, file_start.elapsed(), result.is_ok());
        result
    }

    /// The worker thread is left to finish on its own when the deadline
    /// passes; its result is discarded.
    fn process_with_deadline(&self, file: InputFile, limit: Duration) -> FileResult {
        let name = file.name.clone();
        let loader = Arc::clone(&self.loader);
        let rules = Arc::clone(&self.rules);
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(extract_file(loader.as_ref(), &rules, &file));
        });

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!("{} exceeded the {:?} deadline", name, limit);
                Err(ExtractionError::timeout(name, limit))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(ExtractionError::unreadable(name, "reader stopped without a result"))
            }
        }
    }
}
