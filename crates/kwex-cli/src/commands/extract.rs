//! Extract command: apply column rules to a batch of documents.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use kwex_core::{
    BatchDriver, BatchReport, ColumnSpec, ExtractionError, ExtractionRules, FileEntry, InputFile,
    KwexConfig, OutputTable, ResolverMode, StopWords, TableWriter,
};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input files, directories or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Column as NAME[=KEYWORD][:BEHAVIOR], or NAME:filename (repeatable)
    #[arg(long = "column", value_name = "SPEC")]
    columns: Vec<ColumnSpec>,

    /// Stop word ending value collection (repeatable, replaces the defaults)
    #[arg(long = "stop-word", value_name = "WORD")]
    stop_words: Vec<String>,

    /// How repeated keywords are handled
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Drop colon-only tokens between keyword and value
    #[arg(long)]
    skip_separators: bool,

    /// Output CSV file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Per-file deadline in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Exit with an error when any file was skipped
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Collect distinct values from every keyword occurrence
    Aggregate,
    /// Use the first occurrence and the nearest value only
    Single,
}

impl From<ModeArg> for ResolverMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Aggregate => ResolverMode::AggregateUnique,
            ModeArg::Single => ResolverMode::SingleMatch,
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &args);

    let rules = build_rules(&config, &args)?;
    debug!("Columns: {:?}", rules.header());

    let paths = expand_inputs(&args.inputs)?;
    if paths.is_empty() {
        anyhow::bail!("No input files matched: {}", args.inputs.join(" "));
    }

    let entries: Vec<FileEntry> = paths
        .iter()
        .map(|path| {
            InputFile::from_path(path)
                .map_err(|e| ExtractionError::unreadable(path.display().to_string(), e))
        })
        .collect();

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        entries.len()
    );

    let progress = ProgressBar::new(entries.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );

    let driver = BatchDriver::new(rules).with_config(&config.batch);
    let bar = progress.clone();
    let report = tokio::task::spawn_blocking(move || {
        driver.run_entries(entries, |name, _| {
            bar.set_message(name.to_string());
            bar.inc(1);
        })
    })
    .await??;
    progress.finish_and_clear();

    write_table(&report.table, config.output.path.as_ref())?;
    print_summary(&report, paths.len(), start);

    if args.fail_fast && !report.failures.is_empty() {
        anyhow::bail!("{} file(s) could not be processed", report.failures.len());
    }

    Ok(())
}

/// Command-line flags take precedence over the configuration file.
fn apply_overrides(config: &mut KwexConfig, args: &ExtractArgs) {
    if let Some(jobs) = args.jobs {
        config.batch.jobs = jobs;
    }
    if args.timeout.is_some() {
        config.batch.timeout_secs = args.timeout;
    }
    if args.output.is_some() {
        config.output.path = args.output.clone();
    }
    if let Some(mode) = args.mode {
        config.extraction.mode = mode.into();
    }
    if args.skip_separators {
        config.extraction.skip_separators = true;
    }
    if !args.stop_words.is_empty() {
        config.extraction.stop_words = args.stop_words.clone();
    }
}

fn build_rules(config: &KwexConfig, args: &ExtractArgs) -> anyhow::Result<ExtractionRules> {
    if args.columns.is_empty() {
        if config.extraction.column_titles.is_empty() {
            anyhow::bail!("No columns given. Use --column or set extraction.column_titles in the config file.");
        }
        return Ok(config.extraction.rules()?);
    }

    let extraction = &config.extraction;
    Ok(ExtractionRules::new(args.columns.clone())?
        .with_stop_words(StopWords::new(extraction.stop_words.iter().cloned()))
        .with_mode(extraction.mode)
        .with_skip_separators(extraction.skip_separators))
}

/// Glob patterns expand to their matches and directories to the files
/// directly inside them (sorted by name); other inputs are taken as paths.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        let before = paths.len();
        let path = Path::new(input);

        if input.contains(['*', '?', '[']) {
            paths.extend(glob(input)?.filter_map(|entry| entry.ok()).filter(|p| p.is_file()));
        } else if path.is_dir() {
            let mut files: Vec<PathBuf> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.is_file())
                .collect();
            files.sort();
            debug!("{}: {} files", path.display(), files.len());
            paths.extend(files);
        } else {
            paths.push(path.to_path_buf());
        }

        if paths.len() == before {
            warn!("No files found for {}", input);
        }
    }
    Ok(paths)
}

fn write_table(table: &OutputTable, path: Option<&PathBuf>) -> anyhow::Result<()> {
    let writer = TableWriter::new();
    match path {
        Some(path) => {
            writer.write_to_path(table, path)?;
            eprintln!(
                "{} Wrote {} rows to {}",
                style("✓").green(),
                table.len(),
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writer.write(table, &mut handle)?;
            handle.flush()?;
        }
    }
    Ok(())
}

fn print_summary(report: &BatchReport, total: usize, start: Instant) {
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        total,
        start.elapsed()
    );
    eprintln!("  Extracted: {}", style(report.succeeded()).green());

    if !report.failures.is_empty() {
        eprintln!("  Skipped:   {}", style(report.failures.len()).red());
        for failure in &report.failures {
            eprintln!("    {} {}", style("✗").red(), failure);
        }
    }
}
