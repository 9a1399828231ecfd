//! Pipeline entry points: resolve effective paths from the app config and
//! run the stages in sequence.
//!
//! The whole pipeline is synchronous single-pass batch work; stages compose
//! by folder convention: the concatenator writes into `{source}/{output_dir}`
//! and the resolver reads the same folder by default.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, instrument};

use brainguide_concat::{ConcatConfig, ConcatReport, concatenate};
use brainguide_interlink::{ResolveConfig, ResolveReport, resolve};
use brainguide_render::{RenderOptions, render};
use brainguide_shared::{AppConfig, Result};

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self) {}
}

// ---------------------------------------------------------------------------
// Stage entry points
// ---------------------------------------------------------------------------

/// Result of a full `publish` run.
#[derive(Debug)]
pub struct PublishReport {
    /// Concatenation stage outcome.
    pub concat: ConcatReport,
    /// Link-resolution stage outcome.
    pub resolve: ResolveReport,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Run the concatenator. `input` overrides the configured source folder.
#[instrument(skip_all)]
pub fn run_concat(
    config: &AppConfig,
    input: Option<&Path>,
    progress: &dyn ProgressReporter,
) -> Result<ConcatReport> {
    let source = effective_source(config, input);
    progress.phase("Concatenating sections");

    let report = concatenate(&ConcatConfig {
        output_dir: source.join(&config.defaults.output_dir),
        source_dir: source,
        default_language: config.defaults.language.clone(),
        references: config.translations.references.clone(),
    })?;

    progress.done();
    Ok(report)
}

/// Run the link resolver. `input` overrides the default input (the
/// concatenator's output folder); a single file is accepted too.
#[instrument(skip_all)]
pub fn run_interlink(
    config: &AppConfig,
    input: Option<&Path>,
    progress: &dyn ProgressReporter,
) -> Result<ResolveReport> {
    let source = match input {
        Some(path) => path.to_path_buf(),
        None => staging_dir(config),
    };
    progress.phase("Resolving wiki links");

    let report = resolve(&ResolveConfig {
        source,
        index_dir: PathBuf::from(&config.content.index_dir),
        base_urls: config.base_urls.clone(),
        default_language: config.defaults.language.clone(),
    })?;

    progress.done();
    Ok(report)
}

/// Drive pandoc over one link-resolved document.
#[instrument(skip_all)]
pub fn run_render(
    config: &AppConfig,
    input: &Path,
    format: Option<&str>,
    output: Option<&Path>,
    progress: &dyn ProgressReporter,
) -> Result<PathBuf> {
    progress.phase("Rendering with pandoc");

    let csl = match config.render.csl.as_str() {
        "" => None,
        path => Some(PathBuf::from(path)),
    };

    let rendered = render(&RenderOptions {
        input: input.to_path_buf(),
        output: output.map(Path::to_path_buf),
        format: format.unwrap_or(&config.render.output_format).to_string(),
        bibliography: PathBuf::from(&config.render.bibliography),
        csl,
        remove_captions: config.render.remove_captions,
        filters_dir: PathBuf::from(&config.render.filters_dir),
    })?;

    progress.done();
    Ok(rendered)
}

/// Run concat then interlink: sections in, `html-ready` documents out.
#[instrument(skip_all)]
pub fn run_publish(
    config: &AppConfig,
    input: Option<&Path>,
    progress: &dyn ProgressReporter,
) -> Result<PublishReport> {
    let start = Instant::now();
    let source = effective_source(config, input);

    info!(source = %source.display(), "starting publish pipeline");

    let concat_report = run_concat(config, Some(source.as_path()), progress)?;
    let staging = source.join(&config.defaults.output_dir);
    let resolve_report = run_interlink(config, Some(staging.as_path()), progress)?;

    let report = PublishReport {
        concat: concat_report,
        resolve: resolve_report,
        elapsed: start.elapsed(),
    };

    info!(
        combined = report.concat.written.len(),
        published = report.resolve.written.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "publish pipeline complete"
    );

    Ok(report)
}

/// The folder the concatenator reads sections from.
fn effective_source(config: &AppConfig, input: Option<&Path>) -> PathBuf {
    input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.content.source_dir))
}

/// The folder combined documents land in between the two stages.
fn staging_dir(config: &AppConfig) -> PathBuf {
    PathBuf::from(&config.content.source_dir).join(&config.defaults.output_dir)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
