//! Pandoc driver for the final render stage.
//!
//! The rendering itself is pandoc's job; this crate owns the preflight
//! checks, the Lua filter files, and the argument vector, then waits on the
//! subprocess. Citations come from a BibTeX bibliography via citeproc.

mod filters;

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, instrument};

use brainguide_shared::{BrainGuideError, Result};

/// One pandoc invocation.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Markdown document to render.
    pub input: PathBuf,
    /// Output path. Defaults to the input with the target format's extension.
    pub output: Option<PathBuf>,
    /// Target format: `html` or `md`.
    pub format: String,
    /// BibTeX bibliography for citeproc.
    pub bibliography: PathBuf,
    /// CSL citation style, if any.
    pub csl: Option<PathBuf>,
    /// Whether to apply the caption-removal filter.
    pub remove_captions: bool,
    /// Directory the Lua filters live in (created and populated if absent).
    pub filters_dir: PathBuf,
}

/// Render a document through pandoc. Returns the output path.
#[instrument(skip_all, fields(input = %opts.input.display(), format = %opts.format))]
pub fn render(opts: &RenderOptions) -> Result<PathBuf> {
    preflight(opts)?;
    filters::ensure_filters(&opts.filters_dir)?;

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| opts.input.with_extension(&opts.format));

    let args = build_args(opts, &output);

    let status = Command::new("pandoc").args(&args).status().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BrainGuideError::Render(
                "pandoc not found. Install pandoc first: https://pandoc.org/installing.html"
                    .to_string(),
            )
        } else {
            BrainGuideError::Render(format!("failed to spawn pandoc: {e}"))
        }
    })?;

    if !status.success() {
        return Err(BrainGuideError::Render(format!(
            "pandoc exited with status: {}",
            status.code().unwrap_or(-1)
        )));
    }

    info!(output = %output.display(), "render complete");
    Ok(output)
}

/// Check that everything pandoc will read actually exists.
fn preflight(opts: &RenderOptions) -> Result<()> {
    if !opts.input.exists() {
        return Err(BrainGuideError::config(format!(
            "input file does not exist: {}",
            opts.input.display()
        )));
    }

    if !opts.bibliography.exists() {
        return Err(BrainGuideError::config(format!(
            "bibliography file does not exist: {}",
            opts.bibliography.display()
        )));
    }

    if let Some(csl) = &opts.csl {
        if !csl.exists() {
            return Err(BrainGuideError::config(format!(
                "CSL file does not exist: {}",
                csl.display()
            )));
        }
    }

    Ok(())
}

/// Build the pandoc argument vector.
fn build_args(opts: &RenderOptions, output: &Path) -> Vec<String> {
    let mut args = vec![
        opts.input.to_string_lossy().to_string(),
        "-f".to_string(),
        "markdown".to_string(),
        "-t".to_string(),
        pandoc_format(&opts.format).to_string(),
        "--bibliography".to_string(),
        opts.bibliography.to_string_lossy().to_string(),
        "--citeproc".to_string(),
        "--lua-filter".to_string(),
        filters::filter_path(&opts.filters_dir, filters::IMAGE_SIZE)
            .to_string_lossy()
            .to_string(),
        "--lua-filter".to_string(),
        filters::filter_path(&opts.filters_dir, filters::REFERENCE_LIST)
            .to_string_lossy()
            .to_string(),
    ];

    if opts.remove_captions {
        args.push("--lua-filter".to_string());
        args.push(
            filters::filter_path(&opts.filters_dir, filters::REMOVE_CAPTIONS)
                .to_string_lossy()
                .to_string(),
        );
    }

    if let Some(csl) = &opts.csl {
        args.push("--csl".to_string());
        args.push(csl.to_string_lossy().to_string());
    }

    args.push("-o".to_string());
    args.push(output.to_string_lossy().to_string());

    args
}

/// Map user-facing format names to pandoc writer names.
fn pandoc_format(format: &str) -> &str {
    if format == "md" { "markdown" } else { format }
}
