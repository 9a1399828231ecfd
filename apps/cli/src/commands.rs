//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use brainguide_core::{ProgressReporter, run_concat, run_interlink, run_publish, run_render};
use brainguide_shared::{
    AppConfig, init_config, load_config, load_config_from, validate_base_urls,
    validate_index_dir, validate_source_dir,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Brain Guide: turn authored sections into published guide documents.
#[derive(Parser)]
#[command(
    name = "brainguide",
    version,
    about = "Concatenate guide sections, resolve wiki links, and render with pandoc.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to a config file (default: ~/.brainguide/brainguide.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Concatenate section files into combined guide documents.
    Concat {
        /// Source folder (defaults to content.source_dir from config).
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Rewrite wiki links to public URLs in combined documents.
    Interlink {
        /// File or folder (defaults to the concatenator's output folder).
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Render a link-resolved document through pandoc.
    Render {
        /// Markdown document to render.
        input: PathBuf,

        /// Output path (defaults to the input with the target extension).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Target format: html or md (defaults to render.output_format).
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Run concatenation and link resolution in sequence.
    Publish {
        /// Source folder (defaults to content.source_dir from config).
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Concat { input } => cmd_concat(&config, input),
        Command::Interlink { input } => cmd_interlink(&config, input),
        Command::Render { input, out, format } => {
            cmd_render(&config, &input, out, format.as_deref())
        }
        Command::Publish { input } => cmd_publish(&config, input),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_concat(config: &AppConfig, input: Option<PathBuf>) -> Result<()> {
    if input.is_none() {
        validate_source_dir(config)?;
    }

    info!(input = ?input, "concatenating sections");

    let start = Instant::now();
    let reporter = CliProgress::new();
    let report = run_concat(config, input.as_deref(), &reporter)?;

    println!();
    println!("  Concatenation complete!");
    println!("  Combined:   {}", report.written.len());
    println!("  Sections:   {}", report.sections_used);
    println!("  Skipped:    {}", report.files_skipped);
    println!("  Failed:     {}", report.groups_failed);
    println!("  Time:       {:.1}s", start.elapsed().as_secs_f64());
    println!();

    Ok(())
}

fn cmd_interlink(config: &AppConfig, input: Option<PathBuf>) -> Result<()> {
    validate_index_dir(config)?;
    validate_base_urls(config)?;

    info!(input = ?input, "resolving wiki links");

    let start = Instant::now();
    let reporter = CliProgress::new();
    let report = run_interlink(config, input.as_deref(), &reporter)?;

    println!();
    println!("  Link resolution complete!");
    println!("  Published:  {}", report.written.len());
    println!("  Resolved:   {}", report.links_resolved);
    println!("  Unresolved: {}", report.links_unresolved);
    println!("  Skipped:    {}", report.files_skipped);
    println!("  Failed:     {}", report.documents_failed);
    println!("  Time:       {:.1}s", start.elapsed().as_secs_f64());
    println!();

    Ok(())
}

fn cmd_render(
    config: &AppConfig,
    input: &std::path::Path,
    out: Option<PathBuf>,
    format: Option<&str>,
) -> Result<()> {
    info!(input = %input.display(), "rendering document");

    let start = Instant::now();
    let reporter = CliProgress::new();
    let output = run_render(config, input, format, out.as_deref(), &reporter)?;

    println!();
    println!("  Render complete!");
    println!("  Output:     {}", output.display());
    println!("  Time:       {:.1}s", start.elapsed().as_secs_f64());
    println!();

    Ok(())
}

fn cmd_publish(config: &AppConfig, input: Option<PathBuf>) -> Result<()> {
    if input.is_none() {
        validate_source_dir(config)?;
    }
    validate_index_dir(config)?;
    validate_base_urls(config)?;

    info!(input = ?input, "running publish pipeline");

    let reporter = CliProgress::new();
    let report = run_publish(config, input.as_deref(), &reporter)?;

    println!();
    println!("  Publish complete!");
    println!("  Combined:   {}", report.concat.written.len());
    println!("  Published:  {}", report.resolve.written.len());
    println!("  Resolved:   {}", report.resolve.links_resolved);
    println!("  Unresolved: {}", report.resolve.links_unresolved);
    println!("  Time:       {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self) {
        self.spinner.finish_and_clear();
    }
}
