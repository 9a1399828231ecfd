//! Shared types, error model, and configuration for the Brain Guide pipeline.
//!
//! This crate is the foundation depended on by all other pipeline crates.
//! It provides:
//! - [`BrainGuideError`], the unified error type
//! - Domain constants and types ([`DocStatus`], the `type` markers)
//! - Configuration ([`AppConfig`], config loading and validation)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContentConfig, DefaultsConfig, RenderConfig, TranslationsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_base_urls,
    validate_index_dir, validate_source_dir,
};
pub use error::{BrainGuideError, Result};
pub use types::{
    DocStatus, GUIDE_TYPE, SECTION_TYPE, published_filename, staging_filename,
};
