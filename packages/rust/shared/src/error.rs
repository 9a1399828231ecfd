//! Error types for the Brain Guide pipeline.
//!
//! Library crates use [`BrainGuideError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum BrainGuideError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A front-matter block was present but could not be parsed.
    #[error("malformed front matter: {message}")]
    MalformedFrontMatter { message: String },

    /// A required front-matter field is absent.
    #[error("missing required front-matter field `{field}`")]
    MissingField { field: String },

    /// A document selected for link resolution has no `language` field.
    #[error("document has no `language` field")]
    MissingLanguage,

    /// No References heading translation configured for a language.
    #[error("no References heading translation for language `{language}`")]
    MissingTranslation { language: String },

    /// No base URL configured for a language actually encountered.
    #[error("no base URL configured for language `{language}`")]
    MissingBaseUrl { language: String },

    /// No eligible input files were found under a source folder.
    #[error("no section files found under {path:?}")]
    NoInputFiles { path: PathBuf },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Pandoc invocation error.
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BrainGuideError>;

impl BrainGuideError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-front-matter error from any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedFrontMatter {
            message: msg.into(),
        }
    }

    /// Create a missing-field error naming the absent field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
