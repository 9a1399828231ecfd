//! Pipeline orchestration for the Brain Guide publishing tool.
//!
//! This crate ties concatenation, link resolution, and rendering into
//! end-to-end workflows (e.g., `publish`).

pub mod pipeline;

pub use pipeline::{
    ProgressReporter, PublishReport, SilentProgress, run_concat, run_interlink, run_publish,
    run_render,
};
