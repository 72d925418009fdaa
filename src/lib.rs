//! # stem-splitter-server
//!
//! Thin HTTP job wrapper around an external stem separation tool (Demucs by
//! default): upload a track, run the tool as a subprocess, then list,
//! download and delete the stems it wrote.

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod logging;
pub mod server;
pub mod types;

pub use crate::{
    config::{SeparatorConfig, ServerConfig},
    core::{
        command::{build_command, build_output_path},
        inputs::resolve_inputs,
        jobs::JobLayout,
        runner::{run, run_with_sinks, RunOutcome},
        separator::Separator,
    },
    error::{Result, StemError},
    types::{EncodingOptions, SeparationMode, SeparationOutcome, SeparationRequest},
};
