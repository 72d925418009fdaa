use crate::{
    core::{command::build_command, inputs::resolve_inputs, runner},
    error::{Result, StemError},
    types::{SeparationOutcome, SeparationRequest},
};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Runs the external separation tool against a file or directory of files.
#[derive(Clone, Debug)]
pub struct Separator {
    program: Vec<String>,
    output_root: PathBuf,
}

impl Separator {
    pub fn new(program: Vec<String>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            program,
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// The argument vector that `separate` would spawn for `input`, or
    /// `None` when there is nothing to separate.
    pub fn command_for(&self, input: &Path, req: &SeparationRequest) -> Result<Option<Vec<String>>> {
        if self.program.is_empty() {
            return Err(StemError::EmptyCommand);
        }

        let in_path = std::path::absolute(input)
            .with_context(|| format!("Bad input path: {}", input.display()))?;
        let out_path = std::path::absolute(&self.output_root)
            .with_context(|| format!("Bad output path: {}", self.output_root.display()))?;

        let files = resolve_inputs(&in_path)?;
        if files.is_empty() {
            return Ok(None);
        }

        Ok(Some(build_command(
            &self.program,
            &files,
            &out_path,
            &req.model_name,
            &req.encoding,
            req.mode.two_stems(),
        )))
    }

    pub async fn separate(&self, input: &Path, req: &SeparationRequest) -> Result<SeparationOutcome> {
        let resolved = {
            let this = self.clone();
            let input = input.to_path_buf();
            let req = req.clone();
            tokio::task::spawn_blocking(move || this.command_for(&input, &req))
                .await
                .context("input resolution task failed")??
        };
        let Some(argv) = resolved else {
            warn!(input = %input.display(), "no valid audio files to separate");
            return Ok(SeparationOutcome::NoValidInput);
        };

        info!(input = %input.display(), model = %req.model_name, mode = ?req.mode, "starting separation");
        let outcome = runner::run(&argv).await?;

        Ok(if outcome.succeeded() {
            SeparationOutcome::Completed
        } else {
            SeparationOutcome::Failed {
                exit_code: outcome.exit_code,
            }
        })
    }
}
