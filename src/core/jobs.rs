use crate::{
    core::command::build_output_path,
    error::{Result, StemError},
    io::filename::{ensure_sanitized, has_artifact_suffix},
};
use anyhow::Context;
use globset::GlobBuilder;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Where a job's files live on disk. A job has no record of its own: the
/// upload is `<upload_root>/<filename>` and its stems are
/// `<output_root>/<model>/<job>/<artifact>`.
#[derive(Clone, Debug)]
pub struct JobLayout {
    pub upload_root: PathBuf,
    pub output_root: PathBuf,
    pub model_name: String,
}

impl JobLayout {
    pub fn new(
        upload_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            upload_root: upload_root.into(),
            output_root: output_root.into(),
            model_name: model_name.into(),
        }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.upload_root)?;
        fs::create_dir_all(&self.output_root)?;
        Ok(())
    }

    pub fn upload_path(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.upload_root.join(ensure_sanitized(filename)?))
    }

    pub fn output_dir(&self, job: &str) -> Result<PathBuf> {
        Ok(build_output_path(
            &self.output_root,
            &self.model_name,
            ensure_sanitized(job)?,
        ))
    }

    pub fn artifact_path(&self, job: &str, artifact: &str) -> Result<PathBuf> {
        Ok(self.output_dir(job)?.join(ensure_sanitized(artifact)?))
    }

    /// Names of the audio files in the job's output directory, in directory
    /// order. Suffixes are matched case-sensitively (`vocals.MP3` is not
    /// listed). `NotFound` if the directory does not exist.
    pub fn list_artifacts(&self, job: &str) -> Result<Vec<String>> {
        let dir = self.output_dir(job)?;
        if !dir.is_dir() {
            return Err(StemError::NotFound {
                path: dir.display().to_string(),
            });
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if has_artifact_suffix(name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Remove the job's output directory and every upload named `<job>.*`.
    /// Returns what was removed; an empty list means the job did not exist.
    pub fn delete_job(&self, job: &str) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();

        let out_dir = self.output_dir(job)?;
        if out_dir.exists() {
            fs::remove_dir_all(&out_dir)?;
            removed.push(out_dir);
        }

        for path in self.matching_uploads(job)? {
            fs::remove_file(&path)?;
            removed.push(path);
        }

        if !removed.is_empty() {
            info!(job, count = removed.len(), "deleted job artifacts");
        }
        Ok(removed)
    }

    /// `list_artifacts` on the blocking pool, for async callers.
    pub async fn list_artifacts_async(&self, job: &str) -> Result<Vec<String>> {
        let layout = self.clone();
        let job = job.to_string();
        tokio::task::spawn_blocking(move || layout.list_artifacts(&job))
            .await
            .context("artifact listing task failed")?
    }

    /// `delete_job` on the blocking pool, for async callers.
    pub async fn delete_job_async(&self, job: &str) -> Result<Vec<PathBuf>> {
        let layout = self.clone();
        let job = job.to_string();
        tokio::task::spawn_blocking(move || layout.delete_job(&job))
            .await
            .context("job deletion task failed")?
    }

    fn matching_uploads(&self, job: &str) -> Result<Vec<PathBuf>> {
        let job = ensure_sanitized(job)?;
        if !self.upload_root.is_dir() {
            return Ok(Vec::new());
        }

        let matcher = GlobBuilder::new(&format!("{job}.*"))
            .literal_separator(true)
            .build()?
            .compile_matcher();

        let mut out = Vec::new();
        for entry in fs::read_dir(&self.upload_root)? {
            let path = entry?.path();
            let matches = path
                .file_name()
                .map(Path::new)
                .is_some_and(|n| matcher.is_match(n));
            if matches && path.is_file() {
                out.push(path);
            }
        }
        Ok(out)
    }
}
