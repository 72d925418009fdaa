use crate::{
    core::{command::DEFAULT_PROGRAM, jobs::JobLayout, separator::Separator},
    error::{Result, StemError},
    io::paths::default_config_file,
    types::{EncodingOptions, SeparationMode, SeparationRequest},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparatorConfig {
    /// Program and leading arguments; `-o`, `-n`, flags and inputs follow.
    pub program: Vec<String>,
    pub model: String,
    pub encoding: EncodingOptions,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.iter().map(|s| s.to_string()).collect(),
            model: "htdemucs".into(),
            encoding: EncodingOptions::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Prefix for download links; the request's Host header is used when unset.
    pub public_base_url: Option<String>,
    pub max_upload_bytes: usize,
    pub separator: SeparatorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".into(),
            upload_dir: "uploads".into(),
            output_dir: "separated".into(),
            public_base_url: None,
            max_upload_bytes: 512 * 1024 * 1024,
            separator: SeparatorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from `path`, else from the default config location, else
    /// fall back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path.map(Path::to_path_buf).or_else(default_config_file) {
            Some(p) => Self::load_from_path(&p),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| StemError::Config(format!("Failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| StemError::Config(format!("Invalid config {}: {e}", path.display())))
    }

    pub fn job_layout(&self) -> JobLayout {
        JobLayout::new(&self.upload_dir, &self.output_dir, &self.separator.model)
    }

    pub fn separator(&self) -> Separator {
        Separator::new(self.separator.program.clone(), &self.output_dir)
    }

    pub fn request(&self, mode: SeparationMode) -> SeparationRequest {
        SeparationRequest {
            mode,
            model_name: self.separator.model.clone(),
            encoding: self.separator.encoding.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.json");
        fs::write(
            &p,
            r#"{ "listen_addr": "0.0.0.0:8080", "separator": { "model": "mdx_extra" } }"#,
        )
        .unwrap();

        let cfg = ServerConfig::load(Some(&p)).unwrap();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.separator.model, "mdx_extra");
        assert_eq!(cfg.separator.program, vec!["python3", "-m", "demucs.separate"]);
        assert_eq!(cfg.upload_dir, PathBuf::from("uploads"));
        assert!(cfg.separator.encoding.mp3);
        assert_eq!(cfg.separator.encoding.mp3_bitrate, 256);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.json");
        fs::write(&p, "{ not json").unwrap();

        match ServerConfig::load(Some(&p)) {
            Err(StemError::Config(msg)) => assert!(msg.contains("Invalid config")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn job_layout_follows_model() {
        let cfg = ServerConfig::default();
        let layout = cfg.job_layout();
        assert_eq!(
            layout.output_dir("song").unwrap(),
            PathBuf::from("separated").join("htdemucs").join("song")
        );
    }
}
