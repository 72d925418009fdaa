use serde::{Deserialize, Serialize};

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

pub const MSG_COMPLETED: &str = "Separation completed successfully";
pub const MSG_FAILED: &str = "Command failed, something went wrong.";
pub const MSG_NO_VALID_INPUT: &str = "No valid audio files found";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparationMode {
    #[default]
    Full,
    Vocals,
}

impl SeparationMode {
    /// `"vocals"` picks two-stem mode; any other selector falls back to full.
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector {
            Some("vocals") => SeparationMode::Vocals,
            _ => SeparationMode::Full,
        }
    }

    pub fn two_stems(&self) -> Option<&'static str> {
        match self {
            SeparationMode::Full => None,
            SeparationMode::Vocals => Some("vocals"),
        }
    }
}

/// Output encoding flags forwarded to the separation tool. The flags are
/// independent; combining `mp3` with `float32` is the caller's problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingOptions {
    pub mp3: bool,
    pub mp3_bitrate: u32,
    pub float32: bool,
    pub int24: bool,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            mp3: true,
            mp3_bitrate: 256,
            float32: false,
            int24: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SeparationRequest {
    pub mode: SeparationMode,
    pub model_name: String,
    pub encoding: EncodingOptions,
}

impl Default for SeparationRequest {
    fn default() -> Self {
        Self {
            mode: SeparationMode::Full,
            model_name: "htdemucs".into(),
            encoding: EncodingOptions::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeparationOutcome {
    Completed,
    Failed { exit_code: Option<i32> },
    NoValidInput,
}

impl SeparationOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, SeparationOutcome::Completed)
    }

    pub fn diagnostic(&self) -> &'static str {
        match self {
            SeparationOutcome::Completed => MSG_COMPLETED,
            SeparationOutcome::Failed { .. } => MSG_FAILED,
            SeparationOutcome::NoValidInput => MSG_NO_VALID_INPUT,
        }
    }
}
