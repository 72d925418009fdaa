use crate::types::EncodingOptions;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROGRAM: [&str; 3] = ["python3", "-m", "demucs.separate"];

/// `<output_root>/<model_name>/<job_id>`, the directory the tool writes a
/// job's stems into. Nothing stops two jobs from sharing it.
pub fn build_output_path(output_root: &Path, model_name: &str, job_id: &str) -> PathBuf {
    output_root.join(model_name).join(job_id)
}

/// Assemble the full argument vector for one separation run.
///
/// Order is fixed: program prefix, `-o`, `-n`, encoding flags, the optional
/// two-stem selector, then the inputs in the order they were resolved.
pub fn build_command(
    program: &[String],
    inputs: &[PathBuf],
    output_root: &Path,
    model_name: &str,
    encoding: &EncodingOptions,
    two_stems: Option<&str>,
) -> Vec<String> {
    let mut cmd: Vec<String> = program.to_vec();

    cmd.push("-o".into());
    cmd.push(output_root.to_string_lossy().into_owned());
    cmd.push("-n".into());
    cmd.push(model_name.to_string());

    if encoding.mp3 {
        cmd.push("--mp3".into());
        cmd.push(format!("--mp3-bitrate={}", encoding.mp3_bitrate));
    }
    if encoding.float32 {
        cmd.push("--float32".into());
    }
    if encoding.int24 {
        cmd.push("--int24".into());
    }
    if let Some(stem) = two_stems {
        cmd.push(format!("--two-stems={stem}"));
    }

    cmd.extend(inputs.iter().map(|p| p.to_string_lossy().into_owned()));
    cmd
}
