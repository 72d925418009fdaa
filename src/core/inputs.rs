use crate::{error::Result, io::filename::has_allowed_extension};
use anyhow::Context;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A single file comes back as-is. A directory yields every entry with an
/// allowed audio extension, in whatever order the OS lists them.
pub fn resolve_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = fs::read_dir(path)
        .with_context(|| format!("Failed to read input directory: {}", path.display()))?;

    let mut out = Vec::new();
    for entry in entries {
        let p = entry?.path();
        if has_allowed_extension(&p) {
            out.push(p);
        }
    }
    Ok(out)
}
