use crate::{
    error::{Result, StemError},
    types::ALLOWED_EXTENSIONS,
};
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Reduce a client-supplied filename to something safe to join onto a
/// storage root: NFKD-decomposed down to ASCII (`é` becomes `e`), no
/// separators, whitespace folded to `_`, and only `[A-Za-z0-9_.-]` kept.
/// Leading and trailing `.`/`_` are stripped.
pub fn sanitize_filename(name: &str) -> Result<String> {
    let spaced: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let cleaned = kept.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        return Err(StemError::InvalidFilename(name.to_string()));
    }
    Ok(cleaned.to_string())
}

/// Accept a path component only if it is already in sanitized form.
pub fn ensure_sanitized(name: &str) -> Result<&str> {
    match sanitize_filename(name) {
        Ok(clean) if clean == name => Ok(name),
        _ => Err(StemError::InvalidFilename(name.to_string())),
    }
}

pub fn is_allowed_audio(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Exact-case suffix check used when listing separated stems.
pub fn has_artifact_suffix(name: &str) -> bool {
    ALLOWED_EXTENSIONS
        .iter()
        .any(|ext| name.strip_suffix(ext).is_some_and(|rest| rest.ends_with('.')))
}

/// Filename minus its last extension; the whole name when there is no dot.
pub fn job_stem(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename)
}
