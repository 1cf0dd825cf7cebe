//! Cached recommendation presets.
//!
//! A fingerprint can be saved to `<dir>/<label>_reco.json` and loaded
//! back later, keyed by an audio-type label. Purely a convenience cache:
//! a missing or malformed file is an error the caller reports and moves
//! on from, never a correctness problem.

use std::path::{Path, PathBuf};

use patina_engine::MojoFingerprint;

/// Errors around the preset cache.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    /// File could not be read or written.
    #[error("preset io error: {0}")]
    Io(#[from] std::io::Error),

    /// File exists but does not parse as a fingerprint.
    #[error("preset parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// File name for a given label.
fn file_name(label: &str) -> String {
    let safe: String = label
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{safe}_reco.json")
}

/// Save a fingerprint under `dir`, keyed by `label`. Returns the path
/// written.
pub fn save(
    dir: &Path,
    label: &str,
    fingerprint: &MojoFingerprint,
) -> Result<PathBuf, PresetError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name(label));
    let json = serde_json::to_string_pretty(fingerprint)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

/// Load a fingerprint from an explicit path.
pub fn load(path: &Path) -> Result<MojoFingerprint, PresetError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Load a fingerprint from `dir` by label, if cached.
pub fn load_by_label(dir: &Path, label: &str) -> Result<MojoFingerprint, PresetError> {
    load(&dir.join(file_name(label)))
}
