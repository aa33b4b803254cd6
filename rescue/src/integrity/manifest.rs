//! Checksum manifest parsing (`sha256sum` output format).

use rescue_shared::errors::{RescueError, RescueResult};
use std::path::Path;

/// One manifest line: a file and its expected SHA-256.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path as written in the manifest.
    pub path: String,
    /// Expected checksum, lowercase hex.
    pub checksum: String,
}

impl ManifestEntry {
    /// Path in absolute form (`/etc/motd`), the form exclusion patterns match.
    pub fn absolute_path(&self) -> String {
        let trimmed = self.path.trim_start_matches("./").trim_start_matches('/');
        format!("/{}", trimmed)
    }
}

/// Load the manifest.
///
/// Returns `None` when the file does not exist or is empty, which means
/// verification is skipped.
pub fn load_manifest(path: &Path) -> RescueResult<Option<Vec<ManifestEntry>>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(RescueError::Storage(format!(
                "Failed to read checksum manifest {}: {}",
                path.display(),
                e
            )));
        }
    };

    if content.is_empty() {
        return Ok(None);
    }

    Ok(Some(parse_manifest(&content)))
}

/// Parse manifest content. Blank lines, comments and malformed lines are
/// skipped.
pub fn parse_manifest(content: &str) -> Vec<ManifestEntry> {
    let mut entries = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Some(entry) => entries.push(entry),
            None => tracing::warn!(line = index + 1, "Skipping malformed checksum manifest line"),
        }
    }

    entries
}

/// `<64 hex><space><space or '*'><path>`
fn parse_line(line: &str) -> Option<ManifestEntry> {
    let (checksum, rest) = line.split_once(' ')?;
    if checksum.len() != 64 || hex::decode(checksum).is_err() {
        return None;
    }

    let path = rest
        .strip_prefix(' ')
        .or_else(|| rest.strip_prefix('*'))
        .unwrap_or(rest);
    if path.is_empty() {
        return None;
    }

    Some(ManifestEntry {
        path: path.to_string(),
        checksum: checksum.to_ascii_lowercase(),
    })
}
