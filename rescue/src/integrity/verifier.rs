//! Checksum comparison against the manifest.

use super::manifest::{ManifestEntry, load_manifest};
use crate::constants::paths;
use crate::layout::RescueLayout;
use regex::Regex;
use rescue_shared::errors::{RescueError, RescueResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

/// Outcome of one verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationVerdict {
    /// No manifest (missing or empty).
    Skipped,
    /// Every checked file matched.
    Passed,
    /// Paths whose checksum did not match or which could not be read.
    Failed(Vec<String>),
}

impl VerificationVerdict {
    pub fn is_failed(&self) -> bool {
        matches!(self, VerificationVerdict::Failed(_))
    }

    pub fn failures(&self) -> &[String] {
        match self {
            VerificationVerdict::Failed(paths) => paths,
            _ => &[],
        }
    }
}

/// Entries matching this pattern are never checked.
///
/// Always contains the message-of-the-day file, which is rewritten at boot by
/// another service, joined with the configured pattern if any.
#[derive(Debug, Clone)]
pub struct ExclusionPattern {
    regex: Regex,
}

impl ExclusionPattern {
    pub fn new(configured: Option<&str>) -> RescueResult<Self> {
        let always = regex::escape(&format!("/{}", paths::MOTD));
        let pattern = match configured.map(str::trim).filter(|p| !p.is_empty()) {
            Some(extra) => format!("{}|{}", always, extra),
            None => always,
        };

        let regex = Regex::new(&pattern).map_err(|e| {
            RescueError::Config(format!("Invalid exclusion pattern '{}': {}", pattern, e))
        })?;

        Ok(Self { regex })
    }

    /// Match against the absolute form of a manifest path.
    pub fn is_excluded(&self, entry: &ManifestEntry) -> bool {
        self.regex.is_match(&entry.absolute_path())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Recomputes manifest checksums for files under the rescue root.
pub struct IntegrityVerifier {
    layout: RescueLayout,
}

impl IntegrityVerifier {
    pub fn new(layout: RescueLayout) -> Self {
        Self { layout }
    }

    /// Verify the files listed in `manifest_path`.
    ///
    /// Never fails: an unreadable manifest is reported as a failed verdict
    /// naming the manifest itself.
    pub fn verify(&self, manifest_path: &Path, exclusion: &ExclusionPattern) -> VerificationVerdict {
        let entries = match load_manifest(manifest_path) {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                tracing::info!(
                    manifest = %manifest_path.display(),
                    "No checksum manifest, skipping integrity verification"
                );
                return VerificationVerdict::Skipped;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Checksum manifest unreadable");
                return VerificationVerdict::Failed(vec![manifest_path.display().to_string()]);
            }
        };

        let mut checked = 0usize;
        let mut excluded = 0usize;
        let mut failed = Vec::new();

        for entry in &entries {
            if exclusion.is_excluded(entry) {
                excluded += 1;
                continue;
            }

            checked += 1;
            if !self.entry_matches(entry) {
                failed.push(entry.path.clone());
            }
        }

        tracing::info!(
            checked,
            excluded,
            failed = failed.len(),
            pattern = %exclusion.as_str(),
            "Integrity verification finished"
        );

        if failed.is_empty() {
            VerificationVerdict::Passed
        } else {
            VerificationVerdict::Failed(failed)
        }
    }

    fn entry_matches(&self, entry: &ManifestEntry) -> bool {
        let path = self.layout.resolve(&entry.path);
        match sha256_file(&path) {
            Ok(actual) if actual == entry.checksum => true,
            Ok(actual) => {
                tracing::warn!(
                    path = %entry.path,
                    expected = %entry.checksum,
                    actual = %actual,
                    "Checksum mismatch"
                );
                false
            }
            Err(e) => {
                tracing::warn!(path = %entry.path, error = %e, "Cannot checksum file");
                false
            }
        }
    }
}

fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sum(content: &[u8]) -> String {
        hex::encode(Sha256::digest(content))
    }

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn manifest(&self) -> PathBuf {
            self.root().join("checksums.txt")
        }

        fn write_manifest(&self, lines: &[(&str, String)]) {
            let content: String = lines
                .iter()
                .map(|(path, checksum)| format!("{}  {}\n", checksum, path))
                .collect();
            std::fs::write(self.manifest(), content).unwrap();
        }

        fn verify(&self, configured: Option<&str>) -> VerificationVerdict {
            let exclusion = ExclusionPattern::new(configured).unwrap();
            IntegrityVerifier::new(RescueLayout::new(self.root())).verify(&self.manifest(), &exclusion)
        }
    }

    #[test]
    fn test_missing_manifest_is_skipped() {
        let fx = Fixture::new();
        assert_eq!(fx.verify(None), VerificationVerdict::Skipped);
    }

    #[test]
    fn test_empty_manifest_is_skipped() {
        let fx = Fixture::new();
        std::fs::write(fx.manifest(), "").unwrap();
        assert_eq!(fx.verify(None), VerificationVerdict::Skipped);
    }

    #[test]
    fn test_all_matching_passes() {
        let fx = Fixture::new();
        write(fx.root(), "etc/hosts", b"127.0.0.1 localhost\n");
        write(fx.root(), "bin/tool", b"\x7fELF");
        fx.write_manifest(&[
            ("etc/hosts", sum(b"127.0.0.1 localhost\n")),
            ("/bin/tool", sum(b"\x7fELF")),
        ]);

        assert_eq!(fx.verify(None), VerificationVerdict::Passed);
    }

    #[test]
    fn test_mismatch_and_missing_fail() {
        let fx = Fixture::new();
        write(fx.root(), "etc/hosts", b"tampered");
        fx.write_manifest(&[
            ("etc/hosts", sum(b"original")),
            ("etc/missing", sum(b"whatever")),
        ]);

        assert_eq!(
            fx.verify(None),
            VerificationVerdict::Failed(vec!["etc/hosts".into(), "etc/missing".into()])
        );
    }

    #[test]
    fn test_motd_always_excluded() {
        let fx = Fixture::new();
        write(fx.root(), "etc/motd", b"regenerated at boot");
        fx.write_manifest(&[("etc/motd", sum(b"build time motd"))]);

        // Only excluded entries: passes without a configured pattern
        assert_eq!(fx.verify(None), VerificationVerdict::Passed);
        // And still excluded when a pattern is configured
        assert_eq!(fx.verify(Some("/var/lib/.*")), VerificationVerdict::Passed);
    }

    #[test]
    fn test_configured_pattern_excludes() {
        let fx = Fixture::new();
        write(fx.root(), "var/lib/state", b"changed");
        write(fx.root(), "etc/hosts", b"same");
        fx.write_manifest(&[
            ("var/lib/state", sum(b"original")),
            ("etc/hosts", sum(b"same")),
        ]);

        assert!(fx.verify(None).is_failed());
        assert_eq!(fx.verify(Some("/var/lib/")), VerificationVerdict::Passed);
    }

    #[test]
    fn test_exclusion_pattern_invalid() {
        let err = ExclusionPattern::new(Some("(")).unwrap_err();
        assert!(matches!(err, RescueError::Config(_)));
    }

    #[test]
    fn test_exclusion_ignores_blank_configured() {
        let pattern = ExclusionPattern::new(Some("   ")).unwrap();
        assert_eq!(pattern.as_str(), regex::escape("/etc/motd"));
    }

    #[test]
    fn test_absolute_and_dotted_entries_resolve_under_root() {
        let fx = Fixture::new();
        write(fx.root(), "etc/hosts", b"127.0.0.1 localhost\n");
        write(fx.root(), "bin/tool", b"\x7fELF");
        fx.write_manifest(&[
            ("/etc/hosts", sum(b"127.0.0.1 localhost\n")),
            ("./bin/tool", sum(b"\x7fELF")),
        ]);

        assert_eq!(fx.verify(None), VerificationVerdict::Passed);
    }
}
