//! Boot parameter classification.
//!
//! The kernel command line is read once at startup and never changes. Mode
//! flags are pure predicates over the token set, so asking twice always gives
//! the same answer.

use crate::constants::params;
use rescue_shared::errors::{RescueError, RescueResult};
use std::collections::BTreeSet;
use std::path::Path;

/// Unordered set of boot parameter tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootParameterSet {
    tokens: BTreeSet<String>,
}

impl BootParameterSet {
    /// Split a command line on whitespace.
    pub fn parse(cmdline: &str) -> Self {
        Self::from_tokens(cmdline.split_whitespace())
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Read the command line file (normally `/proc/cmdline`).
    pub fn read(path: &Path) -> RescueResult<Self> {
        let cmdline = std::fs::read_to_string(path).map_err(|e| {
            RescueError::Storage(format!(
                "Failed to read boot parameters from {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::parse(&cmdline))
    }

    /// Whole-token membership; `debug=1` does not match `debug`.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_debug(&self) -> bool {
        self.contains(params::DEBUG)
    }

    pub fn is_unattended(&self) -> bool {
        self.contains(params::UNATTENDED)
    }

    /// Plain automatic recovery. Always false when `unattended` is present,
    /// so the two recovery paths can never both run.
    pub fn is_automatic(&self) -> bool {
        !self.is_unattended()
            && (self.contains(params::AUTO_RECOVER) || self.contains(params::AUTOMATIC))
    }

    pub fn classify(&self) -> ModeDecision {
        classify(self)
    }
}

/// Mode flags derived from the boot parameters.
///
/// `automatic` and `unattended` are never both set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeDecision {
    pub debug: bool,
    pub unattended: bool,
    pub automatic: bool,
}

/// Which recovery path a boot takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootMode {
    /// No recovery launch; operator works by hand.
    Manual,
    /// Launch recovery, then always show the menu.
    Automatic,
    /// Launch recovery, reboot on success, menu on failure.
    Unattended,
}

impl ModeDecision {
    pub fn boot_mode(&self) -> BootMode {
        if self.unattended {
            BootMode::Unattended
        } else if self.automatic {
            BootMode::Automatic
        } else {
            BootMode::Manual
        }
    }

    /// Whether this boot is allowed to run the recovery tool.
    pub fn launches_recovery(&self) -> bool {
        self.automatic || self.unattended
    }
}

impl std::fmt::Display for BootMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootMode::Manual => write!(f, "manual"),
            BootMode::Automatic => write!(f, "automatic"),
            BootMode::Unattended => write!(f, "unattended"),
        }
    }
}

/// Classify boot intent. Total over any token set.
pub fn classify(params: &BootParameterSet) -> ModeDecision {
    ModeDecision {
        debug: params.is_debug(),
        unattended: params.is_unattended(),
        automatic: params.is_automatic(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(tokens: &[&str]) -> ModeDecision {
        BootParameterSet::from_tokens(tokens.iter().copied()).classify()
    }

    #[test]
    fn test_empty_set_is_manual() {
        let decision = mode(&[]);
        assert_eq!(decision, ModeDecision::default());
        assert_eq!(decision.boot_mode(), BootMode::Manual);
        assert!(!decision.launches_recovery());
    }

    #[test]
    fn test_unattended_suppresses_automatic() {
        for extra in [
            vec![],
            vec!["automatic"],
            vec!["auto_recover"],
            vec!["automatic", "auto_recover", "debug"],
        ] {
            let mut tokens = vec!["unattended"];
            tokens.extend(extra);
            let decision = mode(&tokens);
            assert!(decision.unattended, "tokens: {:?}", tokens);
            assert!(!decision.automatic, "tokens: {:?}", tokens);
            assert_eq!(decision.boot_mode(), BootMode::Unattended);
        }
    }

    #[test]
    fn test_automatic_aliases() {
        assert!(mode(&["automatic"]).automatic);
        assert!(mode(&["auto_recover"]).automatic);
        assert_eq!(mode(&["auto_recover"]).boot_mode(), BootMode::Automatic);
    }

    #[test]
    fn test_debug_is_independent() {
        let decision = mode(&["debug", "quiet", "root=/dev/sda1"]);
        assert!(decision.debug);
        assert!(!decision.automatic);
        assert!(!decision.unattended);

        assert!(!mode(&["automatic"]).debug);
    }

    #[test]
    fn test_tokens_match_whole_words() {
        let decision = mode(&["debug=1", "unattended_mode", "automatically"]);
        assert_eq!(decision, ModeDecision::default());
    }

    #[test]
    fn test_parse_splits_whitespace() {
        let params = BootParameterSet::parse("BOOT_IMAGE=/vmlinuz  quiet\tunattended\n");
        assert!(params.contains("quiet"));
        assert!(params.is_unattended());
        assert!(params.contains("BOOT_IMAGE=/vmlinuz"));
    }

    #[test]
    fn test_classify_is_idempotent() {
        let params = BootParameterSet::parse("automatic debug");
        assert_eq!(params.classify(), params.classify());
        assert_eq!(classify(&params), params.classify());
    }

    #[test]
    fn test_read_missing_file_errors() {
        let err = BootParameterSet::read(Path::new("/nonexistent/cmdline")).unwrap_err();
        assert!(matches!(err, RescueError::Storage(_)));
    }

    #[test]
    fn test_read_empty_file_is_empty_set() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let params = BootParameterSet::read(file.path()).unwrap();
        assert!(params.is_empty());
    }
}
