//! Rescue configuration.
//!
//! Configuration is read once at startup from up to three files in
//! `etc/rescue/` (`local.conf`, `site.conf`, `rescue.conf`, in that order).
//! Each file holds shell-style `KEY=value` assignments; a later file overrides
//! an earlier one and a missing file is skipped.
//!
//! The result is an immutable [`RescueConfig`] shared by reference with every
//! stage. All assignments, recognised or not, are kept in
//! [`RescueConfig::variables`] so setup units and the recovery tool see them
//! in their environment.

use crate::constants::{config as keys, debug_shell, recovery};
use crate::layout::RescueLayout;
use regex::Regex;
use rescue_shared::errors::{RescueError, RescueResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Static orchestrator configuration (built once, never changes).
#[derive(Debug, Clone)]
pub struct RescueConfig {
    /// Extra exclusion regex for integrity verification.
    pub exclude_checksum_verification: Option<String>,
    /// Recovery tool executable (name on PATH or absolute path).
    pub recovery_tool: String,
    /// Terminal the debug shell is bound to.
    pub debug_shell_tty: PathBuf,
    /// Shell started on the debug terminal.
    pub debug_shell: PathBuf,
    /// Every assignment from every loaded file, last one wins.
    pub variables: BTreeMap<String, String>,
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            exclude_checksum_verification: None,
            recovery_tool: recovery::DEFAULT_TOOL.to_string(),
            debug_shell_tty: PathBuf::from(debug_shell::DEFAULT_TTY),
            debug_shell: PathBuf::from(debug_shell::DEFAULT_SHELL),
            variables: BTreeMap::new(),
        }
    }
}

impl RescueConfig {
    /// Load configuration files from the layout's config directory.
    pub fn load(layout: &RescueLayout) -> RescueResult<Self> {
        let mut variables = BTreeMap::new();

        for path in layout.config_files() {
            let Some(content) = read_optional(&path)? else {
                tracing::debug!(path = %path.display(), "Configuration file not present, skipping");
                continue;
            };

            let assignments = parse_assignments(&content, &path);
            tracing::info!(
                path = %path.display(),
                count = assignments.len(),
                "Loaded configuration file"
            );
            variables.extend(assignments);
        }

        Ok(Self::from_variables(variables))
    }

    /// Build the typed configuration from raw assignments.
    ///
    /// An invalid exclusion pattern is dropped with a warning: verification
    /// still runs with the always-excluded path alone.
    pub fn from_variables(variables: BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let exclude_checksum_verification = variables
            .get(keys::EXCLUDE_CHECKSUM_VERIFICATION)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .filter(|pattern| match Regex::new(pattern) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(
                        pattern = %pattern,
                        error = %e,
                        "Ignoring invalid {}",
                        keys::EXCLUDE_CHECKSUM_VERIFICATION
                    );
                    false
                }
            });

        let recovery_tool = non_empty(&variables, keys::RECOVERY_TOOL)
            .unwrap_or(defaults.recovery_tool);
        let debug_shell_tty = non_empty(&variables, keys::DEBUG_SHELL_TTY)
            .map(PathBuf::from)
            .unwrap_or(defaults.debug_shell_tty);
        let debug_shell = non_empty(&variables, keys::DEBUG_SHELL)
            .map(PathBuf::from)
            .unwrap_or(defaults.debug_shell);

        Self {
            exclude_checksum_verification,
            recovery_tool,
            debug_shell_tty,
            debug_shell,
            variables,
        }
    }
}

fn non_empty(variables: &BTreeMap<String, String>, key: &str) -> Option<String> {
    variables
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_optional(path: &Path) -> RescueResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RescueError::Config(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Parse shell-style assignments.
///
/// Accepts `KEY=value`, `export KEY=value`, single or double quoted values,
/// blank lines and `#` comments. Anything else is logged and skipped.
pub fn parse_assignments(content: &str, source: &Path) -> Vec<(String, String)> {
    let mut assignments = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").map(str::trim).unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            tracing::warn!(
                path = %source.display(),
                line = index + 1,
                "Skipping configuration line without assignment"
            );
            continue;
        };

        let key = key.trim();
        if !is_valid_key(key) {
            tracing::warn!(
                path = %source.display(),
                line = index + 1,
                key = %key,
                "Skipping configuration line with invalid variable name"
            );
            continue;
        }

        assignments.push((key.to_string(), unquote(value.trim())));
    }

    assignments
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn unquote(value: &str) -> String {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }

    // Unquoted: drop a trailing comment
    match value.find(" #") {
        Some(pos) => value[..pos].trim_end().to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_conf(layout: &RescueLayout, name: &str, content: &str) {
        let dir = layout.config_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_parse_assignments_forms() {
        let content = r#"
# comment
PLAIN=value
export EXPORTED=yes
DOUBLE="with spaces"
SINGLE='single quoted'
TRAILING=abc # comment
not an assignment
1BAD=x
"#;
        let parsed = parse_assignments(content, Path::new("test.conf"));
        assert_eq!(
            parsed,
            vec![
                ("PLAIN".to_string(), "value".to_string()),
                ("EXPORTED".to_string(), "yes".to_string()),
                ("DOUBLE".to_string(), "with spaces".to_string()),
                ("SINGLE".to_string(), "single quoted".to_string()),
                ("TRAILING".to_string(), "abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = RescueConfig::load(&RescueLayout::new(temp_dir.path())).unwrap();

        assert_eq!(config.recovery_tool, "rear");
        assert_eq!(config.debug_shell_tty, PathBuf::from("/dev/tty9"));
        assert!(config.exclude_checksum_verification.is_none());
        assert!(config.variables.is_empty());
    }

    #[test]
    fn test_later_files_override_earlier() {
        let temp_dir = TempDir::new().unwrap();
        let layout = RescueLayout::new(temp_dir.path());
        write_conf(&layout, "local.conf", "RECOVERY_TOOL=local-tool\nONLY_LOCAL=1\n");
        write_conf(&layout, "site.conf", "RECOVERY_TOOL=site-tool\n");
        write_conf(&layout, "rescue.conf", "DEBUG_SHELL_TTY=/dev/tty2\n");

        let config = RescueConfig::load(&layout).unwrap();

        assert_eq!(config.recovery_tool, "site-tool");
        assert_eq!(config.debug_shell_tty, PathBuf::from("/dev/tty2"));
        assert_eq!(config.variables.get("ONLY_LOCAL").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_rescue_conf_wins_over_site_and_local() {
        let temp_dir = TempDir::new().unwrap();
        let layout = RescueLayout::new(temp_dir.path());
        write_conf(&layout, "local.conf", "RECOVERY_TOOL=a\n");
        write_conf(&layout, "site.conf", "RECOVERY_TOOL=b\n");
        write_conf(&layout, "rescue.conf", "RECOVERY_TOOL=c\n");

        let config = RescueConfig::load(&layout).unwrap();
        assert_eq!(config.recovery_tool, "c");
    }

    #[test]
    fn test_invalid_exclusion_pattern_is_dropped() {
        let mut variables = BTreeMap::new();
        variables.insert(
            "EXCLUDE_CHECKSUM_VERIFICATION".to_string(),
            "(unclosed".to_string(),
        );
        let config = RescueConfig::from_variables(variables);
        assert!(config.exclude_checksum_verification.is_none());
        // The raw value is still exported to units
        assert!(config.variables.contains_key("EXCLUDE_CHECKSUM_VERIFICATION"));
    }

    #[test]
    fn test_valid_exclusion_pattern_is_kept() {
        let mut variables = BTreeMap::new();
        variables.insert(
            "EXCLUDE_CHECKSUM_VERIFICATION".to_string(),
            "/etc/ssh/.*|/var/lib/.*".to_string(),
        );
        let config = RescueConfig::from_variables(variables);
        assert_eq!(
            config.exclude_checksum_verification.as_deref(),
            Some("/etc/ssh/.*|/var/lib/.*")
        );
    }
}
