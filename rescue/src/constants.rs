//! Rescue system constants.
//!
//! Centralized location for well-known paths, boot parameter names and timing
//! values. Paths under [`paths`] are relative to the layout root.

/// Well-known locations inside the rescue system.
pub mod paths {
    /// Kernel command line (absolute, never re-rooted)
    pub const CMDLINE: &str = "/proc/cmdline";

    /// Checksum manifest written when the rescue image was built
    pub const MANIFEST: &str = "checksums.txt";

    /// Message of the day. Regenerated at boot, so never checked.
    pub const MOTD: &str = "etc/motd";

    /// Pre-login greeting
    pub const ISSUE: &str = "etc/issue";

    /// Directory holding the setup units
    pub const SETUP_DIR: &str = "etc/scripts/system-setup.d";

    /// Log files shown by the outcome menu
    pub const LOG_DIR: &str = "var/log/rescue";

    /// Configuration directory
    pub const CONFIG_DIR: &str = "etc/rescue";
}

/// Boot parameters that select the boot mode.
pub mod params {
    pub const DEBUG: &str = "debug";
    pub const UNATTENDED: &str = "unattended";
    pub const AUTO_RECOVER: &str = "auto_recover";
    pub const AUTOMATIC: &str = "automatic";
}

/// Configuration files and the keys the orchestrator understands.
pub mod config {
    /// Configuration files in load order, later ones override earlier ones.
    pub const FILES: [&str; 3] = ["local.conf", "site.conf", "rescue.conf"];

    pub const EXCLUDE_CHECKSUM_VERIFICATION: &str = "EXCLUDE_CHECKSUM_VERIFICATION";
    pub const RECOVERY_TOOL: &str = "RECOVERY_TOOL";
    pub const DEBUG_SHELL_TTY: &str = "DEBUG_SHELL_TTY";
    pub const DEBUG_SHELL: &str = "DEBUG_SHELL";
}

/// Setup unit discovery.
pub mod setup {
    /// Only files with this suffix are setup units
    pub const UNIT_SUFFIX: &str = ".sh";

    /// Shell used to source setup units
    pub const UNIT_SHELL: &str = "/bin/bash";
}

/// External recovery tool invocation.
pub mod recovery {
    pub const DEFAULT_TOOL: &str = "rear";
    pub const SUBCOMMAND: &str = "recover";
    pub const VERBOSE_FLAG: &str = "-v";
    /// Debug and debugscripts flags, passed together in debug mode
    pub const DEBUG_TRACE_FLAGS: [&str; 2] = ["-d", "-D"];
}

/// Detached debug shell.
pub mod debug_shell {
    pub const DEFAULT_TTY: &str = "/dev/tty9";
    pub const DEFAULT_SHELL: &str = "/bin/bash";
}

/// Waits shown to the operator.
pub mod timing {
    /// Pause after reporting an integrity failure (non-debug mode)
    pub const INTEGRITY_FAILURE_PAUSE_SECS: u64 = 10;

    /// Pause after the "ready" message so it can be read
    pub const READY_PAUSE_SECS: u64 = 2;

    /// Countdown before the unattended reboot
    pub const UNATTENDED_REBOOT_DELAY_SECS: u64 = 30;
}

/// Name of the orchestrator's own log file inside the log directory.
pub const LOG_FILE_NAME: &str = "rescue-setup.log";
