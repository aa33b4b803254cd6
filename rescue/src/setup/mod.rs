//! Setup unit sequencing.
//!
//! Setup units are the scripts in `etc/scripts/system-setup.d/` that bring
//! the rescue environment up (network, serial console, keyboard, ...). They
//! run once each, in file name order, and a failing unit never stops the
//! sequence.
//!
//! ## Architecture
//!
//! ```text
//! discover_units ──→ SetupSequencer ──→ UnitRunner (ShellUnitRunner)
//!                          │
//!                          └── TraceSwitch / TraceGuard (debug mode only)
//! ```

mod runner;
mod sequencer;
mod trace;

pub use runner::{ShellUnitRunner, UnitEnvironment, UnitRunner, UnitStatus};
pub use sequencer::{SetupReport, SetupSequencer, SetupUnit, discover_units};
pub use trace::{TraceGuard, TraceSwitch};
