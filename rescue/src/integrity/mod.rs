//! Integrity verification of the rescue image.
//!
//! Compares the files of the running rescue system against the checksum
//! manifest produced when the image was built. Verification is advisory: a
//! mismatch is reported to the operator but never stops the boot.
//!
//! Must run before any setup unit, since units legitimately rewrite files
//! listed in the manifest.

mod manifest;
mod verifier;

pub use manifest::{ManifestEntry, load_manifest, parse_manifest};
pub use verifier::{ExclusionPattern, IntegrityVerifier, VerificationVerdict};
