//! Failure modes of settings loading.
//!
//! A missing settings file is not an error (defaults stand in); only an
//! unreadable or invalid file surfaces here, so the CLI can refuse to
//! start on a broken config instead of silently ignoring it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but reading it failed.
    #[error("cannot read settings file {}: {source}", path.display())]
    Read {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for the expected schema.
    #[error("settings file is not valid: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Convenience alias for settings results.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_names_the_offending_path() {
        let err = SettingsError::Read {
            path: PathBuf::from("/home/u/.deat/settings.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/home/u/.deat/settings.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn schema_mismatch_becomes_invalid() {
        let bad = serde_json::from_str::<crate::ClientSettings>(r#"{"server": 7}"#).unwrap_err();
        let err = SettingsError::from(bad);
        assert!(err.to_string().starts_with("settings file is not valid"));
    }
}
