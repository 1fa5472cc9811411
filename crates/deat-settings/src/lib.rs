//! # deat-settings
//!
//! Configuration management with layered sources for the DEAT client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`ClientSettings::default()`]
//! 2. **User file** — `~/.deat/settings.json`, possibly partial; absent
//!    fields keep their defaults
//! 3. **Environment variables** — `DEAT_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, load_settings, load_settings_from_path, settings_path};
pub use types::{ClientSettings, ConnectionSettings, ServerSettings};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
