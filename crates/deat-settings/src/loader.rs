//! Settings loading.
//!
//! [`load_settings`] builds a [`ClientSettings`] from up to three
//! layers: compiled defaults, the user's `~/.deat/settings.json`, and
//! `DEAT_*` environment variables on top. The file may be partial —
//! every settings type carries `#[serde(default)]`, so absent fields
//! simply keep their defaults and no merge step is needed.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::ClientSettings;

/// Accepted bounds for `DEAT_RECONNECT_DELAY_MS`. Below the floor a
/// flapping server would be hammered; above the ceiling the client is
/// effectively not reconnecting at all.
const RECONNECT_DELAY_MS: RangeInclusive<u64> = 100..=600_000;

/// Location of the user settings file, `~/.deat/settings.json`.
#[must_use]
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    Path::new(&home).join(".deat").join("settings.json")
}

/// Load settings from the default location plus `DEAT_*` overrides.
pub fn load_settings() -> Result<ClientSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from `path` plus `DEAT_*` overrides.
///
/// A missing file yields the defaults. An unreadable or invalid file is
/// an error, not a silent fallback — a broken config should stop the
/// client, not quietly misconfigure it.
pub fn load_settings_from_path(path: &Path) -> Result<ClientSettings> {
    let mut settings = if path.exists() {
        debug!(?path, "reading settings file");
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text)?
    } else {
        debug!(?path, "no settings file, using defaults");
        ClientSettings::default()
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

// ── Environment overrides ────────────────────────────────────────────────────

/// Apply `DEAT_*` environment variable overrides.
///
/// Unset and empty variables leave the setting alone; a set-but-invalid
/// value is logged and ignored rather than guessed at.
pub fn apply_env_overrides(settings: &mut ClientSettings) {
    apply_overrides(settings, |name| {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    });
}

/// Apply overrides from an arbitrary variable source.
///
/// Split out from [`apply_env_overrides`] so the override rules are
/// testable without mutating the process environment.
pub fn apply_overrides(settings: &mut ClientSettings, get: impl Fn(&str) -> Option<String>) {
    if let Some(host) = get("DEAT_HOST") {
        settings.server.host = host;
    }
    if let Some(secure) = get("DEAT_SECURE").and_then(|v| switch("DEAT_SECURE", &v)) {
        settings.server.secure = secure;
    }
    if let Some(ms) =
        get("DEAT_RECONNECT_DELAY_MS").and_then(|v| delay_ms("DEAT_RECONNECT_DELAY_MS", &v))
    {
        settings.connection.reconnect_delay_ms = ms;
    }
    if let Some(include) =
        get("DEAT_INCLUDE_MODULE_FIELD").and_then(|v| switch("DEAT_INCLUDE_MODULE_FIELD", &v))
    {
        settings.connection.include_module_field = include;
    }
}

/// On/off forms accepted for boolean overrides. Anything else is
/// rejected with a warning so a typo cannot flip a setting.
fn switch(name: &str, val: &str) -> Option<bool> {
    let parsed = match val.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    };
    if parsed.is_none() {
        tracing::warn!(key = name, value = %val, "ignoring override, not a boolean");
    }
    parsed
}

fn delay_ms(name: &str, val: &str) -> Option<u64> {
    let parsed = val
        .parse()
        .ok()
        .filter(|ms| RECONNECT_DELAY_MS.contains(ms));
    if parsed.is_none() {
        tracing::warn!(
            key = name,
            value = %val,
            range = ?RECONNECT_DELAY_MS,
            "ignoring override, not a delay in range"
        );
    }
    parsed
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
