//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON
//! settings-file format. Each type implements [`Default`] with production
//! default values, and `#[serde(default)]` allows partial JSON — missing
//! fields get their default during deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for the DEAT client.
///
/// Loaded from `~/.deat/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// ```json
/// {
///   "server": { "host": "deat.example.com", "secure": true },
///   "connection": { "reconnectDelayMs": 2000 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    /// Service endpoint settings.
    pub server: ServerSettings,
    /// Connection lifecycle settings.
    pub connection: ConnectionSettings,
}

/// Service endpoint settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Host (and optional port) of the DEAT service.
    pub host: String,
    /// Use `wss://` instead of `ws://`.
    pub secure: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:8000".to_string(),
            secure: false,
        }
    }
}

/// Connection lifecycle settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSettings {
    /// Fixed delay before the automatic reconnect attempt, in ms.
    pub reconnect_delay_ms: u64,
    /// How long a connection attempt may take before it is abandoned,
    /// in ms. An abandoned dial schedules a reconnect like any other
    /// transport failure.
    pub dial_timeout_ms: u64,
    /// Include the `module` field in outgoing envelopes. Most
    /// deployments route by endpoint path and leave this off.
    pub include_module_field: bool,
    /// Capacity of the inbound frame channel.
    pub frame_buffer: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 1500,
            dial_timeout_ms: 10_000,
            include_module_field: false,
            frame_buffer: 64,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
