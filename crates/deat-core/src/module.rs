//! Module and variant identifiers.
//!
//! A [`Module`] names one remote analytical capability; each module is
//! addressed by its own WebSocket endpoint path. A [`Variant`] selects a
//! preset payload in the front end and is never sent to the service on
//! its own.
//!
//! Both parse case-insensitively (the service treats the path segment
//! case-insensitively too) and canonicalize to uppercase for endpoint
//! construction and display.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ClientError;

// ─────────────────────────────────────────────────────────────────────────────
// Module
// ─────────────────────────────────────────────────────────────────────────────

/// A named remote analytical module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Module {
    /// Adaptive reliability computation.
    Arc,
    /// Chaotic risk.
    Cr,
    /// Survival / stabilization engine.
    Nur,
}

impl Module {
    /// Canonical uppercase form used on the wire and in endpoint paths.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arc => "ARC",
            Self::Cr => "CR",
            Self::Nur => "NUR",
        }
    }

    /// All known modules, in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Arc, Self::Cr, Self::Nur]
    }

    /// Build the WebSocket endpoint URL for this module.
    ///
    /// The path segment is always uppercase; the service side matches it
    /// case-insensitively.
    #[must_use]
    pub fn endpoint_url(self, secure: bool, host: &str) -> String {
        let scheme = if secure { "wss" } else { "ws" };
        format!("{scheme}://{host}/ws/{}", self.as_str())
    }
}

impl FromStr for Module {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ARC" => Ok(Self::Arc),
            "CR" => Ok(Self::Cr),
            "NUR" => Ok(Self::Nur),
            other => Err(ClientError::MalformedResponse(format!(
                "unknown module `{other}`"
            ))),
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Module {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Module {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Variant
// ─────────────────────────────────────────────────────────────────────────────

/// A preset selector choosing a default payload for the active module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Primary preset.
    #[default]
    A,
    /// Alternate preset.
    B,
}

impl Variant {
    /// Canonical display form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl FromStr for Variant {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            other => Err(ClientError::MalformedResponse(format!(
                "unknown variant `{other}`"
            ))),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
