//! Wire codec for the DEAT service protocol.
//!
//! Outgoing frames wrap the user payload in an [`Envelope`]; incoming
//! frames decode to a normalized [`ModuleResult`]. The service has
//! shipped several client generations with slightly divergent frame
//! shapes, all of which remain live:
//!
//! - standard: `{"module": M, "result": {"metric", "value", "equation",
//!   "interpretation"}}`
//! - compact: the numeric pair nested as `"out": {<metric>: <value>}`
//!   with `"comment"` in place of `"interpretation"`
//! - bare: the result body at the top level, no `"result"` wrapper
//!
//! [`decode_frame`] accepts all of them and downstream code pattern
//! matches on the normalized fields only. Deep schema validation of the
//! payload is deliberately absent — malformed domain structure is the
//! service's to reject.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ClientError, Result};
use crate::module::Module;

// ─────────────────────────────────────────────────────────────────────────────
// Outgoing
// ─────────────────────────────────────────────────────────────────────────────

/// The wire-level wrapper around a user payload sent to the service.
#[derive(Clone, Debug, Serialize)]
pub struct Envelope {
    /// Optional routing hint; most deployments derive the module from
    /// the endpoint path and omit this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<Module>,
    /// The user payload, opaque to the client.
    pub payload: Value,
}

impl Envelope {
    /// Wrap a payload without the routing hint.
    #[must_use]
    pub fn new(payload: Value) -> Self {
        Self {
            module: None,
            payload,
        }
    }

    /// Wrap a payload and include the `module` field.
    #[must_use]
    pub fn with_module(payload: Value, module: Module) -> Self {
        Self {
            module: Some(module),
            payload,
        }
    }

    /// Serialize to JSON text.
    ///
    /// `serde_json` value trees always serialize; a failure here would
    /// be a serde bug, so the empty string stands in rather than a
    /// panic path.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Parse user-supplied payload text into a JSON value.
///
/// This is the pre-send validation gate: failure means nothing is
/// transmitted at all.
pub fn parse_payload(text: &str) -> Result<Value> {
    serde_json::from_str(text.trim()).map_err(|e| ClientError::InvalidUserJson(e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Incoming
// ─────────────────────────────────────────────────────────────────────────────

/// The normalized decoded service response.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleResult {
    /// Module echoed by the service, when present and recognized.
    pub module: Option<Module>,
    /// Metric name.
    pub metric: String,
    /// Numeric metric value.
    pub value: f64,
    /// Human-readable equation text.
    pub equation: String,
    /// Interpretation string.
    pub interpretation: String,
}

/// Result body in either of the observed encodings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireBody {
    Standard {
        metric: String,
        value: f64,
        #[serde(default)]
        equation: String,
        #[serde(default)]
        interpretation: String,
    },
    Compact {
        out: serde_json::Map<String, Value>,
        #[serde(default)]
        equation: String,
        #[serde(default)]
        comment: String,
    },
}

/// Decode an inbound text frame into a [`ModuleResult`].
///
/// Returns [`ClientError::MalformedResponse`] for non-JSON text or a
/// body lacking a usable metric/value pair. Callers drop the frame and
/// keep the connection open.
pub fn decode_frame(raw: &str) -> Result<ModuleResult> {
    let mut frame: Value = serde_json::from_str(raw)
        .map_err(|e| ClientError::MalformedResponse(format!("invalid JSON: {e}")))?;

    // Unknown or absent module names degrade to None; the session falls
    // back to its current selection for labeling.
    let module = frame
        .get("module")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Module>().ok());

    let body_value = match frame.get_mut("result").map(Value::take) {
        Some(body) => body,
        None => frame,
    };
    let body: WireBody = serde_json::from_value(body_value).map_err(|_| {
        ClientError::MalformedResponse("missing metric/value or out mapping".into())
    })?;

    match body {
        WireBody::Standard {
            metric,
            value,
            equation,
            interpretation,
        } => Ok(ModuleResult {
            module,
            metric,
            value,
            equation,
            interpretation,
        }),
        WireBody::Compact {
            out,
            equation,
            comment,
        } => {
            let (metric, value) = out
                .iter()
                .find_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
                .ok_or_else(|| {
                    ClientError::MalformedResponse("out mapping has no numeric entry".into())
                })?;
            Ok(ModuleResult {
                module,
                metric,
                value,
                equation,
                interpretation: comment,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
