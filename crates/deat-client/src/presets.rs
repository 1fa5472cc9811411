//! Static preset payload catalog.
//!
//! Maps `(module, variant)` to the default payload used to pre-fill the
//! editable input. Purely a front-end convenience — the core never
//! inspects these values, and the variant is not sent to the service.

use deat_core::{Module, Variant};
use serde_json::{Value, json};

/// Default payload for a module/variant pair.
#[must_use]
pub fn preset(module: Module, variant: Variant) -> Value {
    match (module, variant) {
        (Module::Arc, Variant::A) => json!({
            "signals": {
                "CN": {"concentration": 0.9},
                "RU": {"entropy": 0.2},
                "US": {"profit_bias": 0.4}
            },
            "adapt_delta": {"cn": 0.01, "ru": -0.01}
        }),
        (Module::Arc, Variant::B) => json!({
            "signals": {
                "CN": {"concentration": 0.5},
                "RU": {"entropy": 0.6},
                "US": {"profit_bias": 0.2}
            },
            "adapt_delta": {"cn": 0.02, "ru": 0.03}
        }),
        (Module::Cr, Variant::A) => json!({
            "signals": {
                "CN": {"concentration": 0.2},
                "RU": {"entropy": 0.9},
                "US": {"profit_bias": 0.6}
            },
            "adapt_delta": {"cn": -0.01, "ru": 0.05}
        }),
        (Module::Cr, Variant::B) => json!({
            "signals": {
                "CN": {"concentration": 0.4},
                "RU": {"entropy": 0.5},
                "US": {"profit_bias": 0.3}
            },
            "adapt_delta": {"cn": 0.0, "ru": 0.02}
        }),
        (Module::Nur, Variant::A) => json!({
            "signals": {
                "CN": {"concentration": 0.8},
                "RU": {"entropy": 0.1},
                "US": {"profit_bias": 0.5}
            },
            "adapt_delta": {"cn": 0.0, "ru": 0.0}
        }),
        (Module::Nur, Variant::B) => json!({
            "signals": {
                "CN": {"concentration": 0.3},
                "RU": {"entropy": 0.6},
                "US": {"profit_bias": 0.2}
            },
            "adapt_delta": {"cn": 0.02, "ru": 0.01}
        }),
    }
}

/// Pretty-printed preset text for the editable payload field.
#[must_use]
pub fn preset_text(module: Module, variant: Variant) -> String {
    serde_json::to_string_pretty(&preset(module, variant)).unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
