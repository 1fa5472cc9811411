//! Row construction and severity classification.
//!
//! A [`ResultRow`] is the rendering-ready record appended to the visible
//! result log. Rows are built from a decoded [`ModuleResult`] plus the
//! [`RequestContext`] captured when the request was submitted — the
//! label must reflect the variant active at *request* time, since the
//! selection may have changed while the reply was in flight.

use std::fmt;

use serde::Serialize;

use crate::module::{Module, Variant};
use crate::wire::ModuleResult;

// ─────────────────────────────────────────────────────────────────────────────
// Severity
// ─────────────────────────────────────────────────────────────────────────────

/// Three-tier classification of a result value, display-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBand {
    /// `value > 0.7`
    High,
    /// `0.4 < value <= 0.7`
    Medium,
    /// `value <= 0.4`
    Low,
}

impl SeverityBand {
    /// Classify a metric value. Thresholds are fixed by the service's
    /// presentation contract, not configurable.
    #[must_use]
    pub fn classify(value: f64) -> Self {
        if value > 0.7 {
            Self::High
        } else if value > 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Lowercase display form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request context
// ─────────────────────────────────────────────────────────────────────────────

/// Session state captured at submit time, matched to the reply on
/// arrival.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    /// Module the request was sent to.
    pub module: Module,
    /// Variant active when the request was sent.
    pub variant: Variant,
    /// The payload text as submitted.
    pub payload_text: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Result row
// ─────────────────────────────────────────────────────────────────────────────

/// One rendering-ready record. Append-only and never mutated once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    /// Combined module–variant label, e.g. `ARC – A`.
    pub label: String,
    /// Request payload as text.
    pub request: String,
    /// Metric name.
    pub metric: String,
    /// Numeric metric value.
    pub value: f64,
    /// Severity band derived from the value.
    pub band: SeverityBand,
    /// Equation text.
    pub equation: String,
    /// Interpretation string.
    pub interpretation: String,
}

impl ResultRow {
    /// Build a row from a decoded result and its request context.
    ///
    /// The label prefers the module echoed by the service, falling back
    /// to the module the request was addressed to.
    #[must_use]
    pub fn build(result: &ModuleResult, ctx: &RequestContext) -> Self {
        let module = result.module.unwrap_or(ctx.module);
        Self {
            label: format!("{module} – {}", ctx.variant),
            request: ctx.payload_text.clone(),
            metric: result.metric.clone(),
            value: result.value,
            band: SeverityBand::classify(result.value),
            equation: result.equation.clone(),
            interpretation: result.interpretation.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn context(module: Module, variant: Variant) -> RequestContext {
        RequestContext {
            module,
            variant,
            payload_text: "{}".into(),
        }
    }

    fn result(value: f64) -> ModuleResult {
        ModuleResult {
            module: Some(Module::Arc),
            metric: "score".into(),
            value,
            equation: "f(x)=x".into(),
            interpretation: "strong".into(),
        }
    }

    // -- classification boundaries --

    #[test]
    fn classify_above_high_threshold() {
        assert_eq!(SeverityBand::classify(0.71), SeverityBand::High);
    }

    #[test]
    fn classify_medium_band() {
        assert_eq!(SeverityBand::classify(0.5), SeverityBand::Medium);
        assert_eq!(SeverityBand::classify(0.7), SeverityBand::Medium);
    }

    #[test]
    fn classify_low_band_inclusive() {
        assert_eq!(SeverityBand::classify(0.4), SeverityBand::Low);
        assert_eq!(SeverityBand::classify(0.0), SeverityBand::Low);
    }

    #[test]
    fn band_display() {
        assert_eq!(SeverityBand::High.to_string(), "high");
        assert_eq!(SeverityBand::Low.as_str(), "low");
    }

    // -- row building --

    #[test]
    fn build_row_scenario_arc_a() {
        let ctx = RequestContext {
            module: Module::Arc,
            variant: Variant::A,
            payload_text: r#"{"signals":{"CN":{"concentration":0.9}}}"#.into(),
        };
        let row = ResultRow::build(&result(0.82), &ctx);
        assert_eq!(row.label, "ARC – A");
        assert_eq!(row.band, SeverityBand::High);
        assert_eq!(row.equation, "f(x)=x");
        assert_eq!(row.request, ctx.payload_text);
    }

    #[test]
    fn build_row_prefers_echoed_module() {
        // Request went to CR but the service says ARC answered.
        let row = ResultRow::build(&result(0.2), &context(Module::Cr, Variant::B));
        assert_eq!(row.label, "ARC – B");
    }

    #[test]
    fn build_row_falls_back_to_request_module() {
        let mut res = result(0.2);
        res.module = None;
        let row = ResultRow::build(&res, &context(Module::Nur, Variant::A));
        assert_eq!(row.label, "NUR – A");
    }

    #[test]
    fn build_row_label_uses_request_time_variant() {
        let row = ResultRow::build(&result(0.9), &context(Module::Arc, Variant::B));
        assert_eq!(row.label, "ARC – B");
    }
}
