// crates/chart-controls-core/src/core/value.rs
// ============================================================================
// Module: Control Value Helpers
// Description: Presence rules for loosely typed control values.
// Purpose: Decide whether a saved or default value counts as "present".
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Saved form values are JSON and frequently hold placeholder values such as
//! `null`, `""`, or `0`. Coercion and choice pruning only act on values that
//! are present, where presence follows the usual loose-truthiness rules.

use serde_json::Value;

/// Returns true when a control value counts as present.
///
/// `null`, `false`, numeric zero, and the empty string are absent. Arrays and
/// objects are present even when empty.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
