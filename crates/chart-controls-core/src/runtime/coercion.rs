// crates/chart-controls-core/src/runtime/coercion.rs
// ============================================================================
// Module: Value Coercion and Validation
// Description: Normalizes saved values and runs control validators.
// Purpose: Produce a value consistent with the control's declared shape.
// Dependencies: crate::core, serde_json, tracing
// ============================================================================

//! ## Overview
//! Saved values may predate a change to a control's shape or choices. This
//! module reconciles them:
//! - an absent value falls back to the default, while an explicit `null` is kept;
//! - a truthy scalar saved for a multi control is wrapped in an array;
//! - select values no longer among the choices are pruned.
//!
//! Pruning never fails. Validators then run against the final value and their
//! messages are returned as data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use tracing::warn;

use crate::core::ControlDefinition;
use crate::core::ControlState;
use crate::core::is_truthy;
use crate::runtime::error::ResolveError;

// ============================================================================
// SECTION: Coercion
// ============================================================================

/// Picks the raw value or the default and applies the multi wrap.
#[must_use]
pub fn coerce_value(definition: &ControlDefinition, raw: Option<&Value>) -> Value {
    match raw {
        None => definition.evaluated_default(),
        Some(value) if definition.multi && is_truthy(value) && !value.is_array() => {
            Value::Array(vec![value.clone()])
        }
        Some(value) => value.clone(),
    }
}

/// Outcome of pruning a value against declared choices.
#[derive(Debug, Clone, PartialEq)]
pub struct Pruned {
    /// Value after pruning.
    pub value: Value,
    /// Values that were dropped, in their original order.
    pub dropped: Vec<Value>,
}

impl Pruned {
    /// Wraps a value that needed no pruning.
    const fn kept(value: Value) -> Self {
        Self {
            value,
            dropped: Vec::new(),
        }
    }
}

/// Drops values that are no longer among a select control's choices.
///
/// Only non-free-form select controls with declared choices and a truthy
/// value are pruned. Multi values keep the surviving elements in order; a
/// single value outside the choices becomes `null`.
#[must_use]
pub fn prune_stale_choices(definition: &ControlDefinition, value: Value) -> Pruned {
    if !definition.kind.prunes_choices() || definition.free_form || !is_truthy(&value) {
        return Pruned::kept(value);
    }
    let Some(allowed) = definition.choice_values() else {
        return Pruned::kept(value);
    };
    if definition.multi {
        return match value {
            Value::Array(items) if !items.is_empty() => {
                let (kept, dropped): (Vec<Value>, Vec<Value>) =
                    items.into_iter().partition(|item| allowed.contains(&item));
                Pruned {
                    value: Value::Array(kept),
                    dropped,
                }
            }
            other => Pruned::kept(other),
        };
    }
    if allowed.contains(&&value) {
        Pruned::kept(value)
    } else {
        Pruned {
            value: Value::Null,
            dropped: vec![value],
        }
    }
}

/// Resolves the final value of a control: coercion, then pruning.
#[must_use]
pub fn resolve_value(definition: &ControlDefinition, raw: Option<&Value>) -> Value {
    let coerced = coerce_value(definition, raw);
    let pruned = prune_stale_choices(definition, coerced);
    if !pruned.dropped.is_empty() {
        warn!(
            kind = %definition.kind,
            dropped = pruned.dropped.len(),
            "pruned stale values outside declared choices"
        );
    }
    pruned.value
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Runs every validator against the value and builds the control state.
///
/// # Errors
///
/// Returns [`ResolveError::ValidatorFault`] when a validator faults; the
/// remaining validators are not run.
pub fn validate(
    name: &str,
    definition: &ControlDefinition,
    value: Value,
) -> Result<ControlState, ResolveError> {
    let mut errors = Vec::new();
    for validator in &definition.validators {
        match validator.check(&value) {
            Ok(Some(message)) => errors.push(message),
            Ok(None) => {}
            Err(fault) => {
                return Err(ResolveError::ValidatorFault {
                    control: name.to_string(),
                    validator: validator.name().to_string(),
                    message: fault.message,
                });
            }
        }
    }
    Ok(ControlState::from_definition(name, definition, value).with_validation_errors(errors))
}
