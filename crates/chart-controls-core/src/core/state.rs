// crates/chart-controls-core/src/core/state.rs
// ============================================================================
// Module: Control State
// Description: Resolved control states and the flattened form data.
// Purpose: Provide the serializable output handed to the UI and query builder.
// Dependencies: crate::core::definition, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ControlState`] is a definition after overrides, dynamic properties, and
//! value resolution. It carries no function values, so it serializes cleanly.
//! States are rebuilt on every resolution and never mutated in place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::definition::Choice;
use crate::core::definition::ControlDefinition;
use crate::core::definition::ControlKind;

// ============================================================================
// SECTION: Aliases
// ============================================================================

/// Resolved states keyed by control name.
pub type ControlsState = BTreeMap<String, ControlState>;

/// Control values keyed by control name.
pub type FormData = BTreeMap<String, Value>;

// ============================================================================
// SECTION: Control State
// ============================================================================

/// Fully resolved state of one control.
///
/// # Invariants
/// - `validation_errors` is empty when the value passed every validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    /// Control name.
    pub name: String,
    /// Widget kind tag.
    #[serde(rename = "type")]
    pub kind: ControlKind,
    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Evaluated default value.
    pub default: Value,
    /// Value is a sequence rather than a scalar.
    pub multi: bool,
    /// Values outside `choices` are permitted.
    pub free_form: bool,
    /// Ordered allowed choices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    /// Opaque render-only properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: BTreeMap<String, Value>,
    /// Resolved value.
    pub value: Value,
    /// Validation messages in validator order.
    #[serde(default)]
    pub validation_errors: Vec<String>,
}

impl ControlState {
    /// Builds a state from a definition and a resolved value.
    #[must_use]
    pub fn from_definition(name: &str, definition: &ControlDefinition, value: Value) -> Self {
        Self {
            name: name.to_string(),
            kind: definition.kind.clone(),
            label: definition.label.clone(),
            description: definition.description.clone(),
            default: definition.evaluated_default(),
            multi: definition.multi,
            free_form: definition.free_form,
            choices: definition.choices.clone(),
            props: definition.props.clone(),
            value,
            validation_errors: Vec::new(),
        }
    }

    /// Seeds a state straight from an embedded definition; the value is the
    /// definition's default and no validators run.
    #[must_use]
    pub fn seed(name: &str, definition: &ControlDefinition) -> Self {
        let value = definition.evaluated_default();
        Self::from_definition(name, definition, value)
    }

    /// Attaches validation messages.
    #[must_use]
    pub fn with_validation_errors(mut self, errors: Vec<String>) -> Self {
        self.validation_errors = errors;
        self
    }

    /// Returns true when no validator reported an error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }
}
