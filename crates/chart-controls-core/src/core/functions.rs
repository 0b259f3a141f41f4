// crates/chart-controls-core/src/core/functions.rs
// ============================================================================
// Module: Control Function Values
// Description: Named, shareable function values carried by control definitions.
// Purpose: Model validators, computed defaults, and state mappers as typed data.
// Dependencies: crate::core::{datasource, definition}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Control definitions carry behavior: validators, defaults computed from the
//! definition, and mappers that derive properties from ambient state. Each is
//! wrapped in a [`NamedFn`], an `Arc`'d closure plus a stable name. The name is
//! what configuration refers to and what `Debug`/`PartialEq` operate on, so
//! definitions remain comparable in tests and printable in diagnostics.
//!
//! All closures are `Send + Sync`; registries holding them can be shared
//! across threads without synchronization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::core::datasource::AmbientState;
use crate::core::definition::ControlDefinition;
use crate::core::definition::ControlPatch;

// ============================================================================
// SECTION: Named Function
// ============================================================================

/// A function value paired with the name it is registered under.
///
/// # Invariants
/// - Equality and debug output consider the name only.
pub struct NamedFn<F: ?Sized> {
    /// Registered function name.
    name: Arc<str>,
    /// Shared function body.
    func: Arc<F>,
}

impl<F: ?Sized> NamedFn<F> {
    /// Returns the registered function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F: ?Sized> Clone for NamedFn<F> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            func: Arc::clone(&self.func),
        }
    }
}

impl<F: ?Sized> fmt::Debug for NamedFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedFn").field(&self.name).finish()
    }
}

impl<F: ?Sized> PartialEq for NamedFn<F> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

// ============================================================================
// SECTION: Validators
// ============================================================================

/// Programmer-defect raised by a validator instead of returning a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidatorFault {
    /// Description of the defect.
    pub message: String,
}

impl ValidatorFault {
    /// Creates a validator fault with the provided message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of running one validator: `Ok(Some(msg))` reports a validation
/// error, `Ok(None)` accepts the value, `Err` is a fatal defect.
pub type ValidatorOutcome = Result<Option<String>, ValidatorFault>;

/// Validator invoked with a control's final value.
pub type ValidatorFn = NamedFn<dyn Fn(&Value) -> ValidatorOutcome + Send + Sync>;

impl ValidatorFn {
    /// Wraps a validator closure under the given name.
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&Value) -> ValidatorOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Runs the validator against a value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorFault`] when the validator itself is defective.
    pub fn check(&self, value: &Value) -> ValidatorOutcome {
        (self.func)(value)
    }
}

// ============================================================================
// SECTION: Computed Defaults
// ============================================================================

/// Default computed from the (already mapped) control definition.
pub type DefaultFn = NamedFn<dyn Fn(&ControlDefinition) -> Value + Send + Sync>;

impl DefaultFn {
    /// Wraps a default-computing closure under the given name.
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&ControlDefinition) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Computes the default value for a definition.
    #[must_use]
    pub fn evaluate(&self, definition: &ControlDefinition) -> Value {
        (self.func)(definition)
    }
}

// ============================================================================
// SECTION: State Mappers
// ============================================================================

/// Mapper deriving definition fields from ambient state.
pub type PropsMapper =
    NamedFn<dyn Fn(&AmbientState, &ControlDefinition) -> ControlPatch + Send + Sync>;

impl PropsMapper {
    /// Wraps a state-mapping closure under the given name.
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&AmbientState, &ControlDefinition) -> ControlPatch + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Computes the partial overrides for a definition under ambient state.
    #[must_use]
    pub fn map(&self, state: &AmbientState, definition: &ControlDefinition) -> ControlPatch {
        (self.func)(state, definition)
    }
}
