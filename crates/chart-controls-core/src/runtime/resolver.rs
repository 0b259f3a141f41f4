// crates/chart-controls-core/src/runtime/resolver.rs
// ============================================================================
// Module: Control State Resolver
// Description: Orchestrates lookup, dynamic evaluation, and validation.
// Purpose: Resolve one control or a visualization's whole layout.
// Dependencies: crate::{core, interfaces, runtime}, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`ControlResolver`] borrows a registry and runs the pipeline
//! lookup, dynamic props, coercion, validation for each control key. The batch
//! entry point walks the sections rendered for a visualization and datasource
//! type and resolves every named slot against the saved form data. Inline
//! slots are seeded from their embedded definition without lookup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use crate::core::AmbientState;
use crate::core::ControlSlot;
use crate::core::ControlState;
use crate::core::ControlsState;
use crate::core::DatasourceType;
use crate::core::FormData;
use crate::interfaces::ControlRegistry;
use crate::runtime::coercion::resolve_value;
use crate::runtime::coercion::validate;
use crate::runtime::dynamic::apply_dynamic_props;
use crate::runtime::error::ResolveError;
use crate::runtime::registry::resolve_definition;
use crate::runtime::registry::sections_to_render;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves control state against a borrowed registry.
#[derive(Debug)]
pub struct ControlResolver<'a, R: ?Sized> {
    /// Registry supplying definitions and layouts.
    registry: &'a R,
}

impl<R: ?Sized> Clone for ControlResolver<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for ControlResolver<'_, R> {}

impl<'a, R> ControlResolver<'a, R>
where
    R: ControlRegistry + ?Sized,
{
    /// Creates a resolver over the registry.
    #[must_use]
    pub const fn new(registry: &'a R) -> Self {
        Self {
            registry,
        }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &'a R {
        self.registry
    }

    /// Resolves the state of one control.
    ///
    /// `raw` is `None` when no value was saved; an explicit JSON `null` is
    /// treated as a saved value.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the control is unknown or a validator
    /// faults.
    pub fn control_state(
        &self,
        control: &str,
        viz_type: &str,
        ambient: Option<&AmbientState>,
        raw: Option<&Value>,
    ) -> Result<ControlState, ResolveError> {
        let base = resolve_definition(self.registry, control, viz_type)?;
        let definition = apply_dynamic_props(base, ambient);
        let value = resolve_value(&definition, raw);
        let state = validate(control, &definition, value)?;
        debug!(
            control,
            viz_type,
            kind = %state.kind,
            errors = state.validation_errors.len(),
            "resolved control state"
        );
        Ok(state)
    }

    /// Resolves every control rendered for a visualization.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResolveError`] raised by a named slot.
    pub fn all_controls_state(
        &self,
        viz_type: &str,
        datasource_type: DatasourceType,
        ambient: Option<&AmbientState>,
        saved: &Map<String, Value>,
    ) -> Result<ControlsState, ResolveError> {
        let mut states = ControlsState::new();
        let sections = sections_to_render(self.registry, viz_type, datasource_type);
        for slot in sections.iter().flat_map(|section| section.slots()) {
            match slot {
                ControlSlot::Named(name) => {
                    let state = self.control_state(name, viz_type, ambient, saved.get(name))?;
                    states.insert(name.clone(), state);
                }
                ControlSlot::Inline(inline) => {
                    let state = ControlState::seed(&inline.name, &inline.config);
                    states.insert(inline.name.clone(), state);
                }
                ControlSlot::Empty => {}
            }
        }
        debug!(
            viz_type,
            datasource_type = %datasource_type,
            sections = sections.len(),
            controls = states.len(),
            "resolved controls state"
        );
        Ok(states)
    }
}

// ============================================================================
// SECTION: Form Data
// ============================================================================

/// Projects resolved states onto their values.
#[must_use]
pub fn to_form_data(states: &ControlsState) -> FormData {
    states.iter().map(|(name, state)| (name.clone(), state.value.clone())).collect()
}
