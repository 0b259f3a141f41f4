// crates/chart-controls-core/src/runtime/dynamic.rs
// ============================================================================
// Module: Dynamic Property Evaluation
// Description: Applies state mappers and computed defaults to definitions.
// Purpose: Turn a definition with function-valued fields into plain data.
// Dependencies: crate::core, tracing
// ============================================================================

//! ## Overview
//! Mapping happens in two ordered steps. First the state mapper, when both it
//! and ambient state are present, contributes a patch that wins over the
//! definition. Then a computed default is evaluated against the mapped
//! definition, so defaults such as "first choice" see the mapped choices.
//! The mapper never survives evaluation.

use tracing::trace;

use crate::core::AmbientState;
use crate::core::ControlDefault;
use crate::core::ControlDefinition;

/// Evaluates the function-valued fields of a definition.
///
/// The result carries no mapper and, when a default is present, a static one.
#[must_use]
pub fn apply_dynamic_props(
    mut definition: ControlDefinition,
    ambient: Option<&AmbientState>,
) -> ControlDefinition {
    if let Some(mapper) = definition.map_state_to_props.take()
        && let Some(state) = ambient
    {
        let mut patch = mapper.map(state, &definition);
        patch.map_state_to_props = None;
        trace!(mapper = mapper.name(), "applied state mapper");
        definition = definition.patched(&patch);
    }
    if matches!(definition.default, Some(ControlDefault::Computed(_))) {
        let value = definition.evaluated_default();
        definition.default = Some(ControlDefault::Static(value));
    }
    definition
}
