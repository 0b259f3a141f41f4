// crates/chart-controls-core/src/runtime/registry.rs
// ============================================================================
// Module: Control Registry Lookup
// Description: In-memory registry and base-definition resolution.
// Purpose: Resolve a control name to its effective definition for a viz type.
// Dependencies: crate::core, crate::interfaces, tracing
// ============================================================================

//! ## Overview
//! Lookup checks the global registry first and falls back to an inline slot
//! in the visualization's own layout. The visualization's override, when
//! present, is applied field-by-field on top. Unknown visualization types
//! behave as if they declared no sections and no overrides.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use tracing::trace;

use crate::core::ControlDefinition;
use crate::core::ControlPanelSection;
use crate::core::DatasourceType;
use crate::core::PanelConfig;
use crate::interfaces::ControlRegistry;
use crate::runtime::error::ResolveError;

// ============================================================================
// SECTION: Static Registry
// ============================================================================

/// Registry backed by in-memory maps, built once and then shared read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticRegistry {
    /// Global definitions keyed by control name.
    controls: BTreeMap<String, ControlDefinition>,
    /// Panel configurations keyed by visualization type.
    panels: BTreeMap<String, PanelConfig>,
    /// Sections rendered ahead of every visualization's own.
    common_sections: Vec<ControlPanelSection>,
}

impl StaticRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a global control definition.
    #[must_use]
    pub fn with_control(mut self, name: impl Into<String>, definition: ControlDefinition) -> Self {
        self.controls.insert(name.into(), definition);
        self
    }

    /// Registers a visualization's panel configuration.
    #[must_use]
    pub fn with_panel(mut self, viz_type: impl Into<String>, panel: PanelConfig) -> Self {
        self.panels.insert(viz_type.into(), panel);
        self
    }

    /// Appends a common section.
    #[must_use]
    pub fn with_common_section(mut self, section: ControlPanelSection) -> Self {
        self.common_sections.push(section);
        self
    }

    /// Iterates global control names in sorted order.
    pub fn control_names(&self) -> impl Iterator<Item = &str> {
        self.controls.keys().map(String::as_str)
    }

    /// Iterates registered visualization types in sorted order.
    pub fn viz_types(&self) -> impl Iterator<Item = &str> {
        self.panels.keys().map(String::as_str)
    }
}

impl ControlRegistry for StaticRegistry {
    fn global_control(&self, name: &str) -> Option<&ControlDefinition> {
        self.controls.get(name)
    }

    fn panel_config(&self, viz_type: &str) -> Option<&PanelConfig> {
        self.panels.get(viz_type)
    }

    fn common_sections(&self) -> &[ControlPanelSection] {
        &self.common_sections
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the effective base definition of a control.
///
/// # Errors
///
/// Returns [`ResolveError::UnknownControl`] when the name is neither global
/// nor inline for the visualization.
pub fn resolve_definition<R>(
    registry: &R,
    control: &str,
    viz_type: &str,
) -> Result<ControlDefinition, ResolveError>
where
    R: ControlRegistry + ?Sized,
{
    let panel = registry.panel_config(viz_type);
    let base = registry
        .global_control(control)
        .or_else(|| panel.and_then(|panel| panel.inline_control(control)))
        .ok_or_else(|| ResolveError::UnknownControl {
            control: control.to_string(),
            viz_type: viz_type.to_string(),
        })?;
    let definition = base.clone();
    match panel.and_then(|panel| panel.override_for(control)) {
        Some(patch) => {
            trace!(control, viz_type, "applying visualization override");
            Ok(definition.patched(patch))
        }
        None => Ok(definition),
    }
}

/// Returns the sections rendered for a visualization and datasource type:
/// common sections first, then the visualization's own, each kept only when
/// it applies to the datasource type.
pub fn sections_to_render<'a, R>(
    registry: &'a R,
    viz_type: &str,
    datasource_type: DatasourceType,
) -> Vec<&'a ControlPanelSection>
where
    R: ControlRegistry + ?Sized,
{
    let own = registry.panel_config(viz_type).map(|panel| panel.sections.as_slice()).unwrap_or(&[]);
    registry
        .common_sections()
        .iter()
        .chain(own)
        .filter(|section| section.applies_to(datasource_type))
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
