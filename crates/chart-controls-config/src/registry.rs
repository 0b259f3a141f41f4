// crates/chart-controls-config/src/registry.rs
// ============================================================================
// Module: Registry Builder
// Description: Converts validated config into an in-memory control registry.
// Purpose: Bind function names and materialize core definitions and layouts.
// Dependencies: chart-controls-core, tracing
// ============================================================================

//! ## Overview
//! Building runs after structural validation. Every function name is looked
//! up in the supplied [`FunctionCatalog`]; an unknown name fails the whole
//! build so a registry never holds dangling references.

// ============================================================================
// SECTION: Imports
// ============================================================================

use chart_controls_core::ControlDefault;
use chart_controls_core::ControlDefinition;
use chart_controls_core::ControlKind;
use chart_controls_core::ControlPanelSection;
use chart_controls_core::ControlPatch;
use chart_controls_core::ControlSlot;
use chart_controls_core::PanelConfig;
use chart_controls_core::PropsMapper;
use chart_controls_core::StaticRegistry;
use chart_controls_core::ValidatorFn;
use tracing::debug;

use crate::config::ChartControlsConfig;
use crate::config::ConfigError;
use crate::config::ControlSpec;
use crate::config::DefaultSpec;
use crate::config::OverrideSpec;
use crate::config::SectionSpec;
use crate::config::SlotSpec;
use crate::functions::FunctionCatalog;

// ============================================================================
// SECTION: Registry Builder
// ============================================================================

impl ChartControlsConfig {
    /// Builds the in-memory registry, binding function names from `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a function name is unknown.
    pub fn build_registry(&self, catalog: &FunctionCatalog) -> Result<StaticRegistry, ConfigError> {
        let mut registry = StaticRegistry::new();
        for (name, spec) in &self.controls {
            let definition = control_definition(spec, catalog, name)?;
            registry = registry.with_control(name.clone(), definition);
        }
        for section in &self.common_sections {
            registry = registry.with_common_section(panel_section(section, catalog)?);
        }
        for (viz_type, viz) in &self.visualizations {
            let mut panel = PanelConfig {
                supports_multi_datasource: viz.supports_multi_datasource,
                ..PanelConfig::default()
            };
            for section in &viz.sections {
                panel = panel.with_section(panel_section(section, catalog)?);
            }
            for (name, spec) in &viz.overrides {
                panel = panel.with_override(name.clone(), control_patch(spec, catalog, name)?);
            }
            registry = registry.with_panel(viz_type.clone(), panel);
        }
        debug!(
            controls = self.controls.len(),
            visualizations = self.visualizations.len(),
            "built control registry"
        );
        Ok(registry)
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Converts a control spec into a definition.
fn control_definition(
    spec: &ControlSpec,
    catalog: &FunctionCatalog,
    control: &str,
) -> Result<ControlDefinition, ConfigError> {
    let mut definition = ControlDefinition::new(ControlKind::from(spec.kind.as_str()))
        .with_multi(spec.multi)
        .with_free_form(spec.free_form);
    definition.label.clone_from(&spec.label);
    definition.description.clone_from(&spec.description);
    definition.choices.clone_from(&spec.choices);
    definition.props.clone_from(&spec.props);
    definition.default = spec
        .default
        .as_ref()
        .map(|default| control_default(default, catalog, control))
        .transpose()?;
    definition.validators = validators(&spec.validators, catalog, control)?;
    definition.map_state_to_props =
        spec.map_state_to_props.as_deref().map(|name| mapper(name, catalog, control)).transpose()?;
    Ok(definition)
}

/// Converts an override spec into a patch.
fn control_patch(
    spec: &OverrideSpec,
    catalog: &FunctionCatalog,
    control: &str,
) -> Result<ControlPatch, ConfigError> {
    Ok(ControlPatch {
        kind: spec.kind.as_deref().map(ControlKind::from),
        label: spec.label.clone(),
        description: spec.description.clone(),
        default: spec
            .default
            .as_ref()
            .map(|default| control_default(default, catalog, control))
            .transpose()?,
        multi: spec.multi,
        free_form: spec.free_form,
        choices: spec.choices.clone(),
        validators: spec
            .validators
            .as_ref()
            .map(|names| validators(names, catalog, control))
            .transpose()?,
        map_state_to_props: spec
            .map_state_to_props
            .as_deref()
            .map(|name| mapper(name, catalog, control))
            .transpose()?,
        props: spec.props.clone(),
    })
}

/// Converts a section spec into a panel section.
fn panel_section(
    spec: &SectionSpec,
    catalog: &FunctionCatalog,
) -> Result<ControlPanelSection, ConfigError> {
    let mut rows = Vec::with_capacity(spec.rows.len());
    for row in &spec.rows {
        let slots =
            row.iter().map(|slot| control_slot(slot, catalog)).collect::<Result<Vec<_>, _>>()?;
        rows.push(slots);
    }
    Ok(ControlPanelSection {
        key: spec.key.clone(),
        label: spec.label.clone(),
        expanded: spec.expanded,
        datasource_types: spec.datasource_types.clone(),
        rows,
    })
}

/// Converts a slot spec; the empty name is a placeholder slot.
fn control_slot(spec: &SlotSpec, catalog: &FunctionCatalog) -> Result<ControlSlot, ConfigError> {
    match spec {
        SlotSpec::Name(name) if name.is_empty() => Ok(ControlSlot::Empty),
        SlotSpec::Name(name) => Ok(ControlSlot::named(name.clone())),
        SlotSpec::Inline(inline) => {
            let definition = control_definition(&inline.config, catalog, &inline.name)?;
            Ok(ControlSlot::inline(inline.name.clone(), definition))
        }
    }
}

/// Binds a default spec.
fn control_default(
    spec: &DefaultSpec,
    catalog: &FunctionCatalog,
    control: &str,
) -> Result<ControlDefault, ConfigError> {
    match spec {
        DefaultSpec::Static(value) => Ok(ControlDefault::Static(value.clone())),
        DefaultSpec::Computed(default) => catalog
            .default_fn(&default.computed)
            .cloned()
            .map(ControlDefault::Computed)
            .ok_or_else(|| unknown_function("default", &default.computed, control)),
    }
}

/// Binds validator names in order.
fn validators(
    names: &[String],
    catalog: &FunctionCatalog,
    control: &str,
) -> Result<Vec<ValidatorFn>, ConfigError> {
    names
        .iter()
        .map(|name| {
            catalog
                .validator(name)
                .cloned()
                .ok_or_else(|| unknown_function("validator", name, control))
        })
        .collect()
}

/// Binds a state mapper name.
fn mapper(
    name: &str,
    catalog: &FunctionCatalog,
    control: &str,
) -> Result<PropsMapper, ConfigError> {
    catalog.mapper(name).cloned().ok_or_else(|| unknown_function("state mapper", name, control))
}

/// Builds the error for an unregistered function name.
fn unknown_function(kind: &str, name: &str, control: &str) -> ConfigError {
    ConfigError::Invalid(format!("control `{control}` references unknown {kind} `{name}`"))
}
