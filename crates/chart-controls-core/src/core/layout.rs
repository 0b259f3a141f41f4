// crates/chart-controls-core/src/core/layout.rs
// ============================================================================
// Module: Control Panel Layouts
// Description: Per-visualization panel sections, rows, slots, and overrides.
// Purpose: Describe which controls a visualization renders and how it tweaks them.
// Dependencies: crate::core::{datasource, definition}
// ============================================================================

//! ## Overview
//! A [`PanelConfig`] lists ordered sections of ordered rows of slots. A slot
//! names a global control, embeds an inline control, or is empty. Sections
//! may be restricted to datasource types so that, for example, SQL-only time
//! controls are not rendered for a druid source.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::datasource::DatasourceType;
use crate::core::definition::ControlDefinition;
use crate::core::definition::ControlPatch;

// ============================================================================
// SECTION: Slots
// ============================================================================

/// Control embedded directly in a panel layout.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineControl {
    /// Control name.
    pub name: String,
    /// Embedded definition.
    pub config: ControlDefinition,
}

/// One position within a panel row.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlSlot {
    /// Reference to a control by name.
    Named(String),
    /// Control carrying its own definition.
    Inline(InlineControl),
    /// Placeholder that renders nothing.
    Empty,
}

impl ControlSlot {
    /// Creates a named slot.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Creates an inline slot.
    #[must_use]
    pub fn inline(name: impl Into<String>, config: ControlDefinition) -> Self {
        Self::Inline(InlineControl {
            name: name.into(),
            config,
        })
    }
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Ordered group of control rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlPanelSection {
    /// Optional stable section key.
    pub key: Option<String>,
    /// Optional section label.
    pub label: Option<String>,
    /// Section starts expanded.
    pub expanded: bool,
    /// Datasource types the section renders for; empty means all.
    pub datasource_types: Vec<DatasourceType>,
    /// Ordered rows of slots.
    pub rows: Vec<Vec<ControlSlot>>,
}

impl ControlPanelSection {
    /// Creates an empty section with a label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Appends a row of slots.
    #[must_use]
    pub fn with_row(mut self, row: Vec<ControlSlot>) -> Self {
        self.rows.push(row);
        self
    }

    /// Restricts the section to the given datasource types.
    #[must_use]
    pub fn restricted_to(mut self, types: Vec<DatasourceType>) -> Self {
        self.datasource_types = types;
        self
    }

    /// Returns true when the section renders for the datasource type.
    #[must_use]
    pub fn applies_to(&self, datasource_type: DatasourceType) -> bool {
        self.datasource_types.is_empty() || self.datasource_types.contains(&datasource_type)
    }

    /// Iterates every slot in row order.
    pub fn slots(&self) -> impl Iterator<Item = &ControlSlot> {
        self.rows.iter().flatten()
    }
}

// ============================================================================
// SECTION: Panel Config
// ============================================================================

/// Layout and overrides of one visualization type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelConfig {
    /// Ordered sections.
    pub sections: Vec<ControlPanelSection>,
    /// Partial overrides keyed by control name.
    pub overrides: BTreeMap<String, ControlPatch>,
    /// Visualization accepts more than one datasource.
    pub supports_multi_datasource: bool,
}

impl PanelConfig {
    /// Appends a section.
    #[must_use]
    pub fn with_section(mut self, section: ControlPanelSection) -> Self {
        self.sections.push(section);
        self
    }

    /// Registers an override for a control.
    #[must_use]
    pub fn with_override(mut self, name: impl Into<String>, patch: ControlPatch) -> Self {
        self.overrides.insert(name.into(), patch);
        self
    }

    /// Finds the first inline control with the given name.
    #[must_use]
    pub fn inline_control(&self, name: &str) -> Option<&ControlDefinition> {
        self.sections.iter().flat_map(ControlPanelSection::slots).find_map(|slot| match slot {
            ControlSlot::Inline(inline) if inline.name == name => Some(&inline.config),
            _ => None,
        })
    }

    /// Returns the override registered for a control.
    #[must_use]
    pub fn override_for(&self, name: &str) -> Option<&ControlPatch> {
        self.overrides.get(name)
    }
}
