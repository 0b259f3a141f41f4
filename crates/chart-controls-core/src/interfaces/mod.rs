// crates/chart-controls-core/src/interfaces/mod.rs
// ============================================================================
// Module: Chart Controls Interfaces
// Description: Registry lookup surface consumed by the resolver.
// Purpose: Decouple resolution from where control definitions come from.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The resolver reads control definitions and panel layouts through
//! [`ControlRegistry`]. Implementations are read-only after construction and
//! must be safe to share across threads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ControlDefinition;
use crate::core::ControlPanelSection;
use crate::core::PanelConfig;

// ============================================================================
// SECTION: Control Registry
// ============================================================================

/// Read-only source of control definitions and panel layouts.
///
/// # Invariants
/// - Lookups for the same key return the same definition for the registry's
///   lifetime.
pub trait ControlRegistry: Send + Sync {
    /// Returns the global definition registered under `name`.
    fn global_control(&self, name: &str) -> Option<&ControlDefinition>;

    /// Returns the panel configuration of a visualization type.
    fn panel_config(&self, viz_type: &str) -> Option<&PanelConfig>;

    /// Returns the sections rendered ahead of every visualization's own.
    fn common_sections(&self) -> &[ControlPanelSection];

    /// Returns true when the visualization accepts multiple datasources.
    fn supports_multi_datasource(&self, viz_type: &str) -> bool {
        self.panel_config(viz_type).is_some_and(|panel| panel.supports_multi_datasource)
    }
}
