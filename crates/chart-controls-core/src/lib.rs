// crates/chart-controls-core/src/lib.rs
// ============================================================================
// Module: Chart Controls Core Library
// Description: Public API surface for the chart control resolution engine.
// Purpose: Expose control types, registry interfaces, and runtime resolvers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Chart Controls core resolves the effective state of every control a
//! visualization renders. It looks up control definitions, applies
//! per-visualization overrides, evaluates dynamic properties, coerces saved
//! values against declared shapes, and runs validators. It also intersects the
//! column and metric schemas of multiple attached datasources.
//!
//! All operations are pure over read-only registries supplied through the
//! [`ControlRegistry`] interface. The core never loads configuration itself.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::ControlRegistry;
pub use runtime::ControlResolver;
pub use runtime::DatasourceKey;
pub use runtime::DatasourceSelection;
pub use runtime::DatasourceWidgetState;
pub use runtime::DatasourceWidgets;
pub use runtime::Pruned;
pub use runtime::ResolveError;
pub use runtime::SelectionError;
pub use runtime::SelectionMode;
pub use runtime::StaticRegistry;
pub use runtime::WidgetFlag;
pub use runtime::WidgetMode;
pub use runtime::WidgetStateError;
pub use runtime::apply_dynamic_props;
pub use runtime::coerce_value;
pub use runtime::merge_columns;
pub use runtime::merge_fields;
pub use runtime::merge_metrics;
pub use runtime::prune_stale_choices;
pub use runtime::resolve_definition;
pub use runtime::resolve_value;
pub use runtime::sections_to_render;
pub use runtime::to_form_data;
pub use runtime::validate;
