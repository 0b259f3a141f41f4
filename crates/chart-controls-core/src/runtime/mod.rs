// crates/chart-controls-core/src/runtime/mod.rs
// ============================================================================
// Module: Chart Controls Runtime
// Description: Resolution pipeline, schema merge, and selection state.
// Purpose: Group the operations that run over the core data model.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules, leaves first: registry lookup, dynamic evaluation,
//! coercion and validation, then the resolver that orchestrates them. The
//! schema merge engine is independent and is typically called from state
//! mappers. Selection and widget state model the datasource pickers.

pub mod coercion;
pub mod dynamic;
pub mod error;
pub mod merge;
pub mod registry;
pub mod resolver;
pub mod selection;
pub mod widgets;

pub use coercion::Pruned;
pub use coercion::coerce_value;
pub use coercion::prune_stale_choices;
pub use coercion::resolve_value;
pub use coercion::validate;
pub use dynamic::apply_dynamic_props;
pub use error::ResolveError;
pub use merge::column_equals;
pub use merge::merge_columns;
pub use merge::merge_fields;
pub use merge::merge_metrics;
pub use merge::metric_equals;
pub use registry::StaticRegistry;
pub use registry::resolve_definition;
pub use registry::sections_to_render;
pub use resolver::ControlResolver;
pub use resolver::to_form_data;
pub use selection::DatasourceKey;
pub use selection::DatasourceSelection;
pub use selection::SelectionError;
pub use selection::SelectionMode;
pub use widgets::DatasourceWidgetState;
pub use widgets::DatasourceWidgets;
pub use widgets::WidgetFlag;
pub use widgets::WidgetMode;
pub use widgets::WidgetStateError;
