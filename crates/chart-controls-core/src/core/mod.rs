// crates/chart-controls-core/src/core/mod.rs
// ============================================================================
// Module: Chart Controls Core Types
// Description: Canonical control, layout, datasource, and state structures.
// Purpose: Provide stable types shared by registries, resolvers, and the UI.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types describe control definitions (immutable templates), panel
//! layouts, datasource schemas, and the derived control states handed to the
//! rendering layer. Definitions carry function values through [`NamedFn`] so
//! they stay cloneable and debuggable.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod datasource;
pub mod definition;
pub mod functions;
pub mod layout;
pub mod state;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use datasource::AmbientState;
pub use datasource::ColumnSpec;
pub use datasource::DataSourceSchema;
pub use datasource::DatasourceType;
pub use datasource::MetricSpec;
pub use datasource::UnknownDatasourceType;
pub use definition::Choice;
pub use definition::ControlDefault;
pub use definition::ControlDefinition;
pub use definition::ControlKind;
pub use definition::ControlPatch;
pub use functions::DefaultFn;
pub use functions::NamedFn;
pub use functions::PropsMapper;
pub use functions::ValidatorFault;
pub use functions::ValidatorFn;
pub use functions::ValidatorOutcome;
pub use layout::ControlPanelSection;
pub use layout::ControlSlot;
pub use layout::InlineControl;
pub use layout::PanelConfig;
pub use state::ControlState;
pub use state::ControlsState;
pub use state::FormData;
pub use value::is_truthy;
