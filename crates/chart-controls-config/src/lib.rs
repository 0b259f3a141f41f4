// crates/chart-controls-config/src/lib.rs
// ============================================================================
// Module: Chart Controls Config Library
// Description: Registry configuration model, validation, and binding.
// Purpose: Single source of truth for chart-controls.toml semantics.
// Dependencies: chart-controls-core, serde, toml
// ============================================================================

//! ## Overview
//! `chart-controls-config` loads the static control registries from TOML. It
//! validates them fail-closed and binds named functions from a
//! [`FunctionCatalog`] to produce a [`chart_controls_core::StaticRegistry`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod functions;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use functions::FunctionCatalog;
