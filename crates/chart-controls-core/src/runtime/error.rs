// crates/chart-controls-core/src/runtime/error.rs
// ============================================================================
// Module: Resolution Errors
// Description: Error types surfaced by control resolution.
// Purpose: Distinguish configuration defects from data-level outcomes.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Only two failures abort resolution: a control that resolves nowhere and a
//! validator that faults. Stale values and validation messages are data and
//! never surface here.

use thiserror::Error;

/// Errors raised while resolving control state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Control is neither global nor inline for the visualization.
    #[error("unknown control `{control}` for visualization `{viz_type}`")]
    UnknownControl {
        /// Requested control name.
        control: String,
        /// Active visualization type.
        viz_type: String,
    },
    /// Validator raised a defect instead of returning a message.
    #[error("validator `{validator}` faulted on control `{control}`: {message}")]
    ValidatorFault {
        /// Control being validated.
        control: String,
        /// Registered validator name.
        validator: String,
        /// Fault description.
        message: String,
    },
}
