// crates/chart-controls-config/src/functions.rs
// ============================================================================
// Module: Function Catalog
// Description: Named validators, computed defaults, and state mappers.
// Purpose: Bind function names written in config to function values.
// Dependencies: chart-controls-core, serde_json
// ============================================================================

//! ## Overview
//! Configuration refers to behavior by name. The catalog maps those names to
//! [`ValidatorFn`], [`DefaultFn`], and [`PropsMapper`] values. The builtin
//! catalog covers the common validators, first-choice defaults, and mappers
//! that offer the merged columns or metrics of the attached datasources.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use chart_controls_core::AmbientState;
use chart_controls_core::Choice;
use chart_controls_core::ColumnSpec;
use chart_controls_core::ControlDefinition;
use chart_controls_core::ControlPatch;
use chart_controls_core::DefaultFn;
use chart_controls_core::PropsMapper;
use chart_controls_core::ValidatorFn;
use chart_controls_core::is_truthy;
use chart_controls_core::merge_columns;
use chart_controls_core::merge_metrics;
use serde_json::Value;

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Registry of named function values.
#[derive(Debug, Clone, Default)]
pub struct FunctionCatalog {
    /// Validators by name.
    validators: BTreeMap<String, ValidatorFn>,
    /// Computed defaults by name.
    defaults: BTreeMap<String, DefaultFn>,
    /// State mappers by name.
    mappers: BTreeMap<String, PropsMapper>,
}

impl FunctionCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the builtin functions.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new()
            .with_validator(ValidatorFn::new("non_empty", non_empty))
            .with_validator(ValidatorFn::new("integer", integer))
            .with_validator(ValidatorFn::new("numeric", numeric))
            .with_default(DefaultFn::new("first_choice", first_choice))
            .with_default(DefaultFn::new("first_choice_list", |definition: &ControlDefinition| {
                match first_choice(definition) {
                    Value::Null => Value::Array(Vec::new()),
                    value => Value::Array(vec![value]),
                }
            }))
            .with_mapper(column_mapper("column_choices", |_| true))
            .with_mapper(column_mapper("groupby_choices", |column| column.groupby))
            .with_mapper(column_mapper("filterable_choices", |column| column.filterable))
            .with_mapper(column_mapper("time_column_choices", |column| column.is_dttm))
            .with_mapper(PropsMapper::new("metric_choices", metric_choices))
    }

    /// Registers a validator under its own name.
    #[must_use]
    pub fn with_validator(mut self, validator: ValidatorFn) -> Self {
        self.validators.insert(validator.name().to_string(), validator);
        self
    }

    /// Registers a computed default under its own name.
    #[must_use]
    pub fn with_default(mut self, default: DefaultFn) -> Self {
        self.defaults.insert(default.name().to_string(), default);
        self
    }

    /// Registers a state mapper under its own name.
    #[must_use]
    pub fn with_mapper(mut self, mapper: PropsMapper) -> Self {
        self.mappers.insert(mapper.name().to_string(), mapper);
        self
    }

    /// Returns the validator registered under `name`.
    #[must_use]
    pub fn validator(&self, name: &str) -> Option<&ValidatorFn> {
        self.validators.get(name)
    }

    /// Returns the computed default registered under `name`.
    #[must_use]
    pub fn default_fn(&self, name: &str) -> Option<&DefaultFn> {
        self.defaults.get(name)
    }

    /// Returns the state mapper registered under `name`.
    #[must_use]
    pub fn mapper(&self, name: &str) -> Option<&PropsMapper> {
        self.mappers.get(name)
    }
}

// ============================================================================
// SECTION: Builtin Validators
// ============================================================================

/// Rejects absent values and empty lists.
#[allow(clippy::unnecessary_wraps, reason = "Validator signature is fixed.")]
fn non_empty(value: &Value) -> chart_controls_core::ValidatorOutcome {
    let empty = !is_truthy(value) || value.as_array().is_some_and(Vec::is_empty);
    Ok(empty.then(|| "cannot be empty".to_string()))
}

/// Returns the numeric reading of a number or numeric string.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Accepts absent values and whole numbers.
#[allow(clippy::unnecessary_wraps, reason = "Validator signature is fixed.")]
fn integer(value: &Value) -> chart_controls_core::ValidatorOutcome {
    if !is_truthy(value) {
        return Ok(None);
    }
    let whole = as_number(value).is_some_and(|n| n.fract() == 0.0);
    Ok((!whole).then(|| "is expected to be an integer".to_string()))
}

/// Accepts absent values and numbers.
#[allow(clippy::unnecessary_wraps, reason = "Validator signature is fixed.")]
fn numeric(value: &Value) -> chart_controls_core::ValidatorOutcome {
    if !is_truthy(value) || value.is_boolean() {
        return Ok(None);
    }
    Ok(as_number(value).is_none().then(|| "is expected to be a number".to_string()))
}

// ============================================================================
// SECTION: Builtin Defaults and Mappers
// ============================================================================

/// Value of the first declared choice, or `null`.
fn first_choice(definition: &ControlDefinition) -> Value {
    definition
        .choices
        .as_ref()
        .and_then(|choices| choices.first())
        .map_or(Value::Null, |choice| choice.value().clone())
}

/// Offers the metrics shared by every attached datasource.
fn metric_choices(state: &AmbientState, _: &ControlDefinition) -> ControlPatch {
    let Some(datasource_type) = state.effective_datasource_type() else {
        return ControlPatch::choices(Vec::new());
    };
    let choices = merge_metrics(&state.datasources, datasource_type)
        .into_iter()
        .map(|metric| Choice::new(metric.metric_name.as_str(), metric.display_name()))
        .collect();
    ControlPatch::choices(choices)
}

/// Mapper offering the merged columns that pass `keep` as choices.
fn column_mapper(name: &'static str, keep: fn(&ColumnSpec) -> bool) -> PropsMapper {
    PropsMapper::new(name, move |state: &AmbientState, _: &ControlDefinition| {
        let choices = merge_columns(&state.datasources, keep)
            .into_iter()
            .map(|column| Choice::new(column.column.as_str(), column.display_name()))
            .collect();
        ControlPatch::choices(choices)
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
