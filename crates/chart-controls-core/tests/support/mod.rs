// crates/chart-controls-core/tests/support/mod.rs
// ============================================================================
// Module: Core Test Support
// Description: Shared fixtures for chart-controls-core integration tests.
// Purpose: Build a representative registry and datasource schemas.
// ============================================================================

//! Shared fixtures for chart-controls-core integration tests.

#![allow(dead_code, reason = "Each test binary uses a different subset of fixtures.")]

use chart_controls_core::Choice;
use chart_controls_core::ColumnSpec;
use chart_controls_core::ControlDefinition;
use chart_controls_core::ControlKind;
use chart_controls_core::ControlPanelSection;
use chart_controls_core::ControlPatch;
use chart_controls_core::ControlSlot;
use chart_controls_core::DataSourceSchema;
use chart_controls_core::DatasourceType;
use chart_controls_core::MetricSpec;
use chart_controls_core::PanelConfig;
use chart_controls_core::StaticRegistry;
use chart_controls_core::ValidatorFn;
use chart_controls_core::is_truthy;
use serde_json::Value;

pub type TestResult = Result<(), String>;

/// Fails with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into()) }
}

/// Validator rejecting absent values.
pub fn non_empty() -> ValidatorFn {
    ValidatorFn::new("non_empty", |value: &Value| {
        Ok((!is_truthy(value)).then(|| "cannot be empty".to_string()))
    })
}

/// Validator rejecting non-integer values.
pub fn integer() -> ValidatorFn {
    ValidatorFn::new("integer", |value: &Value| {
        let ok = value.is_i64()
            || value.is_u64()
            || value.as_str().is_some_and(|text| text.parse::<i64>().is_ok());
        Ok((!ok).then(|| "is expected to be an integer".to_string()))
    })
}

/// Selectable string choices where the label equals the value.
pub fn choices(values: &[&str]) -> Vec<Choice> {
    values.iter().map(|value| Choice::new(*value, *value)).collect()
}

/// Registry with common sections, a line chart, and table/druid-only sections.
pub fn sample_registry() -> StaticRegistry {
    let line = PanelConfig::default()
        .with_section(
            ControlPanelSection::new("Query")
                .with_row(vec![ControlSlot::named("metrics"), ControlSlot::named("groupby")])
                .with_row(vec![ControlSlot::named("row_limit"), ControlSlot::Empty]),
        )
        .with_section(
            ControlPanelSection::new("Time")
                .restricted_to(vec![DatasourceType::Table])
                .with_row(vec![ControlSlot::named("time_grain_sqla")]),
        )
        .with_section(
            ControlPanelSection::new("Druid Time")
                .restricted_to(vec![DatasourceType::Druid])
                .with_row(vec![ControlSlot::named("granularity")]),
        )
        .with_section(ControlPanelSection::new("Chart Options").with_row(vec![
            ControlSlot::inline(
                "line_width",
                ControlDefinition::new(ControlKind::Text).with_default(2),
            ),
        ]))
        .with_override("row_limit", ControlPatch {
            label: Some("Series limit".to_string()),
            default: Some(chart_controls_core::ControlDefault::Static(Value::from(50))),
            ..ControlPatch::default()
        });

    StaticRegistry::new()
        .with_common_section(
            ControlPanelSection::new("Datasource & Chart Type")
                .with_row(vec![ControlSlot::named("viz_type")]),
        )
        .with_control(
            "viz_type",
            ControlDefinition::new(ControlKind::VizType)
                .with_label("Visualization Type")
                .with_default("table"),
        )
        .with_control(
            "metrics",
            ControlDefinition::new(ControlKind::Metrics)
                .with_label("Metrics")
                .with_multi(true)
                .with_validator(non_empty()),
        )
        .with_control(
            "groupby",
            ControlDefinition::new(ControlKind::Select)
                .with_label("Group by")
                .with_multi(true)
                .with_default(Value::Array(Vec::new()))
                .with_choices(choices(&["country", "region", "city"])),
        )
        .with_control(
            "row_limit",
            ControlDefinition::new(ControlKind::Select)
                .with_label("Row limit")
                .with_free_form(true)
                .with_default(10_000)
                .with_validator(integer())
                .with_choices(choices(&["10", "100", "1000"])),
        )
        .with_control(
            "time_grain_sqla",
            ControlDefinition::new(ControlKind::Select)
                .with_default("P1D")
                .with_choices(choices(&["PT1H", "P1D", "P1W"])),
        )
        .with_control(
            "granularity",
            ControlDefinition::new(ControlKind::Select)
                .with_default("one day")
                .with_choices(choices(&["one hour", "one day"])),
        )
        .with_panel("line", line)
}

/// Table datasource with the given column names and `sum` metrics.
pub fn table_source(columns: &[&str], metrics: &[&str]) -> DataSourceSchema {
    let schema = columns.iter().fold(DataSourceSchema::new(DatasourceType::Table), |schema, name| {
        schema.with_column(ColumnSpec::new(*name).with_type("STRING"))
    });
    metrics.iter().fold(schema, |schema, name| {
        let mut metric = MetricSpec::new(*name);
        metric.metric_type = Some("sum".to_string());
        metric.expression = Some(format!("SUM({name})"));
        schema.with_metric(metric)
    })
}
