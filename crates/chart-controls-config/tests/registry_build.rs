//! Registry build tests for chart-controls-config.
// crates/chart-controls-config/tests/registry_build.rs
// =============================================================================
// Module: Registry Build Tests
// Description: Resolve controls through a registry built from TOML.
// Purpose: Ensure builtin functions bind and behave end to end.
// =============================================================================

mod common;

use chart_controls_config::FunctionCatalog;
use chart_controls_core::AmbientState;
use chart_controls_core::ColumnSpec;
use chart_controls_core::ControlResolver;
use chart_controls_core::ControlsState;
use chart_controls_core::DataSourceSchema;
use chart_controls_core::DatasourceSelection;
use chart_controls_core::DatasourceType;
use chart_controls_core::MetricSpec;
use chart_controls_core::SelectionMode;
use chart_controls_core::StaticRegistry;
use common::TestResult;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

fn registry() -> Result<StaticRegistry, String> {
    let config = common::sample_config().map_err(|err| err.to_string())?;
    config.build_registry(&FunctionCatalog::builtin()).map_err(|err| err.to_string())
}

fn datasource(extra_column: &str) -> DataSourceSchema {
    let mut ds = ColumnSpec::new("ds").with_type("TIMESTAMP");
    ds.is_dttm = true;
    let mut country = ColumnSpec::new("country").with_type("STRING");
    country.groupby = true;
    let mut extra = ColumnSpec::new(extra_column).with_type("STRING");
    extra.groupby = true;
    let mut count = MetricSpec::new("count");
    count.metric_type = Some("count".to_string());
    count.expression = Some("COUNT(*)".to_string());
    DataSourceSchema::new(DatasourceType::Table)
        .with_column(ds)
        .with_column(country)
        .with_column(extra)
        .with_metric(count)
}

fn resolve(saved: &Map<String, Value>) -> Result<ControlsState, String> {
    let registry = registry()?;
    let ambient = AmbientState::with_datasources(vec![datasource("city"), datasource("region")]);
    ControlResolver::new(&registry)
        .all_controls_state("line", DatasourceType::Table, Some(&ambient), saved)
        .map_err(|err| err.to_string())
}

fn choice_values(states: &ControlsState, name: &str) -> Result<Vec<Value>, String> {
    let state = states.get(name).ok_or_else(|| format!("missing {name}"))?;
    Ok(state.choices.iter().flatten().map(|choice| choice.value().clone()).collect())
}

#[test]
fn mappers_offer_merged_schema_choices() -> TestResult {
    let states = resolve(&Map::new())?;
    let groupby = choice_values(&states, "groupby")?;
    if groupby != [json!("country")] {
        return Err(format!("unexpected groupby choices {groupby:?}"));
    }
    let metrics = choice_values(&states, "metrics")?;
    if metrics != [json!("count")] {
        return Err(format!("unexpected metric choices {metrics:?}"));
    }
    Ok(())
}

#[test]
fn mapped_choices_carry_display_labels() -> TestResult {
    let states = resolve(&Map::new())?;
    let groupby = states.get("groupby").ok_or("missing groupby")?;
    let labels: Vec<&str> = groupby.choices.iter().flatten().map(|choice| choice.label()).collect();
    if labels != ["country"] {
        return Err(format!("unexpected groupby labels {labels:?}"));
    }
    Ok(())
}

#[test]
fn configured_multi_datasource_support_enables_multiple_mode() -> TestResult {
    let registry = registry()?;
    let mut selection = DatasourceSelection::new();
    selection.set_viz_type_from(&registry, "line");
    selection.set_mode(SelectionMode::Multiple).map_err(|err| err.to_string())?;
    selection.select(["1__table", "2__table"]).map_err(|err| err.to_string())?;
    if selection.ids() != [1, 2] {
        return Err(format!("unexpected selection {:?}", selection.ids()));
    }
    selection.set_viz_type_from(&registry, "table");
    if selection.mode() != SelectionMode::Single || !selection.keys().is_empty() {
        return Err("visualization without support kept multiple mode".to_string());
    }
    Ok(())
}

#[test]
fn computed_default_uses_mapped_time_columns() -> TestResult {
    let states = resolve(&Map::new())?;
    let time = states.get("granularity_sqla").ok_or("missing granularity_sqla")?;
    if time.value != json!("ds") {
        return Err(format!("unexpected time column {}", time.value));
    }
    Ok(())
}

#[test]
fn override_and_validators_apply_from_config() -> TestResult {
    let mut saved = Map::new();
    saved.insert("groupby".to_string(), json!(["country", "city"]));
    let states = resolve(&saved)?;
    let row_limit = states.get("row_limit").ok_or("missing row_limit")?;
    if row_limit.value != json!(50) || row_limit.label.as_deref() != Some("Series limit") {
        return Err(format!("override not applied: {:?}", row_limit.label));
    }
    let groupby = states.get("groupby").ok_or("missing groupby")?;
    if groupby.value != json!(["country"]) {
        return Err(format!("stale groupby value kept: {}", groupby.value));
    }
    let metrics = states.get("metrics").ok_or("missing metrics")?;
    if metrics.validation_errors != ["cannot be empty"] {
        return Err(format!("unexpected metric errors {:?}", metrics.validation_errors));
    }
    let line_width = states.get("line_width").ok_or("missing line_width")?;
    if line_width.value != json!(2) {
        return Err(format!("inline control not seeded: {}", line_width.value));
    }
    Ok(())
}
