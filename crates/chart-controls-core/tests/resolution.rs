// crates/chart-controls-core/tests/resolution.rs
// ============================================================================
// Module: Control Resolution Tests
// Description: Lookup precedence, coercion, pruning, validation, and batches.
// Purpose: Ensure resolved control state is consistent with its definition.
// ============================================================================

//! Control state resolution tests for chart-controls-core.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]

mod support;

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use chart_controls_core::AmbientState;
use chart_controls_core::Choice;
use chart_controls_core::ControlDefinition;
use chart_controls_core::ControlKind;
use chart_controls_core::ControlPanelSection;
use chart_controls_core::ControlPatch;
use chart_controls_core::ControlResolver;
use chart_controls_core::ControlSlot;
use chart_controls_core::DatasourceType;
use chart_controls_core::DefaultFn;
use chart_controls_core::PanelConfig;
use chart_controls_core::PropsMapper;
use chart_controls_core::ResolveError;
use chart_controls_core::StaticRegistry;
use chart_controls_core::ValidatorFault;
use chart_controls_core::ValidatorFn;
use chart_controls_core::merge_columns;
use chart_controls_core::to_form_data;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use support::TestResult;
use support::ensure;
use support::sample_registry;
use support::table_source;

fn state_value(
    registry: &StaticRegistry,
    control: &str,
    raw: Option<&Value>,
) -> Result<Value, String> {
    ControlResolver::new(registry)
        .control_state(control, "line", None, raw)
        .map(|state| state.value)
        .map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Lookup Precedence
// ============================================================================

#[test]
fn override_wins_over_global_definition() -> TestResult {
    let registry = sample_registry();
    let state = ControlResolver::new(&registry)
        .control_state("row_limit", "line", None, None)
        .map_err(|err| err.to_string())?;
    ensure(state.label.as_deref() == Some("Series limit"), "override label applied")?;
    ensure(state.default == json!(50), "override default applied")?;
    ensure(state.value == json!(50), "absent value falls back to override default")?;
    ensure(state.free_form, "non-overridden fields inherit from global")?;
    ensure(state.is_valid(), format!("unexpected errors {:?}", state.validation_errors))
}

#[test]
fn global_wins_over_inline_of_same_name() -> TestResult {
    let panel = PanelConfig::default().with_section(ControlPanelSection::new("Query").with_row(vec![
        ControlSlot::inline("limit", ControlDefinition::new(ControlKind::Text).with_default(2)),
    ]));
    let registry = StaticRegistry::new()
        .with_control("limit", ControlDefinition::new(ControlKind::Text).with_default(1))
        .with_panel("bar", panel);
    let state = ControlResolver::new(&registry)
        .control_state("limit", "bar", None, None)
        .map_err(|err| err.to_string())?;
    ensure(state.value == json!(1), format!("expected global default, got {}", state.value))
}

#[test]
fn inline_control_resolves_with_override() -> TestResult {
    let panel = PanelConfig::default()
        .with_section(ControlPanelSection::new("Options").with_row(vec![ControlSlot::inline(
            "bins",
            ControlDefinition::new(ControlKind::Text).with_label("Bins").with_default(5),
        )]))
        .with_override("bins", ControlPatch {
            label: Some("Number of bins".to_string()),
            ..ControlPatch::default()
        });
    let registry = StaticRegistry::new().with_panel("histogram", panel);
    let state = ControlResolver::new(&registry)
        .control_state("bins", "histogram", None, None)
        .map_err(|err| err.to_string())?;
    ensure(state.label.as_deref() == Some("Number of bins"), "override label applied")?;
    ensure(state.value == json!(5), "inline default kept")
}

#[test]
fn unknown_control_is_an_error() -> TestResult {
    let registry = sample_registry();
    let result = ControlResolver::new(&registry).control_state("nope", "line", None, None);
    ensure(
        result
            == Err(ResolveError::UnknownControl {
                control: "nope".to_string(),
                viz_type: "line".to_string(),
            }),
        format!("unexpected result {result:?}"),
    )
}

// ============================================================================
// SECTION: Coercion
// ============================================================================

#[test]
fn multi_control_wraps_truthy_scalar() -> TestResult {
    let registry = sample_registry();
    let value = state_value(&registry, "groupby", Some(&json!("country")))?;
    ensure(value == json!(["country"]), format!("expected wrapped value, got {value}"))
}

#[test]
fn multi_control_keeps_falsy_scalar() -> TestResult {
    let registry = sample_registry();
    let value = state_value(&registry, "groupby", Some(&json!("")))?;
    ensure(value == json!(""), format!("expected unwrapped empty string, got {value}"))
}

#[test]
fn explicit_null_is_not_replaced_by_default() -> TestResult {
    let registry = sample_registry();
    let absent = state_value(&registry, "groupby", None)?;
    let null = state_value(&registry, "groupby", Some(&Value::Null))?;
    ensure(absent == json!([]), format!("absent value should use default, got {absent}"))?;
    ensure(null.is_null(), format!("explicit null should be kept, got {null}"))
}

#[test]
fn single_select_drops_stale_value() -> TestResult {
    let registry = sample_registry();
    let stale = state_value(&registry, "time_grain_sqla", Some(&json!("P1M")))?;
    let valid = state_value(&registry, "time_grain_sqla", Some(&json!("PT1H")))?;
    ensure(stale.is_null(), format!("stale single value should become null, got {stale}"))?;
    ensure(valid == json!("PT1H"), format!("valid value kept, got {valid}"))
}

#[test]
fn multi_select_filters_stale_values_in_order() -> TestResult {
    let registry = sample_registry();
    let value = state_value(&registry, "groupby", Some(&json!(["city", "state", "country"])))?;
    ensure(value == json!(["city", "country"]), format!("unexpected filtered value {value}"))
}

#[test]
fn free_form_select_keeps_values_outside_choices() -> TestResult {
    let registry = sample_registry();
    let state = ControlResolver::new(&registry)
        .control_state("row_limit", "line", None, Some(&json!("12345")))
        .map_err(|err| err.to_string())?;
    ensure(state.value == json!("12345"), "free-form value kept")?;
    ensure(state.is_valid(), "numeric string passes integer validator")
}

#[test]
fn non_select_kinds_are_never_pruned() -> TestResult {
    let registry = StaticRegistry::new().with_control(
        "color",
        ControlDefinition::new(ControlKind::ColorPicker)
            .with_choices(vec![Choice::new("red", "Red")]),
    );
    let state = ControlResolver::new(&registry)
        .control_state("color", "any", None, Some(&json!("blue")))
        .map_err(|err| err.to_string())?;
    ensure(state.value == json!("blue"), format!("unexpected value {}", state.value))
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn validator_messages_follow_declaration_order() -> TestResult {
    let first = ValidatorFn::new("first", |_: &Value| Ok(Some("first failed".to_string())));
    let passing = ValidatorFn::new("passing", |_: &Value| Ok(None));
    let second = ValidatorFn::new("second", |_: &Value| Ok(Some("second failed".to_string())));
    let registry = StaticRegistry::new().with_control(
        "name",
        ControlDefinition::new(ControlKind::Text)
            .with_validator(first)
            .with_validator(passing)
            .with_validator(second),
    );
    let state = ControlResolver::new(&registry)
        .control_state("name", "any", None, Some(&json!("x")))
        .map_err(|err| err.to_string())?;
    ensure(
        state.validation_errors == vec!["first failed".to_string(), "second failed".to_string()],
        format!("unexpected errors {:?}", state.validation_errors),
    )
}

#[test]
fn empty_metrics_report_validation_error() -> TestResult {
    let registry = sample_registry();
    let state = ControlResolver::new(&registry)
        .control_state("metrics", "line", None, None)
        .map_err(|err| err.to_string())?;
    ensure(state.value.is_null(), "no default means null")?;
    ensure(state.validation_errors == vec!["cannot be empty".to_string()], "non_empty reported")
}

#[test]
fn validator_fault_aborts_resolution() -> TestResult {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let faulty =
        ValidatorFn::new("faulty", |_: &Value| Err(ValidatorFault::new("bad input shape")));
    let counting = ValidatorFn::new("counting", move |_: &Value| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    });
    let registry = StaticRegistry::new().with_control(
        "name",
        ControlDefinition::new(ControlKind::Text).with_validator(faulty).with_validator(counting),
    );
    let result = ControlResolver::new(&registry).control_state("name", "any", None, None);
    ensure(
        result
            == Err(ResolveError::ValidatorFault {
                control: "name".to_string(),
                validator: "faulty".to_string(),
                message: "bad input shape".to_string(),
            }),
        format!("unexpected result {result:?}"),
    )?;
    ensure(calls.load(Ordering::SeqCst) == 0, "later validators must not run")
}

// ============================================================================
// SECTION: Dynamic Properties
// ============================================================================

#[test]
fn mapper_choices_feed_computed_default() -> TestResult {
    let mapper = PropsMapper::new("column_choices", |state: &AmbientState, _: &ControlDefinition| {
        let choices = merge_columns(&state.datasources, |_| true)
            .into_iter()
            .map(|column| Choice::new(column.column.as_str(), column.display_name()))
            .collect();
        ControlPatch::choices(choices)
    });
    let first_choice = DefaultFn::new("first_choice", |def: &ControlDefinition| {
        def.choices.as_ref().and_then(|c| c.first()).map_or(Value::Null, |c| c.value().clone())
    });
    let registry = StaticRegistry::new().with_control(
        "x_axis",
        ControlDefinition::new(ControlKind::Select)
            .with_mapper(mapper)
            .with_computed_default(first_choice),
    );
    let ambient = AmbientState::with_datasources(vec![
        table_source(&["ds", "country", "city"], &[]),
        table_source(&["city", "country"], &[]),
    ]);
    let state = ControlResolver::new(&registry)
        .control_state("x_axis", "any", Some(&ambient), None)
        .map_err(|err| err.to_string())?;
    ensure(state.value == json!("country"), format!("unexpected value {}", state.value))?;
    ensure(state.default == json!("country"), "default is evaluated to plain data")?;
    let choices = state.choices.unwrap_or_default();
    ensure(choices.len() == 2, format!("expected merged choices, got {choices:?}"))
}

#[test]
fn stale_value_pruned_against_mapped_choices() -> TestResult {
    let mapper = PropsMapper::new("fixed", |_: &AmbientState, _: &ControlDefinition| {
        ControlPatch::choices(vec![Choice::new("a", "A")])
    });
    let registry = StaticRegistry::new().with_control(
        "pick",
        ControlDefinition::new(ControlKind::Select)
            .with_choices(vec![Choice::new("b", "B")])
            .with_mapper(mapper),
    );
    let resolver = ControlResolver::new(&registry);
    let ambient = AmbientState::default();
    let mapped = resolver
        .control_state("pick", "any", Some(&ambient), Some(&json!("b")))
        .map_err(|err| err.to_string())?;
    let unmapped = resolver
        .control_state("pick", "any", None, Some(&json!("b")))
        .map_err(|err| err.to_string())?;
    ensure(mapped.value.is_null(), "value outside mapped choices is pruned")?;
    ensure(unmapped.value == json!("b"), "without ambient state the base choices apply")
}

// ============================================================================
// SECTION: Batch Resolution
// ============================================================================

#[test]
fn batch_covers_every_rendered_slot() -> TestResult {
    let registry = sample_registry();
    let resolver = ControlResolver::new(&registry);
    let table = resolver
        .all_controls_state("line", DatasourceType::Table, None, &Map::new())
        .map_err(|err| err.to_string())?;
    let names: Vec<&str> = table.keys().map(String::as_str).collect();
    ensure(
        names == ["groupby", "line_width", "metrics", "row_limit", "time_grain_sqla", "viz_type"],
        format!("unexpected table controls {names:?}"),
    )?;
    let druid = resolver
        .all_controls_state("line", DatasourceType::Druid, None, &Map::new())
        .map_err(|err| err.to_string())?;
    ensure(druid.contains_key("granularity"), "druid section rendered")?;
    ensure(!druid.contains_key("time_grain_sqla"), "table-only section skipped")
}

#[test]
fn batch_uses_saved_values_and_seeds_inline_controls() -> TestResult {
    let registry = sample_registry();
    let mut saved = Map::new();
    saved.insert("groupby".to_string(), json!("region"));
    saved.insert("line_width".to_string(), json!(7));
    let states = ControlResolver::new(&registry)
        .all_controls_state("line", DatasourceType::Table, None, &saved)
        .map_err(|err| err.to_string())?;
    let groupby = states.get("groupby").ok_or("missing groupby")?;
    let line_width = states.get("line_width").ok_or("missing line_width")?;
    ensure(groupby.value == json!(["region"]), "saved value resolved and wrapped")?;
    ensure(line_width.value == json!(2), "inline control seeded from its default")?;
    ensure(line_width.is_valid(), "inline control is not validated")
}

#[test]
fn batch_propagates_unknown_controls() -> TestResult {
    let section = ControlPanelSection::new("Query").with_row(vec![ControlSlot::named("ghost")]);
    let panel = PanelConfig::default().with_section(section);
    let registry = StaticRegistry::new().with_panel("bar", panel);
    let result = ControlResolver::new(&registry).all_controls_state(
        "bar",
        DatasourceType::Table,
        None,
        &Map::new(),
    );
    ensure(
        matches!(
            result,
            Err(ResolveError::UnknownControl { ref control, .. }) if control == "ghost"
        ),
        format!("unexpected result {result:?}"),
    )
}

#[test]
fn unknown_viz_renders_only_common_sections() -> TestResult {
    let registry = sample_registry();
    let states = ControlResolver::new(&registry)
        .all_controls_state("unheard_of", DatasourceType::Table, None, &Map::new())
        .map_err(|err| err.to_string())?;
    ensure(states.len() == 1 && states.contains_key("viz_type"), format!("unexpected {states:?}"))
}

#[test]
fn form_data_round_trips_through_resolution() -> TestResult {
    let registry = sample_registry();
    let resolver = ControlResolver::new(&registry);
    let mut saved = Map::new();
    saved.insert("groupby".to_string(), json!(["city", "village"]));
    saved.insert("time_grain_sqla".to_string(), json!("P1W"));
    let first = resolver
        .all_controls_state("line", DatasourceType::Table, None, &saved)
        .map_err(|err| err.to_string())?;
    let form_data: Map<String, Value> = to_form_data(&first).into_iter().collect();
    let second = resolver
        .all_controls_state("line", DatasourceType::Table, None, &form_data)
        .map_err(|err| err.to_string())?;
    ensure(first == second, "re-resolving form data is a fixed point")?;
    ensure(form_data.get("groupby") == Some(&json!(["city"])), "pruned value persisted")
}

#[test]
fn resolver_is_shareable_across_threads() -> TestResult {
    let registry = sample_registry();
    let resolver = ControlResolver::new(&registry);
    let results: Vec<Result<usize, String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = [DatasourceType::Table, DatasourceType::Druid, DatasourceType::Table]
            .into_iter()
            .map(|datasource_type| {
                scope.spawn(move || {
                    resolver
                        .all_controls_state("line", datasource_type, None, &Map::new())
                        .map(|states| states.len())
                        .map_err(|err| err.to_string())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|_| Err("thread panicked".to_string())))
            .collect()
    });
    for result in results {
        ensure(result? == 6, "every thread resolves the full layout")?;
    }
    Ok(())
}
