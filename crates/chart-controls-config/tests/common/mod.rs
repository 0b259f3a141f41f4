// crates/chart-controls-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Helpers
// Description: Shared TOML fixtures for chart-controls-config tests.
// Purpose: Keep registry fixtures consistent across test binaries.
// ============================================================================

//! Shared helpers for chart-controls-config integration tests.

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers.")]

use chart_controls_config::ChartControlsConfig;
use chart_controls_config::ConfigError;

pub type TestResult = Result<(), String>;

/// Registry with globals, a common section, and a line chart layout.
pub const SAMPLE_TOML: &str = r#"
[logging]
level = "info"

[controls.viz_type]
type = "VizTypeControl"
label = "Visualization Type"
default = "table"

[controls.metrics]
type = "MetricsControl"
label = "Metrics"
multi = true
validators = ["non_empty"]
map_state_to_props = "metric_choices"

[controls.groupby]
type = "SelectControl"
label = "Group by"
multi = true
default = []
map_state_to_props = "groupby_choices"

[controls.granularity_sqla]
type = "SelectControl"
label = "Time Column"
default = { computed = "first_choice" }
map_state_to_props = "time_column_choices"

[controls.row_limit]
type = "SelectControl"
free_form = true
default = 10000
choices = [[10, "10"], [100, "100"], [1000, "1000"]]
validators = ["integer"]

[[common_sections]]
label = "Datasource & Chart Type"
expanded = true
rows = [["viz_type"]]

[visualizations.line]
supports_multi_datasource = true

[[visualizations.line.sections]]
label = "Query"
expanded = true
rows = [
  ["metrics", "groupby"],
  ["row_limit", ""],
]

[[visualizations.line.sections]]
label = "Time"
datasource_types = ["table"]
rows = [["granularity_sqla"]]

[[visualizations.line.sections]]
label = "Chart Options"
rows = [[{ name = "line_width", config = { type = "TextControl", default = 2 } }]]

[visualizations.line.overrides.row_limit]
label = "Series limit"
default = 50
"#;

/// Parses the sample registry.
pub fn sample_config() -> Result<ChartControlsConfig, ConfigError> {
    ChartControlsConfig::from_toml_str(SAMPLE_TOML)
}

/// Asserts that `result` is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
