// crates/chart-controls-config/src/config.rs
// ============================================================================
// Module: Chart Controls Configuration
// Description: Configuration loading and validation for control registries.
// Purpose: Provide strict, fail-closed registry parsing with hard limits.
// Dependencies: chart-controls-core, serde, toml, tracing
// ============================================================================

//! ## Overview
//! Registries are loaded from a TOML file with strict size and path limits.
//! The file declares global controls, common sections, and per-visualization
//! layouts with overrides. Structural validation runs on load; function names
//! are bound against a [`crate::FunctionCatalog`] when the registry is built.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use chart_controls_core::Choice;
use chart_controls_core::DatasourceType;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "chart-controls.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "CHART_CONTROLS_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default maximum number of global controls.
pub(crate) const DEFAULT_MAX_CONTROLS: usize = 1_024;
/// Upper bound for `limits.max_controls`.
pub(crate) const MAX_MAX_CONTROLS: usize = 16_384;
/// Default maximum number of visualization types.
pub(crate) const DEFAULT_MAX_VISUALIZATIONS: usize = 256;
/// Upper bound for `limits.max_visualizations`.
pub(crate) const MAX_MAX_VISUALIZATIONS: usize = 4_096;
/// Maximum length of a control or visualization name.
pub(crate) const MAX_NAME_LENGTH: usize = 128;
/// Accepted logging levels.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Chart controls registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartControlsConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Registry size limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Global control definitions keyed by name.
    #[serde(default)]
    pub controls: BTreeMap<String, ControlSpec>,
    /// Sections rendered ahead of every visualization's own.
    #[serde(default)]
    pub common_sections: Vec<SectionSpec>,
    /// Panel layouts keyed by visualization type.
    #[serde(default)]
    pub visualizations: BTreeMap<String, VisualizationSpec>,
}

impl ChartControlsConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::from_toml_str(content)?;
        debug!(
            path = %resolved.display(),
            controls = config.controls.len(),
            visualizations = config.visualizations.len(),
            "loaded chart controls config"
        );
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.validate()?;
        self.limits.validate()?;
        if self.controls.len() > self.limits.max_controls {
            return Err(ConfigError::Invalid(format!(
                "controls exceed limits.max_controls ({})",
                self.limits.max_controls
            )));
        }
        if self.visualizations.len() > self.limits.max_visualizations {
            return Err(ConfigError::Invalid(format!(
                "visualizations exceed limits.max_visualizations ({})",
                self.limits.max_visualizations
            )));
        }
        for name in self.controls.keys() {
            validate_name("control", name)?;
        }
        let common_inline = self.validate_common_sections()?;
        for (viz_type, viz) in &self.visualizations {
            validate_name("visualization", viz_type)?;
            self.validate_visualization(viz_type, viz, &common_inline)?;
        }
        Ok(())
    }

    /// Common sections render for every visualization, so their named slots
    /// must be global. Returns the inline names they define.
    fn validate_common_sections(&self) -> Result<BTreeSet<&str>, ConfigError> {
        let inline = collect_inline_names("common sections", &self.common_sections)?;
        for name in &inline {
            if self.controls.contains_key(*name) {
                return Err(ConfigError::Invalid(format!(
                    "control `{name}` is defined both globally and inline in common sections"
                )));
            }
        }
        for slot in self.common_sections.iter().flat_map(SectionSpec::slots) {
            if let SlotSpec::Name(name) = slot
                && !name.is_empty()
                && !self.controls.contains_key(name)
            {
                return Err(ConfigError::Invalid(format!(
                    "common sections reference unknown control `{name}`"
                )));
            }
        }
        Ok(inline)
    }

    /// Validates one visualization's slots and overrides.
    fn validate_visualization(
        &self,
        viz_type: &str,
        viz: &VisualizationSpec,
        common_inline: &BTreeSet<&str>,
    ) -> Result<(), ConfigError> {
        let scope = format!("visualization `{viz_type}`");
        let inline = collect_inline_names(&scope, &viz.sections)?;
        let resolves = |name: &str| self.controls.contains_key(name) || inline.contains(name);
        for name in &inline {
            if self.controls.contains_key(*name) {
                return Err(ConfigError::Invalid(format!(
                    "control `{name}` is defined both globally and inline in {scope}"
                )));
            }
            if common_inline.contains(name) {
                return Err(ConfigError::Invalid(format!(
                    "inline control `{name}` is defined both in common sections and in {scope}"
                )));
            }
        }
        for slot in viz.sections.iter().flat_map(SectionSpec::slots) {
            if let SlotSpec::Name(name) = slot
                && !name.is_empty()
                && !resolves(name.as_str())
            {
                return Err(ConfigError::Invalid(format!(
                    "{scope} references unknown control `{name}`"
                )));
            }
        }
        for name in viz.overrides.keys() {
            if !resolves(name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "{scope} overrides unknown control `{name}`"
                )));
            }
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default log level filter.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Validates the log level.
    fn validate(&self) -> Result<(), ConfigError> {
        if LOG_LEVELS.contains(&self.level.as_str()) {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )))
        }
    }
}

/// Registry size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum number of global controls.
    #[serde(default = "default_max_controls")]
    pub max_controls: usize,
    /// Maximum number of visualization types.
    #[serde(default = "default_max_visualizations")]
    pub max_visualizations: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_controls: DEFAULT_MAX_CONTROLS,
            max_visualizations: DEFAULT_MAX_VISUALIZATIONS,
        }
    }
}

impl LimitsConfig {
    /// Validates limit bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_controls == 0 || self.max_controls > MAX_MAX_CONTROLS {
            return Err(ConfigError::Invalid(format!(
                "limits.max_controls must be between 1 and {MAX_MAX_CONTROLS}"
            )));
        }
        if self.max_visualizations == 0 || self.max_visualizations > MAX_MAX_VISUALIZATIONS {
            return Err(ConfigError::Invalid(format!(
                "limits.max_visualizations must be between 1 and {MAX_MAX_VISUALIZATIONS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Control Specs
// ============================================================================

/// Default value as written in config: a static value or a named function.
///
/// A table with a `computed` key always names a function and carries no
/// other keys.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum DefaultSpec {
    /// `{ computed = "<fn>" }`.
    Computed(ComputedDefault),
    /// Any other value.
    Static(Value),
}

/// Reference to a registered default function.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputedDefault {
    /// Registered default-function name.
    pub computed: String,
}

impl TryFrom<Value> for DefaultSpec {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if value.as_object().is_some_and(|table| table.contains_key("computed")) {
            return serde_json::from_value(value).map(Self::Computed);
        }
        Ok(Self::Static(value))
    }
}

/// Global or inline control definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlSpec {
    /// Widget kind tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Help text.
    #[serde(default)]
    pub description: Option<String>,
    /// Default value.
    #[serde(default)]
    pub default: Option<DefaultSpec>,
    /// Value is a sequence.
    #[serde(default)]
    pub multi: bool,
    /// Values outside `choices` are permitted.
    #[serde(default)]
    pub free_form: bool,
    /// Allowed `[value, label]` pairs.
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    /// Validator function names, in run order.
    #[serde(default)]
    pub validators: Vec<String>,
    /// State mapper function name.
    #[serde(default)]
    pub map_state_to_props: Option<String>,
    /// Opaque render properties.
    #[serde(default)]
    pub props: BTreeMap<String, Value>,
}

/// Partial control definition applied by a visualization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideSpec {
    /// Replacement widget kind tag.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Replacement label.
    #[serde(default)]
    pub label: Option<String>,
    /// Replacement help text.
    #[serde(default)]
    pub description: Option<String>,
    /// Replacement default.
    #[serde(default)]
    pub default: Option<DefaultSpec>,
    /// Replacement shape flag.
    #[serde(default)]
    pub multi: Option<bool>,
    /// Replacement free-form flag.
    #[serde(default)]
    pub free_form: Option<bool>,
    /// Replacement choices.
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    /// Replacement validator names.
    #[serde(default)]
    pub validators: Option<Vec<String>>,
    /// Replacement state mapper name.
    #[serde(default)]
    pub map_state_to_props: Option<String>,
    /// Render properties merged over the base.
    #[serde(default)]
    pub props: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Layout Specs
// ============================================================================

/// Slot entry: a control name, `""` for an empty slot, or an inline control.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SlotSpec {
    /// Named control; the empty string is a placeholder.
    Name(String),
    /// Inline control.
    Inline(InlineSlotSpec),
}

/// Inline control slot carrying its own definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InlineSlotSpec {
    /// Control name.
    pub name: String,
    /// Embedded definition.
    pub config: ControlSpec,
}

/// Panel section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSpec {
    /// Stable section key.
    #[serde(default)]
    pub key: Option<String>,
    /// Section label.
    #[serde(default)]
    pub label: Option<String>,
    /// Section starts expanded.
    #[serde(default)]
    pub expanded: bool,
    /// Datasource types the section renders for; empty means all.
    #[serde(default)]
    pub datasource_types: Vec<DatasourceType>,
    /// Ordered rows of slots.
    #[serde(default)]
    pub rows: Vec<Vec<SlotSpec>>,
}

impl SectionSpec {
    /// Iterates every slot in row order.
    pub fn slots(&self) -> impl Iterator<Item = &SlotSpec> {
        self.rows.iter().flatten()
    }
}

/// Panel layout and overrides of one visualization type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisualizationSpec {
    /// Ordered sections.
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
    /// Partial overrides keyed by control name.
    #[serde(default)]
    pub overrides: BTreeMap<String, OverrideSpec>,
    /// Visualization accepts multiple datasources.
    #[serde(default)]
    pub supports_multi_datasource: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default log level.
fn default_log_level() -> String {
    "warn".to_string()
}

/// Default global control limit.
const fn default_max_controls() -> usize {
    DEFAULT_MAX_CONTROLS
}

/// Default visualization limit.
const fn default_max_visualizations() -> usize {
    DEFAULT_MAX_VISUALIZATIONS
}

/// Validates a registry key.
fn validate_name(kind: &str, name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{kind} name must be non-empty")));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{kind} name `{name}` exceeds max length")));
    }
    Ok(())
}

/// Collects inline control names, rejecting duplicates within one scope.
fn collect_inline_names<'a>(
    scope: &str,
    sections: &'a [SectionSpec],
) -> Result<BTreeSet<&'a str>, ConfigError> {
    let mut names = BTreeSet::new();
    for slot in sections.iter().flat_map(SectionSpec::slots) {
        if let SlotSpec::Inline(inline) = slot {
            let name = &inline.name;
            validate_name("inline control", name)?;
            if !names.insert(name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate inline control `{name}` in {scope}"
                )));
            }
        }
    }
    Ok(names)
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
