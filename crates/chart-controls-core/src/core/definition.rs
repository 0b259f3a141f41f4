// crates/chart-controls-core/src/core/definition.rs
// ============================================================================
// Module: Control Definitions
// Description: Immutable control templates and partial overrides.
// Purpose: Define the data-bearing fields of a control independent of rendering.
// Dependencies: crate::core::functions, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ControlDefinition`] is the template a control state is derived from.
//! Only the data-bearing fields (default, shape, choices, validators) matter
//! to resolution; render-only properties ride along in an opaque `props` map.
//! A [`ControlPatch`] is a partial definition applied field-by-field, used for
//! per-visualization overrides and for the output of state mappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::functions::DefaultFn;
use crate::core::functions::PropsMapper;
use crate::core::functions::ValidatorFn;

// ============================================================================
// SECTION: Control Kind
// ============================================================================

/// Widget kind tag of a control.
///
/// Serialized as the widget tag string (for example `SelectControl`). Tags
/// without a dedicated variant round-trip through [`ControlKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ControlKind {
    /// Single or multi select over a list of choices.
    Select,
    /// Boolean checkbox.
    Checkbox,
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    TextArea,
    /// Metric picker with ad-hoc metric support.
    Metrics,
    /// Color picker.
    ColorPicker,
    /// Numeric slider.
    Slider,
    /// Hidden, non-rendered value carrier.
    Hidden,
    /// Datasource picker.
    Datasource,
    /// Visualization type picker.
    VizType,
    /// Any other widget tag.
    Custom(String),
}

impl ControlKind {
    /// Returns the widget tag string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Select => "SelectControl",
            Self::Checkbox => "CheckboxControl",
            Self::Text => "TextControl",
            Self::TextArea => "TextAreaControl",
            Self::Metrics => "MetricsControl",
            Self::ColorPicker => "ColorPickerControl",
            Self::Slider => "SliderControl",
            Self::Hidden => "HiddenControl",
            Self::Datasource => "DatasourceControl",
            Self::VizType => "VizTypeControl",
            Self::Custom(tag) => tag,
        }
    }

    /// Returns true when stale values are pruned against declared choices.
    #[must_use]
    pub const fn prunes_choices(&self) -> bool {
        matches!(self, Self::Select)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ControlKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "SelectControl" => Self::Select,
            "CheckboxControl" => Self::Checkbox,
            "TextControl" => Self::Text,
            "TextAreaControl" => Self::TextArea,
            "MetricsControl" => Self::Metrics,
            "ColorPickerControl" => Self::ColorPicker,
            "SliderControl" => Self::Slider,
            "HiddenControl" => Self::Hidden,
            "DatasourceControl" => Self::Datasource,
            "VizTypeControl" => Self::VizType,
            _ => Self::Custom(tag),
        }
    }
}

impl From<&str> for ControlKind {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<ControlKind> for String {
    fn from(kind: ControlKind) -> Self {
        match kind {
            ControlKind::Custom(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

// ============================================================================
// SECTION: Choices
// ============================================================================

/// Allowed `(value, label)` pair, serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice(pub Value, pub String);

impl Choice {
    /// Creates a choice from a value and a display label.
    #[must_use]
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self(value.into(), label.into())
    }

    /// Returns the choice value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.0
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.1
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default value of a control: static, or computed from the definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlDefault {
    /// Fixed JSON value.
    Static(Value),
    /// Function of the definition, evaluated after state mapping.
    Computed(DefaultFn),
}

// ============================================================================
// SECTION: Control Definition
// ============================================================================

/// Immutable control template.
///
/// # Invariants
/// - Registries never hand out mutable access; resolution works on clones.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlDefinition {
    /// Widget kind tag.
    pub kind: ControlKind,
    /// Optional display label.
    pub label: Option<String>,
    /// Optional help text.
    pub description: Option<String>,
    /// Optional default value.
    pub default: Option<ControlDefault>,
    /// Value is a sequence rather than a scalar.
    pub multi: bool,
    /// Values outside `choices` are permitted.
    pub free_form: bool,
    /// Ordered allowed choices.
    pub choices: Option<Vec<Choice>>,
    /// Validators run against the final value, in order.
    pub validators: Vec<ValidatorFn>,
    /// Mapper deriving fields from ambient state.
    pub map_state_to_props: Option<PropsMapper>,
    /// Opaque render-only properties.
    pub props: BTreeMap<String, Value>,
}

impl ControlDefinition {
    /// Creates an empty definition of the given kind.
    #[must_use]
    pub const fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            label: None,
            description: None,
            default: None,
            multi: false,
            free_form: false,
            choices: None,
            validators: Vec::new(),
            map_state_to_props: None,
            props: BTreeMap::new(),
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets a static default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(ControlDefault::Static(value.into()));
        self
    }

    /// Sets a computed default.
    #[must_use]
    pub fn with_computed_default(mut self, func: DefaultFn) -> Self {
        self.default = Some(ControlDefault::Computed(func));
        self
    }

    /// Marks the control as multi-valued.
    #[must_use]
    pub fn with_multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    /// Marks the control as free-form.
    #[must_use]
    pub fn with_free_form(mut self, free_form: bool) -> Self {
        self.free_form = free_form;
        self
    }

    /// Sets the allowed choices.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Appends a validator.
    #[must_use]
    pub fn with_validator(mut self, validator: ValidatorFn) -> Self {
        self.validators.push(validator);
        self
    }

    /// Sets the ambient-state mapper.
    #[must_use]
    pub fn with_mapper(mut self, mapper: PropsMapper) -> Self {
        self.map_state_to_props = Some(mapper);
        self
    }

    /// Sets an opaque render property.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Returns the default as a plain value, evaluating a computed default
    /// against this definition. Missing defaults are `null`.
    #[must_use]
    pub fn evaluated_default(&self) -> Value {
        match &self.default {
            Some(ControlDefault::Static(value)) => value.clone(),
            Some(ControlDefault::Computed(func)) => func.evaluate(self),
            None => Value::Null,
        }
    }

    /// Returns the values of the declared choices, if any.
    #[must_use]
    pub fn choice_values(&self) -> Option<Vec<&Value>> {
        self.choices.as_ref().map(|choices| choices.iter().map(Choice::value).collect())
    }

    /// Applies a partial override; patch fields win, absent fields inherit.
    #[must_use]
    pub fn patched(mut self, patch: &ControlPatch) -> Self {
        if let Some(kind) = &patch.kind {
            self.kind = kind.clone();
        }
        if let Some(label) = &patch.label {
            self.label = Some(label.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(default) = &patch.default {
            self.default = Some(default.clone());
        }
        if let Some(multi) = patch.multi {
            self.multi = multi;
        }
        if let Some(free_form) = patch.free_form {
            self.free_form = free_form;
        }
        if let Some(choices) = &patch.choices {
            self.choices = Some(choices.clone());
        }
        if let Some(validators) = &patch.validators {
            self.validators.clone_from(validators);
        }
        if let Some(mapper) = &patch.map_state_to_props {
            self.map_state_to_props = Some(mapper.clone());
        }
        for (key, value) in &patch.props {
            self.props.insert(key.clone(), value.clone());
        }
        self
    }
}

// ============================================================================
// SECTION: Control Patch
// ============================================================================

/// Partial control definition; every present field replaces the base field.
///
/// `props` entries are merged key-by-key rather than replacing the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlPatch {
    /// Replacement widget kind.
    pub kind: Option<ControlKind>,
    /// Replacement label.
    pub label: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement default.
    pub default: Option<ControlDefault>,
    /// Replacement shape flag.
    pub multi: Option<bool>,
    /// Replacement free-form flag.
    pub free_form: Option<bool>,
    /// Replacement choices.
    pub choices: Option<Vec<Choice>>,
    /// Replacement validator list.
    pub validators: Option<Vec<ValidatorFn>>,
    /// Replacement state mapper.
    pub map_state_to_props: Option<PropsMapper>,
    /// Render properties merged over the base map.
    pub props: BTreeMap<String, Value>,
}

impl ControlPatch {
    /// Creates a patch that only replaces the choices.
    #[must_use]
    pub fn choices(choices: Vec<Choice>) -> Self {
        Self {
            choices: Some(choices),
            ..Self::default()
        }
    }
}
