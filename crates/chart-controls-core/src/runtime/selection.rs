// crates/chart-controls-core/src/runtime/selection.rs
// ============================================================================
// Module: Datasource Selection
// Description: Single or multiple datasource choice for a new chart.
// Purpose: Produce the seed form data that opens a chart for exploration.
// Dependencies: crate::core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A new chart starts from a visualization type and a datasource selection.
//! Datasources are addressed by keys of the form `<id>__<type>`. Multiple
//! selection is only available for visualizations that support it, and every
//! selected datasource must share one type. Rejected selections leave the
//! previous selection untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::DatasourceType;
use crate::interfaces::ControlRegistry;

/// Separator between the id and the type in a datasource key.
const KEY_SEPARATOR: &str = "__";

/// Prefix applied to the viz type of multi-datasource charts.
const MULTI_SOURCE_PREFIX: &str = "multi_source_";

/// Visualization preselected for a new chart.
const DEFAULT_VIZ_TYPE: &str = "table";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while changing a datasource selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Key is not of the form `<id>__<type>`.
    #[error("malformed datasource key: {0}")]
    MalformedKey(String),
    /// Selected datasources do not share one type.
    #[error("mixed datasource types: expected {expected}, found {found}")]
    MixedTypes {
        /// Type of the first selected datasource.
        expected: DatasourceType,
        /// Conflicting type.
        found: DatasourceType,
    },
    /// Single mode needs exactly one datasource.
    #[error("single datasource mode expects exactly one datasource, got {0}")]
    SingleArity(usize),
    /// Visualization does not accept multiple datasources.
    #[error("visualization `{0}` does not support multiple datasources")]
    MultiNotSupported(String),
}

// ============================================================================
// SECTION: Datasource Key
// ============================================================================

/// Parsed `<id>__<type>` datasource key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasourceKey {
    /// Datasource identifier.
    pub id: u64,
    /// Datasource type.
    #[serde(rename = "type")]
    pub kind: DatasourceType,
}

impl FromStr for DatasourceKey {
    type Err = SelectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || SelectionError::MalformedKey(value.to_string());
        let (id, kind) = value.split_once(KEY_SEPARATOR).ok_or_else(malformed)?;
        let id = id.parse::<u64>().map_err(|_| malformed())?;
        let kind = kind.parse::<DatasourceType>().map_err(|_| malformed())?;
        Ok(Self {
            id,
            kind,
        })
    }
}

impl fmt::Display for DatasourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.id, self.kind)
    }
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Whether one or several datasources may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Exactly one datasource.
    #[default]
    Single,
    /// Any number of datasources of one type.
    Multiple,
}

/// Datasource and visualization choice for a new chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceSelection {
    /// Chosen visualization type.
    viz_type: String,
    /// Chosen visualization accepts multiple datasources.
    supports_multi: bool,
    /// Active selection mode.
    mode: SelectionMode,
    /// Selected datasources in selection order.
    keys: Vec<DatasourceKey>,
}

impl Default for DatasourceSelection {
    fn default() -> Self {
        Self {
            viz_type: DEFAULT_VIZ_TYPE.to_string(),
            supports_multi: false,
            mode: SelectionMode::Single,
            keys: Vec::new(),
        }
    }
}

impl DatasourceSelection {
    /// Creates an empty single-mode selection for the default visualization.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the chosen visualization type.
    #[must_use]
    pub fn viz_type(&self) -> &str {
        &self.viz_type
    }

    /// Returns the active selection mode.
    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Returns the selected datasources.
    #[must_use]
    pub fn keys(&self) -> &[DatasourceKey] {
        &self.keys
    }

    /// Returns the selected datasource ids in selection order.
    #[must_use]
    pub fn ids(&self) -> Vec<u64> {
        self.keys.iter().map(|key| key.id).collect()
    }

    /// Returns the shared type of the selected datasources.
    #[must_use]
    pub fn datasource_type(&self) -> Option<DatasourceType> {
        self.keys.first().map(|key| key.kind)
    }

    /// Chooses a visualization; visualizations without multi-datasource
    /// support force single mode and clear the selection.
    pub fn set_viz_type(&mut self, viz_type: impl Into<String>, supports_multi: bool) {
        self.viz_type = viz_type.into();
        self.supports_multi = supports_multi;
        if !supports_multi {
            self.mode = SelectionMode::Single;
            self.keys.clear();
        }
    }

    /// Chooses a visualization, reading its multi-datasource support from
    /// the registry.
    pub fn set_viz_type_from<R>(&mut self, registry: &R, viz_type: &str)
    where
        R: ControlRegistry + ?Sized,
    {
        self.set_viz_type(viz_type, registry.supports_multi_datasource(viz_type));
    }

    /// Switches the selection mode; switching to single mode clears the
    /// selection.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::MultiNotSupported`] when multiple mode is
    /// requested for a visualization that does not support it.
    pub fn set_mode(&mut self, mode: SelectionMode) -> Result<(), SelectionError> {
        match mode {
            SelectionMode::Multiple if !self.supports_multi => {
                Err(SelectionError::MultiNotSupported(self.viz_type.clone()))
            }
            SelectionMode::Multiple => {
                self.mode = mode;
                Ok(())
            }
            SelectionMode::Single => {
                self.mode = mode;
                self.keys.clear();
                Ok(())
            }
        }
    }

    /// Replaces the selection with the given datasource keys.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when a key is malformed, single mode is not
    /// given exactly one key, or multiple mode is given mixed types. The
    /// previous selection is kept on error.
    pub fn select<I, S>(&mut self, keys: I) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = keys
            .into_iter()
            .map(|key| key.as_ref().parse())
            .collect::<Result<Vec<DatasourceKey>, _>>()?;
        match self.mode {
            SelectionMode::Single if parsed.len() != 1 => {
                return Err(SelectionError::SingleArity(parsed.len()));
            }
            SelectionMode::Single => {}
            SelectionMode::Multiple => {
                if let Some(first) = parsed.first()
                    && let Some(other) = parsed.iter().find(|key| key.kind != first.kind)
                {
                    return Err(SelectionError::MixedTypes {
                        expected: first.kind,
                        found: other.kind,
                    });
                }
            }
        }
        self.keys = parsed;
        Ok(())
    }

    /// Returns true when a chart can be created from the selection.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.keys.is_empty() && !self.viz_type.is_empty()
    }

    /// Builds the seed form data for exploring the new chart.
    #[must_use]
    pub fn explore_form_data(&self) -> Value {
        let viz_type = match self.mode {
            SelectionMode::Multiple => format!("{MULTI_SOURCE_PREFIX}{}", self.viz_type),
            SelectionMode::Single => self.viz_type.clone(),
        };
        json!({
            "viz_type": viz_type,
            "datasources": {
                "ids": self.ids(),
                "type": self.datasource_type(),
            },
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
