// crates/chart-controls-core/src/core/datasource.rs
// ============================================================================
// Module: Datasource Schemas
// Description: Datasource kinds, column/metric specs, and ambient state.
// Purpose: Describe the schemas controls draw their choices from.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A chart is bound to one or more datasources of a single kind. Their column
//! and metric schemas feed the choices of column and metric pickers through
//! state mappers. [`AmbientState`] bundles those schemas with an opaque bag of
//! extra context; the resolver passes it through untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Datasource Type
// ============================================================================

/// Backing-store kind of a datasource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasourceType {
    /// SQL table-like source.
    Table,
    /// Druid streaming source.
    Druid,
}

impl DatasourceType {
    /// Returns the canonical lowercase tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Druid => "druid",
        }
    }
}

impl fmt::Display for DatasourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a datasource type tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown datasource type: {0}")]
pub struct UnknownDatasourceType(pub String);

impl FromStr for DatasourceType {
    type Err = UnknownDatasourceType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "table" => Ok(Self::Table),
            "druid" => Ok(Self::Druid),
            other => Err(UnknownDatasourceType(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Column and Metric Specs
// ============================================================================

/// Column of a datasource schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    #[serde(alias = "column_name")]
    pub column: String,
    /// Column data type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    /// SQL expression for computed columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose_name: Option<String>,
    /// Column may be grouped by.
    #[serde(default)]
    pub groupby: bool,
    /// Column may be filtered on.
    #[serde(default)]
    pub filterable: bool,
    /// Column holds temporal values.
    #[serde(default)]
    pub is_dttm: bool,
}

impl ColumnSpec {
    /// Creates a plain column with only a name.
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            column_type: None,
            expression: None,
            verbose_name: None,
            groupby: false,
            filterable: false,
            is_dttm: false,
        }
    }

    /// Sets the column data type.
    #[must_use]
    pub fn with_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = Some(column_type.into());
        self
    }

    /// Sets the column expression.
    #[must_use]
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Returns the label shown for this column.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.verbose_name.as_deref().unwrap_or(&self.column)
    }
}

/// Metric of a datasource schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Metric name.
    pub metric_name: String,
    /// Aggregation kind (for example `sum`, `count`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    /// SQL expression (table sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// JSON aggregation definition (druid sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose_name: Option<String>,
}

impl MetricSpec {
    /// Creates a metric with only a name.
    #[must_use]
    pub fn new(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            metric_type: None,
            expression: None,
            json: None,
            verbose_name: None,
        }
    }

    /// Returns the label shown for this metric.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.verbose_name.as_deref().unwrap_or(&self.metric_name)
    }
}

// ============================================================================
// SECTION: Datasource Schema
// ============================================================================

/// Column and metric schema of one attached datasource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceSchema {
    /// Optional datasource identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Optional datasource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Backing-store kind.
    #[serde(rename = "type")]
    pub kind: DatasourceType,
    /// Ordered columns.
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    /// Ordered metrics.
    #[serde(default)]
    pub metrics: Vec<MetricSpec>,
}

impl DataSourceSchema {
    /// Creates an empty schema of the given kind.
    #[must_use]
    pub const fn new(kind: DatasourceType) -> Self {
        Self {
            id: None,
            name: None,
            kind,
            columns: Vec::new(),
            metrics: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn with_column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a metric.
    #[must_use]
    pub fn with_metric(mut self, metric: MetricSpec) -> Self {
        self.metrics.push(metric);
        self
    }
}

// ============================================================================
// SECTION: Ambient State
// ============================================================================

/// Context handed to state mappers.
///
/// # Invariants
/// - The resolver never inspects this value; only mappers do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbientState {
    /// Attached datasource schemas, in attachment order.
    #[serde(default)]
    pub datasources: Vec<DataSourceSchema>,
    /// Explicit datasource type for the attached set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource_type: Option<DatasourceType>,
    /// Unstructured extra context.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl AmbientState {
    /// Creates an ambient state over the given datasources.
    #[must_use]
    pub fn with_datasources(datasources: Vec<DataSourceSchema>) -> Self {
        Self {
            datasources,
            datasource_type: None,
            extra: Map::new(),
        }
    }

    /// Returns the explicit datasource type, else the first datasource's kind.
    #[must_use]
    pub fn effective_datasource_type(&self) -> Option<DatasourceType> {
        self.datasource_type.or_else(|| self.datasources.first().map(|ds| ds.kind))
    }
}
