// crates/chart-controls-core/src/runtime/merge.rs
// ============================================================================
// Module: Schema Merge Engine
// Description: Intersects column and metric schemas across datasources.
// Purpose: Offer only fields every attached datasource can serve.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! A multi-datasource chart can only reference fields that exist in every
//! source. [`merge_fields`] keeps the items of the first datasource that have
//! an equal counterpart in each of the others. Results are references into the
//! first datasource, in its order; membership does not depend on the order of
//! the remaining datasources.

use crate::core::ColumnSpec;
use crate::core::DataSourceSchema;
use crate::core::DatasourceType;
use crate::core::MetricSpec;

// ============================================================================
// SECTION: Generic Merge
// ============================================================================

/// Intersects the filtered items extracted from each datasource.
///
/// Zero datasources yield nothing and one yields its filtered items.
pub fn merge_fields<'a, D, T, E, F, Q>(
    datasources: &'a [D],
    extract: E,
    keep: F,
    equals: Q,
) -> Vec<&'a T>
where
    E: Fn(&'a D) -> &'a [T],
    F: Fn(&T) -> bool,
    Q: Fn(&T, &T) -> bool,
{
    let mut filtered = datasources
        .iter()
        .map(|ds| extract(ds).iter().filter(|item| keep(item)).collect::<Vec<_>>());
    let Some(first) = filtered.next() else {
        return Vec::new();
    };
    filtered.fold(first, |merged, others| {
        if merged.is_empty() {
            return merged;
        }
        merged
            .into_iter()
            .filter(|item| others.iter().any(|other| equals(item, other)))
            .collect()
    })
}

// ============================================================================
// SECTION: Columns and Metrics
// ============================================================================

/// Returns true when two columns have the same name, type, and expression.
#[must_use]
pub fn column_equals(left: &ColumnSpec, right: &ColumnSpec) -> bool {
    left.column == right.column
        && left.column_type == right.column_type
        && left.expression == right.expression
}

/// Returns true when two metrics match for the datasource type: the metric
/// type always, plus the JSON definition for druid or the expression for
/// table sources.
#[must_use]
pub fn metric_equals(
    datasource_type: DatasourceType,
    left: &MetricSpec,
    right: &MetricSpec,
) -> bool {
    left.metric_type == right.metric_type
        && match datasource_type {
            DatasourceType::Druid => left.json == right.json,
            DatasourceType::Table => left.expression == right.expression,
        }
}

/// Columns shared by every datasource that pass the filter.
pub fn merge_columns<F>(datasources: &[DataSourceSchema], filter: F) -> Vec<&ColumnSpec>
where
    F: Fn(&ColumnSpec) -> bool,
{
    merge_fields(datasources, |ds| ds.columns.as_slice(), filter, column_equals)
}

/// Metrics shared by every datasource, compared per datasource type.
#[must_use]
pub fn merge_metrics(
    datasources: &[DataSourceSchema],
    datasource_type: DatasourceType,
) -> Vec<&MetricSpec> {
    merge_fields(
        datasources,
        |ds| ds.metrics.as_slice(),
        |_| true,
        |left, right| metric_equals(datasource_type, left, right),
    )
}
