//! Grouping and per-group aggregation

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::model::{CellValue, Row, Table};

/// Insertion-ordered map with the fast Fx hasher
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Sub-tables keyed by the stringified group value, in first-seen order
pub type Groups = FxIndexMap<String, Table>;

/// Group name used for rows that lack the grouping column
pub const ABSENT_GROUP: &str = "undefined";

type AggregationFn = Box<dyn Fn(&[CellValue]) -> CellValue>;

/// One named reduction of a source column
pub struct Aggregation {
    source: String,
    func: AggregationFn,
}

impl Aggregation {
    /// Column whose values are reduced
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Apply the reduction
    pub fn reduce(&self, values: &[CellValue]) -> CellValue {
        (self.func)(values)
    }
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregation")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Output column name → (source column, reduction), evaluated in insertion order
#[derive(Debug, Default)]
pub struct Aggregations {
    entries: IndexMap<String, Aggregation>,
}

impl Aggregations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output column computed as `func(values of source)`.
    /// Re-using an output name replaces the reduction but keeps its position.
    pub fn insert<F>(&mut self, output: impl Into<String>, source: impl Into<String>, func: F)
    where
        F: Fn(&[CellValue]) -> CellValue + 'static,
    {
        self.entries.insert(
            output.into(),
            Aggregation {
                source: source.into(),
                func: Box::new(func),
            },
        );
    }

    /// Builder-style [`Aggregations::insert`]
    pub fn with<F>(mut self, output: impl Into<String>, source: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[CellValue]) -> CellValue + 'static,
    {
        self.insert(output, source, func);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Aggregation)> {
        self.entries.iter().map(|(name, agg)| (name.as_str(), agg))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stringified group key of a cell; absent cells share the `undefined` group
pub fn group_key(value: Option<&CellValue>) -> String {
    match value {
        Some(v) => v.display().into_owned(),
        None => ABSENT_GROUP.to_string(),
    }
}

impl Table {
    /// Partition rows by the stringified value of `key`.
    ///
    /// Groups appear in the order their key is first seen; rows keep their
    /// relative order inside a group.
    pub fn group_by(&self, key: &str) -> Groups {
        let mut buckets: FxIndexMap<String, Vec<Row>> = FxIndexMap::default();
        for row in self.rows() {
            buckets
                .entry(group_key(row.get(key)))
                .or_default()
                .push(row.clone());
        }

        debug!(key, rows = self.len(), groups = buckets.len(), "group_by");

        buckets
            .into_iter()
            .map(|(name, rows)| (name, Table::new(rows)))
            .collect()
    }

    /// One summary row per group: `{ group, row_count, <outputs...> }`.
    ///
    /// For every aggregation entry, `row_count` is overwritten with the number
    /// of defined values of that entry's source column, so the final
    /// `row_count` reflects the last entry. An output named `group` or
    /// `row_count` replaces the built-in value.
    pub fn aggregate_by(&self, key: &str, aggs: &Aggregations) -> Table {
        let groups = self.group_by(key);

        let summary: Table = groups
            .iter()
            .map(|(name, group)| {
                let mut out = Row::new().with("group", name.as_str());
                for (output, agg) in aggs.iter() {
                    let values = group.column(agg.source());
                    out.insert("row_count", values.len());
                    out.insert(output, agg.reduce(&values));
                }
                out
            })
            .collect();

        debug!(key, aggregations = aggs.len(), groups = summary.len(), "aggregate_by");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::stats;
    use crate::row;

    fn sample() -> Table {
        Table::new(vec![
            row! { "g" => "a", "v" => 1 },
            row! { "g" => "b", "v" => 2 },
            row! { "g" => "a", "v" => 3 },
        ])
    }

    #[test]
    fn test_group_by_first_seen_order() {
        let groups = sample().group_by("g");
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            groups["a"].rows(),
            &[row! { "g" => "a", "v" => 1 }, row! { "g" => "a", "v" => 3 }]
        );
        assert_eq!(groups["b"].rows(), &[row! { "g" => "b", "v" => 2 }]);
    }

    #[test]
    fn test_group_by_stringifies_keys() {
        let table = Table::new(vec![
            row! { "k" => 1 },
            row! { "k" => 1.0 },
            row! { "k" => "1" },
            row! { "k" => CellValue::Null },
            row! { "other" => 0 },
        ]);
        let groups = table.group_by("k");
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["1", "null", "undefined"]);
        assert_eq!(groups["1"].len(), 3);
    }

    #[test]
    fn test_aggregate_by_sum() {
        let aggs = Aggregations::new().with("total", "v", stats::sum);
        let summary = sample().aggregate_by("g", &aggs);
        assert_eq!(
            summary.into_rows(),
            vec![
                row! { "group" => "a", "row_count" => 2, "total" => 4 },
                row! { "group" => "b", "row_count" => 1, "total" => 2 },
            ]
        );
    }

    #[test]
    fn test_row_count_follows_last_aggregation() {
        let table = Table::new(vec![
            row! { "g" => "a", "v" => 1, "w" => 10 },
            row! { "g" => "a", "v" => 2 },
        ]);
        let aggs = Aggregations::new()
            .with("total_v", "v", stats::sum)
            .with("total_w", "w", stats::sum);
        let summary = table.aggregate_by("g", &aggs);
        assert_eq!(summary.rows()[0].get("row_count"), Some(&CellValue::Int(1)));

        let aggs = Aggregations::new()
            .with("total_w", "w", stats::sum)
            .with("total_v", "v", stats::sum);
        let summary = table.aggregate_by("g", &aggs);
        assert_eq!(summary.rows()[0].get("row_count"), Some(&CellValue::Int(2)));
    }

    #[test]
    fn test_aggregate_by_output_layout() {
        let aggs = Aggregations::new()
            .with("avg", "v", stats::mean)
            .with("hi", "v", stats::max);
        let summary = sample().aggregate_by("g", &aggs);
        assert_eq!(
            summary.columns().unwrap(),
            vec!["group", "row_count", "avg", "hi"]
        );
        assert_eq!(summary.rows()[0].get("avg"), Some(&CellValue::Int(2)));
    }

    #[test]
    fn test_aggregate_by_with_closure() {
        let aggs = Aggregations::new().with("n", "v", |values: &[CellValue]| {
            CellValue::from(values.len() * 10)
        });
        let summary = sample().aggregate_by("g", &aggs);
        assert_eq!(summary.column("n"), vec![CellValue::Int(20), CellValue::Int(10)]);
    }

    #[test]
    fn test_aggregate_by_without_entries() {
        let summary = sample().aggregate_by("g", &Aggregations::new());
        assert_eq!(
            summary.into_rows(),
            vec![row! { "group" => "a" }, row! { "group" => "b" }]
        );
    }
}
