use crate::data_types::{band_key, numeric_field, Band, CategoryValue, Row, StackedBand};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

type BandIdentity = (CategoryValue, Option<CategoryValue>, Option<CategoryValue>);

/// Rolls rows up into one band per `(domain, group, stack)` by summing `transform(value)`.
///
/// `group_key`/`stack_key` set to `None` drop that dimension from the aggregation entirely.
/// Rows missing a configured dimension are bucketed under `CategoryValue::Null`.
/// Bands come out in order of first occurrence.
pub fn aggregate(
    rows: &[Row],
    domain_key: &str,
    group_key: Option<&str>,
    stack_key: Option<&str>,
    value_key: &str,
    transform: Option<&dyn Fn(f64) -> f64>,
) -> Vec<Band> {
    let mut slots: HashMap<BandIdentity, usize> = HashMap::with_capacity(rows.len());
    let mut bands: Vec<Band> = Vec::new();

    for row in rows {
        let domain = CategoryValue::from_field(row, domain_key);
        let group = group_key.map(|k| CategoryValue::from_field(row, k));
        let stack = stack_key.map(|k| CategoryValue::from_field(row, k));
        let raw = numeric_field(row, value_key);
        let value = match transform {
            Some(f) => f(raw),
            None => raw,
        };

        let identity = (domain, group, stack);
        match slots.get(&identity) {
            Some(&i) => bands[i].value += value,
            None => {
                let (domain, group, stack) = identity.clone();
                slots.insert(identity, bands.len());
                bands.push(Band::new(domain, group, stack, value));
            }
        }
    }

    debug!(rows = rows.len(), bands = bands.len(), "aggregated rows");
    bands
}

/// Sorted distinct values.
pub fn distinct_sorted<'a, I>(values: I) -> Vec<CategoryValue>
where
    I: IntoIterator<Item = &'a CategoryValue>,
{
    values
        .into_iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct domains of a band set.
pub fn domains(bands: &[Band]) -> Vec<CategoryValue> {
    distinct_sorted(bands.iter().map(|b| &b.domain))
}

/// Sorted distinct groups of a band set. Empty when the group dimension is absent.
pub fn groups(bands: &[Band]) -> Vec<CategoryValue> {
    distinct_sorted(bands.iter().filter_map(|b| b.group.as_ref()))
}

/// Sorted distinct stack identities of a band set.
pub fn stacks(bands: &[Band]) -> Vec<CategoryValue> {
    distinct_sorted(bands.iter().filter_map(|b| b.stack.as_ref()))
}

type ColumnId = (CategoryValue, Option<CategoryValue>);

/// Assigns each band its `[min, max]` interval inside its `(domain, group)` column.
///
/// With a non-empty `order`, every column gets exactly one band per stack identity: members
/// missing from a column are synthesized with a zero value. Identities present in the data but
/// absent from `order` are stacked after it, in sorted order.
///
/// With an empty `order`, or bands without a stack dimension, stacking is off: each band spans
/// `[0, value]` and its index is the position of its group among the sorted groups.
pub fn stack(bands: &[Band], order: &[CategoryValue]) -> Vec<StackedBand> {
    let mut columns: BTreeMap<ColumnId, Vec<&Band>> = BTreeMap::new();
    for band in bands {
        columns
            .entry((band.domain.clone(), band.group.clone()))
            .or_default()
            .push(band);
    }

    if order.is_empty() || bands.iter().all(|b| b.stack.is_none()) {
        let group_order = groups(bands);
        let mut out = Vec::with_capacity(bands.len());
        for members in columns.values() {
            for band in members {
                let index = band
                    .group
                    .as_ref()
                    .and_then(|g| group_order.iter().position(|o| o == g))
                    .unwrap_or(0);
                out.push(StackedBand {
                    band: (*band).clone(),
                    min: 0.0,
                    max: band.value,
                    index,
                });
            }
        }
        return out;
    }

    // Repeated identities in `order` keep their first position.
    let mut full_order: Vec<CategoryValue> = Vec::with_capacity(order.len());
    for identity in order.iter().cloned().chain(stacks(bands)) {
        if !full_order.contains(&identity) {
            full_order.push(identity);
        }
    }

    let mut out = Vec::with_capacity(columns.len() * full_order.len());
    for ((domain, group), members) in &columns {
        let mut running = 0.0;
        for (index, identity) in full_order.iter().enumerate() {
            let value: f64 = members
                .iter()
                .filter(|b| b.stack.as_ref() == Some(identity))
                .map(|b| b.value)
                .sum();
            let band = Band {
                key: band_key(domain, group.as_ref(), Some(identity)),
                domain: domain.clone(),
                group: group.clone(),
                stack: Some(identity.clone()),
                value,
            };
            out.push(StackedBand {
                band,
                min: running,
                max: running + value,
                index,
            });
            running += value;
        }
    }
    out
}

/// Total per `(domain, group)` column, keyed by the column key.
pub fn column_totals(bands: &[Band]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for band in bands {
        *totals.entry(band.column_key()).or_insert(0.0) += band.value;
    }
    totals
}

/// Largest stacked extent, used as the upper end of value scales.
pub fn max_extent(stacked: &[StackedBand]) -> Option<f64> {
    stacked
        .iter()
        .map(|b| b.max.max(b.min))
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
}

/// Smallest stacked extent, used as the lower end of value scales.
pub fn min_extent(stacked: &[StackedBand]) -> Option<f64> {
    stacked
        .iter()
        .map(|b| b.min.min(b.max))
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<Row> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_duplicates_are_summed() {
        let data = rows(json!([
            {"d": "a", "v": 1},
            {"d": "a", "v": 2},
            {"d": "b", "v": 5}
        ]));
        let bands = aggregate(&data, "d", None, None, "v", None);
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].key, "a");
        assert_eq!(bands[0].value, 3.0);
        assert_eq!(bands[1].value, 5.0);
    }

    #[test]
    fn test_missing_group_is_null_bucket() {
        let data = rows(json!([
            {"d": "a", "g": "x", "v": 1},
            {"d": "a", "v": 2},
            {"d": "a", "g": null, "v": 3}
        ]));
        let bands = aggregate(&data, "d", Some("g"), None, "v", None);
        assert_eq!(bands.len(), 2);
        let null_band = bands.iter().find(|b| b.group == Some(CategoryValue::Null)).unwrap();
        assert_eq!(null_band.value, 5.0);
        assert_eq!(null_band.key, "a__null");
    }

    #[test]
    fn test_transform_applies_per_row() {
        let data = rows(json!([{"d": "a", "v": 2}, {"d": "a", "v": 3}]));
        let square = |v: f64| v * v;
        let bands = aggregate(&data, "d", None, None, "v", Some(&square));
        assert_eq!(bands[0].value, 13.0);
    }

    #[test]
    fn test_unstacked_index_follows_group_order() {
        let data = rows(json!([
            {"d": "a", "g": "z", "v": 1},
            {"d": "a", "g": "m", "v": 2}
        ]));
        let bands = aggregate(&data, "d", Some("g"), None, "v", None);
        let stacked = stack(&bands, &[]);
        let z = stacked.iter().find(|b| b.key() == "a__z").unwrap();
        let m = stacked.iter().find(|b| b.key() == "a__m").unwrap();
        assert_eq!((m.index, m.min, m.max), (0, 0.0, 2.0));
        assert_eq!((z.index, z.min, z.max), (1, 0.0, 1.0));
    }

    #[test]
    fn test_unknown_stack_identities_are_appended() {
        let data = rows(json!([
            {"d": "a", "s": "x", "v": 1},
            {"d": "a", "s": "q", "v": 2}
        ]));
        let bands = aggregate(&data, "d", None, Some("s"), "v", None);
        let stacked = stack(&bands, &["x".into()]);
        assert_eq!(stacked.len(), 2);
        assert_eq!(stacked[1].key(), "a__q");
        assert_eq!((stacked[1].min, stacked[1].max), (1.0, 3.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], "d", None, None, "v", None).is_empty());
        assert!(stack(&[], &["x".into()]).is_empty());
        assert_eq!(max_extent(&[]), None);
    }
}
