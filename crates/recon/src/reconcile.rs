use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReconError;
use crate::model::{DuplicateKey, MeasurementRow, NormalizedTable, ReconciledRow};

/// How identifiers occurring more than once are handled at join time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// k rows in A and m rows in B yield k×m joined rows.
    #[default]
    Expand,
    /// Fail on the first duplicated identifier.
    Reject,
}

fn group_by_identifier(table: &NormalizedTable) -> BTreeMap<&str, Vec<&MeasurementRow>> {
    let mut groups: BTreeMap<&str, Vec<&MeasurementRow>> = BTreeMap::new();
    for row in &table.rows {
        groups.entry(row.identifier.as_str()).or_default().push(row);
    }
    groups
}

/// Full outer join of `a` and `b` on identifier.
///
/// Rows come out grouped by identifier in ascending order; within one
/// identifier, the cross product runs in A-order then B-order.
pub fn reconcile(a: &NormalizedTable, b: &NormalizedTable) -> Vec<ReconciledRow> {
    let left = group_by_identifier(a);
    let right = group_by_identifier(b);

    let keys: BTreeSet<&str> = left.keys().chain(right.keys()).copied().collect();
    let mut rows = Vec::new();

    for key in keys {
        match (left.get(key), right.get(key)) {
            (Some(ls), Some(rs)) => {
                for l in ls {
                    for r in rs {
                        rows.push(ReconciledRow::new(key, l.value, r.value));
                    }
                }
            }
            (Some(ls), None) => {
                rows.extend(ls.iter().map(|l| ReconciledRow::new(key, l.value, None)));
            }
            (None, Some(rs)) => {
                rows.extend(rs.iter().map(|r| ReconciledRow::new(key, None, r.value)));
            }
            (None, None) => {}
        }
    }

    debug!(
        a = a.len(),
        b = b.len(),
        joined = rows.len(),
        comparable = rows.iter().filter(|r| r.comparable).count(),
        "reconciled"
    );

    rows
}

/// Identifiers that occur more than once on either side, ascending.
pub fn duplicate_keys(a: &NormalizedTable, b: &NormalizedTable) -> Vec<DuplicateKey> {
    let left = group_by_identifier(a);
    let right = group_by_identifier(b);
    let keys: BTreeSet<&str> = left.keys().chain(right.keys()).copied().collect();

    keys.into_iter()
        .filter_map(|key| {
            let count_a = left.get(key).map_or(0, Vec::len);
            let count_b = right.get(key).map_or(0, Vec::len);
            (count_a > 1 || count_b > 1).then(|| DuplicateKey {
                identifier: key.to_string(),
                count_a,
                count_b,
            })
        })
        .collect()
}

/// [`reconcile`] with an explicit policy for duplicated identifiers.
pub fn reconcile_with_policy(
    a: &NormalizedTable,
    b: &NormalizedTable,
    policy: DuplicatePolicy,
) -> Result<Vec<ReconciledRow>, ReconError> {
    if policy == DuplicatePolicy::Reject {
        if let Some(dup) = duplicate_keys(a, b).into_iter().next() {
            return Err(ReconError::DuplicateKey {
                identifier: dup.identifier,
                count_a: dup.count_a,
                count_b: dup.count_b,
            });
        }
    }
    Ok(reconcile(a, b))
}
