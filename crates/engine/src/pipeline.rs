//! Normalization of a [`BudgetSnapshot`] into flat spending records.
//!
//! The pipeline runs in four steps:
//!
//! 1. splits are flattened over their parent transaction (one row per split,
//!    or the parent itself when it has none);
//! 2. every identifier is repaired, see [`repair_id`](crate::repair_id);
//! 3. account, payee, category and category group names are resolved;
//! 4. transfers (no category) and the ready-to-assign inflow are dropped.
//!
//! The function is total: unknown references degrade to missing names and
//! never raise.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    BudgetSnapshot, SubTransaction, Transaction,
    dimensions::Dimensions,
    ids::{repair_id, repair_owned},
};

/// Name of the group holding the reserved unallocated-funds category.
pub const INFLOW_CATEGORY_GROUP: &str = "Internal Master Category";
/// Name of the reserved unallocated-funds category.
pub const INFLOW_CATEGORY: &str = "Inflow: Ready to Assign";

/// A denormalized spending record.
///
/// Category columns are always resolved: rows whose category cannot be
/// resolved never leave the pipeline. Account and payee names may be missing
/// when the upstream references an entity that is not part of the snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: i64,
    pub account_id: String,
    pub account: Option<String>,
    pub payee_id: Option<String>,
    pub payee: Option<String>,
    pub category_id: String,
    pub category: String,
    pub category_group_id: String,
    pub category_group: String,
}

/// Row produced by the split flattening step, before any repair.
#[derive(Debug)]
struct Provisional<'a> {
    parent: &'a Transaction,
    amount: i64,
    payee_id: Option<&'a str>,
    category_id: Option<&'a str>,
}

impl<'a> Provisional<'a> {
    fn from_parent(parent: &'a Transaction) -> Self {
        Self {
            parent,
            amount: parent.amount,
            payee_id: parent.payee_id.as_deref(),
            category_id: parent.category_id.as_deref(),
        }
    }

    /// Overrides the parent columns with the split ones. A missing split
    /// payee keeps the parent payee; a missing split category marks a
    /// transfer split and stays missing.
    fn from_split(parent: &'a Transaction, split: &'a SubTransaction) -> Self {
        Self {
            parent,
            amount: split.amount,
            payee_id: split.payee_id.as_deref().or(parent.payee_id.as_deref()),
            category_id: split.category_id.as_deref(),
        }
    }
}

fn flatten_splits(snapshot: &BudgetSnapshot) -> Vec<Provisional<'_>> {
    // Splits are matched on the raw parent id: composite ids sharing a UUID
    // prefix belong to different parents.
    let mut splits: HashMap<&str, Vec<&SubTransaction>> = HashMap::new();
    for split in &snapshot.subtransactions {
        splits
            .entry(split.transaction_id.as_str())
            .or_default()
            .push(split);
    }

    let mut rows = Vec::with_capacity(snapshot.transactions.len() + snapshot.subtransactions.len());
    for parent in &snapshot.transactions {
        match splits.get(parent.id.as_str()) {
            Some(children) => rows.extend(
                children
                    .iter()
                    .map(|split| Provisional::from_split(parent, *split)),
            ),
            None => rows.push(Provisional::from_parent(parent)),
        }
    }
    rows
}

fn is_inflow(category_group: &str, category: &str) -> bool {
    category_group == INFLOW_CATEGORY_GROUP && category == INFLOW_CATEGORY
}

fn resolve(row: Provisional<'_>, dims: &Dimensions<'_>) -> Option<FlatTransaction> {
    let account_id = repair_id(&row.parent.account_id);
    let payee_id = row.payee_id.map(repair_id);
    // Transfers carry no category and stop here.
    let category_id = repair_id(row.category_id?);
    let category = dims.category(category_id)?;

    if is_inflow(category.group, category.name) {
        return None;
    }

    Some(FlatTransaction {
        id: repair_owned(&row.parent.id),
        date: row.parent.date,
        amount: row.amount,
        account_id: account_id.to_string(),
        account: dims.account(account_id).map(str::to_string),
        payee_id: payee_id.map(str::to_string),
        payee: payee_id.and_then(|id| dims.payee(id)).map(str::to_string),
        category_id: category_id.to_string(),
        category: category.name.to_string(),
        category_group_id: category.group_id.to_string(),
        category_group: category.group.to_string(),
    })
}

/// Flattens `snapshot` into the ordered list of spending records.
///
/// Rows are emitted in the order transactions appear in the snapshot; the
/// rows of a split transaction follow the order of its splits. Splits whose
/// parent is not in the snapshot produce nothing.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use engine::{Account, BudgetSnapshot, Category, CategoryGroup, Payee, Transaction};
///
/// let snapshot = BudgetSnapshot {
///     accounts: vec![Account { id: "A1".into(), name: "Checking".into() }],
///     payees: vec![Payee { id: "P1".into(), name: "Coffee Shop".into() }],
///     category_groups: vec![CategoryGroup { id: "G1".into(), name: "Everyday".into() }],
///     categories: vec![Category {
///         id: "C1".into(),
///         name: "Dining".into(),
///         category_group_id: "G1".into(),
///     }],
///     transactions: vec![Transaction {
///         id: "T1".into(),
///         date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
///         amount: -500,
///         account_id: "A1".into(),
///         payee_id: Some("P1".into()),
///         category_id: Some("C1".into()),
///     }],
///     subtransactions: vec![],
/// };
///
/// let rows = engine::normalize(&snapshot);
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].category, "Dining");
/// assert_eq!(rows[0].payee.as_deref(), Some("Coffee Shop"));
/// ```
#[must_use]
pub fn normalize(snapshot: &BudgetSnapshot) -> Vec<FlatTransaction> {
    let dims = Dimensions::new(snapshot);
    flatten_splits(snapshot)
        .into_iter()
        .filter_map(|row| resolve(row, &dims))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent(id: &str, category: Option<&str>) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            amount: -1000,
            account_id: "A1".to_string(),
            payee_id: Some("P1".to_string()),
            category_id: category.map(str::to_string),
        }
    }

    fn split(parent: &str, amount: i64, category: Option<&str>) -> SubTransaction {
        SubTransaction {
            transaction_id: parent.to_string(),
            amount,
            payee_id: None,
            category_id: category.map(str::to_string),
        }
    }

    #[test]
    fn parent_without_splits_is_kept_as_is() {
        let snapshot = BudgetSnapshot {
            transactions: vec![parent("T1", Some("C1"))],
            ..Default::default()
        };

        let rows = flatten_splits(&snapshot);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, -1000);
        assert_eq!(rows[0].category_id, Some("C1"));
    }

    #[test]
    fn splits_fan_out_in_input_order() {
        let snapshot = BudgetSnapshot {
            transactions: vec![parent("T1", None), parent("T2", Some("C9"))],
            subtransactions: vec![
                split("T1", -100, Some("C1")),
                split("T2", -300, Some("C3")),
                split("T1", -200, Some("C2")),
            ],
            ..Default::default()
        };

        let rows = flatten_splits(&snapshot);
        let amounts: Vec<i64> = rows.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![-100, -200, -300]);
        assert!(rows.iter().all(|r| r.parent.account_id == "A1"));
    }

    #[test]
    fn missing_split_payee_keeps_parent_payee() {
        let snapshot = BudgetSnapshot {
            transactions: vec![parent("T1", Some("C1"))],
            subtransactions: vec![split("T1", -100, Some("C2"))],
            ..Default::default()
        };

        let rows = flatten_splits(&snapshot);
        assert_eq!(rows[0].payee_id, Some("P1"));
        assert_eq!(rows[0].category_id, Some("C2"));
        assert_eq!(rows[0].amount, -100);
    }

    #[test]
    fn missing_split_category_is_not_inherited() {
        let snapshot = BudgetSnapshot {
            transactions: vec![parent("T1", Some("C1"))],
            subtransactions: vec![split("T1", -100, None)],
            ..Default::default()
        };

        let rows = flatten_splits(&snapshot);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category_id, None);
    }

    #[test]
    fn orphan_split_produces_nothing() {
        let snapshot = BudgetSnapshot {
            subtransactions: vec![split("ghost", -100, Some("C1"))],
            ..Default::default()
        };

        assert!(flatten_splits(&snapshot).is_empty());
    }

    #[test]
    fn split_join_uses_raw_parent_id() {
        let uuid = "0b6f4a7c-1d2e-4f3a-8b9c-0d1e2f3a4b5c";
        let first = format!("{uuid}_2024-01-01");
        let second = format!("{uuid}_2024-02-01");
        let snapshot = BudgetSnapshot {
            transactions: vec![parent(&first, None), parent(&second, Some("C1"))],
            subtransactions: vec![split(&first, -10, Some("C2")), split(&first, -20, Some("C3"))],
            ..Default::default()
        };

        let rows = flatten_splits(&snapshot);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].parent.id, second);
        assert_eq!(rows[2].amount, -1000);
    }

    #[test]
    fn inflow_pair_must_match_exactly() {
        assert!(is_inflow(INFLOW_CATEGORY_GROUP, INFLOW_CATEGORY));
        assert!(!is_inflow("Everyday", INFLOW_CATEGORY));
        assert!(!is_inflow(INFLOW_CATEGORY_GROUP, "Uncategorized"));
    }
}
