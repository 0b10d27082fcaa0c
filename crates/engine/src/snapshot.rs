//! The module contains the in-memory budget snapshot the pipeline consumes.
//!
//! A snapshot is built fresh for every request from the upstream budget and
//! dropped once the response is produced. Identifiers are kept as the raw
//! strings the upstream emitted: some of them are composites
//! (`<uuid>_<suffix>`) and are only repaired while normalizing, see
//! [`repair_id`](crate::repair_id).

use chrono::NaiveDate;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payee {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
}

/// A budget category. It belongs to exactly one [`CategoryGroup`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub category_group_id: String,
}

/// A transaction as stored upstream.
///
/// `amount` is expressed in the upstream minor unit (milliunits) and is
/// never rescaled. `category_id` is `None` for transfers between accounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: i64,
    pub account_id: String,
    pub payee_id: Option<String>,
    pub category_id: Option<String>,
}

/// One slice of a split transaction.
///
/// Splits carry neither a date nor an account: both always come from the
/// parent referenced by `transaction_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubTransaction {
    pub transaction_id: String,
    pub amount: i64,
    pub payee_id: Option<String>,
    pub category_id: Option<String>,
}

/// Full set of entity collections for one budget at one point in time.
///
/// Ordering inside each collection carries no meaning except for
/// `transactions` and `subtransactions`, whose order is reflected in the
/// normalized output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BudgetSnapshot {
    pub accounts: Vec<Account>,
    pub payees: Vec<Payee>,
    pub category_groups: Vec<CategoryGroup>,
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub subtransactions: Vec<SubTransaction>,
}

