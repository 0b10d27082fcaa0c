//! Budget normalization engine.
//!
//! The engine turns a [`BudgetSnapshot`] fetched from the budgeting service
//! into a flat, ordered list of [`FlatTransaction`]s ready to be served to a
//! client. It is pure and synchronous: no I/O, no shared state, so it can be
//! called concurrently from any number of requests.

pub use ids::repair_id;
pub use pipeline::{FlatTransaction, INFLOW_CATEGORY, INFLOW_CATEGORY_GROUP, normalize};
pub use snapshot::{
    Account, BudgetSnapshot, Category, CategoryGroup, Payee, SubTransaction, Transaction,
};

mod dimensions;
mod ids;
mod pipeline;
mod snapshot;
