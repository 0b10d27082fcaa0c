//! Transactions API endpoint.
//!
//! Fetches the last used budget of the user, flattens it with the engine and
//! returns the spending records as a JSON array.

use api_types::{transaction::Transaction, ynab::BudgetDetail};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{ServerError, oauth_account, server::ServerState, user};

fn map_transaction(tx: engine::FlatTransaction) -> Transaction {
    Transaction {
        id: tx.id,
        date: tx.date,
        amount: tx.amount,
        account_id: tx.account_id,
        account: tx.account,
        payee_id: tx.payee_id,
        payee: tx.payee,
        category_id: tx.category_id,
        category: tx.category,
        category_group_id: tx.category_group_id,
        category_group: tx.category_group,
    }
}

/// Build the engine snapshot out of the budget export. Missing collections
/// are treated as empty.
pub(crate) fn snapshot(budget: BudgetDetail) -> engine::BudgetSnapshot {
    engine::BudgetSnapshot {
        accounts: budget
            .accounts
            .unwrap_or_default()
            .into_iter()
            .map(|a| engine::Account {
                id: a.id,
                name: a.name,
            })
            .collect(),
        payees: budget
            .payees
            .unwrap_or_default()
            .into_iter()
            .map(|p| engine::Payee {
                id: p.id,
                name: p.name,
            })
            .collect(),
        category_groups: budget
            .category_groups
            .unwrap_or_default()
            .into_iter()
            .map(|g| engine::CategoryGroup {
                id: g.id,
                name: g.name,
            })
            .collect(),
        categories: budget
            .categories
            .unwrap_or_default()
            .into_iter()
            .map(|c| engine::Category {
                id: c.id,
                name: c.name,
                category_group_id: c.category_group_id,
            })
            .collect(),
        transactions: budget
            .transactions
            .unwrap_or_default()
            .into_iter()
            .map(|t| engine::Transaction {
                id: t.id,
                date: t.date,
                amount: t.amount,
                account_id: t.account_id,
                payee_id: t.payee_id,
                category_id: t.category_id,
            })
            .collect(),
        subtransactions: budget
            .subtransactions
            .unwrap_or_default()
            .into_iter()
            .map(|s| engine::SubTransaction {
                transaction_id: s.transaction_id,
                amount: s.amount,
                payee_id: s.payee_id,
                category_id: s.category_id,
            })
            .collect(),
    }
}

/// Return a usable access token for `user`, refreshing it when expired.
async fn access_token(state: &ServerState, user: &user::Model) -> Result<String, ServerError> {
    let account = oauth_account::for_user(&state.db, user.id)
        .await?
        .ok_or(ServerError::Unauthorized)?;

    let now = Utc::now();
    if !account.is_expired(now) {
        return Ok(account.access_token);
    }
    let Some(refresh_token) = account.refresh_token.clone() else {
        // Let the budgeting service answer with its own error.
        return Ok(account.access_token);
    };

    tracing::debug!("refreshing access token of user {}", user.id);
    let token = state.ynab.refresh_token(&refresh_token).await?;
    let account = oauth_account::update_token(&state.db, account, &token, now).await?;
    Ok(account.access_token)
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    let token = access_token(&state, &user).await?;
    let budget = state.ynab.budget(&token).await?;

    let snapshot = snapshot(budget);
    let transactions: Vec<Transaction> = engine::normalize(&snapshot)
        .into_iter()
        .map(map_transaction)
        .collect();
    tracing::debug!(
        "user {}: {} transactions in, {} records out",
        user.id,
        snapshot.transactions.len(),
        transactions.len()
    );

    Ok(Json(transactions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::ynab::{Category, CategoryGroup, SubTransaction, TransactionSummary};
    use chrono::NaiveDate;

    #[test]
    fn missing_collections_become_empty() {
        let snapshot = snapshot(BudgetDetail {
            id: "b".to_string(),
            name: "Main".to_string(),
            ..Default::default()
        });
        assert_eq!(snapshot, engine::BudgetSnapshot::default());
    }

    #[test]
    fn budget_maps_to_snapshot_fields() {
        let budget = BudgetDetail {
            id: "b".to_string(),
            name: "Main".to_string(),
            category_groups: Some(vec![CategoryGroup {
                id: "g1".to_string(),
                name: "Everyday".to_string(),
                hidden: false,
                deleted: false,
            }]),
            categories: Some(vec![Category {
                id: "c1".to_string(),
                category_group_id: "g1".to_string(),
                name: "Dining".to_string(),
                hidden: false,
                deleted: false,
            }]),
            transactions: Some(vec![TransactionSummary {
                id: "t1".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                amount: -1000,
                memo: None,
                account_id: "a1".to_string(),
                payee_id: None,
                category_id: None,
                transfer_account_id: None,
                deleted: false,
            }]),
            subtransactions: Some(vec![SubTransaction {
                id: "s1".to_string(),
                transaction_id: "t1".to_string(),
                amount: -1000,
                memo: None,
                payee_id: Some("p1".to_string()),
                category_id: Some("c1".to_string()),
                transfer_account_id: None,
                deleted: false,
            }]),
            ..Default::default()
        };

        let snapshot = snapshot(budget);
        assert_eq!(snapshot.categories[0].category_group_id, "g1");
        assert_eq!(snapshot.transactions[0].account_id, "a1");
        assert_eq!(snapshot.subtransactions[0].transaction_id, "t1");

        let rows = engine::normalize(&snapshot);
        assert_eq!(rows.len(), 1);
        assert_eq!(map_transaction(rows[0].clone()).category, "Dining");
    }
}
