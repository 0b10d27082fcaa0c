use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod transaction {
    use super::*;

    /// Flat spending record served by `GET /transactions/`.
    ///
    /// `amount` is in milliunits, exactly as the budgeting service reports it.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Transaction {
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
}

pub mod error {
    use super::*;

    /// Error detail as reported by the budgeting service.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorDetail {
        pub id: String,
        pub name: String,
        pub detail: String,
    }

    /// Upstream error envelope: `{"error": {"id", "name", "detail"}}`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub error: ErrorDetail,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub email: String,
    }
}

/// Models of the budgeting service API (`https://api.ynab.com/v1`).
///
/// Only the fields the service relies on are modelled; unknown fields are
/// ignored. Identifiers are kept as strings because deleted or special
/// entities may carry composite ids (`<uuid>_<suffix>`).
pub mod ynab {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetDetailResponse {
        pub data: BudgetDetailWrapper,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetDetailWrapper {
        pub budget: BudgetDetail,
        #[serde(default)]
        pub server_knowledge: Option<i64>,
    }

    /// Full budget export. Every collection may be omitted by the service.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct BudgetDetail {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub accounts: Option<Vec<Account>>,
        #[serde(default)]
        pub payees: Option<Vec<Payee>>,
        #[serde(default)]
        pub category_groups: Option<Vec<CategoryGroup>>,
        #[serde(default)]
        pub categories: Option<Vec<Category>>,
        #[serde(default)]
        pub transactions: Option<Vec<TransactionSummary>>,
        #[serde(default)]
        pub subtransactions: Option<Vec<SubTransaction>>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Account {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub closed: bool,
        #[serde(default)]
        pub deleted: bool,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Payee {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub transfer_account_id: Option<String>,
        #[serde(default)]
        pub deleted: bool,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryGroup {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub hidden: bool,
        #[serde(default)]
        pub deleted: bool,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Category {
        pub id: String,
        pub category_group_id: String,
        pub name: String,
        #[serde(default)]
        pub hidden: bool,
        #[serde(default)]
        pub deleted: bool,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TransactionSummary {
        pub id: String,
        pub date: NaiveDate,
        /// Milliunits.
        pub amount: i64,
        #[serde(default)]
        pub memo: Option<String>,
        pub account_id: String,
        #[serde(default)]
        pub payee_id: Option<String>,
        #[serde(default)]
        pub category_id: Option<String>,
        #[serde(default)]
        pub transfer_account_id: Option<String>,
        #[serde(default)]
        pub deleted: bool,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SubTransaction {
        pub id: String,
        pub transaction_id: String,
        pub amount: i64,
        #[serde(default)]
        pub memo: Option<String>,
        #[serde(default)]
        pub payee_id: Option<String>,
        #[serde(default)]
        pub category_id: Option<String>,
        #[serde(default)]
        pub transfer_account_id: Option<String>,
        #[serde(default)]
        pub deleted: bool,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct UserResponse {
        pub data: UserWrapper,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct UserWrapper {
        pub user: User,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct User {
        pub id: String,
    }

    /// OAuth2 token endpoint response.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Token {
        pub access_token: String,
        #[serde(default)]
        pub token_type: Option<String>,
        /// Lifetime in seconds.
        #[serde(default)]
        pub expires_in: Option<i64>,
        #[serde(default)]
        pub refresh_token: Option<String>,
        #[serde(default)]
        pub scope: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_with_missing_collections_parses() {
        let json = r#"{"data":{"budget":{"id":"b","name":"Main"},"server_knowledge":3}}"#;
        let res: ynab::BudgetDetailResponse = serde_json::from_str(json).unwrap();
        assert!(res.data.budget.transactions.is_none());
        assert_eq!(res.data.server_knowledge, Some(3));
    }

    #[test]
    fn transaction_with_null_category_parses() {
        let json = r#"{
            "id": "t1",
            "date": "2024-01-05",
            "amount": -500,
            "cleared": "cleared",
            "account_id": "a1",
            "payee_id": null,
            "category_id": null,
            "transfer_account_id": "a2",
            "deleted": false
        }"#;
        let tx: ynab::TransactionSummary = serde_json::from_str(json).unwrap();
        assert!(tx.category_id.is_none());
        assert_eq!(tx.transfer_account_id.as_deref(), Some("a2"));
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn error_envelope_parses() {
        let json = r#"{"error":{"id":"401","name":"unauthorized","detail":"Unauthorized"}}"#;
        let res: error::ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(res.error.name, "unauthorized");
    }
}
