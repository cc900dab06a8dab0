//! Queries for ledger information.
//!
//! Queries fetch information from whatever storage is backing the application.
//! They never modify data.

pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use super::domain::{
    accounts::Account, categories::Category, credit_cards::CreditCard,
    settings::NotificationSettings, tags::Tag, transactions::Transaction,
};

#[async_trait]
pub trait TransactionQueries {
    /// List every transaction, newest first, with the stored tag encoding
    /// decoded into a list.
    async fn list_transactions(&self) -> Result<Vec<Transaction>>;
}

#[async_trait]
pub trait CatalogQueries {
    async fn list_accounts(&self) -> Result<Vec<Account>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn list_credit_cards(&self) -> Result<Vec<CreditCard>>;
    async fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Load the notification settings, falling back to the defaults when
    /// nothing has been saved yet.
    async fn load_settings(&self) -> Result<NotificationSettings>;
}
