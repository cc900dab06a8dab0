//! Mutations against the ledger.
//!
//! Commands are the only code allowed to touch stored account balances. Every
//! mutation runs inside a single database transaction so a failed write never
//! leaves a balance out of sync with the transaction list.

use async_trait::async_trait;
use thiserror::Error;

use super::domain::{
    categories::{Category, CategoryDraft},
    credit_cards::{CreditCard, CreditCardDraft},
    settings::NotificationSettings,
    tags::{Tag, TagDraft},
    transactions::{Transaction, TransactionDraft, TransactionPatch},
};

pub mod sqlite;

#[derive(Debug, Error)]
pub enum TransactionError {
    /// The draft references an account id that does not exist.
    #[error("account {0} does not exist")]
    UnknownAccount(String),
    #[error("no transaction found with the provided id")]
    TransactionNotFound,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<sqlx::Error> for TransactionError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::TransactionNotFound,
            other => Self::Unknown(other.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no record found with the provided id")]
    NotFound,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<sqlx::Error> for CatalogError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Unknown(other.into()),
        }
    }
}

#[async_trait]
pub trait TransactionCommands {
    /// Record a new transaction and adjust the referenced account's balance
    /// by its signed amount.
    async fn add_transaction(
        &self,
        draft: TransactionDraft,
    ) -> Result<Transaction, TransactionError>;

    /// Apply a partial update. If the amount, type, or account changed, the
    /// old contribution is reverted and the new one applied, both computed
    /// from the stored snapshot.
    async fn update_transaction(
        &self,
        transaction_id: &str,
        patch: TransactionPatch,
    ) -> Result<Transaction, TransactionError>;

    /// Remove a transaction and revert its balance contribution.
    async fn delete_transaction(&self, transaction_id: &str) -> Result<(), TransactionError>;

    /// Merge externally supplied transactions into the ledger as a batch of
    /// adds. Balances are reconciled for every imported record, and fresh ids
    /// are minted. Either the whole batch lands or none of it does.
    async fn import_transactions(
        &self,
        drafts: Vec<TransactionDraft>,
    ) -> Result<Vec<Transaction>, TransactionError>;
}

#[async_trait]
pub trait CatalogCommands {
    async fn add_category(&self, draft: CategoryDraft) -> anyhow::Result<Category>;
    async fn update_category(
        &self,
        category_id: &str,
        draft: CategoryDraft,
    ) -> Result<Category, CatalogError>;
    async fn delete_category(&self, category_id: &str) -> Result<(), CatalogError>;

    async fn add_credit_card(&self, draft: CreditCardDraft) -> anyhow::Result<CreditCard>;
    async fn update_credit_card(
        &self,
        card_id: &str,
        draft: CreditCardDraft,
    ) -> Result<CreditCard, CatalogError>;
    async fn delete_credit_card(&self, card_id: &str) -> Result<(), CatalogError>;

    async fn add_tag(&self, draft: TagDraft) -> anyhow::Result<Tag>;
    async fn update_tag(&self, tag_id: &str, draft: TagDraft) -> Result<Tag, CatalogError>;
    async fn delete_tag(&self, tag_id: &str) -> Result<(), CatalogError>;

    /// Overwrite an account's stored balance. This is the manual correction
    /// escape hatch exposed by the API; normal maintenance happens through
    /// transaction mutations.
    async fn set_account_balance(
        &self,
        account_id: &str,
        balance: f64,
    ) -> Result<(), CatalogError>;

    async fn save_settings(&self, settings: NotificationSettings) -> anyhow::Result<()>;
}
