use anyhow::Result;
use async_trait::async_trait;
use tracing::trace;

use crate::{
    database::SqliteConnection,
    ledger::{
        domain::{
            accounts::Account, categories::Category, credit_cards::CreditCard,
            settings::NotificationSettings, tags::Tag, transactions::Transaction,
        },
        models,
    },
};

use super::{CatalogQueries, TransactionQueries};

/// A struct to provide queries for the SQLite database backing the
/// application.
pub struct SqliteQueries(pub SqliteConnection);

#[async_trait]
impl TransactionQueries for SqliteQueries {
    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        trace!("Listing transactions.");

        let rows: Vec<models::Transaction> =
            sqlx::query_as("SELECT * FROM transactions ORDER BY date DESC")
                .fetch_all(&*self.0)
                .await?;

        rows.into_iter()
            .map(models::Transaction::try_into_domain)
            .collect()
    }
}

#[async_trait]
impl CatalogQueries for SqliteQueries {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows: Vec<models::Account> = sqlx::query_as("SELECT * FROM accounts ORDER BY id")
            .fetch_all(&*self.0)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows: Vec<models::Category> = sqlx::query_as("SELECT * FROM categories ORDER BY id")
            .fetch_all(&*self.0)
            .await?;

        rows.into_iter()
            .map(models::Category::try_into_domain)
            .collect()
    }

    async fn list_credit_cards(&self) -> Result<Vec<CreditCard>> {
        let rows: Vec<models::CreditCard> =
            sqlx::query_as("SELECT * FROM credit_cards ORDER BY name")
                .fetch_all(&*self.0)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let rows: Vec<models::Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY name")
            .fetch_all(&*self.0)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn load_settings(&self) -> Result<NotificationSettings> {
        let row: Option<models::NotificationSettings> =
            sqlx::query_as("SELECT * FROM notification_settings WHERE id = 1")
                .fetch_optional(&*self.0)
                .await?;

        Ok(row.map(Into::into).unwrap_or_default())
    }
}
