use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction as DbTransaction};
use tracing::info;
use uuid::Uuid;

use crate::ledger::{
    domain::{
        categories::{Category, CategoryDraft},
        credit_cards::{CreditCard, CreditCardDraft},
        settings::NotificationSettings,
        tags::{Tag, TagDraft},
        transactions::{self, Transaction, TransactionDraft, TransactionPatch},
    },
    models,
};

use super::{CatalogCommands, CatalogError, TransactionCommands, TransactionError};

pub struct SqliteCommands<'a>(pub &'a SqlitePool);

async fn account_exists(
    tx: &mut DbTransaction<'_, Sqlite>,
    account_id: &str,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM accounts WHERE id = ?")
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?;

    Ok(row.is_some())
}

async fn insert_transaction(
    tx: &mut DbTransaction<'_, Sqlite>,
    transaction: &Transaction,
) -> Result<(), TransactionError> {
    let tags = models::encode_tags(&transaction.tags)?;

    sqlx::query(
        r#"
        INSERT INTO transactions
            (id, description, amount, date, category, "type", account_id, tags, credit_card_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&transaction.id)
    .bind(&transaction.description)
    .bind(transaction.amount)
    .bind(transaction.date)
    .bind(&transaction.category)
    .bind(transaction.kind.as_str())
    .bind(&transaction.account_id)
    .bind(tags)
    .bind(&transaction.credit_card_id)
    .execute(&mut *tx)
    .await?;

    Ok(())
}

async fn adjust_balance(
    tx: &mut DbTransaction<'_, Sqlite>,
    account_id: &str,
    delta: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE accounts SET balance = balance + ? WHERE id = ?")
        .bind(delta)
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

    Ok(())
}

async fn fetch_transaction(
    tx: &mut DbTransaction<'_, Sqlite>,
    transaction_id: &str,
) -> Result<Transaction, TransactionError> {
    let row: Option<models::Transaction> =
        sqlx::query_as("SELECT * FROM transactions WHERE id = ?")
            .bind(transaction_id)
            .fetch_optional(&mut *tx)
            .await?;

    row.ok_or(TransactionError::TransactionNotFound)?
        .try_into_domain()
        .map_err(TransactionError::Unknown)
}

#[async_trait]
impl<'a> TransactionCommands for SqliteCommands<'a> {
    async fn add_transaction(
        &self,
        draft: TransactionDraft,
    ) -> Result<Transaction, TransactionError> {
        let mut tx = self.0.begin().await?;

        if !account_exists(&mut tx, &draft.account_id).await? {
            return Err(TransactionError::UnknownAccount(draft.account_id));
        }

        let transaction = draft.into_transaction(Uuid::new_v4().to_string());

        insert_transaction(&mut tx, &transaction).await?;
        adjust_balance(&mut tx, &transaction.account_id, transaction.signed_amount()).await?;

        tx.commit().await?;

        info!(id = %transaction.id, "Recorded new transaction.");

        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        patch: TransactionPatch,
    ) -> Result<Transaction, TransactionError> {
        let mut tx = self.0.begin().await?;

        let old = fetch_transaction(&mut tx, transaction_id).await?;
        let updated = patch.apply_to(old.clone());

        if updated.account_id != old.account_id
            && !account_exists(&mut tx, &updated.account_id).await?
        {
            return Err(TransactionError::UnknownAccount(updated.account_id));
        }

        let tags = models::encode_tags(&updated.tags)?;

        sqlx::query(
            r#"
            UPDATE transactions
            SET description = ?, amount = ?, date = ?, category = ?, "type" = ?,
                account_id = ?, tags = ?, credit_card_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&updated.description)
        .bind(updated.amount)
        .bind(updated.date)
        .bind(&updated.category)
        .bind(updated.kind.as_str())
        .bind(&updated.account_id)
        .bind(tags)
        .bind(&updated.credit_card_id)
        .bind(transaction_id)
        .execute(&mut tx)
        .await?;

        for (account_id, delta) in transactions::rebalance_deltas(&old, &updated) {
            adjust_balance(&mut tx, &account_id, delta).await?;
        }

        tx.commit().await?;

        info!(id = %transaction_id, "Updated transaction.");

        Ok(updated)
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<(), TransactionError> {
        let mut tx = self.0.begin().await?;

        let old = fetch_transaction(&mut tx, transaction_id).await?;

        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(transaction_id)
            .execute(&mut tx)
            .await?;

        adjust_balance(&mut tx, &old.account_id, -old.signed_amount()).await?;

        tx.commit().await?;

        info!(
            id = %transaction_id,
            rows = result.rows_affected(),
            "Deleted transaction."
        );

        Ok(())
    }

    async fn import_transactions(
        &self,
        drafts: Vec<TransactionDraft>,
    ) -> Result<Vec<Transaction>, TransactionError> {
        if drafts.is_empty() {
            return Ok(vec![]);
        }

        let mut tx = self.0.begin().await?;

        // Validate every account reference before inserting anything.
        let mut checked: HashSet<&str> = HashSet::new();
        for draft in &drafts {
            if checked.insert(draft.account_id.as_str())
                && !account_exists(&mut tx, &draft.account_id).await?
            {
                return Err(TransactionError::UnknownAccount(draft.account_id.clone()));
            }
        }

        let mut imported = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let transaction = draft.into_transaction(Uuid::new_v4().to_string());

            insert_transaction(&mut tx, &transaction).await?;
            adjust_balance(&mut tx, &transaction.account_id, transaction.signed_amount()).await?;

            imported.push(transaction);
        }

        tx.commit().await?;

        info!(count = imported.len(), "Imported transactions.");

        Ok(imported)
    }
}

#[async_trait]
impl<'a> CatalogCommands for SqliteCommands<'a> {
    async fn add_category(&self, draft: CategoryDraft) -> anyhow::Result<Category> {
        let category = draft.into_category(Uuid::new_v4().to_string());

        sqlx::query(
            r#"INSERT INTO categories (id, name, icon, color, "type") VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.icon)
        .bind(&category.color)
        .bind(category.kind.as_str())
        .execute(self.0)
        .await?;

        info!(id = %category.id, "Created category.");

        Ok(category)
    }

    async fn update_category(
        &self,
        category_id: &str,
        draft: CategoryDraft,
    ) -> Result<Category, CatalogError> {
        let category = draft.into_category(category_id.to_owned());

        let result = sqlx::query(
            r#"UPDATE categories SET name = ?, icon = ?, color = ?, "type" = ? WHERE id = ?"#,
        )
        .bind(&category.name)
        .bind(&category.icon)
        .bind(&category.color)
        .bind(category.kind.as_str())
        .bind(category_id)
        .execute(self.0)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }

        Ok(category)
    }

    async fn delete_category(&self, category_id: &str) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(category_id)
            .execute(self.0)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }

        Ok(())
    }

    async fn add_credit_card(&self, draft: CreditCardDraft) -> anyhow::Result<CreditCard> {
        let card = draft.into_credit_card(Uuid::new_v4().to_string());

        sqlx::query(
            r#"
            INSERT INTO credit_cards
                (id, name, brand, bank, limit_val, closing_day, due_day, color)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&card.id)
        .bind(&card.name)
        .bind(&card.brand)
        .bind(&card.bank)
        .bind(card.limit)
        .bind(i64::from(card.closing_day))
        .bind(i64::from(card.due_day))
        .bind(&card.color)
        .execute(self.0)
        .await?;

        info!(id = %card.id, "Created credit card.");

        Ok(card)
    }

    async fn update_credit_card(
        &self,
        card_id: &str,
        draft: CreditCardDraft,
    ) -> Result<CreditCard, CatalogError> {
        let card = draft.into_credit_card(card_id.to_owned());

        let result = sqlx::query(
            r#"
            UPDATE credit_cards
            SET name = ?, brand = ?, bank = ?, limit_val = ?, closing_day = ?,
                due_day = ?, color = ?
            WHERE id = ?
            "#,
        )
        .bind(&card.name)
        .bind(&card.brand)
        .bind(&card.bank)
        .bind(card.limit)
        .bind(i64::from(card.closing_day))
        .bind(i64::from(card.due_day))
        .bind(&card.color)
        .bind(card_id)
        .execute(self.0)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }

        Ok(card)
    }

    async fn delete_credit_card(&self, card_id: &str) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM credit_cards WHERE id = ?")
            .bind(card_id)
            .execute(self.0)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }

        Ok(())
    }

    async fn add_tag(&self, draft: TagDraft) -> anyhow::Result<Tag> {
        let tag = draft.into_tag(Uuid::new_v4().to_string());

        sqlx::query("INSERT INTO tags (id, name, color) VALUES (?, ?, ?)")
            .bind(&tag.id)
            .bind(&tag.name)
            .bind(&tag.color)
            .execute(self.0)
            .await?;

        info!(id = %tag.id, "Created tag.");

        Ok(tag)
    }

    async fn update_tag(&self, tag_id: &str, draft: TagDraft) -> Result<Tag, CatalogError> {
        let tag = draft.into_tag(tag_id.to_owned());

        let result = sqlx::query("UPDATE tags SET name = ?, color = ? WHERE id = ?")
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(tag_id)
            .execute(self.0)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }

        Ok(tag)
    }

    async fn delete_tag(&self, tag_id: &str) -> Result<(), CatalogError> {
        // Transactions keep any ids pointing at the removed tag; lookups for
        // them simply stop resolving.
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(tag_id)
            .execute(self.0)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }

        Ok(())
    }

    async fn set_account_balance(
        &self,
        account_id: &str,
        balance: f64,
    ) -> Result<(), CatalogError> {
        let result = sqlx::query("UPDATE accounts SET balance = ? WHERE id = ?")
            .bind(balance)
            .bind(account_id)
            .execute(self.0)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }

        info!(id = %account_id, "Overwrote account balance.");

        Ok(())
    }

    async fn save_settings(&self, settings: NotificationSettings) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_settings
                (id, card_due_reminders, transaction_reminders, reminder_time, days_before_due)
            VALUES (1, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                card_due_reminders = excluded.card_due_reminders,
                transaction_reminders = excluded.transaction_reminders,
                reminder_time = excluded.reminder_time,
                days_before_due = excluded.days_before_due
            "#,
        )
        .bind(settings.card_due_reminders)
        .bind(settings.transaction_reminders)
        .bind(&settings.reminder_time)
        .bind(i64::from(settings.days_before_due))
        .execute(self.0)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::ledger::domain::transactions::TransactionType;

    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("failed to run migrations");

        crate::database::seed_defaults(&pool)
            .await
            .expect("failed to seed defaults");

        pool
    }

    fn draft(amount: f64, kind: TransactionType, account_id: &str) -> TransactionDraft {
        TransactionDraft {
            description: "Mercado".to_owned(),
            amount,
            date: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            category: "Alimentação".to_owned(),
            kind,
            account_id: account_id.to_owned(),
            tags: vec![],
            credit_card_id: None,
        }
    }

    async fn balance(pool: &SqlitePool, account_id: &str) -> f64 {
        let (balance,): (f64,) = sqlx::query_as("SELECT balance FROM accounts WHERE id = ?")
            .bind(account_id)
            .fetch_one(pool)
            .await
            .expect("account should exist");

        balance
    }

    /// Every account's stored balance must equal the signed sum of its
    /// transactions.
    async fn assert_balances_consistent(pool: &SqlitePool) {
        let rows: Vec<(String, f64, f64)> = sqlx::query_as(
            r#"
            SELECT a.id, a.balance,
                COALESCE(SUM(CASE WHEN t."type" = 'income' THEN t.amount ELSE -t.amount END), 0.0)
            FROM accounts a
            LEFT JOIN transactions t ON t.account_id = a.id
            GROUP BY a.id
            "#,
        )
        .fetch_all(pool)
        .await
        .expect("balance query should succeed");

        for (account_id, stored, derived) in rows {
            assert!(
                (stored - derived).abs() < 1e-9,
                "account {account_id}: stored balance {stored} != derived {derived}"
            );
        }
    }

    #[tokio::test]
    async fn add_and_delete_round_trip_restores_balances() {
        let pool = test_pool().await;
        let commands = SqliteCommands(&pool);

        let income = commands
            .add_transaction(draft(100.0, TransactionType::Income, "1"))
            .await
            .expect("add income");
        assert_eq!(100.0, balance(&pool, "1").await);
        assert_balances_consistent(&pool).await;

        let expense = commands
            .add_transaction(draft(30.0, TransactionType::Expense, "1"))
            .await
            .expect("add expense");
        assert_eq!(70.0, balance(&pool, "1").await);
        assert_balances_consistent(&pool).await;

        commands
            .delete_transaction(&expense.id)
            .await
            .expect("delete expense");
        assert_eq!(100.0, balance(&pool, "1").await);

        commands
            .delete_transaction(&income.id)
            .await
            .expect("delete income");
        assert_eq!(0.0, balance(&pool, "1").await);
        assert_balances_consistent(&pool).await;
    }

    #[tokio::test]
    async fn add_rejects_unknown_account() {
        let pool = test_pool().await;
        let commands = SqliteCommands(&pool);

        let error = commands
            .add_transaction(draft(10.0, TransactionType::Expense, "missing"))
            .await
            .expect_err("unknown account should be rejected");

        assert!(matches!(error, TransactionError::UnknownAccount(id) if id == "missing"));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(0, count);
    }

    #[tokio::test]
    async fn description_update_leaves_balances_untouched() {
        let pool = test_pool().await;
        let commands = SqliteCommands(&pool);

        let transaction = commands
            .add_transaction(draft(50.0, TransactionType::Expense, "1"))
            .await
            .expect("add");

        let updated = commands
            .update_transaction(
                &transaction.id,
                TransactionPatch {
                    description: Some("Feira".to_owned()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");

        assert_eq!("Feira", updated.description);
        assert_eq!(-50.0, balance(&pool, "1").await);
        assert_balances_consistent(&pool).await;
    }

    #[tokio::test]
    async fn account_move_shifts_contribution() {
        let pool = test_pool().await;
        let commands = SqliteCommands(&pool);

        let transaction = commands
            .add_transaction(draft(100.0, TransactionType::Income, "1"))
            .await
            .expect("add");
        assert_eq!(100.0, balance(&pool, "1").await);
        assert_eq!(0.0, balance(&pool, "2").await);

        commands
            .update_transaction(
                &transaction.id,
                TransactionPatch {
                    account_id: Some("2".to_owned()),
                    ..Default::default()
                },
            )
            .await
            .expect("move to other account");

        assert_eq!(0.0, balance(&pool, "1").await);
        assert_eq!(100.0, balance(&pool, "2").await);
        assert_balances_consistent(&pool).await;
    }

    #[tokio::test]
    async fn amount_and_type_update_reconciles_from_snapshot() {
        let pool = test_pool().await;
        let commands = SqliteCommands(&pool);

        let transaction = commands
            .add_transaction(draft(50.0, TransactionType::Expense, "1"))
            .await
            .expect("add");
        assert_eq!(-50.0, balance(&pool, "1").await);

        commands
            .update_transaction(
                &transaction.id,
                TransactionPatch {
                    amount: Some(80.0),
                    kind: Some(TransactionType::Income),
                    ..Default::default()
                },
            )
            .await
            .expect("update amount and type");

        assert_eq!(80.0, balance(&pool, "1").await);
        assert_balances_consistent(&pool).await;
    }

    #[tokio::test]
    async fn update_unknown_transaction_is_not_found() {
        let pool = test_pool().await;
        let commands = SqliteCommands(&pool);

        let error = commands
            .update_transaction("missing", TransactionPatch::default())
            .await
            .expect_err("unknown id should fail");

        assert!(matches!(error, TransactionError::TransactionNotFound));
    }

    #[tokio::test]
    async fn delete_unknown_transaction_is_not_found() {
        let pool = test_pool().await;
        let commands = SqliteCommands(&pool);

        let error = commands
            .delete_transaction("missing")
            .await
            .expect_err("unknown id should fail");

        assert!(matches!(error, TransactionError::TransactionNotFound));
    }

    #[tokio::test]
    async fn import_reconciles_balances_and_mints_ids() {
        let pool = test_pool().await;
        let commands = SqliteCommands(&pool);

        let imported = commands
            .import_transactions(vec![
                draft(100.0, TransactionType::Income, "1"),
                draft(30.0, TransactionType::Expense, "1"),
                draft(20.0, TransactionType::Income, "2"),
            ])
            .await
            .expect("import");

        assert_eq!(3, imported.len());
        assert_ne!(imported[0].id, imported[1].id);
        assert_eq!(70.0, balance(&pool, "1").await);
        assert_eq!(20.0, balance(&pool, "2").await);
        assert_balances_consistent(&pool).await;
    }

    #[tokio::test]
    async fn import_with_unknown_account_imports_nothing() {
        let pool = test_pool().await;
        let commands = SqliteCommands(&pool);

        let error = commands
            .import_transactions(vec![
                draft(100.0, TransactionType::Income, "1"),
                draft(30.0, TransactionType::Expense, "missing"),
            ])
            .await
            .expect_err("unknown account should fail the batch");

        assert!(matches!(error, TransactionError::UnknownAccount(_)));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(0, count);
        assert_eq!(0.0, balance(&pool, "1").await);
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let pool = test_pool().await;
        let commands = SqliteCommands(&pool);

        let settings = NotificationSettings {
            card_due_reminders: false,
            transaction_reminders: true,
            reminder_time: "07:30".to_owned(),
            days_before_due: 5,
        };

        commands
            .save_settings(settings.clone())
            .await
            .expect("save settings");

        let row: models::NotificationSettings =
            sqlx::query_as("SELECT * FROM notification_settings WHERE id = 1")
                .fetch_one(&pool)
                .await
                .expect("settings row should exist");

        assert_eq!(settings, row.into());
    }
}
