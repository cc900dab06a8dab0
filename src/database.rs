use std::ops::Deref;

use sqlx::SqlitePool;
use tracing::info;

#[derive(Clone)]
pub struct SqliteConnection(SqlitePool);

impl SqliteConnection {
    pub fn new(pool: SqlitePool) -> Self {
        Self(pool)
    }
}

impl Deref for SqliteConnection {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Accounts created on first startup, matching the stock install.
const DEFAULT_ACCOUNTS: [(&str, &str, &str, &str); 2] = [
    ("1", "Carteira", "#000000", "Wallet"),
    ("2", "Conta Corrente", "#333333", "Banknote"),
];

const DEFAULT_CATEGORIES: [(&str, &str, &str, &str, &str); 6] = [
    ("c1", "Alimentação", "Utensils", "#f59e0b", "expense"),
    ("c2", "Transporte", "Car", "#3b82f6", "expense"),
    ("c3", "Lazer", "Gamepad2", "#8b5cf6", "expense"),
    ("c4", "Saúde", "HeartPulse", "#ef4444", "expense"),
    ("c5", "Salário", "DollarSign", "#10b981", "income"),
    ("c6", "Investimentos", "TrendingUp", "#000000", "income"),
];

/// Insert the default accounts and categories if their tables are empty. The
/// seed runs on every startup and is a no-op once data exists.
pub async fn seed_defaults(pool: &SqlitePool) -> anyhow::Result<()> {
    let (account_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;

    if account_count == 0 {
        for (id, name, color, icon) in DEFAULT_ACCOUNTS {
            sqlx::query(
                "INSERT INTO accounts (id, name, balance, color, icon) VALUES (?, ?, 0, ?, ?)",
            )
            .bind(id)
            .bind(name)
            .bind(color)
            .bind(icon)
            .execute(pool)
            .await?;
        }

        info!(count = DEFAULT_ACCOUNTS.len(), "Seeded default accounts.");
    }

    let (category_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;

    if category_count == 0 {
        for (id, name, icon, color, kind) in DEFAULT_CATEGORIES {
            sqlx::query(
                r#"INSERT INTO categories (id, name, icon, color, "type") VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(id)
            .bind(name)
            .bind(icon)
            .bind(color)
            .bind(kind)
            .execute(pool)
            .await?;
        }

        info!(
            count = DEFAULT_CATEGORIES.len(),
            "Seeded default categories."
        );
    }

    Ok(())
}
