//! Row types mapping the SQLite schema to the domain. Enum-ish and encoded
//! columns (`type`, `tags`) are stored as text and decoded here.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::domain;

#[derive(Clone, Debug, FromRow)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub category: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub account_id: String,
    /// JSON-encoded list of tag ids.
    pub tags: String,
    pub credit_card_id: Option<String>,
}

impl Transaction {
    pub fn try_into_domain(self) -> anyhow::Result<domain::transactions::Transaction> {
        let kind = self
            .kind
            .parse()
            .with_context(|| format!("transaction {} has an invalid type", self.id))?;
        let tags: Vec<String> = serde_json::from_str(&self.tags)
            .with_context(|| format!("transaction {} has an invalid tag list", self.id))?;

        Ok(domain::transactions::Transaction {
            id: self.id,
            description: self.description,
            amount: self.amount,
            date: self.date,
            category: self.category,
            kind,
            account_id: self.account_id,
            tags,
            credit_card_id: self.credit_card_id,
        })
    }
}

/// Encode a tag list for storage.
pub fn encode_tags(tags: &[String]) -> anyhow::Result<String> {
    serde_json::to_string(tags).context("Failed to encode tag list.")
}

#[derive(Clone, Debug, FromRow)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub color: String,
    pub icon: String,
}

impl From<Account> for domain::accounts::Account {
    fn from(row: Account) -> Self {
        Self {
            id: row.id,
            name: row.name,
            balance: row.balance,
            color: row.color,
            icon: row.icon,
        }
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[sqlx(rename = "type")]
    pub kind: String,
}

impl Category {
    pub fn try_into_domain(self) -> anyhow::Result<domain::categories::Category> {
        let kind = self
            .kind
            .parse()
            .with_context(|| format!("category {} has an invalid type", self.id))?;

        Ok(domain::categories::Category {
            id: self.id,
            name: self.name,
            icon: self.icon,
            color: self.color,
            kind,
        })
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct CreditCard {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub bank: String,
    pub limit_val: f64,
    pub closing_day: i64,
    pub due_day: i64,
    pub color: String,
}

impl From<CreditCard> for domain::credit_cards::CreditCard {
    fn from(row: CreditCard) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            bank: row.bank,
            limit: row.limit_val,
            closing_day: row.closing_day as u8,
            due_day: row.due_day as u8,
            color: row.color,
        }
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl From<Tag> for domain::tags::Tag {
    fn from(row: Tag) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
        }
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct NotificationSettings {
    pub card_due_reminders: bool,
    pub transaction_reminders: bool,
    pub reminder_time: String,
    pub days_before_due: i64,
}

impl From<NotificationSettings> for domain::settings::NotificationSettings {
    fn from(row: NotificationSettings) -> Self {
        Self {
            card_due_reminders: row.card_due_reminders,
            transaction_reminders: row.transaction_reminders,
            reminder_time: row.reminder_time,
            days_before_due: row.days_before_due as u8,
        }
    }
}
