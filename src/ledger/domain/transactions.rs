use std::str::FromStr;

use chrono::{DateTime, Utc};
use semval::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a transaction adds money to an account or removes it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// The signed contribution of an amount of this type to an account
    /// balance.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

#[derive(Debug, Error)]
#[error("unrecognized transaction type: {0}")]
pub struct UnknownTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(UnknownTransactionType(other.to_owned())),
        }
    }
}

/// A money movement recorded against an account.
///
/// The `category` field references a category by *name* rather than by id.
/// This mirrors how the data has always been stored; renaming a category does
/// not rewrite historical transactions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    /// Non-negative magnitude. The sign comes from `kind`.
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub account_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card_id: Option<String>,
}

impl Transaction {
    /// The transaction's contribution to its account's balance.
    pub fn signed_amount(&self) -> f64 {
        self.kind.signed(self.amount)
    }
}

/// A transaction payload before an id has been assigned.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub description: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub account_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub credit_card_id: Option<String>,
}

impl TransactionDraft {
    pub fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            description: self.description,
            amount: self.amount,
            date: self.date,
            category: self.category,
            kind: self.kind,
            account_id: self.account_id,
            tags: self.tags,
            credit_card_id: self.credit_card_id,
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum TransactionDraftInvalidity {
    /// The description contains no visible characters.
    MissingDescription,
    /// The amount is a magnitude and may not be negative.
    NegativeAmount,
    /// The amount is NaN or infinite.
    NonFiniteAmount,
}

impl Validate for TransactionDraft {
    type Invalidity = TransactionDraftInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                self.description.trim().is_empty(),
                TransactionDraftInvalidity::MissingDescription,
            )
            .invalidate_if(
                self.amount < 0.0,
                TransactionDraftInvalidity::NegativeAmount,
            )
            .invalidate_if(
                !self.amount.is_finite(),
                TransactionDraftInvalidity::NonFiniteAmount,
            )
            .into()
    }
}

/// A partial update to an existing transaction. Absent fields keep their
/// current value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub account_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub credit_card_id: Option<String>,
}

impl TransactionPatch {
    /// Merge the patch over an existing transaction, preserving its id.
    pub fn apply_to(self, base: Transaction) -> Transaction {
        Transaction {
            id: base.id,
            description: self.description.unwrap_or(base.description),
            amount: self.amount.unwrap_or(base.amount),
            date: self.date.unwrap_or(base.date),
            category: self.category.unwrap_or(base.category),
            kind: self.kind.unwrap_or(base.kind),
            account_id: self.account_id.unwrap_or(base.account_id),
            tags: self.tags.unwrap_or(base.tags),
            credit_card_id: self.credit_card_id.or(base.credit_card_id),
        }
    }
}

impl Validate for TransactionPatch {
    type Invalidity = TransactionDraftInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                self.description
                    .as_ref()
                    .map_or(false, |d| d.trim().is_empty()),
                TransactionDraftInvalidity::MissingDescription,
            )
            .invalidate_if(
                self.amount.map_or(false, |a| a < 0.0),
                TransactionDraftInvalidity::NegativeAmount,
            )
            .invalidate_if(
                self.amount.map_or(false, |a| !a.is_finite()),
                TransactionDraftInvalidity::NonFiniteAmount,
            )
            .into()
    }
}

/// Compute the account balance adjustments needed when `old` is replaced by
/// `new`.
///
/// The old contribution is reverted before the new one is applied so that an
/// update staying on the same account nets into a single delta instead of
/// double counting. Returns an empty list when none of amount, type, or
/// account changed.
pub fn rebalance_deltas(old: &Transaction, new: &Transaction) -> Vec<(String, f64)> {
    if old.amount == new.amount && old.kind == new.kind && old.account_id == new.account_id {
        return vec![];
    }

    let mut deltas: Vec<(String, f64)> = Vec::new();

    push_delta(&mut deltas, &old.account_id, -old.signed_amount());
    push_delta(&mut deltas, &new.account_id, new.signed_amount());

    deltas
}

fn push_delta(deltas: &mut Vec<(String, f64)>, account_id: &str, delta: f64) {
    match deltas.iter_mut().find(|(id, _)| id == account_id) {
        Some((_, existing)) => *existing += delta,
        None => deltas.push((account_id.to_owned(), delta)),
    }
}
