//! CSV interchange for the transaction collection.
//!
//! The export includes every transaction field except the id so that an
//! export can be re-imported losslessly (ids are minted on import). Parsing
//! validates the whole document before anything is handed to the ledger;
//! a malformed record fails the entire import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::transactions::{Transaction, TransactionDraft};

/// Separator for the tag list inside a single CSV field.
const TAG_SEPARATOR: char = ';';

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed csv: {0}")]
    Malformed(#[from] csv::Error),
    #[error("record {record}: {message}")]
    InvalidRecord { record: usize, message: String },
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct CsvRecord {
    date: DateTime<Utc>,
    description: String,
    category: String,
    #[serde(rename = "type")]
    kind: String,
    amount: f64,
    account_id: String,
    tags: String,
    credit_card_id: Option<String>,
}

impl From<&Transaction> for CsvRecord {
    fn from(transaction: &Transaction) -> Self {
        Self {
            date: transaction.date,
            description: transaction.description.clone(),
            category: transaction.category.clone(),
            kind: transaction.kind.as_str().to_owned(),
            amount: transaction.amount,
            account_id: transaction.account_id.clone(),
            tags: transaction.tags.join(&TAG_SEPARATOR.to_string()),
            credit_card_id: transaction.credit_card_id.clone(),
        }
    }
}

impl CsvRecord {
    fn try_into_draft(self, record: usize) -> Result<TransactionDraft, ParseError> {
        let kind = self
            .kind
            .parse()
            .map_err(|error| ParseError::InvalidRecord {
                record,
                message: format!("{error}"),
            })?;

        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ParseError::InvalidRecord {
                record,
                message: format!("amount must be a non-negative number, got {}", self.amount),
            });
        }

        let tags = self
            .tags
            .split(TAG_SEPARATOR)
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(TransactionDraft {
            description: self.description,
            amount: self.amount,
            date: self.date,
            category: self.category,
            kind,
            account_id: self.account_id,
            tags,
            credit_card_id: self.credit_card_id.filter(|id| !id.is_empty()),
        })
    }
}

/// Serialize the transaction collection to CSV. Quoting of fields containing
/// the delimiter is handled by the csv writer.
pub fn to_csv(transactions: &[Transaction]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);

    for transaction in transactions {
        writer.serialize(CsvRecord::from(transaction))?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

/// Parse a CSV document into transaction drafts. The whole document is parsed
/// before returning so a partial import can never happen.
pub fn from_csv(data: &str) -> Result<Vec<TransactionDraft>, ParseError> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let mut drafts = Vec::new();

    for (index, record) in reader.deserialize::<CsvRecord>().enumerate() {
        // Line 1 holds the header.
        drafts.push(record?.try_into_draft(index + 2)?);
    }

    Ok(drafts)
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use crate::ledger::domain::transactions::TransactionType;

    use super::*;

    fn transaction(id: &str, description: &str, amount: f64) -> Transaction {
        Transaction {
            id: id.to_owned(),
            description: description.to_owned(),
            amount,
            date: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            category: "Alimentação".to_owned(),
            kind: TransactionType::Expense,
            account_id: "1".to_owned(),
            tags: vec!["tag-a".to_owned(), "tag-b".to_owned()],
            credit_card_id: Some("card-1".to_owned()),
        }
    }

    #[test]
    fn round_trip_preserves_fields() {
        let original = vec![
            transaction("t1", "Mercado, feira da semana", 123.45),
            transaction("t2", "Posto \"Shell\"", 200.0),
        ];

        let csv = to_csv(&original).expect("export should succeed");
        let drafts = from_csv(&csv).expect("re-import should succeed");

        assert_eq!(original.len(), drafts.len());

        for (transaction, draft) in original.iter().zip(&drafts) {
            assert_eq!(transaction.description, draft.description);
            assert_eq!(transaction.amount, draft.amount);
            assert_eq!(transaction.date, draft.date);
            assert_eq!(transaction.category, draft.category);
            assert_eq!(transaction.kind, draft.kind);
            assert_eq!(transaction.account_id, draft.account_id);
            assert_eq!(transaction.tags, draft.tags);
            assert_eq!(transaction.credit_card_id, draft.credit_card_id);
        }
    }

    #[test]
    fn empty_optional_fields() {
        let mut original = transaction("t1", "Mercado", 10.0);
        original.tags = vec![];
        original.credit_card_id = None;

        let csv = to_csv(&[original]).expect("export should succeed");
        let drafts = from_csv(&csv).expect("re-import should succeed");

        assert!(drafts[0].tags.is_empty());
        assert_eq!(None, drafts[0].credit_card_id);
    }

    #[test]
    fn unknown_type_fails() {
        let csv = "date,description,category,type,amount,accountId,tags,creditCardId\n\
                   2024-01-15T12:00:00Z,Mercado,Alimentação,transfer,10.0,1,,\n";

        let error = from_csv(csv).expect_err("unknown type should fail");

        assert!(matches!(
            error,
            ParseError::InvalidRecord { record: 2, .. }
        ));
    }

    #[test]
    fn negative_amount_fails() {
        let csv = "date,description,category,type,amount,accountId,tags,creditCardId\n\
                   2024-01-15T12:00:00Z,Mercado,Alimentação,expense,-10.0,1,,\n";

        let error = from_csv(csv).expect_err("negative amount should fail");

        assert!(matches!(error, ParseError::InvalidRecord { .. }));
    }

    #[test]
    fn truncated_row_fails() {
        let csv = "date,description,category,type,amount,accountId,tags,creditCardId\n\
                   2024-01-15T12:00:00Z,Mercado\n";

        assert!(from_csv(csv).is_err());
    }
}
