use serde::{Deserialize, Serialize};

/// A place money lives (wallet, bank account, ...).
///
/// `balance` is derived-but-stored: it always equals the signed sum of the
/// amounts of the transactions referencing the account. Only the ledger
/// commands may adjust it alongside a transaction mutation; the one exception
/// is the explicit balance write exposed for manual corrections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub color: String,
    pub icon: String,
}
