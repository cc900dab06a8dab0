use chrono::Utc;

use crate::database::SqliteConnection;

use super::{
    domain::{interchange, reports},
    queries::{sqlite::SqliteQueries, CatalogQueries, TransactionQueries},
};

/// Read-side entry point over the ledger.
///
/// Every method fetches a fresh snapshot and derives its answer with the pure
/// functions in [`reports`]; nothing is cached between mutations.
#[derive(Clone)]
pub struct LedgerService {
    db: SqliteConnection,
}

impl LedgerService {
    pub fn new(db: SqliteConnection) -> Self {
        Self { db }
    }

    fn queries(&self) -> SqliteQueries {
        SqliteQueries(self.db.clone())
    }

    pub async fn summary(&self) -> anyhow::Result<reports::Summary> {
        let queries = self.queries();

        let accounts = queries.list_accounts().await?;
        let transactions = queries.list_transactions().await?;

        Ok(reports::summary(
            &accounts,
            &transactions,
            Utc::now().date_naive(),
        ))
    }

    pub async fn category_breakdown(&self) -> anyhow::Result<Vec<reports::BreakdownSlice>> {
        let queries = self.queries();

        let categories = queries.list_categories().await?;
        let transactions = queries.list_transactions().await?;

        Ok(reports::category_breakdown(&transactions, &categories))
    }

    pub async fn tag_breakdown(&self) -> anyhow::Result<Vec<reports::BreakdownSlice>> {
        let queries = self.queries();

        let tags = queries.list_tags().await?;
        let transactions = queries.list_transactions().await?;

        Ok(reports::tag_breakdown(&transactions, &tags))
    }

    pub async fn credit_card_breakdown(&self) -> anyhow::Result<Vec<reports::BreakdownSlice>> {
        let queries = self.queries();

        let cards = queries.list_credit_cards().await?;
        let transactions = queries.list_transactions().await?;

        Ok(reports::credit_card_breakdown(&transactions, &cards))
    }

    pub async fn cash_flow(&self) -> anyhow::Result<Vec<reports::CashFlowPoint>> {
        let transactions = self.queries().list_transactions().await?;

        Ok(reports::cash_flow_series(
            &transactions,
            Utc::now().date_naive(),
        ))
    }

    pub async fn report(&self, query: reports::ReportQuery) -> anyhow::Result<reports::FilteredReport> {
        let transactions = self.queries().list_transactions().await?;

        Ok(reports::filter_transactions(&transactions, &query))
    }

    pub async fn export_csv(&self) -> anyhow::Result<String> {
        let transactions = self.queries().list_transactions().await?;

        interchange::to_csv(&transactions)
    }
}
