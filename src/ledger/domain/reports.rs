//! Read-only views derived from the current ledger snapshot.
//!
//! Everything here is a pure function over in-memory data. Nothing is cached
//! between mutations; callers fetch a fresh snapshot and recompute.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use super::{
    accounts::Account,
    categories::Category,
    credit_cards::CreditCard,
    tags::Tag,
    transactions::{Transaction, TransactionType},
};

/// The headline numbers shown on the dashboard.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub total_balance: f64,
    pub monthly_income: f64,
    pub monthly_expense: f64,
}

/// A grouped expense total for one slice of a breakdown dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct BreakdownSlice {
    /// Category name, tag id, or credit card id depending on the dimension.
    pub key: String,
    pub label: String,
    pub color: String,
    pub total: f64,
}

/// Net amount moved on a single day.
#[derive(Clone, Debug, PartialEq)]
pub struct CashFlowPoint {
    pub day: NaiveDate,
    pub net: f64,
}

pub fn total_balance(accounts: &[Account]) -> f64 {
    accounts.iter().map(|account| account.balance).sum()
}

fn in_month(transaction: &Transaction, month: NaiveDate) -> bool {
    let date = transaction.date.date_naive();

    date.year() == month.year() && date.month() == month.month()
}

pub fn monthly_income(transactions: &[Transaction], today: NaiveDate) -> f64 {
    monthly_total(transactions, today, TransactionType::Income)
}

pub fn monthly_expense(transactions: &[Transaction], today: NaiveDate) -> f64 {
    monthly_total(transactions, today, TransactionType::Expense)
}

fn monthly_total(transactions: &[Transaction], today: NaiveDate, kind: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|t| t.kind == kind && in_month(t, today))
        .map(|t| t.amount)
        .sum()
}

pub fn summary(accounts: &[Account], transactions: &[Transaction], today: NaiveDate) -> Summary {
    Summary {
        total_balance: total_balance(accounts),
        monthly_income: monthly_income(transactions, today),
        monthly_expense: monthly_expense(transactions, today),
    }
}

/// Expense totals grouped by category name. Categories whose computed total
/// is not positive are omitted.
pub fn category_breakdown(transactions: &[Transaction], categories: &[Category]) -> Vec<BreakdownSlice> {
    categories
        .iter()
        .filter(|category| category.kind == TransactionType::Expense)
        .filter_map(|category| {
            let total: f64 = transactions
                .iter()
                .filter(|t| t.kind == TransactionType::Expense && t.category == category.name)
                .map(|t| t.amount)
                .sum();

            (total > 0.0).then(|| BreakdownSlice {
                key: category.name.clone(),
                label: category.name.clone(),
                color: category.color.clone(),
                total,
            })
        })
        .collect()
}

/// Expense totals grouped by tag, largest first. Tags with no positive total
/// are omitted.
pub fn tag_breakdown(transactions: &[Transaction], tags: &[Tag]) -> Vec<BreakdownSlice> {
    let mut slices: Vec<BreakdownSlice> = tags
        .iter()
        .filter_map(|tag| {
            let total: f64 = transactions
                .iter()
                .filter(|t| t.kind == TransactionType::Expense && t.tags.contains(&tag.id))
                .map(|t| t.amount)
                .sum();

            (total > 0.0).then(|| BreakdownSlice {
                key: tag.id.clone(),
                label: tag.name.clone(),
                color: tag.color.clone(),
                total,
            })
        })
        .collect();

    slices.sort_by(|a, b| b.total.total_cmp(&a.total));

    slices
}

/// Expense totals grouped by credit card, largest first.
pub fn credit_card_breakdown(
    transactions: &[Transaction],
    cards: &[CreditCard],
) -> Vec<BreakdownSlice> {
    let mut slices: Vec<BreakdownSlice> = cards
        .iter()
        .filter_map(|card| {
            let total: f64 = transactions
                .iter()
                .filter(|t| {
                    t.kind == TransactionType::Expense
                        && t.credit_card_id.as_deref() == Some(card.id.as_str())
                })
                .map(|t| t.amount)
                .sum();

            (total > 0.0).then(|| BreakdownSlice {
                key: card.id.clone(),
                label: card.name.clone(),
                color: card.color.clone(),
                total,
            })
        })
        .collect();

    slices.sort_by(|a, b| b.total.total_cmp(&a.total));

    slices
}

/// Net amount per calendar day for the current month, in chronological order.
/// Days without transactions are absent rather than zero-filled.
pub fn cash_flow_series(transactions: &[Transaction], today: NaiveDate) -> Vec<CashFlowPoint> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for transaction in transactions.iter().filter(|t| in_month(t, today)) {
        *days.entry(transaction.date.date_naive()).or_insert(0.0) +=
            transaction.signed_amount();
    }

    days.into_iter()
        .map(|(day, net)| CashFlowPoint { day, net })
        .collect()
}

/// Filters for [`filter_transactions`]. Unset dimensions pass everything
/// through.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: Option<String>,
    pub tag: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
}

/// The outcome of a report query: matching transactions, newest first, and
/// their net signed total.
#[derive(Clone, Debug, PartialEq)]
pub struct FilteredReport {
    pub transactions: Vec<Transaction>,
    pub net_total: f64,
}

/// Select the transactions dated within `[start_date, end_date]` (inclusive)
/// that match every provided filter.
pub fn filter_transactions(transactions: &[Transaction], query: &ReportQuery) -> FilteredReport {
    let mut matched: Vec<Transaction> = transactions
        .iter()
        .filter(|t| {
            let date = t.date.date_naive();

            date >= query.start_date && date <= query.end_date
        })
        .filter(|t| {
            query
                .category
                .as_ref()
                .map_or(true, |category| &t.category == category)
        })
        .filter(|t| query.tag.as_ref().map_or(true, |tag| t.tags.contains(tag)))
        .filter(|t| query.kind.map_or(true, |kind| t.kind == kind))
        .cloned()
        .collect();

    matched.sort_by(|a, b| b.date.cmp(&a.date));

    let net_total = matched.iter().map(Transaction::signed_amount).sum();

    FilteredReport {
        transactions: matched,
        net_total,
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn transaction(
        id: &str,
        amount: f64,
        kind: TransactionType,
        date: (i32, u32, u32),
        category: &str,
    ) -> Transaction {
        Transaction {
            id: id.to_owned(),
            description: format!("transaction {id}"),
            amount,
            date: Utc
                .with_ymd_and_hms(date.0, date.1, date.2, 12, 0, 0)
                .unwrap(),
            category: category.to_owned(),
            kind,
            account_id: "1".to_owned(),
            tags: vec![],
            credit_card_id: None,
        }
    }

    fn account(id: &str, balance: f64) -> Account {
        Account {
            id: id.to_owned(),
            name: format!("account {id}"),
            balance,
            color: "#000000".to_owned(),
            icon: "Wallet".to_owned(),
        }
    }

    fn expense_category(name: &str) -> Category {
        Category {
            id: name.to_owned(),
            name: name.to_owned(),
            icon: "Utensils".to_owned(),
            color: "#f59e0b".to_owned(),
            kind: TransactionType::Expense,
        }
    }

    const TODAY: (i32, u32, u32) = (2024, 1, 20);

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(TODAY.0, TODAY.1, TODAY.2).unwrap()
    }

    #[test]
    fn total_balance_sums_accounts() {
        let accounts = vec![account("1", 70.0), account("2", -20.0)];

        assert_eq!(50.0, total_balance(&accounts));
    }

    #[test]
    fn monthly_totals_ignore_other_months() {
        let transactions = vec![
            transaction("a", 100.0, TransactionType::Income, (2024, 1, 5), "Salário"),
            transaction("b", 30.0, TransactionType::Expense, (2024, 1, 15), "Lazer"),
            // Last month and last year must contribute nothing.
            transaction("c", 999.0, TransactionType::Income, (2023, 12, 28), "Salário"),
            transaction("d", 999.0, TransactionType::Expense, (2023, 1, 15), "Lazer"),
        ];

        assert_eq!(100.0, monthly_income(&transactions, today()));
        assert_eq!(30.0, monthly_expense(&transactions, today()));
    }

    #[test]
    fn category_breakdown_skips_empty_categories() {
        let categories = vec![expense_category("Alimentação"), expense_category("Lazer")];
        let transactions = vec![
            transaction("a", 40.0, TransactionType::Expense, (2024, 1, 5), "Alimentação"),
            transaction("b", 10.0, TransactionType::Expense, (2024, 1, 6), "Alimentação"),
            // Income in a matching category name must not count.
            transaction("c", 75.0, TransactionType::Income, (2024, 1, 7), "Lazer"),
        ];

        let breakdown = category_breakdown(&transactions, &categories);

        assert_eq!(1, breakdown.len());
        assert_eq!("Alimentação", breakdown[0].key);
        assert_eq!(50.0, breakdown[0].total);
        assert_eq!("#f59e0b", breakdown[0].color);
    }

    #[test]
    fn tag_breakdown_sorts_descending() {
        let tags = vec![
            Tag {
                id: "t-small".to_owned(),
                name: "viagem".to_owned(),
                color: "#111111".to_owned(),
            },
            Tag {
                id: "t-big".to_owned(),
                name: "casa".to_owned(),
                color: "#222222".to_owned(),
            },
            Tag {
                id: "t-unused".to_owned(),
                name: "pets".to_owned(),
                color: "#333333".to_owned(),
            },
        ];

        let mut small = transaction("a", 10.0, TransactionType::Expense, (2024, 1, 5), "Lazer");
        small.tags = vec!["t-small".to_owned()];
        let mut big = transaction("b", 90.0, TransactionType::Expense, (2024, 1, 6), "Lazer");
        big.tags = vec!["t-big".to_owned()];

        let breakdown = tag_breakdown(&[small, big], &tags);

        assert_eq!(2, breakdown.len());
        assert_eq!("t-big", breakdown[0].key);
        assert_eq!(90.0, breakdown[0].total);
        assert_eq!("t-small", breakdown[1].key);
    }

    #[test]
    fn credit_card_breakdown_groups_by_card() {
        let cards = vec![CreditCard {
            id: "card-1".to_owned(),
            name: "Platinum".to_owned(),
            brand: "Visa".to_owned(),
            bank: "Nubank".to_owned(),
            limit: 5000.0,
            closing_day: 28,
            due_day: 5,
            color: "#7c3aed".to_owned(),
        }];

        let mut on_card = transaction("a", 120.0, TransactionType::Expense, (2024, 1, 5), "Lazer");
        on_card.credit_card_id = Some("card-1".to_owned());
        let off_card = transaction("b", 60.0, TransactionType::Expense, (2024, 1, 6), "Lazer");

        let breakdown = credit_card_breakdown(&[on_card, off_card], &cards);

        assert_eq!(1, breakdown.len());
        assert_eq!("card-1", breakdown[0].key);
        assert_eq!(120.0, breakdown[0].total);
    }

    #[test]
    fn cash_flow_series_is_chronological() {
        let transactions = vec![
            transaction("a", 30.0, TransactionType::Expense, (2024, 1, 15), "Lazer"),
            transaction("b", 100.0, TransactionType::Income, (2024, 1, 2), "Salário"),
            transaction("c", 10.0, TransactionType::Expense, (2024, 1, 2), "Lazer"),
            // Out of month.
            transaction("d", 999.0, TransactionType::Income, (2023, 12, 30), "Salário"),
        ];

        let series = cash_flow_series(&transactions, today());

        assert_eq!(
            vec![
                CashFlowPoint {
                    day: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    net: 90.0,
                },
                CashFlowPoint {
                    day: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                    net: -30.0,
                },
            ],
            series
        );
    }

    #[test]
    fn filter_by_range_and_type() {
        let transactions = vec![
            transaction("a", 50.0, TransactionType::Expense, (2024, 1, 15), "Lazer"),
            transaction("b", 20.0, TransactionType::Income, (2024, 1, 20), "Salário"),
        ];

        let report = filter_transactions(
            &transactions,
            &ReportQuery {
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                category: None,
                tag: None,
                kind: Some(TransactionType::Expense),
            },
        );

        assert_eq!(1, report.transactions.len());
        assert_eq!("a", report.transactions[0].id);
        assert_eq!(-50.0, report.net_total);
    }

    #[test]
    fn filter_range_is_inclusive_and_sorted_descending() {
        let transactions = vec![
            transaction("a", 10.0, TransactionType::Expense, (2024, 1, 1), "Lazer"),
            transaction("b", 20.0, TransactionType::Expense, (2024, 1, 31), "Lazer"),
            transaction("c", 30.0, TransactionType::Expense, (2024, 2, 1), "Lazer"),
        ];

        let report = filter_transactions(
            &transactions,
            &ReportQuery {
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                category: None,
                tag: None,
                kind: None,
            },
        );

        let ids: Vec<&str> = report
            .transactions
            .iter()
            .map(|t| t.id.as_str())
            .collect();

        assert_eq!(vec!["b", "a"], ids);
        assert_eq!(-30.0, report.net_total);
    }

    #[test]
    fn filter_empty_result() {
        let report = filter_transactions(
            &[],
            &ReportQuery {
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                category: None,
                tag: None,
                kind: None,
            },
        );

        assert!(report.transactions.is_empty());
        assert_eq!(0.0, report.net_total);
    }

    #[test]
    fn summary_combines_balances_and_monthly_flows() {
        let accounts = vec![account("1", 70.0)];
        let transactions = vec![
            transaction("a", 100.0, TransactionType::Income, (2024, 1, 5), "Salário"),
            transaction("b", 30.0, TransactionType::Expense, (2024, 1, 15), "Lazer"),
        ];

        assert_eq!(
            Summary {
                total_balance: 70.0,
                monthly_income: 100.0,
                monthly_expense: 30.0,
            },
            summary(&accounts, &transactions, today())
        );
    }
}
