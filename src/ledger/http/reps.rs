use semval::context::Context as ValidationContext;
use serde::Serialize;

use crate::ledger::domain::{
    credit_cards::CreditCardInvalidity,
    reports,
    settings::NotificationSettingsInvalidity,
    transactions::{Transaction, TransactionDraftInvalidity},
};

/// The body returned by mutations with nothing else to report.
#[derive(Serialize)]
pub struct Success {
    pub success: bool,
}

impl Default for Success {
    fn default() -> Self {
        Self { success: true }
    }
}

#[derive(Default, Serialize)]
pub struct TransactionValidationError {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    description: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    amount: Vec<String>,
}

impl From<ValidationContext<TransactionDraftInvalidity>> for TransactionValidationError {
    fn from(validation: ValidationContext<TransactionDraftInvalidity>) -> Self {
        let mut response = Self::default();

        for invalidity in validation.into_iter() {
            match invalidity {
                TransactionDraftInvalidity::MissingDescription => response
                    .description
                    .push("A description is required.".to_owned()),
                TransactionDraftInvalidity::NegativeAmount => response
                    .amount
                    .push("The amount may not be negative.".to_owned()),
                TransactionDraftInvalidity::NonFiniteAmount => response
                    .amount
                    .push("The amount must be a finite number.".to_owned()),
            }
        }

        response
    }
}

#[derive(Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardValidationError {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    name: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    closing_day: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    due_day: Vec<String>,
}

impl From<ValidationContext<CreditCardInvalidity>> for CreditCardValidationError {
    fn from(validation: ValidationContext<CreditCardInvalidity>) -> Self {
        let mut response = Self::default();

        for invalidity in validation.into_iter() {
            match invalidity {
                CreditCardInvalidity::MissingName => {
                    response.name.push("A name is required.".to_owned())
                }
                CreditCardInvalidity::ClosingDayOutOfRange => response
                    .closing_day
                    .push("The closing day must be between 1 and 31.".to_owned()),
                CreditCardInvalidity::DueDayOutOfRange => response
                    .due_day
                    .push("The due day must be between 1 and 31.".to_owned()),
            }
        }

        response
    }
}

#[derive(Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsValidationError {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reminder_time: Vec<String>,
}

impl From<ValidationContext<NotificationSettingsInvalidity>> for SettingsValidationError {
    fn from(validation: ValidationContext<NotificationSettingsInvalidity>) -> Self {
        let mut response = Self::default();

        for invalidity in validation.into_iter() {
            match invalidity {
                NotificationSettingsInvalidity::ReminderTimeFormat => response
                    .reminder_time
                    .push("The reminder time must use the HH:mm format.".to_owned()),
            }
        }

        response
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_balance: f64,
    pub monthly_income: f64,
    pub monthly_expense: f64,
}

impl From<reports::Summary> for Summary {
    fn from(summary: reports::Summary) -> Self {
        Self {
            total_balance: summary.total_balance,
            monthly_income: summary.monthly_income,
            monthly_expense: summary.monthly_expense,
        }
    }
}

#[derive(Serialize)]
pub struct BreakdownSlice {
    pub key: String,
    pub label: String,
    pub color: String,
    pub total: f64,
}

impl From<reports::BreakdownSlice> for BreakdownSlice {
    fn from(slice: reports::BreakdownSlice) -> Self {
        Self {
            key: slice.key,
            label: slice.label,
            color: slice.color,
            total: slice.total,
        }
    }
}

#[derive(Serialize)]
pub struct CashFlowPoint {
    pub day: chrono::NaiveDate,
    pub net: f64,
}

impl From<reports::CashFlowPoint> for CashFlowPoint {
    fn from(point: reports::CashFlowPoint) -> Self {
        Self {
            day: point.day,
            net: point.net,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredReport {
    pub transactions: Vec<Transaction>,
    pub net_total: f64,
}

impl From<reports::FilteredReport> for FilteredReport {
    fn from(report: reports::FilteredReport) -> Self {
        Self {
            transactions: report.transactions,
            net_total: report.net_total,
        }
    }
}
