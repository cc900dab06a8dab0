use semval::prelude::*;
use serde::{Deserialize, Serialize};

/// A credit card transactions can optionally be attached to. The limit is
/// informational only and never enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub bank: String,
    pub limit: f64,
    /// Day of month (1-31) the billing cycle closes.
    pub closing_day: u8,
    /// Day of month (1-31) the bill is due.
    pub due_day: u8,
    pub color: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardDraft {
    pub name: String,
    pub brand: String,
    pub bank: String,
    pub limit: f64,
    pub closing_day: u8,
    pub due_day: u8,
    pub color: String,
}

impl CreditCardDraft {
    pub fn into_credit_card(self, id: String) -> CreditCard {
        CreditCard {
            id,
            name: self.name,
            brand: self.brand,
            bank: self.bank,
            limit: self.limit,
            closing_day: self.closing_day,
            due_day: self.due_day,
            color: self.color,
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum CreditCardInvalidity {
    MissingName,
    ClosingDayOutOfRange,
    DueDayOutOfRange,
}

impl Validate for CreditCardDraft {
    type Invalidity = CreditCardInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                self.name.trim().is_empty(),
                CreditCardInvalidity::MissingName,
            )
            .invalidate_if(
                !(1..=31).contains(&self.closing_day),
                CreditCardInvalidity::ClosingDayOutOfRange,
            )
            .invalidate_if(
                !(1..=31).contains(&self.due_day),
                CreditCardInvalidity::DueDayOutOfRange,
            )
            .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn draft() -> CreditCardDraft {
        CreditCardDraft {
            name: "Platinum".to_owned(),
            brand: "Visa".to_owned(),
            bank: "Nubank".to_owned(),
            limit: 5000.0,
            closing_day: 28,
            due_day: 5,
            color: "#7c3aed".to_owned(),
        }
    }

    #[test]
    fn valid_draft() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn due_day_out_of_range() {
        let mut card = draft();
        card.due_day = 32;

        let context = card.validate().expect_err("day 32 should fail");
        let errors = context.into_iter().collect::<Vec<_>>();

        assert_eq!(vec![CreditCardInvalidity::DueDayOutOfRange], errors);
    }
}
