use chrono::NaiveTime;
use semval::prelude::*;
use serde::{Deserialize, Serialize};

/// Process-wide notification preferences. There is a single settings record
/// which is loaded with defaults on first read and overwritten on save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub card_due_reminders: bool,
    pub transaction_reminders: bool,
    /// Time of day to deliver reminders, formatted `HH:mm`.
    pub reminder_time: String,
    pub days_before_due: u8,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            card_due_reminders: true,
            transaction_reminders: true,
            reminder_time: "09:00".to_owned(),
            days_before_due: 2,
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum NotificationSettingsInvalidity {
    /// The reminder time is not a valid `HH:mm` value.
    ReminderTimeFormat,
}

impl Validate for NotificationSettings {
    type Invalidity = NotificationSettingsInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                NaiveTime::parse_from_str(&self.reminder_time, "%H:%M").is_err(),
                NotificationSettingsInvalidity::ReminderTimeFormat,
            )
            .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(NotificationSettings::default().validate().is_ok());
    }

    #[test]
    fn malformed_reminder_time() {
        let settings = NotificationSettings {
            reminder_time: "9 o'clock".to_owned(),
            ..Default::default()
        };

        let context = settings.validate().expect_err("time should fail to parse");
        let errors = context.into_iter().collect::<Vec<_>>();

        assert_eq!(
            vec![NotificationSettingsInvalidity::ReminderTimeFormat],
            errors
        );
    }
}
