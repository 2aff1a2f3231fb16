//! Notification hand-off. Delivery is not implemented; the log notifier records the
//! intent as a structured event and returns a receipt.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::{Reminder, ReminderKind};
use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationReceipt {
    pub id: Uuid,
    pub product_id: ProductId,
    pub kind: ReminderKind,
    pub channel: String,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("customer {mobile} has not consented to notifications")]
    ConsentRequired { mobile: String },
    #[error("notification channel failure: {0}")]
    Channel(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, reminder: &Reminder) -> Result<NotificationReceipt, NotifyError>;
}

#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, reminder: &Reminder) -> Result<NotificationReceipt, NotifyError> {
        if !reminder.notification_consent {
            return Err(NotifyError::ConsentRequired { mobile: reminder.customer_mobile.clone() });
        }

        let receipt = NotificationReceipt {
            id: Uuid::new_v4(),
            product_id: reminder.product_id.clone(),
            kind: reminder.kind,
            channel: "log".to_string(),
            accepted_at: Utc::now(),
        };

        info!(
            event_name = "reminders.notify.accepted",
            correlation_id = %receipt.id,
            product_id = %reminder.product_id.0,
            reminder_kind = reminder.kind.as_str(),
            due_date = %reminder.due_date,
            days_until = reminder.days_until,
            "reminder notification recorded"
        );

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::{LogNotifier, Notifier, NotifyError};
    use crate::reminders::project_reminders;
    use crate::reminders::tests::{product, today};

    #[tokio::test]
    async fn consenting_customer_gets_a_receipt() {
        let reminder = project_reminders(&product("P-1", 5), today()).remove(0);

        let receipt = LogNotifier.notify(&reminder).await.expect("notify should succeed");

        assert_eq!(receipt.product_id, reminder.product_id);
        assert_eq!(receipt.kind, reminder.kind);
        assert_eq!(receipt.channel, "log");
    }

    #[tokio::test]
    async fn missing_consent_is_refused() {
        let mut declining = product("P-2", 5);
        declining.customer.notification_consent = false;
        let reminder = project_reminders(&declining, today()).remove(0);

        let error = LogNotifier.notify(&reminder).await.expect_err("consent is required");

        assert_eq!(error, NotifyError::ConsentRequired { mobile: "9876543210".to_string() });
    }
}
