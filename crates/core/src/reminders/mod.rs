//! Reminder projection and alert filtering.
//!
//! Reminders are never stored. They are rebuilt from the current product record and a
//! caller-supplied `today` on every read, so the same inputs always produce the same list.

pub mod calendar;
pub mod notify;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::status::{self, AmcStatus, ServiceStatus, WarrantyStatus};

pub use calendar::{group_by_due_date, within_window, CalendarWindow};
pub use notify::{LogNotifier, NotificationReceipt, Notifier, NotifyError};

/// Default look-ahead of the alerts feed.
pub const DEFAULT_ALERT_WINDOW_DAYS: u32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Warranty,
    Amc,
    Service,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warranty => "warranty",
            Self::Amc => "amc",
            Self::Service => "service",
        }
    }
}

impl std::str::FromStr for ReminderKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "warranty" => Ok(Self::Warranty),
            "amc" => Ok(Self::Amc),
            "service" => Ok(Self::Service),
            other => Err(format!("unknown reminder kind `{other}` (expected warranty|amc|service)")),
        }
    }
}

/// Status of a reminder, flattened across the three kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Active,
    ExpiringSoon,
    Expired,
    Inactive,
    Scheduled,
    DueSoon,
    Overdue,
}

impl From<WarrantyStatus> for ReminderStatus {
    fn from(value: WarrantyStatus) -> Self {
        match value {
            WarrantyStatus::Active => Self::Active,
            WarrantyStatus::ExpiringSoon => Self::ExpiringSoon,
            WarrantyStatus::Expired => Self::Expired,
        }
    }
}

impl From<AmcStatus> for ReminderStatus {
    fn from(value: AmcStatus) -> Self {
        match value {
            AmcStatus::Active => Self::Active,
            AmcStatus::ExpiringSoon => Self::ExpiringSoon,
            AmcStatus::Inactive => Self::Inactive,
        }
    }
}

impl From<ServiceStatus> for ReminderStatus {
    fn from(value: ServiceStatus) -> Self {
        match value {
            ServiceStatus::Scheduled => Self::Scheduled,
            ServiceStatus::DueSoon => Self::DueSoon,
            ServiceStatus::Overdue => Self::Overdue,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub product_id: ProductId,
    pub kind: ReminderKind,
    pub due_date: NaiveDate,
    pub status: ReminderStatus,
    pub days_until: i64,
    pub customer_name: String,
    pub customer_mobile: String,
    pub notification_consent: bool,
    pub product_name: String,
    pub brand: String,
    pub model: Option<String>,
}

impl Reminder {
    fn for_product(
        product: &Product,
        kind: ReminderKind,
        due_date: NaiveDate,
        status: ReminderStatus,
        days_until: i64,
    ) -> Self {
        Self {
            product_id: product.id.clone(),
            kind,
            due_date,
            status,
            days_until,
            customer_name: product.customer.name.clone(),
            customer_mobile: product.customer.mobile.clone(),
            notification_consent: product.customer.notification_consent,
            product_name: product.name.clone(),
            brand: product.brand.clone(),
            model: product.model.clone(),
        }
    }
}

/// Zero to three reminders for one product: warranty always, AMC when a dated contract is
/// flagged active, service when a next-service date exists.
pub fn project_reminders(product: &Product, today: NaiveDate) -> Vec<Reminder> {
    let mut reminders = Vec::with_capacity(3);

    let warranty = status::warranty_status(today, product.warranty.end_date);
    reminders.push(Reminder::for_product(
        product,
        ReminderKind::Warranty,
        product.warranty.end_date,
        warranty.status.into(),
        warranty.days_remaining,
    ));

    if let Some(amc_end) = product.amc.effective_end_date() {
        let amc = status::amc_status(today, product.amc.active, Some(amc_end));
        reminders.push(Reminder::for_product(
            product,
            ReminderKind::Amc,
            amc_end,
            amc.status.into(),
            status::days_between(today, amc_end),
        ));
    }

    if let Some(due) = product.next_service_due {
        if let Some(service) = status::service_status(today, Some(due)) {
            reminders.push(Reminder::for_product(
                product,
                ReminderKind::Service,
                due,
                service.status.into(),
                service.days_until,
            ));
        }
    }

    reminders
}

/// Reminders for many products, ordered by due date then product id.
pub fn project_all<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    today: NaiveDate,
) -> Vec<Reminder> {
    let mut reminders: Vec<Reminder> =
        products.into_iter().flat_map(|product| project_reminders(product, today)).collect();
    reminders.sort_by(|a, b| {
        a.due_date.cmp(&b.due_date).then_with(|| a.product_id.cmp(&b.product_id))
    });
    reminders
}

/// "Due soon" feed: keeps reminders with `0 <= days_until <= window_days`.
pub fn filter_alerts(reminders: Vec<Reminder>, window_days: u32) -> Vec<Reminder> {
    let window = i64::from(window_days);
    reminders.into_iter().filter(|reminder| (0..=window).contains(&reminder.days_until)).collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderFilter {
    pub kind: Option<ReminderKind>,
    pub status: Option<ReminderStatus>,
    pub consented_only: bool,
}

impl ReminderFilter {
    pub fn matches(&self, reminder: &Reminder) -> bool {
        self.kind.map_or(true, |kind| reminder.kind == kind)
            && self.status.map_or(true, |status| reminder.status == status)
            && (!self.consented_only || reminder.notification_consent)
    }

    pub fn apply(&self, reminders: Vec<Reminder>) -> Vec<Reminder> {
        reminders.into_iter().filter(|reminder| self.matches(reminder)).collect()
    }
}
