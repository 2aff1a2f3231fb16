//! Warranty, AMC and service-due status derivation.
//!
//! Every function is pure over `today` and the product's date fields. Dates are compared
//! at calendar-day granularity; there is no time-of-day or timezone arithmetic here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// Inclusive upper bound, in days, of the "expiring soon" band.
pub const EXPIRING_SOON_DAYS: i64 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarrantyStatus {
    Active,
    ExpiringSoon,
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmcStatus {
    Active,
    ExpiringSoon,
    Inactive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Scheduled,
    DueSoon,
    Overdue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantyStatusResult {
    pub status: WarrantyStatus,
    /// Signed; negative once the warranty has lapsed.
    pub days_remaining: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmcStatusResult {
    pub status: AmcStatus,
    /// Absent when no contract is in force.
    pub days_remaining: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatusResult {
    pub status: ServiceStatus,
    pub days_until: i64,
}

/// All derived statuses for one product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStatus {
    pub warranty: WarrantyStatusResult,
    pub amc: AmcStatusResult,
    pub service: Option<ServiceStatusResult>,
}

impl ProductStatus {
    pub fn warranty_active(&self) -> bool {
        self.warranty.status != WarrantyStatus::Expired
    }

    pub fn amc_active(&self) -> bool {
        self.amc.status != AmcStatus::Inactive
    }
}

/// Whole days from `today` to `target`. Negative when `target` is in the past.
pub fn days_between(today: NaiveDate, target: NaiveDate) -> i64 {
    (target - today).num_days()
}

enum Band {
    Lapsed,
    Soon,
    Later,
}

fn band(days: i64) -> Band {
    if days < 0 {
        Band::Lapsed
    } else if days <= EXPIRING_SOON_DAYS {
        Band::Soon
    } else {
        Band::Later
    }
}

pub fn warranty_status(today: NaiveDate, warranty_end: NaiveDate) -> WarrantyStatusResult {
    let days_remaining = days_between(today, warranty_end);
    let status = match band(days_remaining) {
        Band::Lapsed => WarrantyStatus::Expired,
        Band::Soon => WarrantyStatus::ExpiringSoon,
        Band::Later => WarrantyStatus::Active,
    };
    WarrantyStatusResult { status, days_remaining }
}

pub fn amc_status(today: NaiveDate, amc_active: bool, amc_end: Option<NaiveDate>) -> AmcStatusResult {
    let Some(end) = amc_end.filter(|_| amc_active) else {
        return AmcStatusResult { status: AmcStatus::Inactive, days_remaining: None };
    };

    let days_remaining = days_between(today, end);
    let status = match band(days_remaining) {
        Band::Lapsed => AmcStatus::Inactive,
        Band::Soon => AmcStatus::ExpiringSoon,
        Band::Later => AmcStatus::Active,
    };
    AmcStatusResult { status, days_remaining: Some(days_remaining) }
}

/// Days until the next service. `None` when no service date is recorded; such products
/// never show up as "due today".
pub fn service_days_until(today: NaiveDate, next_service_due: Option<NaiveDate>) -> Option<i64> {
    next_service_due.map(|due| days_between(today, due))
}

pub fn service_status(
    today: NaiveDate,
    next_service_due: Option<NaiveDate>,
) -> Option<ServiceStatusResult> {
    let days_until = service_days_until(today, next_service_due)?;
    let status = match band(days_until) {
        Band::Lapsed => ServiceStatus::Overdue,
        Band::Soon => ServiceStatus::DueSoon,
        Band::Later => ServiceStatus::Scheduled,
    };
    Some(ServiceStatusResult { status, days_until })
}

pub fn derive_status(today: NaiveDate, product: &Product) -> ProductStatus {
    ProductStatus {
        warranty: warranty_status(today, product.warranty.end_date),
        amc: amc_status(today, product.amc.active, product.amc.end_date),
        service: service_status(today, product.next_service_due),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date")
    }

    fn offset(days: i64) -> NaiveDate {
        today() + Duration::days(days)
    }

    #[test]
    fn warranty_boundaries() {
        let cases = [
            (-1, WarrantyStatus::Expired),
            (0, WarrantyStatus::ExpiringSoon),
            (30, WarrantyStatus::ExpiringSoon),
            (31, WarrantyStatus::Active),
        ];

        for (days, expected) in cases {
            let result = warranty_status(today(), offset(days));
            assert_eq!(result.status, expected, "days = {days}");
            assert_eq!(result.days_remaining, days);
        }
    }

    #[test]
    fn warranty_reports_signed_days_after_expiry() {
        let result = warranty_status(today(), offset(-45));
        assert_eq!(result.status, WarrantyStatus::Expired);
        assert_eq!(result.days_remaining, -45);
    }

    #[test]
    fn amc_boundaries_substitute_inactive_for_expired() {
        let cases = [
            (-1, AmcStatus::Inactive),
            (0, AmcStatus::ExpiringSoon),
            (30, AmcStatus::ExpiringSoon),
            (31, AmcStatus::Active),
        ];

        for (days, expected) in cases {
            let result = amc_status(today(), true, Some(offset(days)));
            assert_eq!(result.status, expected, "days = {days}");
            assert_eq!(result.days_remaining, Some(days));
        }
    }

    #[test]
    fn amc_is_inactive_when_not_flagged_or_undated() {
        for days in [-400, -1, 0, 15, 30, 31, 400] {
            let unflagged = amc_status(today(), false, Some(offset(days)));
            assert_eq!(unflagged.status, AmcStatus::Inactive);
            assert_eq!(unflagged.days_remaining, None);
        }

        let undated = amc_status(today(), true, None);
        assert_eq!(undated, AmcStatusResult { status: AmcStatus::Inactive, days_remaining: None });
    }

    #[test]
    fn service_without_due_date_has_no_day_count() {
        assert_eq!(service_days_until(today(), None), None);
        assert_eq!(service_status(today(), None), None);
    }

    #[test]
    fn service_status_bands() {
        assert_eq!(
            service_status(today(), Some(offset(-3))).map(|result| result.status),
            Some(ServiceStatus::Overdue)
        );
        assert_eq!(
            service_status(today(), Some(offset(0))).map(|result| result.status),
            Some(ServiceStatus::DueSoon)
        );
        assert_eq!(
            service_status(today(), Some(offset(90))),
            Some(ServiceStatusResult { status: ServiceStatus::Scheduled, days_until: 90 })
        );
    }

    #[test]
    fn day_count_ignores_month_lengths() {
        let feb_end = NaiveDate::from_ymd_opt(2028, 2, 29).expect("leap day");
        let mar_first = NaiveDate::from_ymd_opt(2028, 3, 1).expect("valid date");
        assert_eq!(days_between(feb_end, mar_first), 1);
    }
}
