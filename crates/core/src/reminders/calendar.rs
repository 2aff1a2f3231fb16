//! Calendar views over reminders. Windows compare due dates directly, not day counts.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Reminder;
use crate::errors::ValidationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "window")]
pub enum CalendarWindow {
    Month { year: i32, month: u32 },
    /// Seven days beginning at `starting`.
    Week { starting: NaiveDate },
    Range { start: NaiveDate, end: NaiveDate },
}

impl CalendarWindow {
    /// Parses `YYYY-MM`.
    pub fn parse_month(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidValue {
            field: "month",
            reason: format!("`{value}` is not in YYYY-MM form"),
        };
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let window = Self::Month {
            year: year.parse().map_err(|_| invalid())?,
            month: month.parse().map_err(|_| invalid())?,
        };
        window.bounds()?;
        Ok(window)
    }

    /// Parses the `YYYY-MM-DD` start of a week.
    pub fn parse_week(value: &str) -> Result<Self, ValidationError> {
        let starting = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
            ValidationError::InvalidValue {
                field: "week",
                reason: format!("`{value}` is not in YYYY-MM-DD form"),
            }
        })?;
        let window = Self::Week { starting };
        window.bounds()?;
        Ok(window)
    }

    /// The month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        Self::Month { year: date.year(), month: date.month() }
    }

    /// Inclusive first and last day of the window.
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate), ValidationError> {
        match *self {
            Self::Month { year, month } => {
                let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                    ValidationError::InvalidValue {
                        field: "month",
                        reason: format!("{year}-{month:02} is not a calendar month"),
                    }
                })?;
                let next_first = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)
                };
                let last = next_first
                    .and_then(|date| date.pred_opt())
                    .ok_or_else(|| ValidationError::InvalidValue {
                        field: "month",
                        reason: format!("{year}-{month:02} is out of the supported range"),
                    })?;
                Ok((first, last))
            }
            Self::Week { starting } => {
                let last = starting.checked_add_signed(Duration::days(6)).ok_or_else(|| {
                    ValidationError::InvalidValue {
                        field: "week",
                        reason: format!("week starting {starting} is out of the supported range"),
                    }
                })?;
                Ok((starting, last))
            }
            Self::Range { start, end } => {
                if start > end {
                    return Err(ValidationError::InvalidValue {
                        field: "range",
                        reason: format!("start {start} is after end {end}"),
                    });
                }
                Ok((start, end))
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> Result<bool, ValidationError> {
        let (first, last) = self.bounds()?;
        Ok(first <= date && date <= last)
    }
}

/// Reminders whose due date falls inside `window`.
pub fn within_window(
    reminders: Vec<Reminder>,
    window: &CalendarWindow,
) -> Result<Vec<Reminder>, ValidationError> {
    let (first, last) = window.bounds()?;
    Ok(reminders
        .into_iter()
        .filter(|reminder| first <= reminder.due_date && reminder.due_date <= last)
        .collect())
}

/// Groups by exact due date, days in ascending order, input order kept within a day.
pub fn group_by_due_date(reminders: Vec<Reminder>) -> BTreeMap<NaiveDate, Vec<Reminder>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<Reminder>> = BTreeMap::new();
    for reminder in reminders {
        grouped.entry(reminder.due_date).or_default().push(reminder);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::{group_by_due_date, within_window, CalendarWindow};
    use crate::errors::ValidationError;
    use crate::reminders::project_all;
    use crate::reminders::tests::{product, today};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn month_bounds_cover_leap_february_and_december() {
        assert_eq!(
            CalendarWindow::Month { year: 2028, month: 2 }.bounds(),
            Ok((date(2028, 2, 1), date(2028, 2, 29)))
        );
        assert_eq!(
            CalendarWindow::Month { year: 2026, month: 12 }.bounds(),
            Ok((date(2026, 12, 1), date(2026, 12, 31)))
        );
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(CalendarWindow::Month { year: 2026, month: 13 }.bounds().is_err());
        assert!(CalendarWindow::Month { year: 2026, month: 0 }.bounds().is_err());
        assert!(CalendarWindow::parse_month("2026-13").is_err());
        assert!(CalendarWindow::parse_month("October").is_err());
        assert_eq!(
            CalendarWindow::parse_month("2026-10"),
            Ok(CalendarWindow::Month { year: 2026, month: 10 })
        );
    }

    #[test]
    fn week_is_seven_inclusive_days() {
        let window = CalendarWindow::parse_week("2026-10-19").expect("valid week");
        assert_eq!(window.contains(date(2026, 10, 25)), Ok(true));
        assert_eq!(window.contains(date(2026, 10, 26)), Ok(false));
        assert_eq!(window.contains(date(2026, 10, 18)), Ok(false));
    }

    #[test]
    fn week_running_past_the_last_supported_date_is_rejected() {
        let window = CalendarWindow::Week { starting: NaiveDate::MAX };
        assert!(matches!(
            window.bounds(),
            Err(ValidationError::InvalidValue { field: "week", .. })
        ));
        assert!(window.contains(NaiveDate::MAX).is_err());
        assert!(within_window(Vec::new(), &window).is_err());
        assert!(CalendarWindow::parse_week("+262142-12-31").is_err());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let window = CalendarWindow::Range { start: date(2026, 5, 2), end: date(2026, 5, 1) };
        assert!(window.bounds().is_err());
    }

    #[test]
    fn window_filters_by_due_date_including_past_dates() {
        let products = [product("P-old", -5), product("P-now", 5), product("P-next", 40)];
        let reminders = project_all(&products, today());

        let october = within_window(reminders, &CalendarWindow::month_of(today()))
            .expect("valid month");
        let ids: Vec<&str> =
            october.iter().map(|reminder| reminder.product_id.0.as_str()).collect();
        assert_eq!(ids, vec!["P-old", "P-now"]);
    }

    #[test]
    fn grouping_collects_same_day_reminders() {
        let mut serviced = product("P-1", 7);
        serviced.next_service_due = Some(today() + Duration::days(7));
        let other = product("P-2", 9);

        let grouped = group_by_due_date(project_all([&serviced, &other], today()));

        assert_eq!(grouped.len(), 2);
        let first_day = grouped.get(&(today() + Duration::days(7))).expect("day present");
        assert_eq!(first_day.len(), 2);
    }
}
