use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerContact;
use crate::domain::location::Location;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// A purchased item as uploaded by the admin back-office.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub customer: CustomerContact,
    pub name: String,
    pub brand: String,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub category: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty: WarrantyWindow,
    pub amc: AmcWindow,
    pub next_service_due: Option<NaiveDate>,
    pub location: Location,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantyWindow {
    pub warranty_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmcWindow {
    pub active: bool,
    pub end_date: Option<NaiveDate>,
}

impl AmcWindow {
    /// The end date, only when the contract is flagged active.
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        self.end_date.filter(|_| self.active)
    }
}
