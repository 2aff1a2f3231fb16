//! Upload rows handed over by the spreadsheet parser.
//!
//! Rows arrive as string-keyed records. They are deserialized into strict row schemas
//! and validated into domain types here; an upload with any bad row is rejected whole.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::customer::{normalize_mobile, CustomerContact};
use crate::domain::location::{Coordinates, Location};
use crate::domain::product::{AmcWindow, Product, ProductId, WarrantyWindow};
use crate::domain::service_center::{CenterType, ServiceCenter, ServiceCenterId};
use crate::errors::{ApplicationError, ValidationError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A rejected upload. `row` is 1-based; 0 refers to the document as a whole.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("row {row}: `{field}` {reason}")]
pub struct DatasetError {
    pub row: usize,
    pub field: String,
    pub reason: String,
}

impl DatasetError {
    fn new(row: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { row, field: field.into(), reason: reason.into() }
    }

    fn from_validation(row: usize, error: ValidationError) -> Self {
        match error {
            ValidationError::MissingField(field) => Self::new(row, field, "is required"),
            ValidationError::MalformedCoordinates(reason) => Self::new(row, "lat/lon", reason),
            ValidationError::InvalidValue { field, reason } => Self::new(row, field, reason),
        }
    }
}

impl From<DatasetError> for ApplicationError {
    fn from(error: DatasetError) -> Self {
        ValidationError::InvalidValue { field: "dataset", reason: error.to_string() }.into()
    }
}

/// Either a JSON list or a single comma-separated cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    List(Vec<String>),
    Delimited(String),
}

impl Default for StringList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl StringList {
    pub fn into_values(self) -> Vec<String> {
        let values: Vec<String> = match self {
            Self::List(values) => values,
            Self::Delimited(cell) => cell.split(',').map(str::to_string).collect(),
        };
        values
            .into_iter()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductRow {
    pub id: String,
    pub customer_name: String,
    pub customer_mobile: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub notification_consent: bool,
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub warranty_type: Option<String>,
    #[serde(default)]
    pub warranty_start_date: Option<String>,
    pub warranty_end_date: String,
    #[serde(default)]
    pub amc_active: bool,
    #[serde(default)]
    pub amc_end_date: Option<String>,
    #[serde(default)]
    pub next_service_due: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceCenterRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub center_type: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub supported_brands: StringList,
    #[serde(default)]
    pub supported_categories: StringList,
    #[serde(default)]
    pub warranty_supported: bool,
    #[serde(default)]
    pub amc_supported: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    /// RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
    #[serde(default)]
    pub last_verified_at: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

pub fn product_rows_from_json(document: &str) -> Result<Vec<ProductRow>, DatasetError> {
    serde_json::from_str(document)
        .map_err(|error| DatasetError::new(0, "document", error.to_string()))
}

pub fn service_center_rows_from_json(
    document: &str,
) -> Result<Vec<ServiceCenterRow>, DatasetError> {
    serde_json::from_str(document)
        .map_err(|error| DatasetError::new(0, "document", error.to_string()))
}

/// Validates every row or none. Duplicate product ids are rejected.
pub fn validate_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, DatasetError> {
    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let row_number = index + 1;
        let product = validate_product(row_number, row)?;
        if !seen.insert(product.id.clone()) {
            return Err(DatasetError::new(row_number, "id", format!("`{}` is duplicated", product.id.0)));
        }
        products.push(product);
    }
    Ok(products)
}

pub fn validate_service_centers(
    rows: Vec<ServiceCenterRow>,
) -> Result<Vec<ServiceCenter>, DatasetError> {
    let mut seen = HashSet::new();
    let mut centers = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let row_number = index + 1;
        let center = validate_service_center(row_number, row)?;
        if !seen.insert(center.id.clone()) {
            return Err(DatasetError::new(row_number, "id", format!("`{}` is duplicated", center.id.0)));
        }
        centers.push(center);
    }
    Ok(centers)
}

fn validate_product(row: usize, input: ProductRow) -> Result<Product, DatasetError> {
    let id = required(row, "id", &input.id)?;
    let customer_name = required(row, "customer_name", &input.customer_name)?;
    let mobile = normalize_mobile(&input.customer_mobile)
        .map_err(|error| DatasetError::from_validation(row, error))?;
    let name = required(row, "name", &input.name)?;
    let brand = required(row, "brand", &input.brand)?;
    let warranty_end_date = parse_date(row, "warranty_end_date", Some(&input.warranty_end_date))?
        .ok_or_else(|| DatasetError::new(row, "warranty_end_date", "is required"))?;

    let amc_end_date = parse_date(row, "amc_end_date", input.amc_end_date.as_deref())?;
    let coordinates = Coordinates::from_pair(input.lat, input.lon)
        .map_err(|error| DatasetError::from_validation(row, error))?;

    Ok(Product {
        id: ProductId(id),
        customer: CustomerContact {
            name: customer_name,
            mobile,
            email: optional(input.customer_email),
            notification_consent: input.notification_consent,
        },
        name,
        brand,
        model: optional(input.model),
        serial_number: optional(input.serial_number),
        category: optional(input.category),
        purchase_date: parse_date(row, "purchase_date", input.purchase_date.as_deref())?,
        warranty: WarrantyWindow {
            warranty_type: optional(input.warranty_type),
            start_date: parse_date(row, "warranty_start_date", input.warranty_start_date.as_deref())?,
            end_date: warranty_end_date,
        },
        amc: AmcWindow {
            active: input.amc_active,
            end_date: amc_end_date.filter(|_| input.amc_active),
        },
        next_service_due: parse_date(row, "next_service_due", input.next_service_due.as_deref())?,
        location: Location {
            city: optional(input.city),
            pincode: optional(input.pincode),
            coordinates,
        },
    })
}

fn validate_service_center(row: usize, input: ServiceCenterRow) -> Result<ServiceCenter, DatasetError> {
    let id = required(row, "id", &input.id)?;
    let name = required(row, "name", &input.name)?;
    let coordinates = Coordinates::from_pair(input.lat, input.lon)
        .map_err(|error| DatasetError::from_validation(row, error))?;

    if let Some(rating) = input.rating {
        if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
            return Err(DatasetError::new(row, "rating", format!("{rating} is outside 0..=5")));
        }
    }

    Ok(ServiceCenter {
        id: ServiceCenterId(id),
        name,
        center_type: input
            .center_type
            .as_deref()
            .map(CenterType::parse_lenient)
            .unwrap_or_default(),
        address: optional(input.address),
        city: optional(input.city),
        pincode: optional(input.pincode),
        coordinates,
        phone: optional(input.phone),
        supported_brands: input.supported_brands.into_values(),
        supported_categories: input.supported_categories.into_values(),
        warranty_supported: input.warranty_supported,
        amc_supported: input.amc_supported,
        rating: input.rating,
        last_verified_at: parse_timestamp(row, input.last_verified_at.as_deref())?,
        active: input.active,
    })
}

fn required(row: usize, field: &'static str, value: &str) -> Result<String, DatasetError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DatasetError::new(row, field, "is required"));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_date(
    row: usize,
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, DatasetError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| DatasetError::new(row, field, format!("`{value}` is not a YYYY-MM-DD date")))
}

fn parse_timestamp(row: usize, value: Option<&str>) -> Result<Option<DateTime<Utc>>, DatasetError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|date| Some(date.and_time(NaiveTime::MIN).and_utc()))
        .map_err(|_| {
            DatasetError::new(
                row,
                "last_verified_at",
                format!("`{value}` is neither RFC 3339 nor YYYY-MM-DD"),
            )
        })
}
