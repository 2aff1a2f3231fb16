use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::location::Coordinates;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceCenterId(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterType {
    Authorized,
    Partner,
    #[default]
    Unspecified,
}

impl CenterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized => "authorized",
            Self::Partner => "partner",
            Self::Unspecified => "unspecified",
        }
    }

    /// Lenient parse used for spreadsheet and database values.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "authorized" | "authorised" => Self::Authorized,
            "partner" => Self::Partner,
            _ => Self::Unspecified,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceCenter {
    pub id: ServiceCenterId,
    pub name: String,
    pub center_type: CenterType,
    pub address: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub phone: Option<String>,
    pub supported_brands: Vec<String>,
    pub supported_categories: Vec<String>,
    pub warranty_supported: bool,
    pub amc_supported: bool,
    pub rating: Option<f64>,
    pub last_verified_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl ServiceCenter {
    pub fn supports_brand(&self, brand: Option<&str>) -> bool {
        permissive_substring_match(&self.supported_brands, brand)
    }

    pub fn supports_category(&self, category: Option<&str>) -> bool {
        permissive_substring_match(&self.supported_categories, category)
    }
}

/// An empty declared list, or no requested value, counts as a match.
fn permissive_substring_match(declared: &[String], requested: Option<&str>) -> bool {
    let Some(requested) = requested.map(str::trim).filter(|value| !value.is_empty()) else {
        return true;
    };
    if declared.is_empty() {
        return true;
    }

    let needle = requested.to_lowercase();
    declared.iter().any(|entry| entry.to_lowercase().contains(&needle))
}
