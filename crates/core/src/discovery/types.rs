//! Types for service center discovery

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::location::Coordinates;
use crate::domain::product::Product;
use crate::domain::service_center::ServiceCenter;
use crate::errors::ValidationError;
use crate::status;

/// Discovery input for one product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    /// Preferred location filter
    pub pincode: Option<String>,
    /// Used only when no pincode is given
    pub city: Option<String>,
    /// Customer position for distance scoring
    pub coordinates: Option<Coordinates>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub warranty_active: bool,
    pub amc_active: bool,
}

impl DiscoveryRequest {
    /// Builds a request from a product's location, brand, category and current coverage.
    pub fn for_product(product: &Product, today: NaiveDate) -> Self {
        let derived = status::derive_status(today, product);
        Self {
            pincode: product.location.pincode.clone(),
            city: product.location.city.clone(),
            coordinates: product.location.coordinates,
            brand: Some(product.brand.clone()),
            category: product.category.clone(),
            warranty_active: derived.warranty_active(),
            amc_active: derived.amc_active(),
        }
    }

    /// Replaces the product position with one supplied by the customer.
    pub fn with_customer_coordinates(mut self, coordinates: Option<Coordinates>) -> Self {
        if coordinates.is_some() {
            self.coordinates = coordinates;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(coordinates) = self.coordinates {
            Coordinates::new(coordinates.lat, coordinates.lon)?;
        }
        Ok(())
    }

    pub fn location_filter(&self) -> LocationFilter {
        if let Some(pincode) = non_blank(self.pincode.as_deref()) {
            return LocationFilter::Pincode(pincode.to_string());
        }
        if let Some(city) = non_blank(self.city.as_deref()) {
            return LocationFilter::City(city.to_string());
        }
        LocationFilter::Unfiltered
    }

    pub fn ranking_filters(&self) -> RankingFilters {
        RankingFilters {
            brand: non_blank(self.brand.as_deref()).map(str::to_string),
            category: non_blank(self.category.as_deref()).map(str::to_string),
            amc_active: self.amc_active,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Which location predicate a discovery request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationFilter {
    Pincode(String),
    City(String),
    Unfiltered,
}

/// Catalog query. The catalog only ever returns active centers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CenterQuery {
    pub pincode: Option<String>,
    pub city: Option<String>,
    pub warranty_supported_only: bool,
}

impl CenterQuery {
    pub fn all_active() -> Self {
        Self::default()
    }

    pub fn for_location(location: &LocationFilter, warranty_supported_only: bool) -> Self {
        let (pincode, city) = match location {
            LocationFilter::Pincode(pincode) => (Some(pincode.clone()), None),
            LocationFilter::City(city) => (None, Some(city.clone())),
            LocationFilter::Unfiltered => (None, None),
        };
        Self { pincode, city, warranty_supported_only }
    }

    /// Exact-match predicate shared by in-memory catalogs.
    pub fn matches(&self, center: &ServiceCenter) -> bool {
        center.active
            && self.pincode.as_ref().map_or(true, |pincode| center.pincode.as_ref() == Some(pincode))
            && self.city.as_ref().map_or(true, |city| center.city.as_ref() == Some(city))
            && (!self.warranty_supported_only || center.warranty_supported)
    }
}

/// Brand/category matching and AMC ordering applied after location filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingFilters {
    pub brand: Option<String>,
    pub category: Option<String>,
    pub amc_active: bool,
}

/// A service center with its computed distance and score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredServiceCenter {
    #[serde(flatten)]
    pub center: ServiceCenter,
    /// Absent when either endpoint lacks coordinates
    pub distance_km: Option<f64>,
    pub ranking_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub service_centers: Vec<ScoredServiceCenter>,
    pub recommendations: Vec<ScoredServiceCenter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DiscoveryResult {
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            service_centers: Vec::new(),
            recommendations: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.service_centers.is_empty()
    }
}
