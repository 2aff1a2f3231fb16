//! Discovery engine implementation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::scoring::RankingCalculator;
use super::types::*;
use super::{MAX_RECOMMENDATIONS, NO_CENTERS_MESSAGE, WARRANTY_FALLBACK_MESSAGE};
use crate::domain::location::Coordinates;
use crate::domain::service_center::ServiceCenter;
use crate::errors::ApplicationError;
use crate::geo;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("service center catalog unavailable: {0}")]
pub struct CatalogError(pub String);

impl From<CatalogError> for ApplicationError {
    fn from(value: CatalogError) -> Self {
        ApplicationError::Dependency(value.to_string())
    }
}

/// Read side of the service center dataset.
#[async_trait]
pub trait ServiceCenterCatalog: Send + Sync {
    /// Active centers matching `query` exactly.
    async fn find_active(&self, query: &CenterQuery) -> Result<Vec<ServiceCenter>, CatalogError>;
}

#[async_trait]
impl<T> ServiceCenterCatalog for Arc<T>
where
    T: ServiceCenterCatalog + ?Sized,
{
    async fn find_active(&self, query: &CenterQuery) -> Result<Vec<ServiceCenter>, CatalogError> {
        (**self).find_active(query).await
    }
}

/// Orchestrates filtering, fallbacks and ranking over an injected catalog.
pub struct ServiceCenterDiscovery<C> {
    catalog: C,
    calculator: RankingCalculator,
}

impl<C: ServiceCenterCatalog> ServiceCenterDiscovery<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog, calculator: RankingCalculator::new() }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Runs discovery. Empty and degraded outcomes are `Ok` with a message; only invalid
    /// input and catalog failures are errors.
    pub async fn discover(
        &self,
        request: &DiscoveryRequest,
        now: DateTime<Utc>,
    ) -> Result<DiscoveryResult, ApplicationError> {
        request.validate()?;

        let location = request.location_filter();
        if location == LocationFilter::Unfiltered {
            warn!(
                event_name = "discovery.location.unfiltered",
                correlation_id = "discovery",
                "discovery request has neither pincode nor city; searching all active centers"
            );
        }

        let mut all_active = None;
        let mut candidates =
            self.locate(&location, request.warranty_active, &mut all_active).await?;

        let mut message = None;
        if candidates.is_empty() && request.warranty_active {
            candidates = self.locate(&location, false, &mut all_active).await?;
            if !candidates.is_empty() {
                info!(
                    event_name = "discovery.fallback.warranty_relaxed",
                    correlation_id = "discovery",
                    candidates = candidates.len(),
                    "no warranty-supporting centers matched; returning alternative centers"
                );
                message = Some(WARRANTY_FALLBACK_MESSAGE.to_string());
            }
        }

        if candidates.is_empty() {
            info!(
                event_name = "discovery.result.empty",
                correlation_id = "discovery",
                "no service centers matched the request"
            );
            return Ok(DiscoveryResult::empty(NO_CENTERS_MESSAGE));
        }

        let mut result = rank_with(
            &self.calculator,
            candidates,
            request.coordinates,
            &request.ranking_filters(),
            now,
        );
        result.message = message;

        debug!(
            event_name = "discovery.result.ranked",
            correlation_id = "discovery",
            centers = result.service_centers.len(),
            recommendations = result.recommendations.len(),
            "service centers ranked"
        );
        Ok(result)
    }

    /// Exact match first; for city searches, a case-insensitive pass over all active
    /// centers. The all-active list is fetched at most once per request.
    async fn locate(
        &self,
        location: &LocationFilter,
        warranty_only: bool,
        all_active: &mut Option<Vec<ServiceCenter>>,
    ) -> Result<Vec<ServiceCenter>, ApplicationError> {
        let exact =
            self.catalog.find_active(&CenterQuery::for_location(location, warranty_only)).await?;
        if !exact.is_empty() {
            return Ok(exact);
        }

        let LocationFilter::City(city) = location else {
            return Ok(exact);
        };

        let active = match all_active {
            Some(active) => active,
            None => all_active.insert(self.catalog.find_active(&CenterQuery::all_active()).await?),
        };

        let needle = city.trim().to_lowercase();
        let matched: Vec<ServiceCenter> = active
            .iter()
            .filter(|center| {
                center.city.as_deref().map(|value| value.trim().to_lowercase() == needle)
                    == Some(true)
            })
            .filter(|center| !warranty_only || center.warranty_supported)
            .cloned()
            .collect();

        if !matched.is_empty() {
            debug!(
                event_name = "discovery.fallback.city_case_insensitive",
                correlation_id = "discovery",
                city = %city,
                candidates = matched.len(),
                "city matched after case-insensitive comparison"
            );
        }
        Ok(matched)
    }
}

/// Scores, sorts and slices an already-filtered candidate set.
///
/// Recommendations are the top three brand- and category-compatible centers by score.
/// The full list is sorted by score; when AMC is active, AMC-supporting centers move
/// ahead of the rest without disturbing score order inside either group.
pub fn rank_service_centers(
    candidates: Vec<ServiceCenter>,
    customer: Option<Coordinates>,
    filters: &RankingFilters,
    now: DateTime<Utc>,
) -> DiscoveryResult {
    rank_with(&RankingCalculator::new(), candidates, customer, filters, now)
}

fn rank_with(
    calculator: &RankingCalculator,
    candidates: Vec<ServiceCenter>,
    customer: Option<Coordinates>,
    filters: &RankingFilters,
    now: DateTime<Utc>,
) -> DiscoveryResult {
    let mut scored: Vec<ScoredServiceCenter> = candidates
        .into_iter()
        .map(|center| {
            let distance_km = geo::distance_between(customer, center.coordinates);
            let ranking_score =
                calculator.score(distance_km, center.rating, center.last_verified_at, now);
            ScoredServiceCenter { center, distance_km, ranking_score }
        })
        .collect();

    scored.sort_by(|a, b| b.ranking_score.total_cmp(&a.ranking_score));

    let recommendations: Vec<ScoredServiceCenter> = scored
        .iter()
        .filter(|scored| {
            scored.center.supports_brand(filters.brand.as_deref())
                && scored.center.supports_category(filters.category.as_deref())
        })
        .take(MAX_RECOMMENDATIONS)
        .cloned()
        .collect();

    if filters.amc_active {
        scored.sort_by_key(|scored| !scored.center.amc_supported);
    }

    DiscoveryResult { service_centers: scored, recommendations, message: None }
}
