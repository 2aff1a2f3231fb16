//! Service center discovery and recommendation.
//!
//! Candidates are pulled from an injected [`ServiceCenterCatalog`], narrowed by location
//! and warranty support with graceful fallbacks, then ranked by a composite of distance,
//! rating and verification recency.

mod engine;
mod scoring;
mod types;

pub use engine::{rank_service_centers, CatalogError, ServiceCenterCatalog, ServiceCenterDiscovery};
pub use scoring::{ranking_score, ComponentScores, RankingCalculator, RankingWeights};
pub use types::*;

/// Fixed ranking weights. Distance and rating dominate; recency breaks ties.
pub const DEFAULT_WEIGHTS: RankingWeights =
    RankingWeights { distance: 0.40, rating: 0.40, recency: 0.20 };

/// Distance at which the distance component reaches zero.
pub const MAX_DISTANCE_KM: f64 = 50.0;

/// Stand-in distance when either endpoint has no coordinates.
pub const DEFAULT_DISTANCE_KM: f64 = 25.0;

/// Component value used when rating or verification data is missing.
pub const NEUTRAL_COMPONENT_SCORE: f64 = 0.5;

/// Age at which the recency component reaches zero.
pub const RECENCY_HORIZON_DAYS: f64 = 90.0;

/// Maximum recommendations returned alongside the full list.
pub const MAX_RECOMMENDATIONS: usize = 3;

pub const WARRANTY_FALLBACK_MESSAGE: &str =
    "No centers supporting warranty service were found nearby; showing alternative centers.";

pub const NO_CENTERS_MESSAGE: &str = "No service centers found for this location.";
