//! Composite ranking score for service centers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DEFAULT_DISTANCE_KM, MAX_DISTANCE_KM, NEUTRAL_COMPONENT_SCORE, RECENCY_HORIZON_DAYS};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Weights for scoring components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingWeights {
    /// Weight for proximity (0.40)
    pub distance: f64,
    /// Weight for customer rating (0.40)
    pub rating: f64,
    /// Weight for verification recency (0.20)
    pub recency: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

/// Individual scoring components, each in 0.0 - 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub distance: f64,
    pub rating: f64,
    pub recency: f64,
}

/// Score calculator for service centers
#[derive(Debug, Clone)]
pub struct RankingCalculator {
    weights: RankingWeights,
}

impl RankingCalculator {
    pub fn new() -> Self {
        Self { weights: RankingWeights::default() }
    }

    /// Unknown distance scores as the midpoint, not as "far".
    pub fn distance_score(&self, distance_km: Option<f64>) -> f64 {
        let distance = distance_km.unwrap_or(DEFAULT_DISTANCE_KM);
        (1.0 - distance / MAX_DISTANCE_KM).max(0.0)
    }

    pub fn rating_score(&self, rating: Option<f64>) -> f64 {
        rating.map_or(NEUTRAL_COMPONENT_SCORE, |rating| rating / 5.0)
    }

    /// Linear decay to zero over the recency horizon. Verification stamps in the future
    /// count as verified just now.
    pub fn recency_score(&self, last_verified_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(verified_at) = last_verified_at else {
            return NEUTRAL_COMPONENT_SCORE;
        };
        let days_since = ((now - verified_at).num_milliseconds() as f64 / MILLIS_PER_DAY).max(0.0);
        (1.0 - days_since / RECENCY_HORIZON_DAYS).max(0.0)
    }

    pub fn component_scores(
        &self,
        distance_km: Option<f64>,
        rating: Option<f64>,
        last_verified_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> ComponentScores {
        ComponentScores {
            distance: self.distance_score(distance_km),
            rating: self.rating_score(rating),
            recency: self.recency_score(last_verified_at, now),
        }
    }

    pub fn total(&self, components: &ComponentScores) -> f64 {
        components.distance * self.weights.distance
            + components.rating * self.weights.rating
            + components.recency * self.weights.recency
    }

    pub fn score(
        &self,
        distance_km: Option<f64>,
        rating: Option<f64>,
        last_verified_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> f64 {
        self.total(&self.component_scores(distance_km, rating, last_verified_at, now))
    }
}

impl Default for RankingCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Ranking score with the fixed default weights.
pub fn ranking_score(
    distance_km: Option<f64>,
    rating: Option<f64>,
    last_verified_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> f64 {
    RankingCalculator::new().score(distance_km, rating, last_verified_at, now)
}
