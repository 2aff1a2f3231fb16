use carewise_core::dataset;
use carewise_core::domain::product::Product;
use carewise_core::domain::service_center::ServiceCenter;

use crate::connection::DbPool;
use crate::repositories::{
    ProductRepository, RepositoryError, ServiceCenterRepository, SqlProductRepository,
    SqlServiceCenterRepository,
};

/// Deterministic demo dataset.
///
/// Covers the interesting discovery paths:
/// 1. Mumbai 400001 with a warranty-supporting authorized center
/// 2. Bengaluru 560001 where only non-warranty centers exist (fallback)
/// 3. Pune 411001 with no centers at all
pub struct DemoDataset;

impl DemoDataset {
    pub const PRODUCTS_JSON: &str = include_str!("../../../config/fixtures/demo_products.json");
    pub const SERVICE_CENTERS_JSON: &str =
        include_str!("../../../config/fixtures/demo_service_centers.json");

    pub fn products() -> Result<Vec<Product>, RepositoryError> {
        dataset::product_rows_from_json(Self::PRODUCTS_JSON)
            .and_then(dataset::validate_products)
            .map_err(|error| RepositoryError::Decode(format!("demo products: {error}")))
    }

    pub fn service_centers() -> Result<Vec<ServiceCenter>, RepositoryError> {
        dataset::service_center_rows_from_json(Self::SERVICE_CENTERS_JSON)
            .and_then(dataset::validate_service_centers)
            .map_err(|error| RepositoryError::Decode(format!("demo service centers: {error}")))
    }

    /// Replaces both tables with the demo dataset.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let products = Self::products()?;
        let centers = Self::service_centers()?;

        let products_loaded = SqlProductRepository::new(pool.clone()).replace_all(products).await?;
        let service_centers_loaded =
            SqlServiceCenterRepository::new(pool.clone()).replace_all(centers).await?;

        Ok(SeedResult { products_loaded, service_centers_loaded })
    }

    /// Checks that every demo record is present.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let product_repo = SqlProductRepository::new(pool.clone());
        let mut checks = Vec::new();

        for product in Self::products()? {
            let found = product_repo.find_by_id(&product.id).await?;
            checks.push((product.id.0, found.is_some()));
        }

        let stored_centers = SqlServiceCenterRepository::new(pool.clone()).list_all().await?;
        for center in Self::service_centers()? {
            let present = stored_centers.iter().any(|stored| stored.id == center.id);
            checks.push((center.id.0, present));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub products_loaded: usize,
    pub service_centers_loaded: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(String, bool)>,
}

#[cfg(test)]
mod tests {
    use super::DemoDataset;
    use crate::{connect_with_settings, migrations};

    #[test]
    fn demo_rows_validate() {
        let products = DemoDataset::products().expect("demo products validate");
        let centers = DemoDataset::service_centers().expect("demo centers validate");

        assert_eq!(products.len(), 5);
        assert_eq!(centers.len(), 6);
        assert!(centers.iter().any(|center| !center.active));
    }

    #[tokio::test]
    async fn load_then_verify() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let seeded = DemoDataset::load(&pool).await.expect("load");
        let verified = DemoDataset::verify(&pool).await.expect("verify");

        assert_eq!(seeded.products_loaded, 5);
        assert_eq!(seeded.service_centers_loaded, 6);
        assert!(verified.all_present, "{:?}", verified.checks);
    }

    #[tokio::test]
    async fn load_is_repeatable() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        DemoDataset::load(&pool).await.expect("first load");
        let second = DemoDataset::load(&pool).await.expect("second load");

        assert_eq!(second.products_loaded, 5);
    }
}
