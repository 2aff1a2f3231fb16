use std::collections::BTreeMap;

use tokio::sync::RwLock;

use carewise_core::discovery::{CatalogError, CenterQuery, ServiceCenterCatalog};
use carewise_core::domain::product::{Product, ProductId};
use carewise_core::domain::service_center::ServiceCenter;

use super::{ProductRepository, RepositoryError, ServiceCenterRepository};

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<BTreeMap<String, Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        let products = products.into_iter().map(|p| (p.id.0.clone(), p)).collect();
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }

    async fn list_for_customer(&self, mobile: &str) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| p.customer.mobile == mobile).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.values().cloned().collect())
    }

    async fn replace_all(&self, products: Vec<Product>) -> Result<usize, RepositoryError> {
        let written = products.len();
        let mut stored = self.products.write().await;
        *stored = products.into_iter().map(|p| (p.id.0.clone(), p)).collect();
        Ok(written)
    }
}

#[derive(Default)]
pub struct InMemoryServiceCenterRepository {
    centers: RwLock<BTreeMap<String, ServiceCenter>>,
}

impl InMemoryServiceCenterRepository {
    pub fn with_centers(centers: Vec<ServiceCenter>) -> Self {
        let centers = centers.into_iter().map(|c| (c.id.0.clone(), c)).collect();
        Self { centers: RwLock::new(centers) }
    }
}

#[async_trait::async_trait]
impl ServiceCenterRepository for InMemoryServiceCenterRepository {
    async fn list_all(&self) -> Result<Vec<ServiceCenter>, RepositoryError> {
        let centers = self.centers.read().await;
        Ok(centers.values().cloned().collect())
    }

    async fn replace_all(&self, centers: Vec<ServiceCenter>) -> Result<usize, RepositoryError> {
        let written = centers.len();
        let mut stored = self.centers.write().await;
        *stored = centers.into_iter().map(|c| (c.id.0.clone(), c)).collect();
        Ok(written)
    }
}

#[async_trait::async_trait]
impl ServiceCenterCatalog for InMemoryServiceCenterRepository {
    async fn find_active(&self, query: &CenterQuery) -> Result<Vec<ServiceCenter>, CatalogError> {
        let centers = self.centers.read().await;
        Ok(centers.values().filter(|center| query.matches(center)).cloned().collect())
    }
}
