use async_trait::async_trait;
use thiserror::Error;

use carewise_core::discovery::CatalogError;
use carewise_core::domain::product::{Product, ProductId};
use carewise_core::domain::service_center::ServiceCenter;

pub mod memory;
pub mod product;
pub mod service_center;

pub use memory::{InMemoryProductRepository, InMemoryServiceCenterRepository};
pub use product::SqlProductRepository;
pub use service_center::SqlServiceCenterRepository;

/// Rows written per transaction by `replace_all`.
pub const IMPORT_BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for CatalogError {
    fn from(error: RepositoryError) -> Self {
        CatalogError(error.to_string())
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products owned by a normalized mobile number, ordered by id.
    async fn list_for_customer(&self, mobile: &str) -> Result<Vec<Product>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Replaces the whole product table. Returns the number of rows written.
    async fn replace_all(&self, products: Vec<Product>) -> Result<usize, RepositoryError>;
}

#[async_trait]
pub trait ServiceCenterRepository: Send + Sync {
    /// Every center, active or not, ordered by id.
    async fn list_all(&self) -> Result<Vec<ServiceCenter>, RepositoryError>;

    async fn replace_all(&self, centers: Vec<ServiceCenter>) -> Result<usize, RepositoryError>;
}
