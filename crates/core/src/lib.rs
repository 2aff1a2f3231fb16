pub mod config;
pub mod dataset;
pub mod discovery;
pub mod domain;
pub mod errors;
pub mod geo;
pub mod reminders;
pub mod status;

pub use dataset::{DatasetError, ProductRow, ServiceCenterRow};
pub use discovery::{
    CatalogError, DiscoveryRequest, DiscoveryResult, ScoredServiceCenter, ServiceCenterCatalog,
    ServiceCenterDiscovery,
};
pub use domain::customer::CustomerContact;
pub use domain::location::{Coordinates, Location};
pub use domain::product::{Product, ProductId};
pub use domain::service_center::{ServiceCenter, ServiceCenterId};
pub use errors::{ApplicationError, DomainError, InterfaceError, ValidationError};
pub use reminders::{Reminder, ReminderKind, ReminderStatus};
pub use status::{derive_status, AmcStatus, ProductStatus, ServiceStatus, WarrantyStatus};
