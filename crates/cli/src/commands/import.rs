use std::fs;
use std::path::Path;

use carewise_core::dataset;
use carewise_db::{
    ProductRepository, ServiceCenterRepository, SqlProductRepository, SqlServiceCenterRepository,
};
use tracing::info;

use crate::commands::{
    open_database, prepare, with_pool, CommandResult, EXIT_MIGRATION, EXIT_VALIDATION,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    Products,
    ServiceCenters,
}

impl ImportKind {
    fn label(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::ServiceCenters => "service centers",
        }
    }
}

/// Validates a JSON row file and replaces the matching table with it.
pub fn run(kind: ImportKind, path: &Path) -> CommandResult {
    let document = match fs::read_to_string(path) {
        Ok(document) => document,
        Err(error) => {
            return CommandResult::failure(
                "import",
                "input_read",
                format!("could not read `{}`: {error}", path.display()),
                EXIT_VALIDATION,
            );
        }
    };

    let rows = match Rows::parse(kind, &document) {
        Ok(rows) => rows,
        Err(error) => {
            return CommandResult::failure(
                "import",
                "dataset_validation",
                error.to_string(),
                EXIT_VALIDATION,
            );
        }
    };

    let (config, runtime) = match prepare("import") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        with_pool(pool, |pool| async move {
            match rows {
                Rows::Products(products) => {
                    SqlProductRepository::new(pool).replace_all(products).await
                }
                Rows::ServiceCenters(centers) => {
                    SqlServiceCenterRepository::new(pool).replace_all(centers).await
                }
            }
            .map_err(|error| ("import", error.to_string(), EXIT_MIGRATION))
        })
        .await
    });

    match result {
        Ok(written) => {
            info!(
                event_name = "cli.import.completed",
                dataset = kind.label(),
                rows = written,
                "dataset replaced"
            );
            CommandResult::success("import", format!("imported {written} {}", kind.label()))
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("import", error_class, message, exit_code)
        }
    }
}

enum Rows {
    Products(Vec<carewise_core::Product>),
    ServiceCenters(Vec<carewise_core::ServiceCenter>),
}

impl Rows {
    fn parse(kind: ImportKind, document: &str) -> Result<Self, dataset::DatasetError> {
        match kind {
            ImportKind::Products => dataset::product_rows_from_json(document)
                .and_then(dataset::validate_products)
                .map(Self::Products),
            ImportKind::ServiceCenters => dataset::service_center_rows_from_json(document)
                .and_then(dataset::validate_service_centers)
                .map(Self::ServiceCenters),
        }
    }
}
