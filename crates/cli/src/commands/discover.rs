use carewise_core::discovery::{DiscoveryRequest, ServiceCenterDiscovery};
use carewise_core::domain::location::Coordinates;
use carewise_core::domain::product::ProductId;
use carewise_core::errors::ApplicationError;
use carewise_db::{ProductRepository, SqlProductRepository, SqlServiceCenterRepository};
use chrono::Utc;

use crate::commands::{
    open_database, prepare, with_pool, CommandResult, Failure, EXIT_DATABASE, EXIT_VALIDATION,
};

/// Runs discovery for a stored product, optionally from the customer's own position.
pub fn run(product_id: &str, lat: Option<f64>, lon: Option<f64>) -> CommandResult {
    let customer = match Coordinates::from_pair(lat, lon) {
        Ok(customer) => customer,
        Err(error) => {
            return CommandResult::failure(
                "discover",
                "input_validation",
                error.to_string(),
                EXIT_VALIDATION,
            );
        }
    };

    let (config, runtime) = match prepare("discover") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        with_pool(pool, |pool| async move {
            let product = SqlProductRepository::new(pool.clone())
                .find_by_id(&ProductId(product_id.to_string()))
                .await
                .map_err(|error| ("db_query", error.to_string(), EXIT_DATABASE))?
                .ok_or_else(|| {
                    let message = format!("product `{product_id}` does not exist");
                    ("not_found", message, EXIT_VALIDATION)
                })?;

            let now = Utc::now();
            let request = DiscoveryRequest::for_product(&product, now.date_naive())
                .with_customer_coordinates(customer);
            let discovery =
                ServiceCenterDiscovery::new(SqlServiceCenterRepository::new(pool.clone()));
            let outcome = discovery
                .discover(&request, now)
                .await
                .map_err(|error| match error {
                    ApplicationError::Domain(_) => {
                        ("input_validation", error.to_string(), EXIT_VALIDATION)
                    }
                    _ => ("discovery", error.to_string(), EXIT_DATABASE),
                })?;

            Ok::<_, Failure>(outcome)
        })
        .await
    });

    match result {
        Ok(outcome) => {
            let message = outcome.message.clone().unwrap_or_else(|| {
                format!(
                    "{} service centers, {} recommended",
                    outcome.service_centers.len(),
                    outcome.recommendations.len()
                )
            });
            CommandResult::success_with_data("discover", message, serde_json::to_value(&outcome).ok())
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("discover", error_class, message, exit_code)
        }
    }
}
