use carewise_db::DemoDataset;

use crate::commands::{open_database, prepare, CommandResult, Failure, EXIT_MIGRATION, EXIT_VALIDATION};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;

        let seeded = DemoDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))?;

        let verification = DemoDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), EXIT_VALIDATION))?;

        pool.close().await;

        if verification.all_present {
            Ok(seeded)
        } else {
            let missing: Vec<&str> = verification
                .checks
                .iter()
                .filter_map(|(id, present)| (!present).then_some(id.as_str()))
                .collect();
            Err::<_, Failure>(("seed_verification", verification_message(&missing), EXIT_VALIDATION))
        }
    });

    match result {
        Ok(seeded) => CommandResult::success(
            "seed",
            format!(
                "demo dataset loaded: {} products, {} service centers",
                seeded.products_loaded, seeded.service_centers_loaded
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn verification_message(missing: &[&str]) -> String {
    if missing.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for records: {}", missing.join(", "))
    }
}
