pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::import::ImportKind;

#[derive(Debug, Parser)]
#[command(
    name = "carewise",
    about = "Carewise operator CLI",
    long_about = "Operate the Carewise store: migrations, dataset imports, demo seeding, service-center discovery, and config inspection.",
    after_help = "Examples:\n  carewise migrate\n  carewise import products products.json\n  carewise discover P-1001 --lat 18.94 --lon 72.83"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Replace stored products and service centers with the demo dataset")]
    Seed,
    #[command(about = "Validate a JSON row file and replace the matching table with it")]
    Import {
        #[command(subcommand)]
        target: ImportTarget,
    },
    #[command(about = "Find and rank service centers for a stored product")]
    Discover {
        product_id: String,
        #[arg(long, allow_hyphen_values = true, help = "Customer latitude in degrees")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, help = "Customer longitude in degrees")]
        lon: Option<f64>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

#[derive(Debug, Subcommand)]
enum ImportTarget {
    #[command(about = "Import product rows")]
    Products { file: PathBuf },
    #[command(about = "Import service center rows")]
    ServiceCenters { file: PathBuf },
}

impl ImportTarget {
    fn into_parts(self) -> (ImportKind, PathBuf) {
        match self {
            Self::Products { file } => (ImportKind::Products, file),
            Self::ServiceCenters { file } => (ImportKind::ServiceCenters, file),
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Import { target } => {
            let (kind, file) = target.into_parts();
            commands::import::run(kind, &file)
        }
        Command::Discover { product_id, lat, lon } => {
            commands::discover::run(&product_id, lat, lon)
        }
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
