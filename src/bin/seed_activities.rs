use dotenvy::dotenv;
use std::env;

use school_activities::services::seed_service::{self, SeedReport};
use school_activities::{database, AppError, Config};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("seed failed: {}", e);
            std::process::exit(1);
        }
    };

    let reset = env::var("SEED_RESET")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    match seed(&config, reset).await {
        Ok(report) => {
            println!(
                "seed: existing={}, cleared={}, inserted={}",
                report.existing, report.cleared, report.inserted
            );
        }
        Err(e) => {
            eprintln!("seed failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn seed(config: &Config, reset: bool) -> Result<SeedReport, AppError> {
    let pool = database::open(&config.database_url, 1).await?;
    let seed = config.load_seed()?;
    let report = if reset {
        seed_service::reset(&pool, &seed).await
    } else {
        seed_service::seed_if_empty(&pool, &seed).await
    };
    pool.close().await;
    report
}
