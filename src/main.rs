use feelings_backend::config::Config;
use feelings_backend::startup;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // initialize tracing
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Environment misconfigured: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = startup::run(config).await {
        error!("Server failed: {e}");
        std::process::exit(1);
    }
}
