use dotenvy::dotenv;

use toguna::models::config::ServerConfig;
use toguna::run;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = toguna::domain::types::Score::new(server_config.fraud_threshold) {
        log::error!(
            "Invalid fraud_threshold {}: {err}",
            server_config.fraud_threshold
        );
        std::process::exit(1);
    }

    log::info!(
        "Starting server on {}:{}",
        server_config.address,
        server_config.port
    );

    run(server_config).await
}
