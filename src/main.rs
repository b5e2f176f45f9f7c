use pull_hook::config::DEFAULT_CONFIG_PATH;
use pull_hook::logging::{FileLogger, setup_logging};
use pull_hook::{AppState, ProcessRunner, Settings, app};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config_path = PathBuf::from(
        std::env::var("PULL_HOOK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
    );

    let settings = match Settings::load(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let file_logger = settings.log_directory.clone().map(FileLogger::new);
    let _log_guard = match setup_logging(file_logger.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging setup error: {}", e);
            std::process::exit(1);
        }
    };

    let runner = Arc::new(ProcessRunner::new(settings.command_timeout()));
    let bind_address = settings.bind_address.clone();
    info!("Using config {:?}", settings);
    let state = Arc::new(AppState::new(settings, runner));

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_address, e);
            std::process::exit(1);
        }
    };
    info!("Listening on {}", bind_address);

    if let Err(e) = axum::serve(listener, app(state)).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
