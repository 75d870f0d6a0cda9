use std::sync::Arc;

use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use prime_factor_server::{
    app::AppState,
    config::AppConfig,
    http::{
        router::build_routes,
        server::{HttpServer, ServerConfig},
    },
};

fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cfg = AppConfig::from_env();
    info!(stats_file = %cfg.stats_file.display(), "prime factor server starting");

    let state = Arc::new(AppState::from_config(&cfg));
    let dispatcher = build_routes(state);
    let server = HttpServer::with_dispatcher(ServerConfig::from(&cfg), dispatcher);

    if let Err(e) = server.run() {
        error!(error = %e, "server encountered a fatal error");
        std::process::exit(1);
    }
}
