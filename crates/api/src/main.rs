use api::{build_app, init_app_state};
use config::{ApiConfig, LoggingConfig};

#[tokio::main]
async fn main() {
    // Logging is configured from the environment independently of the auth settings,
    // so that configuration errors are reported through tracing
    let logging = LoggingConfig::from_env();
    init_tracing(&logging);

    let config = ApiConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        tracing::error!("Application cannot start without a valid configuration. Exiting.");
        std::process::exit(1);
    });

    let state = init_app_state(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to initialize services");
        std::process::exit(1);
    });

    let app = build_app(state);
    let bind_address = config.server.bind_address();

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(address = %bind_address, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    tracing::info!(address = %bind_address, "Server started successfully");
    tracing::info!("Endpoints:");
    tracing::info!("  - GET /                   (Home page with login link)");
    tracing::info!("  - GET /callback           (OAuth callback)");
    tracing::info!("  - GET /unauthorized");
    tracing::info!("  - GET /protected/user     (Profile and scopes)");
    tracing::info!("  - GET /protected/access   (requires test.access or test.admin)");
    tracing::info!("  - GET /protected/admin    (requires test.admin)");
    tracing::info!("  - GET /protected/backing  (Backing service call)");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

fn init_tracing(logging_config: &LoggingConfig) {
    let filter = logging_config.filter_directive();

    // Initialize tracing based on the format specified in config
    match logging_config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .init();
        }
    }
}
