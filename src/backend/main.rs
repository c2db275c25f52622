use taskflow::backend::routes::create_app;
use taskflow::backend::server::{connect_database, AppState, ServerConfig};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let pool = match connect_database(&config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(error = %err, "database connection failed");
            std::process::exit(1);
        }
    };

    let app = create_app(AppState::new(pool));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "taskflow server listening");

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server exited with error");
    }
}
