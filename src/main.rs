use dotenvy::dotenv;
use kittygram::{
    api::{self, AppState},
    config::{admin, database, settings},
    core::{account, achievement},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and create missing tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the achievement catalog
    achievement::seed_achievements(&db, &app_config.achievements)
        .await
        .inspect_err(|e| error!("Failed to seed achievements: {}", e))?;

    // 6. Bootstrap the staff account, if configured
    if let Some(credentials) = admin::get_admin_credentials() {
        account::ensure_staff_account(&db, &credentials).await?;
    }

    // 7. Serve
    let bind = app_config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind, e))?;
    info!("Listening on {}", bind);

    axum::serve(listener, api::router(AppState::new(db, app_config))).await?;
    Ok(())
}
