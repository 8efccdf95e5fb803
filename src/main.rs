use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod areas;
mod config;
mod database;
mod forecast;
mod render;
mod routes;

use areas::load_region_index;
use config::Config;
use database::Database;
use forecast::{jma::JmaClient, ForecastService};
use routes::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jma_weather=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // A broken area file degrades the service instead of stopping it.
    let regions = match load_region_index(&config.areas_path) {
        Ok(index) => {
            tracing::info!("Loaded {} regions from {}", index.len(), config.areas_path);
            Some(Arc::new(index))
        }
        Err(e) => {
            tracing::error!("Area data failed to load from {}: {}", config.areas_path, e);
            None
        }
    };

    let database = Arc::new(Database::connect(&config.database_url).await?);
    database.init_tables().await?;
    if let Some(index) = &regions {
        let seeded = database.seed_areas(index).await?;
        tracing::debug!("Seeded {} new offices into the area table", seeded);
    }

    let client = JmaClient::new(&config)?;
    let forecasts = Arc::new(ForecastService::new(
        client,
        database.clone(),
        config.forecast_mode,
    ));

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        config: Arc::new(config),
        regions,
        database,
        forecasts,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server starting on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
