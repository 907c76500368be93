mod settings;

use anyhow::Result;
use salary_tax_engine::api::{AppState, create_router};
use salary_tax_engine::config::{ConfigLoader, RulesFetcher};
use salary_tax_engine::engine::{ENGINE_VERSION, TaxEngine};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::settings::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "salary_tax_engine={level},tower_http={level}",
                level = config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting salary tax engine v{}", ENGINE_VERSION);

    let loader = match &config.rules_dir {
        Some(dir) => ConfigLoader::load(dir)?,
        None => ConfigLoader::builtin()?,
    };
    let fetcher = RulesFetcher::new(loader.into_rule_book());
    info!(
        default_fy = %fetcher.default_year(),
        years = fetcher.known_years().len(),
        "Tax rules loaded"
    );

    let app = create_router(AppState::new(TaxEngine::new(fetcher))).layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
