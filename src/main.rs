// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::session_service::SessionService;
use crate::application::sheet_repository::SheetRepository;
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::google_sheets::GoogleSheetsRepository;
use crate::infrastructure::sheet_cache::CachedSheetRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::render::Renderer;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config().context("failed to load configuration")?;
    let sources = config.resolved_sources();
    let configured = sources.iter().filter(|s| s.is_configured()).count();
    tracing::info!("{} of {} data sources configured", configured, sources.len());

    // Create repository (infrastructure layer)
    let sheets = GoogleSheetsRepository::new(
        config.sheets.api_base.clone(),
        Duration::from_secs(config.sheets.timeout_secs),
    )?;
    let repository: Arc<dyn SheetRepository> = Arc::new(CachedSheetRepository::new(
        Arc::new(sheets),
        Duration::from_secs(config.sheets.cache_ttl_secs),
    ));

    // Create services (application layer)
    let dashboard_service = DashboardService::new(repository.clone(), sources, config.dashboard.clone());
    let streaming_service = StreamingDashboardService::new(dashboard_service.clone());
    let renderer = Renderer::new(config.theme.clone(), config.session.remember_days)
        .context("failed to compile templates")?;

    // Create application state
    let state = Arc::new(AppState {
        sessions: SessionService::new(config.session.clone()),
        dashboard_service,
        streaming_service,
        repository,
        renderer,
        assets_dir: config.server.assets_dir.clone(),
        secure_cookies: config.server.secure_cookies,
    });

    // Build router (presentation layer)
    let router = router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind))?;
    tracing::info!("Starting metrics dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
