mod backend;
mod config;
mod dashboard;
mod errors;
mod jobs;
mod markdown;
mod profiles;
mod routes;
mod state;
mod view;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::{Backend, HttpBackend};
use crate::config::Config;
use crate::dashboard::DashboardController;
use crate::jobs::recommend::StudentSkillProfile;
use crate::jobs::JobBoard;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting student dashboard v{}", env!("CARGO_PKG_VERSION"));

    let backend: Arc<dyn Backend> =
        Arc::new(HttpBackend::new(&config.backend_url, config.request_timeout)?);
    info!(
        "Backend client initialized ({}, timeout: {:?})",
        config.backend_url, config.request_timeout
    );

    let profile = config
        .student_skills
        .as_deref()
        .map(StudentSkillProfile::from_list)
        .unwrap_or_default();
    info!("Job recommendations use {} skills", profile.skills.len());

    let state = AppState {
        controller: Arc::new(DashboardController::new(backend.clone(), config.diagram_settle)),
        jobs: Arc::new(JobBoard::new(backend, profile)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
