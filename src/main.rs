mod app;
mod auth;
mod config;
mod error;
mod recipes;
mod state;
mod store;

use tracing_subscriber::EnvFilter;

use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "recipebox=debug,axum=info,tower_http=info";

/// Text logs by default; `LOG_FORMAT=json` for one JSON object per line.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.with_target(false).json().init(),
        _ => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let app_state = AppState::init().await?;
    let config = app_state.config.clone();

    app::serve(app::build_app(app_state), &config).await
}
