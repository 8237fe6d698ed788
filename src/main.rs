use std::time::Duration;

mod app;
mod barcode;
mod bot;
mod catalog;
mod config;
mod db;
mod images;
mod items;
mod journal;
mod meals;
mod memory;
mod products;
mod state;
mod webhook;

#[cfg(test)]
mod testing;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nutritracker=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    if let Some(db) = &app_state.db {
        db::migrate(db).await?;
    }

    bot::session::spawn_sweeper(app_state.sessions.clone(), SESSION_SWEEP_INTERVAL);

    let listen_addr = app_state.config.listen_addr();
    app::serve(app::build_app(app_state), &listen_addr).await
}
