#![allow(dead_code)]

use std::{fs::File, net::SocketAddr};

use anyhow::Context;
use tempfile::TempDir;
use trip_planner::{
    config::AppConfig,
    db::{init_pool, run_migrations},
    state::AppState,
};

/// Application state backed by a throwaway SQLite file.
///
/// The returned directory must outlive the state.
pub async fn test_state() -> anyhow::Result<(AppState, TempDir)> {
    let root = TempDir::new().context("create temp dir for test database")?;
    let db_path = root.path().join("test.sqlite");
    File::create(&db_path)?;

    let config = AppConfig {
        database_url: format!("sqlite://{}", db_path.to_string_lossy()),
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        static_root: root.path().join("static"),
        cookie_secret: "test-cookie-secret".into(),
        session_ttl_hours: 1,
    };

    let db = init_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    Ok((AppState::new(config, db), root))
}
