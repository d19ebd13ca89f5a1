use std::net::SocketAddr;

use backend::{routes, shared, system};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    let db_path = shared::config::get_database_path(&config)?;
    let port = config.server.port;
    let bootstrap_password = config.auth.bootstrap_admin_password.clone();
    shared::config::install(config);

    shared::data::db::initialize_database(Some(&db_path.to_string_lossy()))
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    // Ensure admin user exists
    system::initialization::ensure_admin_user_exists(&bootstrap_password).await?;

    let app = routes::app();

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Dashboard backend listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
