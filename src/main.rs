use lms_dashboard::{load_catalog, resolve_data_path, router, AppState, JsonStore};
use std::{env, net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path()?;
    let catalog = load_catalog(&data_path).await?;
    info!(
        "loaded catalog from {}: {} users, {} courses, payment ledger: {}",
        data_path.display(),
        catalog.users.len(),
        catalog.courses.len(),
        catalog.payments.is_some(),
    );

    let state = AppState::new(Arc::new(JsonStore::new(catalog)));
    let app = router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
