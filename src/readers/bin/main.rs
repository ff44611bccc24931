use std::net::SocketAddr;
use axum::{
    routing::{get, post, put},
    Router,
};
use tracing::info;
use libdesk::core::controller::AppState;
use libdesk::core::domain::Configuration;
use libdesk::readers::controller::{add_reader, change_status, extend_card, find_reader_by_id, query_readers, reader_stats, reconcile_expired, remove_reader, update_reader, update_score};
use libdesk::utils::logging::setup_tracing;
use libdesk::utils::sqlite::build_database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Configuration::from_env("readers")?;
    setup_tracing(config.log_level.as_str());

    let db = build_database(&config).await?;
    let addr: SocketAddr = config.listen_addr.parse()?;
    let state = AppState::new(config, db);

    let app = Router::new()
        .route("/readers", post(add_reader).get(query_readers))
        .route("/readers/reconcile", post(reconcile_expired))
        .route("/readers/:id",
               get(find_reader_by_id).put(update_reader).delete(remove_reader))
        .route("/readers/:id/status", put(change_status))
        .route("/readers/:id/score", put(update_score))
        .route("/readers/:id/extend", post(extend_card))
        .route("/stats/readers", get(reader_stats))
        .with_state(state);

    info!("readers listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
