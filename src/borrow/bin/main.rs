use std::net::SocketAddr;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use libdesk::borrow::controller::{create_borrow, find_borrow_by_id, list_borrows, mark_overdue, reader_borrows, reader_penalties, record_penalty, return_books, update_borrow};
use libdesk::core::controller::AppState;
use libdesk::core::domain::Configuration;
use libdesk::utils::logging::setup_tracing;
use libdesk::utils::sqlite::build_database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Configuration::from_env("borrow")?;
    setup_tracing(config.log_level.as_str());

    let db = build_database(&config).await?;
    let addr: SocketAddr = config.listen_addr.parse()?;
    let state = AppState::new(config, db);

    let app = Router::new()
        .route("/borrows", post(create_borrow).get(list_borrows))
        .route("/borrows/overdue", post(mark_overdue))
        .route("/borrows/:id", get(find_borrow_by_id).put(update_borrow))
        .route("/borrows/:id/return", post(return_books))
        .route("/penalties", post(record_penalty))
        .route("/readers/:id/borrows", get(reader_borrows))
        .route("/readers/:id/penalties", get(reader_penalties))
        .with_state(state);

    info!("borrow desk listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
