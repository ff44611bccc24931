use std::net::SocketAddr;
use axum::{
    routing::{get, post, put},
    Router,
};
use tracing::info;
use libdesk::catalog::controller::{add_author, add_book, add_category, add_publisher, book_stats, find_book_by_id, list_references, query_books, remove_book, update_book, update_inventory};
use libdesk::core::controller::AppState;
use libdesk::core::domain::Configuration;
use libdesk::utils::logging::setup_tracing;
use libdesk::utils::sqlite::build_database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Configuration::from_env("catalog")?;
    setup_tracing(config.log_level.as_str());

    let db = build_database(&config).await?;
    let addr: SocketAddr = config.listen_addr.parse()?;
    let state = AppState::new(config, db);

    let app = Router::new()
        .route("/books", post(add_book).get(query_books))
        .route("/books/:id",
               get(find_book_by_id).put(update_book).delete(remove_book))
        .route("/books/:id/inventory", put(update_inventory))
        .route("/authors", post(add_author))
        .route("/categories", post(add_category))
        .route("/publishers", post(add_publisher))
        .route("/references", get(list_references))
        .route("/stats/books", get(book_stats))
        .with_state(state);

    info!("catalog listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
