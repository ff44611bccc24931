use std::collections::HashMap;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::Value;
use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
use crate::catalog::command::book_stats_cmd::{BookStatsCommand, BookStatsCommandResponse};
use crate::catalog::command::get_book_cmd::{GetBookCommand, GetBookCommandRequest, GetBookCommandResponse};
use crate::catalog::command::query_books_cmd::{QueryBooksCommand, QueryBooksCommandRequest, QueryBooksCommandResponse};
use crate::catalog::command::reference_cmd::{AddReferenceCommand, AddReferenceCommandRequest, ListReferencesCommand, ListReferencesCommandResponse, ReferenceKind};
use crate::catalog::command::remove_book_cmd::{RemoveBookCommand, RemoveBookCommandRequest};
use crate::catalog::command::update_book_cmd::{UpdateBookCommand, UpdateBookCommandRequest};
use crate::catalog::command::update_inventory_cmd::{UpdateInventoryCommand, UpdateInventoryCommandRequest};
use crate::catalog::domain::CatalogService;
use crate::catalog::factory;
use crate::core::command::{Command, CommandError, Outcome};
use crate::core::controller::{acknowledge, AppState, json_to_server_error, ServerError};

fn build_service(state: &AppState) -> Box<dyn CatalogService> {
    factory::create_catalog_service(&state.config, &state.db, state.clock.clone())
}

pub async fn add_book(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    let req: AddBookCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state);
    acknowledge(AddBookCommand::new(svc).execute(req).await)
}

pub async fn find_book_by_id(
    State(state): State<AppState>,
    Path(book_id): Path<i64>) -> Result<Json<GetBookCommandResponse>, ServerError> {
    let req = GetBookCommandRequest::new(book_id);
    let svc = build_service(&state);
    let res = GetBookCommand::new(svc, state.config.low_stock_threshold).execute(req).await?;
    Ok(Json(res))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    let mut req: UpdateBookCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.book_id = book_id;
    let svc = build_service(&state);
    acknowledge(UpdateBookCommand::new(svc).execute(req).await)
}

pub async fn remove_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>) -> Result<Json<Outcome>, ServerError> {
    let req = RemoveBookCommandRequest { book_id };
    let svc = build_service(&state);
    acknowledge(RemoveBookCommand::new(svc).execute(req).await)
}

pub async fn query_books(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>) -> Result<Json<QueryBooksCommandResponse>, ServerError> {
    let req = QueryBooksCommandRequest::from_params(params).map_err(CommandError::from)?;
    let svc = build_service(&state);
    let res = QueryBooksCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub async fn update_inventory(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    let mut req: UpdateInventoryCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.book_id = book_id;
    let svc = build_service(&state);
    acknowledge(UpdateInventoryCommand::new(svc).execute(req).await)
}

async fn add_reference(state: AppState, kind: ReferenceKind, json: Value) -> Result<Json<Outcome>, ServerError> {
    let mut req: AddReferenceCommandRequest = serde_json::from_value(json).map_err(json_to_server_error)?;
    req.kind = kind;
    let svc = build_service(&state);
    acknowledge(AddReferenceCommand::new(svc).execute(req).await)
}

pub async fn add_author(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    add_reference(state, ReferenceKind::Author, json.0).await
}

pub async fn add_category(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    add_reference(state, ReferenceKind::Category, json.0).await
}

pub async fn add_publisher(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    add_reference(state, ReferenceKind::Publisher, json.0).await
}

pub async fn list_references(
    State(state): State<AppState>) -> Result<Json<ListReferencesCommandResponse>, ServerError> {
    let svc = build_service(&state);
    let res = ListReferencesCommand::new(svc).execute(()).await?;
    Ok(Json(res))
}

pub async fn book_stats(
    State(state): State<AppState>) -> Result<Json<BookStatsCommandResponse>, ServerError> {
    let svc = build_service(&state);
    let res = BookStatsCommand::new(svc).execute(()).await?;
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::Json;
    use serde_json::json;
    use crate::catalog::controller::{add_book, find_book_by_id, remove_book, update_inventory};
    use crate::core::controller::AppState;
    use crate::utils::testing::{fixed_clock, test_config, test_db};

    #[tokio::test]
    async fn test_should_serve_book_lifecycle() {
        let state = AppState::with_clock(test_config(), test_db().await, fixed_clock("2025-01-01"));

        let outcome = add_book(State(state.clone()), Json(json!({"title": "Dune", "isbn": "X"})))
            .await.expect("should add book");
        assert!(outcome.0.success);
        let book_id = outcome.0.id.expect("should return id");

        let (status, body) = add_book(State(state.clone()), Json(json!({"title": "Dune 2", "isbn": "X"})))
            .await.expect_err("should conflict");
        assert_eq!(StatusCode::CONFLICT, status);
        assert!(!body.0.success);

        let (status, _) = add_book(State(state.clone()), Json(json!({"isbn": 7})))
            .await.expect_err("should reject body");
        assert_eq!(StatusCode::BAD_REQUEST, status);

        let _ = update_inventory(State(state.clone()), Path(book_id), Json(json!({"total_quantity": 3, "available_quantity": 3})))
            .await.expect("should update inventory");
        let loaded = find_book_by_id(State(state.clone()), Path(book_id)).await.expect("should find book");
        assert_eq!(3, loaded.0.book.available_quantity);

        let _ = remove_book(State(state.clone()), Path(book_id)).await.expect("should remove book");
        let (status, _) = find_book_by_id(State(state), Path(book_id)).await.expect_err("should be gone");
        assert_eq!(StatusCode::NOT_FOUND, status);
    }
}
