use std::collections::HashMap;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::Value;
use crate::borrow::command::create_borrow_cmd::{CreateBorrowCommand, CreateBorrowCommandRequest};
use crate::borrow::command::get_borrow_cmd::{GetBorrowCommand, GetBorrowCommandRequest, GetBorrowCommandResponse};
use crate::borrow::command::list_borrows_cmd::{ListBorrowsCommand, ListBorrowsCommandRequest, ListBorrowsCommandResponse};
use crate::borrow::command::mark_overdue_cmd::MarkOverdueCommand;
use crate::borrow::command::reader_borrows_cmd::{ReaderBorrowsCommand, ReaderBorrowsCommandRequest, ReaderBorrowsCommandResponse};
use crate::borrow::command::reader_penalties_cmd::{ReaderPenaltiesCommand, ReaderPenaltiesCommandRequest, ReaderPenaltiesCommandResponse};
use crate::borrow::command::record_penalty_cmd::{RecordPenaltyCommand, RecordPenaltyCommandRequest};
use crate::borrow::command::return_books_cmd::{ReturnBooksCommand, ReturnBooksCommandRequest};
use crate::borrow::command::update_borrow_cmd::{UpdateBorrowCommand, UpdateBorrowCommandRequest};
use crate::borrow::domain::BorrowService;
use crate::borrow::factory;
use crate::core::command::{Command, CommandError, Outcome};
use crate::core::controller::{acknowledge, AppState, json_to_server_error, ServerError};

fn build_service(state: &AppState) -> Box<dyn BorrowService> {
    factory::create_borrow_service(&state.config, &state.db, state.clock.clone())
}

pub async fn create_borrow(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    let req: CreateBorrowCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state);
    acknowledge(CreateBorrowCommand::new(svc).execute(req).await)
}

pub async fn find_borrow_by_id(
    State(state): State<AppState>,
    Path(slip_id): Path<i64>) -> Result<Json<GetBorrowCommandResponse>, ServerError> {
    let req = GetBorrowCommandRequest { slip_id };
    let svc = build_service(&state);
    let res = GetBorrowCommand::new(svc, state.clock.clone()).execute(req).await?;
    Ok(Json(res))
}

pub async fn list_borrows(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>) -> Result<Json<ListBorrowsCommandResponse>, ServerError> {
    let req = ListBorrowsCommandRequest::from_params(params).map_err(CommandError::from)?;
    let svc = build_service(&state);
    let res = ListBorrowsCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub async fn update_borrow(
    State(state): State<AppState>,
    Path(slip_id): Path<i64>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    let mut req: UpdateBorrowCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.slip_id = slip_id;
    let svc = build_service(&state);
    acknowledge(UpdateBorrowCommand::new(svc).execute(req).await)
}

pub async fn return_books(
    State(state): State<AppState>,
    Path(slip_id): Path<i64>) -> Result<Json<Outcome>, ServerError> {
    let req = ReturnBooksCommandRequest { slip_id };
    let svc = build_service(&state);
    acknowledge(ReturnBooksCommand::new(svc).execute(req).await)
}

pub async fn mark_overdue(
    State(state): State<AppState>) -> Result<Json<Outcome>, ServerError> {
    let svc = build_service(&state);
    acknowledge(MarkOverdueCommand::new(svc).execute(()).await)
}

pub async fn record_penalty(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    let req: RecordPenaltyCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state);
    acknowledge(RecordPenaltyCommand::new(svc).execute(req).await)
}

pub async fn reader_borrows(
    State(state): State<AppState>,
    Path(reader_id): Path<i64>,
    Query(params): Query<HashMap<String, String>>) -> Result<Json<ReaderBorrowsCommandResponse>, ServerError> {
    let page_size = match params.get("page_size") {
        Some(s) => Some(s.parse::<usize>().map_err(|_| CommandError::Validation {
            message: format!("invalid page_size {}", s), reason_code: Some("400".to_string()) })?),
        None => None,
    };
    let req = ReaderBorrowsCommandRequest { reader_id, page: params.get("page").cloned(), page_size };
    let svc = build_service(&state);
    let res = ReaderBorrowsCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub async fn reader_penalties(
    State(state): State<AppState>,
    Path(reader_id): Path<i64>) -> Result<Json<ReaderPenaltiesCommandResponse>, ServerError> {
    let req = ReaderPenaltiesCommandRequest { reader_id };
    let svc = build_service(&state);
    let res = ReaderPenaltiesCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::Json;
    use serde_json::json;
    use crate::borrow::controller::{create_borrow, find_borrow_by_id, list_borrows, mark_overdue, reader_borrows, reader_penalties, record_penalty, return_books, update_borrow};
    use crate::core::controller::AppState;
    use crate::core::library::SlipStatus;
    use crate::utils::testing::{available_quantity, fixed_clock, seed_book, seed_reader, test_config, test_db};

    #[tokio::test]
    async fn test_should_serve_borrow_lifecycle() {
        let db = test_db().await;
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 2, 2).await;
        let state = AppState::with_clock(test_config(), db.clone(), fixed_clock("2025-01-01"));

        let outcome = create_borrow(State(state.clone()), Json(json!({"reader": "Ana Lima", "book": book_id, "quantity": 2})))
            .await.expect("should create borrow");
        let slip_id = outcome.0.id.expect("should return id");
        assert_eq!(0, available_quantity(&db, book_id).await);

        let (status, body) = create_borrow(State(state.clone()), Json(json!({"reader": reader_id, "book": "Dune"})))
            .await.expect_err("should reject empty stock");
        assert_eq!(StatusCode::CONFLICT, status);
        assert!(!body.0.success);
        let (status, _) = create_borrow(State(state.clone()), Json(json!({"book": "Dune"})))
            .await.expect_err("should reject missing reader");
        assert_eq!(StatusCode::BAD_REQUEST, status);

        let loaded = find_borrow_by_id(State(state.clone()), Path(slip_id)).await.expect("should find borrow");
        assert_eq!(2, loaded.0.total_quantity);
        let listed = list_borrows(State(state.clone()), Query(HashMap::new())).await.expect("should list borrows");
        assert_eq!(1, listed.0.borrows.records.len());

        let outcome = record_penalty(State(state.clone()), Json(json!({"reader_id": reader_id, "slip_id": slip_id,
            "book_id": book_id, "penalty_type": "DAMAGED", "amount": 5.0}))).await.expect("should record penalty");
        assert!(outcome.0.success);
        let penalties = reader_penalties(State(state.clone()), Path(reader_id)).await.expect("should list penalties");
        assert_eq!(5.0, penalties.0.total_amount);
        let slips = reader_borrows(State(state.clone()), Path(reader_id), Query(HashMap::new())).await.expect("should list slips");
        assert_eq!(slip_id, slips.0.slips.records[0].slip_id);

        let _ = return_books(State(state.clone()), Path(slip_id)).await.expect("should return books");
        assert_eq!(2, available_quantity(&db, book_id).await);
        let (status, _) = return_books(State(state.clone()), Path(slip_id)).await.expect_err("should reject double return");
        assert_eq!(StatusCode::CONFLICT, status);
    }

    #[tokio::test]
    async fn test_should_serve_overdue_and_override() {
        let db = test_db().await;
        let _ = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let _ = seed_reader(&db, "Bruno Costa", "LOCKED", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 2, 2).await;
        let state = AppState::with_clock(test_config(), db.clone(), fixed_clock("2025-01-01"));
        let outcome = create_borrow(State(state.clone()), Json(json!({"reader": "Ana Lima", "book": book_id})))
            .await.expect("should create borrow");
        let slip_id = outcome.0.id.expect("should return id");
        let (status, _) = create_borrow(State(state.clone()), Json(json!({"reader": "Bruno Costa", "book": book_id})))
            .await.expect_err("should reject locked reader");
        assert_eq!(StatusCode::FORBIDDEN, status);

        let later = AppState::with_clock(test_config(), db.clone(), fixed_clock("2025-02-01"));
        let outcome = mark_overdue(State(later.clone())).await.expect("should mark overdue");
        assert_eq!("1 borrow slips marked late", outcome.0.message);
        let loaded = find_borrow_by_id(State(later.clone()), Path(slip_id)).await.expect("should find borrow");
        assert_eq!(SlipStatus::Late, loaded.0.slip.status);
        assert!(loaded.0.overdue);

        let _ = update_borrow(State(later.clone()), Path(slip_id),
                              Json(json!({"borrow_date": "2025-01-01", "return_date": "2025-01-30", "status": "RETURNED"})))
            .await.expect("should override slip");
        let loaded = find_borrow_by_id(State(later.clone()), Path(slip_id)).await.expect("should find borrow");
        assert_eq!(SlipStatus::Returned, loaded.0.slip.status);
        assert!(!loaded.0.overdue);
        // override has no stock side effects
        assert_eq!(1, available_quantity(&db, book_id).await);

        let (status, _) = update_borrow(State(later.clone()), Path(slip_id), Json(json!({"status": "GONE"})))
            .await.expect_err("should reject body");
        assert_eq!(StatusCode::BAD_REQUEST, status);
    }
}
