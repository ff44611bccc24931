use std::collections::HashMap;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::Value;
use crate::core::command::{Command, CommandError, Outcome};
use crate::core::controller::{acknowledge, AppState, json_to_server_error, ServerError};
use crate::readers::command::add_reader_cmd::{AddReaderCommand, AddReaderCommandRequest};
use crate::readers::command::change_status_cmd::{ChangeStatusCommand, ChangeStatusCommandRequest};
use crate::readers::command::extend_card_cmd::{ExtendCardCommand, ExtendCardCommandRequest};
use crate::readers::command::get_reader_cmd::{GetReaderCommand, GetReaderCommandRequest, GetReaderCommandResponse};
use crate::readers::command::query_readers_cmd::{QueryReadersCommand, QueryReadersCommandRequest, QueryReadersCommandResponse};
use crate::readers::command::reader_stats_cmd::{ReaderStatsCommand, ReaderStatsCommandResponse};
use crate::readers::command::reconcile_expired_cmd::ReconcileExpiredCommand;
use crate::readers::command::remove_reader_cmd::{RemoveReaderCommand, RemoveReaderCommandRequest};
use crate::readers::command::update_reader_cmd::{UpdateReaderCommand, UpdateReaderCommandRequest};
use crate::readers::command::update_score_cmd::{UpdateScoreCommand, UpdateScoreCommandRequest};
use crate::readers::domain::ReaderService;
use crate::readers::factory;

fn build_service(state: &AppState) -> Box<dyn ReaderService> {
    factory::create_reader_service(&state.config, &state.db, state.clock.clone())
}

pub async fn add_reader(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    let req: AddReaderCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state);
    acknowledge(AddReaderCommand::new(svc).execute(req).await)
}

pub async fn find_reader_by_id(
    State(state): State<AppState>,
    Path(reader_id): Path<i64>) -> Result<Json<GetReaderCommandResponse>, ServerError> {
    let req = GetReaderCommandRequest::new(reader_id);
    let svc = build_service(&state);
    let res = GetReaderCommand::new(svc, state.clock.clone()).execute(req).await?;
    Ok(Json(res))
}

pub async fn update_reader(
    State(state): State<AppState>,
    Path(reader_id): Path<i64>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    let mut req: UpdateReaderCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.reader_id = reader_id;
    let svc = build_service(&state);
    acknowledge(UpdateReaderCommand::new(svc).execute(req).await)
}

pub async fn remove_reader(
    State(state): State<AppState>,
    Path(reader_id): Path<i64>) -> Result<Json<Outcome>, ServerError> {
    let req = RemoveReaderCommandRequest { reader_id };
    let svc = build_service(&state);
    acknowledge(RemoveReaderCommand::new(svc).execute(req).await)
}

pub async fn query_readers(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>) -> Result<Json<QueryReadersCommandResponse>, ServerError> {
    let req = QueryReadersCommandRequest::from_params(params).map_err(CommandError::from)?;
    let svc = build_service(&state);
    let res = QueryReadersCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub async fn change_status(
    State(state): State<AppState>,
    Path(reader_id): Path<i64>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    let mut req: ChangeStatusCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.reader_id = reader_id;
    let svc = build_service(&state);
    acknowledge(ChangeStatusCommand::new(svc).execute(req).await)
}

pub async fn update_score(
    State(state): State<AppState>,
    Path(reader_id): Path<i64>,
    json: Json<Value>) -> Result<Json<Outcome>, ServerError> {
    let mut req: UpdateScoreCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.reader_id = reader_id;
    let svc = build_service(&state);
    acknowledge(UpdateScoreCommand::new(svc).execute(req).await)
}

// an empty body extends by the configured card validity
pub async fn extend_card(
    State(state): State<AppState>,
    Path(reader_id): Path<i64>,
    json: Option<Json<Value>>) -> Result<Json<Outcome>, ServerError> {
    let mut req: ExtendCardCommandRequest = match json {
        Some(json) => serde_json::from_value(json.0).map_err(json_to_server_error)?,
        None => ExtendCardCommandRequest::default(),
    };
    req.reader_id = reader_id;
    let svc = build_service(&state);
    acknowledge(ExtendCardCommand::new(svc).execute(req).await)
}

pub async fn reconcile_expired(
    State(state): State<AppState>) -> Result<Json<Outcome>, ServerError> {
    let svc = build_service(&state);
    acknowledge(ReconcileExpiredCommand::new(svc).execute(()).await)
}

pub async fn reader_stats(
    State(state): State<AppState>) -> Result<Json<ReaderStatsCommandResponse>, ServerError> {
    let svc = build_service(&state);
    let res = ReaderStatsCommand::new(svc).execute(()).await?;
    Ok(Json(res))
}
