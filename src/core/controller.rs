use std::sync::Arc;
use axum::http::StatusCode;
use axum::response::Json;
use crate::core::command::{Acknowledged, CommandError, Outcome};
use crate::core::domain::Configuration;
use crate::utils::date::{Clock, SystemClock};
use crate::utils::sqlite::Database;

#[derive(Clone)]
pub struct AppState {
    pub config: Configuration,
    pub db: Database,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: Configuration, db: Database) -> AppState {
        AppState {
            config,
            db,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(config: Configuration, db: Database, clock: Arc<dyn Clock>) -> AppState {
        AppState {
            config,
            db,
            clock,
        }
    }
}

pub type ServerError = (StatusCode, Json<Outcome>);

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    (StatusCode::BAD_REQUEST, Json(Outcome::failed(format!("{}", err).as_str())))
}

// acknowledge renders a state-changing command result as an Outcome body.
pub fn acknowledge<T: Acknowledged>(res: Result<T, CommandError>) -> Result<Json<Outcome>, ServerError> {
    match res {
        Ok(ack) => Ok(Json(Outcome::from(Ok::<T, CommandError>(ack)))),
        Err(err) => Err(ServerError::from(err)),
    }
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        let status = match err {
            CommandError::NotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            CommandError::Ineligible { .. } => {
                StatusCode::FORBIDDEN
            }
            CommandError::InsufficientStock { .. } => {
                StatusCode::CONFLICT
            }
            CommandError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            CommandError::Database { retryable, .. } => {
                if retryable { StatusCode::SERVICE_UNAVAILABLE } else { StatusCode::INTERNAL_SERVER_ERROR }
            }
            CommandError::Runtime { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            CommandError::Serialization { .. } => {
                StatusCode::BAD_REQUEST
            }
            CommandError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
        };
        (status, Json(Outcome::from(&err)))
    }
}
