use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::core::library::ReputationLevel;
use crate::readers::domain::{Reader, ReaderService};
use crate::readers::dto::ReaderDto;
use crate::utils::date::Clock;

pub struct GetReaderCommand {
    reader_service: Box<dyn ReaderService>,
    clock: Arc<dyn Clock>,
}

impl GetReaderCommand {
    pub fn new(reader_service: Box<dyn ReaderService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reader_service,
            clock,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetReaderCommandRequest {
    pub reader_id: i64,
}

impl GetReaderCommandRequest {
    pub fn new(reader_id: i64) -> Self {
        Self {
            reader_id,
        }
    }
}

// GetReaderCommandResponse carries the reader with the card and reputation summary shown on its detail view.
#[derive(Debug, Serialize)]
pub struct GetReaderCommandResponse {
    pub reader: ReaderDto,
    pub status_label: String,
    pub reputation_level: ReputationLevel,
    pub card_expired: bool,
    pub days_until_expiry: Option<i64>,
}

#[async_trait]
impl Command<GetReaderCommandRequest, GetReaderCommandResponse> for GetReaderCommand {
    async fn execute(&self, req: GetReaderCommandRequest) -> Result<GetReaderCommandResponse, CommandError> {
        let today = self.clock.today();
        self.reader_service.find_reader_by_id(req.reader_id).await.map_err(CommandError::from)
            .map(|reader| GetReaderCommandResponse {
                status_label: reader.status_label().to_string(),
                reputation_level: reader.reputation_level(),
                card_expired: reader.is_expired(today),
                days_until_expiry: reader.days_until_expiry(today),
                reader,
            })
    }
}
