use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::core::command::{Acknowledged, Command, CommandError};
use crate::core::library::ReaderStatus;
use crate::readers::domain::ReaderService;
use crate::readers::dto::ReaderDto;

pub struct AddReaderCommand {
    reader_service: Box<dyn ReaderService>,
}

impl AddReaderCommand {
    pub fn new(reader_service: Box<dyn ReaderService>) -> Self {
        Self {
            reader_service,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddReaderCommandRequest {
    pub full_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub card_start: Option<NaiveDate>,
    pub card_end: Option<NaiveDate>,
    pub status: Option<ReaderStatus>,
    pub reputation_score: Option<i64>,
}

impl AddReaderCommandRequest {
    pub fn new(full_name: &str, card_end: Option<NaiveDate>) -> Self {
        Self {
            full_name: full_name.to_string(),
            card_end,
            ..Default::default()
        }
    }

    pub fn build_reader(&self) -> ReaderDto {
        let mut reader = ReaderDto::new(self.full_name.as_str(), self.card_end);
        reader.address = self.address.clone();
        reader.phone = self.phone.clone();
        reader.email = self.email.clone();
        reader.card_start = self.card_start;
        if let Some(status) = self.status {
            reader.status = status;
        }
        if let Some(score) = self.reputation_score {
            reader.reputation_score = score;
        }
        reader
    }
}

#[derive(Debug, Serialize)]
pub struct AddReaderCommandResponse {
    pub reader_id: i64,
    pub full_name: String,
}

impl AddReaderCommandResponse {
    pub fn new(reader_id: i64, full_name: &str) -> Self {
        Self {
            reader_id,
            full_name: full_name.to_string(),
        }
    }
}

impl Acknowledged for AddReaderCommandResponse {
    fn message(&self) -> String {
        format!("Reader '{}' added", self.full_name)
    }

    fn id(&self) -> Option<i64> {
        Some(self.reader_id)
    }
}

#[async_trait]
impl Command<AddReaderCommandRequest, AddReaderCommandResponse> for AddReaderCommand {
    async fn execute(&self, req: AddReaderCommandRequest) -> Result<AddReaderCommandResponse, CommandError> {
        let reader = req.build_reader();
        self.reader_service.add_reader(&reader).await.map_err(CommandError::from)
            .map(|reader_id| AddReaderCommandResponse::new(reader_id, reader.full_name.trim()))
    }
}
