use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::core::command::{Acknowledged, Command, CommandError};
use crate::core::library::ReaderStatus;
use crate::readers::domain::ReaderService;
use crate::readers::dto::ReaderDto;

pub struct UpdateReaderCommand {
    reader_service: Box<dyn ReaderService>,
}

impl UpdateReaderCommand {
    pub fn new(reader_service: Box<dyn ReaderService>) -> Self {
        Self {
            reader_service,
        }
    }
}

// The whole record is replaced, omitted optional fields are cleared.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReaderCommandRequest {
    #[serde(default)]
    pub reader_id: i64,
    pub full_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub card_start: Option<NaiveDate>,
    pub card_end: Option<NaiveDate>,
    pub status: ReaderStatus,
    pub reputation_score: i64,
}

impl UpdateReaderCommandRequest {
    pub fn from_reader(reader: &ReaderDto) -> Self {
        Self {
            reader_id: reader.reader_id,
            full_name: reader.full_name.to_string(),
            address: reader.address.clone(),
            phone: reader.phone.clone(),
            email: reader.email.clone(),
            card_start: reader.card_start,
            card_end: reader.card_end,
            status: reader.status,
            reputation_score: reader.reputation_score,
        }
    }

    pub fn build_reader(&self) -> ReaderDto {
        ReaderDto {
            reader_id: self.reader_id,
            full_name: self.full_name.to_string(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            card_start: self.card_start,
            card_end: self.card_end,
            status: self.status,
            reputation_score: self.reputation_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateReaderCommandResponse {
    pub reader_id: i64,
}

impl Acknowledged for UpdateReaderCommandResponse {
    fn message(&self) -> String {
        format!("Reader {} updated", self.reader_id)
    }

    fn id(&self) -> Option<i64> {
        Some(self.reader_id)
    }
}

#[async_trait]
impl Command<UpdateReaderCommandRequest, UpdateReaderCommandResponse> for UpdateReaderCommand {
    async fn execute(&self, req: UpdateReaderCommandRequest) -> Result<UpdateReaderCommandResponse, CommandError> {
        let reader = req.build_reader();
        self.reader_service.update_reader(&reader).await.map_err(CommandError::from)
            .map(|_| UpdateReaderCommandResponse { reader_id: reader.reader_id })
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::{Command, CommandError};
    use crate::readers::command::update_reader_cmd::{UpdateReaderCommand, UpdateReaderCommandRequest};
    use crate::readers::dto::ReaderDto;
    use crate::readers::factory;
    use crate::utils::testing::{day, fixed_clock, seed_reader, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_update_reader() {
        let db = test_db().await;
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let cmd = UpdateReaderCommand::new(factory::create_reader_service(&test_config(), &db, fixed_clock("2025-01-01")));

        let mut reader = ReaderDto::new("Ana Maria Lima", Some(day("2026-01-01")));
        reader.reader_id = reader_id;
        let res = cmd.execute(UpdateReaderCommandRequest::from_reader(&reader)).await.expect("should update reader");
        assert_eq!(reader_id, res.reader_id);

        reader.card_start = Some(day("2027-01-01"));
        let res = cmd.execute(UpdateReaderCommandRequest::from_reader(&reader)).await;
        assert!(matches!(res, Err(CommandError::Validation { .. })));
    }
}
