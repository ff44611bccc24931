use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Acknowledged, Command, CommandError};
use crate::readers::domain::ReaderService;

pub struct RemoveReaderCommand {
    reader_service: Box<dyn ReaderService>,
}

impl RemoveReaderCommand {
    pub fn new(reader_service: Box<dyn ReaderService>) -> Self {
        Self {
            reader_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoveReaderCommandRequest {
    pub reader_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RemoveReaderCommandResponse {
    pub reader_id: i64,
}

impl Acknowledged for RemoveReaderCommandResponse {
    fn message(&self) -> String {
        format!("Reader {} deleted", self.reader_id)
    }

    fn id(&self) -> Option<i64> {
        Some(self.reader_id)
    }
}

#[async_trait]
impl Command<RemoveReaderCommandRequest, RemoveReaderCommandResponse> for RemoveReaderCommand {
    async fn execute(&self, req: RemoveReaderCommandRequest) -> Result<RemoveReaderCommandResponse, CommandError> {
        self.reader_service.remove_reader(req.reader_id)
            .await.map_err(CommandError::from).map(|_| RemoveReaderCommandResponse { reader_id: req.reader_id })
    }
}
