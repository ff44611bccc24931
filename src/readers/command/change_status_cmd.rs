use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Acknowledged, Command, CommandError};
use crate::core::library::ReaderStatus;
use crate::readers::domain::ReaderService;

pub struct ChangeStatusCommand {
    reader_service: Box<dyn ReaderService>,
}

impl ChangeStatusCommand {
    pub fn new(reader_service: Box<dyn ReaderService>) -> Self {
        Self {
            reader_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusCommandRequest {
    #[serde(default)]
    pub reader_id: i64,
    pub status: ReaderStatus,
}

#[derive(Debug, Serialize)]
pub struct ChangeStatusCommandResponse {
    pub reader_id: i64,
    pub status: ReaderStatus,
}

impl Acknowledged for ChangeStatusCommandResponse {
    fn message(&self) -> String {
        format!("Reader {} is now {}", self.reader_id, self.status.label())
    }

    fn id(&self) -> Option<i64> {
        Some(self.reader_id)
    }
}

#[async_trait]
impl Command<ChangeStatusCommandRequest, ChangeStatusCommandResponse> for ChangeStatusCommand {
    async fn execute(&self, req: ChangeStatusCommandRequest) -> Result<ChangeStatusCommandResponse, CommandError> {
        self.reader_service.change_status(req.reader_id, req.status).await.map_err(CommandError::from)
            .map(|_| ChangeStatusCommandResponse { reader_id: req.reader_id, status: req.status })
    }
}
