use async_trait::async_trait;
use serde::Serialize;
use crate::core::command::{Acknowledged, Command, CommandError};
use crate::readers::domain::ReaderService;

pub struct ReconcileExpiredCommand {
    reader_service: Box<dyn ReaderService>,
}

impl ReconcileExpiredCommand {
    pub fn new(reader_service: Box<dyn ReaderService>) -> Self {
        Self {
            reader_service,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReconcileExpiredCommandResponse {
    pub expired: usize,
}

impl Acknowledged for ReconcileExpiredCommandResponse {
    fn message(&self) -> String {
        format!("{} readers moved to expired", self.expired)
    }

    fn id(&self) -> Option<i64> {
        None
    }
}

#[async_trait]
impl Command<(), ReconcileExpiredCommandResponse> for ReconcileExpiredCommand {
    async fn execute(&self, _req: ()) -> Result<ReconcileExpiredCommandResponse, CommandError> {
        self.reader_service.reconcile_expired().await.map_err(CommandError::from)
            .map(|expired| ReconcileExpiredCommandResponse { expired })
    }
}
