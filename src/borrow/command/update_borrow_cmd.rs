use async_trait::async_trait;
use serde::Serialize;
use crate::borrow::domain::BorrowService;
use crate::borrow::dto::SlipUpdate;
use crate::core::command::{Acknowledged, Command, CommandError};
use crate::core::library::SlipStatus;

pub struct UpdateBorrowCommand {
    borrow_service: Box<dyn BorrowService>,
}

impl UpdateBorrowCommand {
    pub fn new(borrow_service: Box<dyn BorrowService>) -> Self {
        Self {
            borrow_service,
        }
    }
}

pub type UpdateBorrowCommandRequest = SlipUpdate;

#[derive(Debug, Serialize)]
pub struct UpdateBorrowCommandResponse {
    pub slip_id: i64,
    pub status: SlipStatus,
}

impl Acknowledged for UpdateBorrowCommandResponse {
    fn message(&self) -> String {
        format!("Slip {} updated to {}", self.slip_id, self.status)
    }

    fn id(&self) -> Option<i64> {
        Some(self.slip_id)
    }
}

#[async_trait]
impl Command<UpdateBorrowCommandRequest, UpdateBorrowCommandResponse> for UpdateBorrowCommand {
    async fn execute(&self, req: UpdateBorrowCommandRequest) -> Result<UpdateBorrowCommandResponse, CommandError> {
        self.borrow_service.update_borrow(&req).await.map_err(CommandError::from)
            .map(|_| UpdateBorrowCommandResponse { slip_id: req.slip_id, status: req.status })
    }
}
