use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::borrow::domain::{BorrowService, BorrowSlip};
use crate::borrow::dto::BorrowSlipDto;
use crate::core::command::{Command, CommandError};
use crate::utils::date::Clock;

pub struct GetBorrowCommand {
    borrow_service: Box<dyn BorrowService>,
    clock: Arc<dyn Clock>,
}

impl GetBorrowCommand {
    pub fn new(borrow_service: Box<dyn BorrowService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            borrow_service,
            clock,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetBorrowCommandRequest {
    pub slip_id: i64,
}

#[derive(Debug, Serialize)]
pub struct GetBorrowCommandResponse {
    pub slip: BorrowSlipDto,
    pub overdue: bool,
    pub total_quantity: i64,
    pub total_fine: f64,
}

#[async_trait]
impl Command<GetBorrowCommandRequest, GetBorrowCommandResponse> for GetBorrowCommand {
    async fn execute(&self, req: GetBorrowCommandRequest) -> Result<GetBorrowCommandResponse, CommandError> {
        let today = self.clock.today();
        self.borrow_service.find_borrow_by_id(req.slip_id).await.map_err(CommandError::from)
            .map(|slip| GetBorrowCommandResponse {
                overdue: slip.is_overdue(today),
                total_quantity: slip.total_quantity(),
                total_fine: slip.total_fine(),
                slip,
            })
    }
}
