use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::borrow::domain::BorrowService;
use crate::borrow::dto::PenaltyDto;
use crate::core::command::{Command, CommandError};

pub struct ReaderPenaltiesCommand {
    borrow_service: Box<dyn BorrowService>,
}

impl ReaderPenaltiesCommand {
    pub fn new(borrow_service: Box<dyn BorrowService>) -> Self {
        Self {
            borrow_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReaderPenaltiesCommandRequest {
    pub reader_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ReaderPenaltiesCommandResponse {
    pub reader_id: i64,
    pub total_amount: f64,
    pub penalties: Vec<PenaltyDto>,
}

#[async_trait]
impl Command<ReaderPenaltiesCommandRequest, ReaderPenaltiesCommandResponse> for ReaderPenaltiesCommand {
    async fn execute(&self, req: ReaderPenaltiesCommandRequest) -> Result<ReaderPenaltiesCommandResponse, CommandError> {
        self.borrow_service.find_penalties_by_reader(req.reader_id).await.map_err(CommandError::from)
            .map(|penalties| ReaderPenaltiesCommandResponse {
                reader_id: req.reader_id,
                total_amount: penalties.iter().map(|p| p.amount).sum(),
                penalties,
            })
    }
}
