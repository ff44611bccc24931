use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::borrow::domain::BorrowService;
use crate::borrow::dto::BorrowSlipDto;
use crate::core::command::{Command, CommandError};
use crate::core::library::PaginatedResult;

pub struct ReaderBorrowsCommand {
    borrow_service: Box<dyn BorrowService>,
}

impl ReaderBorrowsCommand {
    pub fn new(borrow_service: Box<dyn BorrowService>) -> Self {
        Self {
            borrow_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReaderBorrowsCommandRequest {
    pub reader_id: i64,
    pub page: Option<String>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ReaderBorrowsCommandResponse {
    pub reader_id: i64,
    pub slips: PaginatedResult<BorrowSlipDto>,
}

#[async_trait]
impl Command<ReaderBorrowsCommandRequest, ReaderBorrowsCommandResponse> for ReaderBorrowsCommand {
    async fn execute(&self, req: ReaderBorrowsCommandRequest) -> Result<ReaderBorrowsCommandResponse, CommandError> {
        self.borrow_service.find_borrows_by_reader(req.reader_id, req.page.as_deref(), req.page_size.unwrap_or(50))
            .await.map_err(CommandError::from)
            .map(|slips| ReaderBorrowsCommandResponse { reader_id: req.reader_id, slips })
    }
}
