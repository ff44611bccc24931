use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::borrow::domain::BorrowService;
use crate::borrow::dto::{BorrowRequest, BorrowSlipDto};
use crate::core::command::{Acknowledged, Command, CommandError};
use crate::core::domain::LookupKey;

pub struct CreateBorrowCommand {
    borrow_service: Box<dyn BorrowService>,
}

impl CreateBorrowCommand {
    pub fn new(borrow_service: Box<dyn BorrowService>) -> Self {
        Self {
            borrow_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBorrowCommandRequest {
    pub reader: LookupKey,
    pub book: LookupKey,
    pub quantity: Option<i64>,
    pub staff_id: Option<i64>,
}

impl CreateBorrowCommandRequest {
    pub fn new(reader: LookupKey, book: LookupKey, quantity: Option<i64>) -> Self {
        Self {
            reader,
            book,
            quantity,
            staff_id: None,
        }
    }

    fn to_borrow(&self) -> BorrowRequest {
        BorrowRequest {
            reader: self.reader.clone(),
            book: self.book.clone(),
            quantity: self.quantity,
            staff_id: self.staff_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateBorrowCommandResponse {
    pub slip: BorrowSlipDto,
}

impl Acknowledged for CreateBorrowCommandResponse {
    fn message(&self) -> String {
        format!("Borrow slip {} created, due {}", self.slip.slip_id, self.slip.return_due)
    }

    fn id(&self) -> Option<i64> {
        Some(self.slip.slip_id)
    }
}

#[async_trait]
impl Command<CreateBorrowCommandRequest, CreateBorrowCommandResponse> for CreateBorrowCommand {
    async fn execute(&self, req: CreateBorrowCommandRequest) -> Result<CreateBorrowCommandResponse, CommandError> {
        self.borrow_service.create_borrow(&req.to_borrow())
            .await.map_err(CommandError::from).map(|slip| CreateBorrowCommandResponse { slip })
    }
}
