use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::borrow::domain::{BorrowService, BorrowSlip};
use crate::borrow::dto::BorrowSlipDto;
use crate::core::command::{Acknowledged, Command, CommandError};

pub struct ReturnBooksCommand {
    borrow_service: Box<dyn BorrowService>,
}

impl ReturnBooksCommand {
    pub fn new(borrow_service: Box<dyn BorrowService>) -> Self {
        Self {
            borrow_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReturnBooksCommandRequest {
    pub slip_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ReturnBooksCommandResponse {
    pub slip: BorrowSlipDto,
}

impl Acknowledged for ReturnBooksCommandResponse {
    fn message(&self) -> String {
        format!("Slip {} returned, {} copies back in stock", self.slip.slip_id, self.slip.total_quantity())
    }

    fn id(&self) -> Option<i64> {
        Some(self.slip.slip_id)
    }
}

#[async_trait]
impl Command<ReturnBooksCommandRequest, ReturnBooksCommandResponse> for ReturnBooksCommand {
    async fn execute(&self, req: ReturnBooksCommandRequest) -> Result<ReturnBooksCommandResponse, CommandError> {
        self.borrow_service.return_books(req.slip_id)
            .await.map_err(CommandError::from).map(|slip| ReturnBooksCommandResponse { slip })
    }
}

#[cfg(test)]
mod tests {
    use crate::borrow::command::return_books_cmd::{ReturnBooksCommand, ReturnBooksCommandRequest};
    use crate::borrow::domain::BorrowService;
    use crate::borrow::dto::BorrowRequest;
    use crate::borrow::factory;
    use crate::core::command::{Command, CommandError, Outcome};
    use crate::core::domain::LookupKey;
    use crate::utils::testing::{available_quantity, fixed_clock, seed_book, seed_reader, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_return_books() {
        let db = test_db().await;
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 3, 3).await;
        let borrow_svc = factory::create_borrow_service(&test_config(), &db, fixed_clock("2025-01-01"));
        let mut req = BorrowRequest::new(LookupKey::Id(reader_id), LookupKey::Id(book_id));
        req.quantity = Some(2);
        let slip = borrow_svc.create_borrow(&req).await.expect("should borrow");

        let cmd = ReturnBooksCommand::new(factory::create_borrow_service(&test_config(), &db, fixed_clock("2025-01-08")));
        let outcome = Outcome::from(cmd.execute(ReturnBooksCommandRequest { slip_id: slip.slip_id }).await);
        assert!(outcome.success);
        assert_eq!(format!("Slip {} returned, 2 copies back in stock", slip.slip_id), outcome.message);
        assert_eq!(3, available_quantity(&db, book_id).await);

        let again = cmd.execute(ReturnBooksCommandRequest { slip_id: slip.slip_id }).await;
        assert!(matches!(again, Err(CommandError::Conflict { .. })));
    }
}
