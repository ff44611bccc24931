use async_trait::async_trait;
use serde::Serialize;
use crate::borrow::domain::BorrowService;
use crate::borrow::dto::PenaltyDto;
use crate::core::command::{Acknowledged, Command, CommandError};
use crate::core::library::PenaltyKind;

pub struct RecordPenaltyCommand {
    borrow_service: Box<dyn BorrowService>,
}

impl RecordPenaltyCommand {
    pub fn new(borrow_service: Box<dyn BorrowService>) -> Self {
        Self {
            borrow_service,
        }
    }
}

pub type RecordPenaltyCommandRequest = PenaltyDto;

#[derive(Debug, Serialize)]
pub struct RecordPenaltyCommandResponse {
    pub penalty_id: i64,
    pub penalty_type: PenaltyKind,
    pub amount: f64,
}

impl Acknowledged for RecordPenaltyCommandResponse {
    fn message(&self) -> String {
        format!("{} penalty of {:.2} recorded", self.penalty_type, self.amount)
    }

    fn id(&self) -> Option<i64> {
        Some(self.penalty_id)
    }
}

#[async_trait]
impl Command<RecordPenaltyCommandRequest, RecordPenaltyCommandResponse> for RecordPenaltyCommand {
    async fn execute(&self, req: RecordPenaltyCommandRequest) -> Result<RecordPenaltyCommandResponse, CommandError> {
        self.borrow_service.record_penalty(&req).await.map_err(CommandError::from)
            .map(|penalty_id| RecordPenaltyCommandResponse {
                penalty_id,
                penalty_type: req.penalty_type,
                amount: req.amount,
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::borrow::command::record_penalty_cmd::{RecordPenaltyCommand, RecordPenaltyCommandRequest};
    use crate::borrow::domain::BorrowService;
    use crate::borrow::dto::BorrowRequest;
    use crate::borrow::factory;
    use crate::core::command::{Command, CommandError, Outcome};
    use crate::core::domain::LookupKey;
    use crate::core::library::PenaltyKind;
    use crate::utils::testing::{fixed_clock, seed_book, seed_reader, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_record_penalty() {
        let db = test_db().await;
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 3, 3).await;
        let borrow_svc = factory::create_borrow_service(&test_config(), &db, fixed_clock("2025-01-01"));
        let slip = borrow_svc.create_borrow(&BorrowRequest::new(LookupKey::Id(reader_id), LookupKey::Id(book_id)))
            .await.expect("should borrow");

        let cmd = RecordPenaltyCommand::new(borrow_svc);
        let req = RecordPenaltyCommandRequest::new(reader_id, slip.slip_id, book_id, PenaltyKind::Lost, 80.0);
        let outcome = Outcome::from(cmd.execute(req).await);
        assert!(outcome.success);
        assert_eq!("LOST penalty of 80.00 recorded", outcome.message);

        let req = RecordPenaltyCommandRequest::new(reader_id, slip.slip_id, book_id + 1, PenaltyKind::Late, 1.0);
        assert!(matches!(cmd.execute(req).await, Err(CommandError::NotFound { .. })));
    }
}
