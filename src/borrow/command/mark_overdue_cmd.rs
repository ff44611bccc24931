use async_trait::async_trait;
use serde::Serialize;
use crate::borrow::domain::BorrowService;
use crate::core::command::{Acknowledged, Command, CommandError};

pub struct MarkOverdueCommand {
    borrow_service: Box<dyn BorrowService>,
}

impl MarkOverdueCommand {
    pub fn new(borrow_service: Box<dyn BorrowService>) -> Self {
        Self {
            borrow_service,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkOverdueCommandResponse {
    pub late: usize,
}

impl Acknowledged for MarkOverdueCommandResponse {
    fn message(&self) -> String {
        format!("{} borrow slips marked late", self.late)
    }

    fn id(&self) -> Option<i64> {
        None
    }
}

#[async_trait]
impl Command<(), MarkOverdueCommandResponse> for MarkOverdueCommand {
    async fn execute(&self, _req: ()) -> Result<MarkOverdueCommandResponse, CommandError> {
        self.borrow_service.mark_overdue().await.map_err(CommandError::from)
            .map(|late| MarkOverdueCommandResponse { late })
    }
}

#[cfg(test)]
mod tests {
    use crate::borrow::command::mark_overdue_cmd::MarkOverdueCommand;
    use crate::borrow::domain::BorrowService;
    use crate::borrow::dto::BorrowRequest;
    use crate::borrow::factory;
    use crate::core::command::{Command, Outcome};
    use crate::core::domain::LookupKey;
    use crate::utils::testing::{fixed_clock, seed_book, seed_reader, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_mark_overdue() {
        let db = test_db().await;
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 3, 3).await;
        let _ = factory::create_borrow_service(&test_config(), &db, fixed_clock("2025-01-01"))
            .create_borrow(&BorrowRequest::new(LookupKey::Id(reader_id), LookupKey::Id(book_id)))
            .await.expect("should borrow");

        let cmd = MarkOverdueCommand::new(factory::create_borrow_service(&test_config(), &db, fixed_clock("2025-01-16")));
        let outcome = Outcome::from(cmd.execute(()).await);
        assert!(outcome.success);
        assert_eq!("1 borrow slips marked late", outcome.message);
        assert_eq!(0, cmd.execute(()).await.expect("should mark nothing").late);
    }
}
