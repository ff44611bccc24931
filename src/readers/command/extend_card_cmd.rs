use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::core::command::{Acknowledged, Command, CommandError};
use crate::readers::domain::ReaderService;

pub struct ExtendCardCommand {
    reader_service: Box<dyn ReaderService>,
}

impl ExtendCardCommand {
    pub fn new(reader_service: Box<dyn ReaderService>) -> Self {
        Self {
            reader_service,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtendCardCommandRequest {
    #[serde(default)]
    pub reader_id: i64,
    // falls back to the configured card validity
    pub days: Option<i64>,
}

impl ExtendCardCommandRequest {
    pub fn new(reader_id: i64, days: Option<i64>) -> Self {
        Self {
            reader_id,
            days,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExtendCardCommandResponse {
    pub reader_id: i64,
    pub card_end: NaiveDate,
}

impl Acknowledged for ExtendCardCommandResponse {
    fn message(&self) -> String {
        format!("Card of reader {} extended to {}", self.reader_id, self.card_end)
    }

    fn id(&self) -> Option<i64> {
        Some(self.reader_id)
    }
}

#[async_trait]
impl Command<ExtendCardCommandRequest, ExtendCardCommandResponse> for ExtendCardCommand {
    async fn execute(&self, req: ExtendCardCommandRequest) -> Result<ExtendCardCommandResponse, CommandError> {
        self.reader_service.extend_card(req.reader_id, req.days).await.map_err(CommandError::from)
            .map(|card_end| ExtendCardCommandResponse { reader_id: req.reader_id, card_end })
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::{Command, CommandError, Outcome};
    use crate::readers::command::extend_card_cmd::{ExtendCardCommand, ExtendCardCommandRequest};
    use crate::readers::factory;
    use crate::utils::testing::{fixed_clock, seed_reader, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_extend_card() {
        let db = test_db().await;
        let reader_id = seed_reader(&db, "Ana Lima", "EXPIRED", "2024-01-01").await;
        let cmd = ExtendCardCommand::new(factory::create_reader_service(&test_config(), &db, fixed_clock("2025-01-01")));

        let outcome = Outcome::from(cmd.execute(ExtendCardCommandRequest::new(reader_id, None)).await);
        assert!(outcome.success);
        assert_eq!(format!("Card of reader {} extended to 2026-01-01", reader_id), outcome.message);

        let res = cmd.execute(ExtendCardCommandRequest::new(reader_id, Some(-3))).await;
        assert!(matches!(res, Err(CommandError::Validation { .. })));
    }
}
