use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Acknowledged, Command, CommandError};
use crate::readers::domain::ReaderService;

pub struct UpdateScoreCommand {
    reader_service: Box<dyn ReaderService>,
}

impl UpdateScoreCommand {
    pub fn new(reader_service: Box<dyn ReaderService>) -> Self {
        Self {
            reader_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateScoreCommandRequest {
    #[serde(default)]
    pub reader_id: i64,
    pub reputation_score: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdateScoreCommandResponse {
    pub reader_id: i64,
    pub reputation_score: i64,
}

impl Acknowledged for UpdateScoreCommandResponse {
    fn message(&self) -> String {
        format!("Reputation of reader {} set to {}", self.reader_id, self.reputation_score)
    }

    fn id(&self) -> Option<i64> {
        Some(self.reader_id)
    }
}

#[async_trait]
impl Command<UpdateScoreCommandRequest, UpdateScoreCommandResponse> for UpdateScoreCommand {
    async fn execute(&self, req: UpdateScoreCommandRequest) -> Result<UpdateScoreCommandResponse, CommandError> {
        self.reader_service.update_reputation_score(req.reader_id, req.reputation_score)
            .await.map_err(CommandError::from).map(|_| UpdateScoreCommandResponse {
            reader_id: req.reader_id,
            reputation_score: req.reputation_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::{Command, CommandError};
    use crate::readers::command::update_score_cmd::{UpdateScoreCommand, UpdateScoreCommandRequest};
    use crate::readers::factory;
    use crate::utils::testing::{fixed_clock, seed_reader, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_update_score() {
        let db = test_db().await;
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let cmd = UpdateScoreCommand::new(factory::create_reader_service(&test_config(), &db, fixed_clock("2025-01-01")));

        let res = cmd.execute(UpdateScoreCommandRequest { reader_id, reputation_score: 72 }).await.expect("should update score");
        assert_eq!(72, res.reputation_score);
        let res = cmd.execute(UpdateScoreCommandRequest { reader_id, reputation_score: 120 }).await;
        assert!(matches!(res, Err(CommandError::Validation { .. })));
    }
}
