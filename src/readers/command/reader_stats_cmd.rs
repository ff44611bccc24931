use async_trait::async_trait;
use serde::Serialize;
use crate::core::command::{Command, CommandError};
use crate::readers::domain::ReaderService;
use crate::readers::dto::{ReaderDto, ReaderStatistics};

pub struct ReaderStatsCommand {
    reader_service: Box<dyn ReaderService>,
}

impl ReaderStatsCommand {
    pub fn new(reader_service: Box<dyn ReaderService>) -> Self {
        Self {
            reader_service,
        }
    }
}

// Besides the counters it lists the ACTIVE readers the next reconciliation would expire.
#[derive(Debug, Serialize)]
pub struct ReaderStatsCommandResponse {
    pub statistics: ReaderStatistics,
    pub pending_expiry: Vec<ReaderDto>,
}

#[async_trait]
impl Command<(), ReaderStatsCommandResponse> for ReaderStatsCommand {
    async fn execute(&self, _req: ()) -> Result<ReaderStatsCommandResponse, CommandError> {
        let statistics = self.reader_service.statistics().await.map_err(CommandError::from)?;
        let pending_expiry = self.reader_service.check_expired_cards().await.map_err(CommandError::from)?;
        Ok(ReaderStatsCommandResponse { statistics, pending_expiry })
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::Command;
    use crate::readers::command::reader_stats_cmd::ReaderStatsCommand;
    use crate::readers::factory;
    use crate::utils::testing::{fixed_clock, seed_reader, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_reader_stats() {
        let db = test_db().await;
        let _ = seed_reader(&db, "Ana Lima", "ACTIVE", "2024-12-31").await;
        let _ = seed_reader(&db, "Bruno Costa", "LOCKED", "2025-01-20").await;
        let cmd = ReaderStatsCommand::new(factory::create_reader_service(&test_config(), &db, fixed_clock("2025-01-01")));

        let res = cmd.execute(()).await.expect("should return stats");
        assert_eq!(2, res.statistics.total_readers);
        assert_eq!(1, res.statistics.locked_readers);
        assert_eq!(1, res.statistics.expiring_soon);
        assert_eq!(1, res.pending_expiry.len());
        assert_eq!("Ana Lima", res.pending_expiry[0].full_name);
    }
}
