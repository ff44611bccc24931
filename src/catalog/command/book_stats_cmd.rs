use async_trait::async_trait;
use serde::Serialize;
use crate::books::dto::CatalogStatistics;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub struct BookStatsCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl BookStatsCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookStatsCommandResponse {
    pub statistics: CatalogStatistics,
}

#[async_trait]
impl Command<(), BookStatsCommandResponse> for BookStatsCommand {
    async fn execute(&self, _req: ()) -> Result<BookStatsCommandResponse, CommandError> {
        self.catalog_service.statistics().await.map_err(CommandError::from)
            .map(|statistics| BookStatsCommandResponse { statistics })
    }
}
