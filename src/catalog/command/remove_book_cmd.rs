use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogService;
use crate::core::command::{Acknowledged, Command, CommandError};

pub struct RemoveBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl RemoveBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoveBookCommandRequest {
    pub book_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RemoveBookCommandResponse {
    pub book_id: i64,
}

impl Acknowledged for RemoveBookCommandResponse {
    fn message(&self) -> String {
        format!("Book {} deleted", self.book_id)
    }

    fn id(&self) -> Option<i64> {
        Some(self.book_id)
    }
}

#[async_trait]
impl Command<RemoveBookCommandRequest, RemoveBookCommandResponse> for RemoveBookCommand {
    async fn execute(&self, req: RemoveBookCommandRequest) -> Result<RemoveBookCommandResponse, CommandError> {
        self.catalog_service.remove_book(req.book_id)
            .await.map_err(CommandError::from).map(|_| RemoveBookCommandResponse { book_id: req.book_id })
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
    use crate::catalog::command::remove_book_cmd::{RemoveBookCommand, RemoveBookCommandRequest};
    use crate::catalog::factory;
    use crate::core::command::{Command, CommandError};
    use crate::utils::testing::{fixed_clock, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_remove_book() {
        let db = test_db().await;
        let add_cmd = AddBookCommand::new(factory::create_catalog_service(&test_config(), &db, fixed_clock("2025-01-01")));
        let remove_cmd = RemoveBookCommand::new(factory::create_catalog_service(&test_config(), &db, fixed_clock("2025-01-01")));

        let res = add_cmd.execute(AddBookCommandRequest::new("Dune", None)).await.expect("should add book");
        let _ = remove_cmd.execute(RemoveBookCommandRequest { book_id: res.book_id }).await.expect("should remove book");
        let again = remove_cmd.execute(RemoveBookCommandRequest { book_id: res.book_id }).await;
        assert!(matches!(again, Err(CommandError::NotFound { .. })));
    }
}
