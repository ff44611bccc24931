use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogService;
use crate::core::command::{Acknowledged, Command, CommandError};

pub struct UpdateInventoryCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl UpdateInventoryCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateInventoryCommandRequest {
    #[serde(default)]
    pub book_id: i64,
    pub total_quantity: i64,
    pub available_quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdateInventoryCommandResponse {
    pub book_id: i64,
    pub total_quantity: i64,
    pub available_quantity: i64,
}

impl Acknowledged for UpdateInventoryCommandResponse {
    fn message(&self) -> String {
        format!("Inventory of book {} set to {}/{}", self.book_id, self.available_quantity, self.total_quantity)
    }

    fn id(&self) -> Option<i64> {
        Some(self.book_id)
    }
}

#[async_trait]
impl Command<UpdateInventoryCommandRequest, UpdateInventoryCommandResponse> for UpdateInventoryCommand {
    async fn execute(&self, req: UpdateInventoryCommandRequest) -> Result<UpdateInventoryCommandResponse, CommandError> {
        self.catalog_service.update_inventory(req.book_id, req.total_quantity, req.available_quantity)
            .await.map_err(CommandError::from).map(|_| UpdateInventoryCommandResponse {
            book_id: req.book_id,
            total_quantity: req.total_quantity,
            available_quantity: req.available_quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::command::update_inventory_cmd::{UpdateInventoryCommand, UpdateInventoryCommandRequest};
    use crate::catalog::factory;
    use crate::core::command::{Command, CommandError, Outcome};
    use crate::utils::testing::{available_quantity, fixed_clock, seed_book, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_update_inventory() {
        let db = test_db().await;
        let book_id = seed_book(&db, "Dune", 0, 0).await;
        let cmd = UpdateInventoryCommand::new(factory::create_catalog_service(&test_config(), &db, fixed_clock("2025-01-01")));

        let outcome = Outcome::from(cmd.execute(UpdateInventoryCommandRequest { book_id, total_quantity: 4, available_quantity: 2 }).await);
        assert!(outcome.success);
        assert_eq!(2, available_quantity(&db, book_id).await);

        let res = cmd.execute(UpdateInventoryCommandRequest { book_id, total_quantity: 4, available_quantity: 5 }).await;
        assert!(matches!(res, Err(CommandError::Validation { .. })));
        assert_eq!(2, available_quantity(&db, book_id).await);
    }
}
