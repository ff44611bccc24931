use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Acknowledged, Command, CommandError};

pub struct AddBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl AddBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddBookCommandRequest {
    pub title: String,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    pub publisher_id: Option<i64>,
    pub publish_year: Option<i64>,
    pub isbn: Option<String>,
    pub barcode: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

impl AddBookCommandRequest {
    pub fn new(title: &str, isbn: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            isbn: isbn.map(str::to_string),
            ..Default::default()
        }
    }

    // new titles always start with an empty inventory
    pub fn build_book(&self) -> BookDto {
        let mut book = BookDto::new(self.title.as_str(), self.isbn.as_deref());
        book.author_id = self.author_id;
        book.category_id = self.category_id;
        book.publisher_id = self.publisher_id;
        book.publish_year = self.publish_year;
        book.barcode = self.barcode.clone();
        book.price = self.price;
        book.description = self.description.clone();
        book
    }
}

#[derive(Debug, Serialize)]
pub struct AddBookCommandResponse {
    pub book_id: i64,
    pub title: String,
}

impl AddBookCommandResponse {
    pub fn new(book_id: i64, title: &str) -> Self {
        Self {
            book_id,
            title: title.to_string(),
        }
    }
}

impl Acknowledged for AddBookCommandResponse {
    fn message(&self) -> String {
        format!("Book '{}' added", self.title)
    }

    fn id(&self) -> Option<i64> {
        Some(self.book_id)
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        let book = req.build_book();
        self.catalog_service.add_book(&book).await.map_err(CommandError::from)
            .map(|book_id| AddBookCommandResponse::new(book_id, book.title.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
    use crate::catalog::factory;
    use crate::core::command::{Command, CommandError, Outcome};
    use crate::utils::testing::{fixed_clock, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_add_book() {
        let db = test_db().await;
        let cmd = AddBookCommand::new(factory::create_catalog_service(&test_config(), &db, fixed_clock("2025-01-01")));

        let res = cmd.execute(AddBookCommandRequest::new("Dune", Some("X"))).await;
        let outcome = Outcome::from(res);
        assert!(outcome.success);
        assert_eq!(Some(1), outcome.id);
        assert_eq!("Book 'Dune' added", outcome.message);

        let res = cmd.execute(AddBookCommandRequest::new("Other", Some("X"))).await;
        assert!(matches!(res, Err(CommandError::Conflict { .. })));
    }
}
