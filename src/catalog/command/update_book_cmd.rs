use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Acknowledged, Command, CommandError};

pub struct UpdateBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl UpdateBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookCommandRequest {
    #[serde(default)]
    pub book_id: i64,
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

impl UpdateBookCommandRequest {
    pub fn new(book_id: i64, title: &str, isbn: Option<&str>) -> Self {
        Self {
            book_id,
            title: title.to_string(),
            isbn: isbn.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn build_book(&self) -> BookDto {
        let mut book = BookDto::new(self.title.as_str(), self.isbn.as_deref());
        book.book_id = self.book_id;
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
pub struct UpdateBookCommandResponse {
    pub book_id: i64,
}

impl Acknowledged for UpdateBookCommandResponse {
    fn message(&self) -> String {
        format!("Book {} updated", self.book_id)
    }

    fn id(&self) -> Option<i64> {
        Some(self.book_id)
    }
}

#[async_trait]
impl Command<UpdateBookCommandRequest, UpdateBookCommandResponse> for UpdateBookCommand {
    async fn execute(&self, req: UpdateBookCommandRequest) -> Result<UpdateBookCommandResponse, CommandError> {
        let book = req.build_book();
        self.catalog_service.update_book(&book).await.map_err(CommandError::from)
            .map(|_| UpdateBookCommandResponse { book_id: book.book_id })
    }
}
