use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::domain::Book;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::library::StockStatus;

pub struct GetBookCommand {
    catalog_service: Box<dyn CatalogService>,
    low_stock_threshold: i64,
}

impl GetBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>, low_stock_threshold: i64) -> Self {
        Self {
            catalog_service,
            low_stock_threshold,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetBookCommandRequest {
    pub book_id: i64,
}

impl GetBookCommandRequest {
    pub fn new(book_id: i64) -> Self {
        Self {
            book_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetBookCommandResponse {
    pub book: BookDto,
    pub stock_status: StockStatus,
    pub borrow_rate: f64,
}

impl GetBookCommandResponse {
    pub fn new(book: BookDto, low_stock_threshold: i64) -> Self {
        Self {
            stock_status: book.stock_status(low_stock_threshold),
            borrow_rate: book.borrow_rate(),
            book,
        }
    }
}

#[async_trait]
impl Command<GetBookCommandRequest, GetBookCommandResponse> for GetBookCommand {
    async fn execute(&self, req: GetBookCommandRequest) -> Result<GetBookCommandResponse, CommandError> {
        self.catalog_service.find_book_by_id(req.book_id)
            .await.map_err(CommandError::from).map(|b| GetBookCommandResponse::new(b, self.low_stock_threshold))
    }
}
