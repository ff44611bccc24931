use serde::{Deserialize, Serialize};
use crate::books::domain::Book;
use crate::core::domain::Identifiable;
use crate::core::library::StockStatus;

// BookDto is a data transfer object for Catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
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
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub publisher_name: Option<String>,
    #[serde(default)]
    pub total_quantity: i64,
    #[serde(default)]
    pub available_quantity: i64,
}

impl BookDto {
    pub fn new(title: &str, isbn: Option<&str>) -> BookDto {
        BookDto {
            book_id: 0,
            title: title.to_string(),
            author_id: None,
            category_id: None,
            publisher_id: None,
            publish_year: None,
            isbn: isbn.map(str::to_string),
            barcode: None,
            price: None,
            description: None,
            author_name: None,
            category_name: None,
            publisher_name: None,
            total_quantity: 0,
            available_quantity: 0,
        }
    }
}

impl Identifiable for BookDto {
    fn id(&self) -> i64 {
        self.book_id
    }
}

impl Book for BookDto {
    fn stock_status(&self, low_stock_threshold: i64) -> StockStatus {
        StockStatus::from_available(self.available_quantity, low_stock_threshold)
    }

    fn is_available(&self) -> bool {
        self.available_quantity > 0
    }

    fn borrow_rate(&self) -> f64 {
        if self.total_quantity <= 0 {
            return 0.0;
        }
        (self.total_quantity - self.available_quantity) as f64 / self.total_quantity as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStatistics {
    pub total_books: i64,
    pub total_quantity: i64,
    pub available_quantity: i64,
    pub borrowed_quantity: i64,
    pub out_of_stock: i64,
    pub low_stock: i64,
    pub total_authors: i64,
    pub total_categories: i64,
    pub total_publishers: i64,
}
