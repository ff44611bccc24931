use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crate::core::domain::Identifiable;
use crate::core::library::LibraryError;

// BookEntity is a catalog title joined with its reference names and inventory totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BookEntity {
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
    pub author_name: Option<String>,
    pub category_name: Option<String>,
    pub publisher_name: Option<String>,
    pub total_quantity: i64,
    pub available_quantity: i64,
}

impl BookEntity {
    pub fn new(title: &str) -> Self {
        Self {
            book_id: 0,
            title: title.to_string(),
            author_id: None,
            category_id: None,
            publisher_id: None,
            publish_year: None,
            isbn: None,
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

impl Identifiable for BookEntity {
    fn id(&self) -> i64 {
        self.book_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InventoryEntity {
    pub book_id: i64,
    pub total_quantity: i64,
    pub available_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AuthorEntity {
    pub author_id: i64,
    pub author_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CategoryEntity {
    pub category_id: i64,
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PublisherEntity {
    pub publisher_id: i64,
    pub publisher_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CatalogStatisticsEntity {
    pub total_books: i64,
    pub total_quantity: i64,
    pub available_quantity: i64,
    pub out_of_stock: i64,
    pub low_stock: i64,
    pub total_authors: i64,
    pub total_categories: i64,
    pub total_publishers: i64,
}

// BookSearchField narrows keyword search to one column, All matches any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookSearchField {
    #[default]
    All,
    Title,
    Author,
    Isbn,
    Barcode,
    Category,
}

impl BookSearchField {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            BookSearchField::All => &["title", "author_name", "isbn", "barcode", "category_name"],
            BookSearchField::Title => &["title"],
            BookSearchField::Author => &["author_name"],
            BookSearchField::Isbn => &["isbn"],
            BookSearchField::Barcode => &["barcode"],
            BookSearchField::Category => &["category_name"],
        }
    }
}

impl FromStr for BookSearchField {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(BookSearchField::All),
            "title" => Ok(BookSearchField::Title),
            "author" => Ok(BookSearchField::Author),
            "isbn" => Ok(BookSearchField::Isbn),
            "barcode" => Ok(BookSearchField::Barcode),
            "category" => Ok(BookSearchField::Category),
            _ => Err(LibraryError::validation(format!("cannot search books by {}", s).as_str(), Some("400".to_string()))),
        }
    }
}

impl Display for BookSearchField {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BookSearchField::All => write!(f, "all"),
            BookSearchField::Title => write!(f, "title"),
            BookSearchField::Author => write!(f, "author"),
            BookSearchField::Isbn => write!(f, "isbn"),
            BookSearchField::Barcode => write!(f, "barcode"),
            BookSearchField::Category => write!(f, "category"),
        }
    }
}
