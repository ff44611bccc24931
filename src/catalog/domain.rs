pub mod service;

use std::collections::HashMap;
use async_trait::async_trait;
use crate::books::domain::model::{AuthorEntity, BookSearchField, CategoryEntity, PublisherEntity};
use crate::books::dto::{BookDto, CatalogStatistics};
use crate::core::domain::LookupKey;
use crate::core::library::{LibraryResult, PaginatedResult};

#[async_trait]
pub trait CatalogService: Sync + Send {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<i64>;
    async fn remove_book(&self, id: i64) -> LibraryResult<()>;
    async fn update_book(&self, book: &BookDto) -> LibraryResult<()>;
    async fn find_book_by_id(&self, id: i64) -> LibraryResult<BookDto>;
    async fn find_book_by_title(&self, title: &str) -> LibraryResult<BookDto>;
    async fn find_book(&self, key: &LookupKey) -> LibraryResult<BookDto>;
    async fn query_books(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookDto>>;
    async fn search_books(&self, keyword: &str, field: BookSearchField,
                          page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookDto>>;
    async fn update_inventory(&self, book_id: i64, total_quantity: i64, available_quantity: i64) -> LibraryResult<()>;
    async fn add_author(&self, name: &str) -> LibraryResult<i64>;
    async fn find_authors(&self) -> LibraryResult<Vec<AuthorEntity>>;
    async fn add_category(&self, name: &str) -> LibraryResult<i64>;
    async fn find_categories(&self) -> LibraryResult<Vec<CategoryEntity>>;
    async fn add_publisher(&self, publisher: &PublisherEntity) -> LibraryResult<i64>;
    async fn find_publishers(&self) -> LibraryResult<Vec<PublisherEntity>>;
    async fn statistics(&self) -> LibraryResult<CatalogStatistics>;
}
