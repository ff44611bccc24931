pub mod sqlite_book_repository;

use async_trait::async_trait;
use crate::books::domain::model::{AuthorEntity, BookEntity, BookSearchField, CatalogStatisticsEntity, CategoryEntity, InventoryEntity, PublisherEntity};
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;

#[async_trait]
pub trait BookRepository: Repository<BookEntity> {
    // exact title match, the lowest id wins when titles repeat
    async fn find_by_title(&self, title: &str) -> LibraryResult<BookEntity>;

    async fn exists_isbn(&self, isbn: &str, exclude_book_id: Option<i64>) -> LibraryResult<bool>;

    async fn exists_barcode(&self, barcode: &str, exclude_book_id: Option<i64>) -> LibraryResult<bool>;

    async fn search(&self, keyword: &str, field: BookSearchField,
                    page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>>;

    // number of open slips (BORROWING or LATE) that still hold copies of the book
    async fn count_open_loans(&self, book_id: i64) -> LibraryResult<i64>;

    // copies of the book held by open slips
    async fn count_outstanding_copies(&self, book_id: i64) -> LibraryResult<i64>;

    async fn get_inventory(&self, book_id: i64) -> LibraryResult<InventoryEntity>;

    // leaves the row untouched when total - available would not cover the outstanding copies
    async fn update_inventory(&self, inventory: &InventoryEntity) -> LibraryResult<usize>;

    async fn create_author(&self, author: &AuthorEntity) -> LibraryResult<i64>;

    async fn find_authors(&self) -> LibraryResult<Vec<AuthorEntity>>;

    async fn create_category(&self, category: &CategoryEntity) -> LibraryResult<i64>;

    async fn find_categories(&self) -> LibraryResult<Vec<CategoryEntity>>;

    async fn create_publisher(&self, publisher: &PublisherEntity) -> LibraryResult<i64>;

    async fn find_publishers(&self) -> LibraryResult<Vec<PublisherEntity>>;

    async fn statistics(&self, low_stock_threshold: i64) -> LibraryResult<CatalogStatisticsEntity>;
}
