use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;
use crate::books::domain::model::{AuthorEntity, BookEntity, BookSearchField, CatalogStatisticsEntity, CategoryEntity, InventoryEntity, PublisherEntity};
use crate::books::dto::{BookDto, CatalogStatistics};
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::{Configuration, LookupKey};
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::gateway::events::{publish_or_warn, EventPublisher};
use crate::utils::date::Clock;
use crate::utils::validator::{validate_barcode, validate_inventory, validate_isbn, validate_phone, validate_price, validate_publish_year, validate_required_name, validate_title};

pub struct CatalogServiceImpl {
    low_stock_threshold: i64,
    book_repository: Box<dyn BookRepository>,
    events_publisher: Box<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl CatalogServiceImpl {
    pub fn new(config: &Configuration, book_repository: Box<dyn BookRepository>,
               events_publisher: Box<dyn EventPublisher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            low_stock_threshold: config.low_stock_threshold,
            book_repository,
            events_publisher,
            clock,
        }
    }

    fn validate_book(&self, book: &BookEntity) -> LibraryResult<()> {
        validate_title(book.title.as_str())?;
        validate_isbn(book.isbn.as_deref())?;
        validate_barcode(book.barcode.as_deref())?;
        validate_publish_year(book.publish_year, self.clock.current_year())?;
        validate_price(book.price)
    }

    // ISBN and barcode must stay unique, a book never conflicts with itself
    async fn check_unique(&self, book: &BookEntity, exclude_book_id: Option<i64>) -> LibraryResult<()> {
        if let Some(isbn) = &book.isbn {
            if self.book_repository.exists_isbn(isbn, exclude_book_id).await? {
                return Err(LibraryError::conflict(format!("ISBN '{}' already exists", isbn).as_str()));
            }
        }
        if let Some(barcode) = &book.barcode {
            if self.book_repository.exists_barcode(barcode, exclude_book_id).await? {
                return Err(LibraryError::conflict(format!("barcode '{}' already exists", barcode).as_str()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<i64> {
        let entity = BookEntity::from(book);
        self.validate_book(&entity)?;
        validate_inventory(entity.total_quantity, entity.available_quantity)?;
        self.check_unique(&entity, None).await?;
        let book_id = self.book_repository.create(&entity).await?;
        info!("added book {} '{}'", book_id, entity.title);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::added("book_added", "books", book_id, &entity)).await;
        Ok(book_id)
    }

    async fn remove_book(&self, id: i64) -> LibraryResult<()> {
        let book = self.book_repository.get(id).await?;
        if self.book_repository.count_open_loans(id).await? > 0 {
            return Err(LibraryError::conflict(format!("book '{}' is currently borrowed and cannot be deleted",
                                                      book.title).as_str()));
        }
        if self.book_repository.delete(id).await? == 0 {
            return Err(LibraryError::not_found(format!("book {} not found", id).as_str()));
        }
        info!("removed book {}", id);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::deleted("book_removed", "books", id, &book)).await;
        Ok(())
    }

    async fn update_book(&self, book: &BookDto) -> LibraryResult<()> {
        if book.book_id <= 0 {
            return Err(LibraryError::validation("book id is required", Some("400".to_string())));
        }
        let entity = BookEntity::from(book);
        self.validate_book(&entity)?;
        self.check_unique(&entity, Some(entity.book_id)).await?;
        if self.book_repository.update(&entity).await? == 0 {
            return Err(LibraryError::not_found(format!("book {} not found", entity.book_id).as_str()));
        }
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::updated("book_updated", "books", entity.book_id, &entity)).await;
        Ok(())
    }

    async fn find_book_by_id(&self, id: i64) -> LibraryResult<BookDto> {
        self.book_repository.get(id).await.map(|b| BookDto::from(&b))
    }

    async fn find_book_by_title(&self, title: &str) -> LibraryResult<BookDto> {
        self.book_repository.find_by_title(title).await.map(|b| BookDto::from(&b))
    }

    async fn find_book(&self, key: &LookupKey) -> LibraryResult<BookDto> {
        match key {
            LookupKey::Id(id) => self.find_book_by_id(*id).await,
            LookupKey::Name(title) => self.find_book_by_title(title.as_str()).await,
        }
    }

    async fn query_books(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookDto>> {
        let res = self.book_repository.query(predicate, page, page_size).await?;
        Ok(res.map(|r| BookDto::from(r)))
    }

    async fn search_books(&self, keyword: &str, field: BookSearchField,
                          page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookDto>> {
        let res = self.book_repository.search(keyword, field, page, page_size).await?;
        info!("found {} books for '{}' by {}", res.records.len(), keyword, field);
        Ok(res.map(|r| BookDto::from(r)))
    }

    async fn update_inventory(&self, book_id: i64, total_quantity: i64, available_quantity: i64) -> LibraryResult<()> {
        validate_inventory(total_quantity, available_quantity)?;
        let inventory = InventoryEntity { book_id, total_quantity, available_quantity };
        if self.book_repository.update_inventory(&inventory).await? == 0 {
            self.book_repository.get_inventory(book_id).await?;
            let outstanding = self.book_repository.count_outstanding_copies(book_id).await?;
            return Err(LibraryError::conflict(
                format!("book {} has {} copies out on loan, {} total with {} available leaves room for {}",
                        book_id, outstanding, total_quantity, available_quantity, total_quantity - available_quantity).as_str()));
        }
        info!("updated inventory of book {}: {}/{}", book_id, available_quantity, total_quantity);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::updated("inventory_updated", "books", book_id, &inventory)).await;
        Ok(())
    }

    async fn add_author(&self, name: &str) -> LibraryResult<i64> {
        validate_required_name(name, "author name")?;
        self.book_repository.create_author(&AuthorEntity { author_id: 0, author_name: name.trim().to_string() }).await
    }

    async fn find_authors(&self) -> LibraryResult<Vec<AuthorEntity>> {
        self.book_repository.find_authors().await
    }

    async fn add_category(&self, name: &str) -> LibraryResult<i64> {
        validate_required_name(name, "category name")?;
        self.book_repository.create_category(&CategoryEntity { category_id: 0, category_name: name.trim().to_string() }).await
    }

    async fn find_categories(&self) -> LibraryResult<Vec<CategoryEntity>> {
        self.book_repository.find_categories().await
    }

    async fn add_publisher(&self, publisher: &PublisherEntity) -> LibraryResult<i64> {
        validate_required_name(publisher.publisher_name.as_str(), "publisher name")?;
        validate_phone(publisher.phone.as_deref())?;
        self.book_repository.create_publisher(publisher).await
    }

    async fn find_publishers(&self) -> LibraryResult<Vec<PublisherEntity>> {
        self.book_repository.find_publishers().await
    }

    async fn statistics(&self) -> LibraryResult<CatalogStatistics> {
        self.book_repository.statistics(self.low_stock_threshold).await.map(|s| CatalogStatistics::from(&s))
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            book_id: other.book_id,
            title: other.title.to_string(),
            author_id: other.author_id,
            category_id: other.category_id,
            publisher_id: other.publisher_id,
            publish_year: other.publish_year,
            isbn: other.isbn.clone(),
            barcode: other.barcode.clone(),
            price: other.price,
            description: other.description.clone(),
            author_name: other.author_name.clone(),
            category_name: other.category_name.clone(),
            publisher_name: other.publisher_name.clone(),
            total_quantity: other.total_quantity,
            available_quantity: other.available_quantity,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            book_id: other.book_id,
            title: other.title.trim().to_string(),
            author_id: other.author_id,
            category_id: other.category_id,
            publisher_id: other.publisher_id,
            publish_year: other.publish_year,
            isbn: non_blank(&other.isbn),
            barcode: non_blank(&other.barcode),
            price: other.price,
            description: non_blank(&other.description),
            author_name: None,
            category_name: None,
            publisher_name: None,
            total_quantity: other.total_quantity,
            available_quantity: other.available_quantity,
        }
    }
}

impl From<&CatalogStatisticsEntity> for CatalogStatistics {
    fn from(other: &CatalogStatisticsEntity) -> Self {
        Self {
            total_books: other.total_books,
            total_quantity: other.total_quantity,
            available_quantity: other.available_quantity,
            borrowed_quantity: other.total_quantity - other.available_quantity,
            out_of_stock: other.out_of_stock,
            low_stock: other.low_stock,
            total_authors: other.total_authors,
            total_categories: other.total_categories,
            total_publishers: other.total_publishers,
        }
    }
}
