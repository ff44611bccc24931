use std::collections::HashMap;
use async_trait::async_trait;
use sqlx::Sqlite;
use crate::books::domain::model::{AuthorEntity, BookEntity, BookSearchField, CatalogStatisticsEntity, CategoryEntity, InventoryEntity, PublisherEntity};
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::sqlite::{build_filter, from_rows, like_pattern, to_limit, to_offset, Database};

const BOOK_VIEW: &str = r#"
    SELECT b.book_id, b.title, b.author_id, b.category_id, b.publisher_id, b.publish_year,
           b.isbn, b.barcode, b.price, b.description,
           a.author_name, c.category_name, p.publisher_name,
           COALESCE(bi.total_quantity, 0) AS total_quantity,
           COALESCE(bi.available_quantity, 0) AS available_quantity
    FROM books b
    LEFT JOIN authors a ON b.author_id = a.author_id
    LEFT JOIN categories c ON b.category_id = c.category_id
    LEFT JOIN publishers p ON b.publisher_id = p.publisher_id
    LEFT JOIN book_inventory bi ON b.book_id = bi.book_id
"#;

const BOOK_COLUMNS: [&str; 10] = ["title", "author_id", "category_id", "publisher_id", "publish_year",
    "isbn", "barcode", "author_name", "category_name", "publisher_name"];

const OUTSTANDING_COPIES: &str = "(SELECT COALESCE(SUM(bd.quantity), 0) FROM borrow_details bd \
     JOIN borrow_slips bs ON bd.slip_id = bs.slip_id WHERE bd.book_id = ? AND bs.status IN ('BORROWING', 'LATE'))";

#[derive(Debug)]
pub struct SqliteBookRepository {
    db: Database,
}

impl SqliteBookRepository {
    pub fn new(db: Database) -> Self {
        Self {
            db,
        }
    }
}

#[async_trait]
impl Repository<BookEntity> for SqliteBookRepository {
    // book and its inventory row are written together
    async fn create(&self, entity: &BookEntity) -> LibraryResult<i64> {
        let mut tx = self.db.pool().begin().await?;
        let book_id = sqlx::query(
            "INSERT INTO books (title, author_id, category_id, publisher_id, publish_year, isbn, barcode, price, description) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(entity.title.as_str())
            .bind(entity.author_id)
            .bind(entity.category_id)
            .bind(entity.publisher_id)
            .bind(entity.publish_year)
            .bind(entity.isbn.as_deref())
            .bind(entity.barcode.as_deref())
            .bind(entity.price)
            .bind(entity.description.as_deref())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        sqlx::query("INSERT INTO book_inventory (book_id, total_quantity, available_quantity) VALUES (?, ?, ?)")
            .bind(book_id)
            .bind(entity.total_quantity)
            .bind(entity.available_quantity)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(book_id)
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let res = sqlx::query(
            "UPDATE books SET title = ?, author_id = ?, category_id = ?, publisher_id = ?, publish_year = ?, \
             isbn = ?, barcode = ?, price = ?, description = ? WHERE book_id = ?")
            .bind(entity.title.as_str())
            .bind(entity.author_id)
            .bind(entity.category_id)
            .bind(entity.publisher_id)
            .bind(entity.publish_year)
            .bind(entity.isbn.as_deref())
            .bind(entity.barcode.as_deref())
            .bind(entity.price)
            .bind(entity.description.as_deref())
            .bind(entity.book_id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn get(&self, id: i64) -> LibraryResult<BookEntity> {
        let sql = format!("{} WHERE b.book_id = ?", BOOK_VIEW);
        sqlx::query_as::<Sqlite, BookEntity>(sql.as_str())
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("book {} not found", id).as_str()))
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        let mut tx = self.db.pool().begin().await?;
        sqlx::query("DELETE FROM book_inventory WHERE book_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let res = sqlx::query("DELETE FROM books WHERE book_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(res.rows_affected() as usize)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let (filter_expr, values) = build_filter(predicate, &BOOK_COLUMNS)?;
        let offset = to_offset(page)?;
        let sql = format!("SELECT * FROM ({}) AS v{} ORDER BY book_id DESC LIMIT ? OFFSET ?", BOOK_VIEW, filter_expr);
        let mut query = sqlx::query_as::<Sqlite, BookEntity>(sql.as_str());
        for value in values {
            query = query.bind(value);
        }
        let records = query
            .bind(to_limit(page_size))
            .bind(offset)
            .fetch_all(self.db.pool())
            .await?;
        Ok(from_rows(page, page_size, offset, records))
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn find_by_title(&self, title: &str) -> LibraryResult<BookEntity> {
        let sql = format!("{} WHERE b.title = ? ORDER BY b.book_id LIMIT 1", BOOK_VIEW);
        sqlx::query_as::<Sqlite, BookEntity>(sql.as_str())
            .bind(title)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("book '{}' not found", title).as_str()))
    }

    async fn exists_isbn(&self, isbn: &str, exclude_book_id: Option<i64>) -> LibraryResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE isbn = ? AND book_id != ?")
            .bind(isbn)
            .bind(exclude_book_id.unwrap_or(0))
            .fetch_one(self.db.pool())
            .await?;
        Ok(count > 0)
    }

    async fn exists_barcode(&self, barcode: &str, exclude_book_id: Option<i64>) -> LibraryResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE barcode = ? AND book_id != ?")
            .bind(barcode)
            .bind(exclude_book_id.unwrap_or(0))
            .fetch_one(self.db.pool())
            .await?;
        Ok(count > 0)
    }

    async fn search(&self, keyword: &str, field: BookSearchField,
                    page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let offset = to_offset(page)?;
        let columns = field.columns();
        let filter_expr = columns.iter()
            .map(|c| format!("{} LIKE ?", c))
            .collect::<Vec<String>>()
            .join(" OR ");
        let sql = format!("SELECT * FROM ({}) AS v WHERE {} ORDER BY book_id DESC LIMIT ? OFFSET ?", BOOK_VIEW, filter_expr);
        let pattern = like_pattern(keyword);
        let mut query = sqlx::query_as::<Sqlite, BookEntity>(sql.as_str());
        for _ in columns {
            query = query.bind(pattern.clone());
        }
        let records = query
            .bind(to_limit(page_size))
            .bind(offset)
            .fetch_all(self.db.pool())
            .await?;
        Ok(from_rows(page, page_size, offset, records))
    }

    async fn count_open_loans(&self, book_id: i64) -> LibraryResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_details bd JOIN borrow_slips bs ON bd.slip_id = bs.slip_id \
             WHERE bd.book_id = ? AND bs.status IN ('BORROWING', 'LATE')")
            .bind(book_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn count_outstanding_copies(&self, book_id: i64) -> LibraryResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT {}", OUTSTANDING_COPIES))
            .bind(book_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn get_inventory(&self, book_id: i64) -> LibraryResult<InventoryEntity> {
        sqlx::query_as::<Sqlite, InventoryEntity>(
            "SELECT book_id, total_quantity, available_quantity FROM book_inventory WHERE book_id = ?")
            .bind(book_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("inventory for book {} not found", book_id).as_str()))
    }

    async fn update_inventory(&self, inventory: &InventoryEntity) -> LibraryResult<usize> {
        let sql = format!("UPDATE book_inventory SET total_quantity = ?, available_quantity = ? \
                           WHERE book_id = ? AND ? - ? >= {}", OUTSTANDING_COPIES);
        let res = sqlx::query(sql.as_str())
            .bind(inventory.total_quantity)
            .bind(inventory.available_quantity)
            .bind(inventory.book_id)
            .bind(inventory.total_quantity)
            .bind(inventory.available_quantity)
            .bind(inventory.book_id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn create_author(&self, author: &AuthorEntity) -> LibraryResult<i64> {
        let res = sqlx::query("INSERT INTO authors (author_name) VALUES (?)")
            .bind(author.author_name.trim())
            .execute(self.db.pool())
            .await?;
        Ok(res.last_insert_rowid())
    }

    async fn find_authors(&self) -> LibraryResult<Vec<AuthorEntity>> {
        let authors = sqlx::query_as::<Sqlite, AuthorEntity>(
            "SELECT author_id, author_name FROM authors ORDER BY author_name")
            .fetch_all(self.db.pool())
            .await?;
        Ok(authors)
    }

    async fn create_category(&self, category: &CategoryEntity) -> LibraryResult<i64> {
        let res = sqlx::query("INSERT INTO categories (category_name) VALUES (?)")
            .bind(category.category_name.trim())
            .execute(self.db.pool())
            .await?;
        Ok(res.last_insert_rowid())
    }

    async fn find_categories(&self) -> LibraryResult<Vec<CategoryEntity>> {
        let categories = sqlx::query_as::<Sqlite, CategoryEntity>(
            "SELECT category_id, category_name FROM categories ORDER BY category_name")
            .fetch_all(self.db.pool())
            .await?;
        Ok(categories)
    }

    async fn create_publisher(&self, publisher: &PublisherEntity) -> LibraryResult<i64> {
        let res = sqlx::query("INSERT INTO publishers (publisher_name, address, phone) VALUES (?, ?, ?)")
            .bind(publisher.publisher_name.trim())
            .bind(publisher.address.as_deref())
            .bind(publisher.phone.as_deref())
            .execute(self.db.pool())
            .await?;
        Ok(res.last_insert_rowid())
    }

    async fn find_publishers(&self) -> LibraryResult<Vec<PublisherEntity>> {
        let publishers = sqlx::query_as::<Sqlite, PublisherEntity>(
            "SELECT publisher_id, publisher_name, address, phone FROM publishers ORDER BY publisher_name")
            .fetch_all(self.db.pool())
            .await?;
        Ok(publishers)
    }

    async fn statistics(&self, low_stock_threshold: i64) -> LibraryResult<CatalogStatisticsEntity> {
        let stats = sqlx::query_as::<Sqlite, CatalogStatisticsEntity>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM books) AS total_books,
                (SELECT COALESCE(SUM(total_quantity), 0) FROM book_inventory) AS total_quantity,
                (SELECT COALESCE(SUM(available_quantity), 0) FROM book_inventory) AS available_quantity,
                (SELECT COUNT(*) FROM book_inventory WHERE available_quantity = 0) AS out_of_stock,
                (SELECT COUNT(*) FROM book_inventory WHERE available_quantity > 0 AND available_quantity < ?) AS low_stock,
                (SELECT COUNT(*) FROM authors) AS total_authors,
                (SELECT COUNT(*) FROM categories) AS total_categories,
                (SELECT COUNT(*) FROM publishers) AS total_publishers
            "#)
            .bind(low_stock_threshold)
            .fetch_one(self.db.pool())
            .await?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::books::domain::model::{AuthorEntity, BookEntity, BookSearchField, CategoryEntity, InventoryEntity};
    use crate::books::repository::BookRepository;
    use crate::books::repository::sqlite_book_repository::SqliteBookRepository;
    use crate::core::library::LibraryError;
    use crate::core::repository::Repository;
    use crate::utils::testing::{count_rows, seed_reader, test_db};

    #[tokio::test]
    async fn test_should_create_get_books() {
        let db = test_db().await;
        let book_repo = SqliteBookRepository::new(db.clone());
        let author_id = book_repo.create_author(&AuthorEntity { author_id: 0, author_name: " Frank Herbert ".to_string() })
            .await.expect("should create author");

        let mut book = BookEntity::new("Dune");
        book.author_id = Some(author_id);
        book.isbn = Some("9780441013593".to_string());
        let book_id = book_repo.create(&book).await.expect("should create book");

        let loaded = book_repo.get(book_id).await.expect("should return book");
        assert_eq!("Dune", loaded.title);
        assert_eq!(Some("Frank Herbert".to_string()), loaded.author_name);
        assert_eq!(0, loaded.total_quantity);
        assert_eq!(1, count_rows(&db, "book_inventory").await);
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_isbn_in_store() {
        let book_repo = SqliteBookRepository::new(test_db().await);
        let mut book = BookEntity::new("Dune");
        book.isbn = Some("111".to_string());
        let first = book_repo.create(&book).await.expect("should create book");
        let res = book_repo.create(&book).await;
        assert!(matches!(res, Err(LibraryError::Conflict { .. })));
        assert!(book_repo.exists_isbn("111", None).await.expect("should check"));
        assert!(!book_repo.exists_isbn("111", Some(first)).await.expect("should check"));
    }

    #[tokio::test]
    async fn test_should_update_books() {
        let book_repo = SqliteBookRepository::new(test_db().await);
        let mut book = BookEntity::new("Dune");
        book.book_id = book_repo.create(&book).await.expect("should create book");
        book.title = "Dune Messiah".to_string();
        book.publish_year = Some(1969);
        assert_eq!(1, book_repo.update(&book).await.expect("should update book"));

        let loaded = book_repo.find_by_title("Dune Messiah").await.expect("should find book");
        assert_eq!(Some(1969), loaded.publish_year);
        assert!(matches!(book_repo.find_by_title("Dune").await, Err(LibraryError::NotFound { .. })));

        book.book_id = 999;
        assert_eq!(0, book_repo.update(&book).await.expect("should update nothing"));
    }

    #[tokio::test]
    async fn test_should_delete_books_with_inventory() {
        let db = test_db().await;
        let book_repo = SqliteBookRepository::new(db.clone());
        let book_id = book_repo.create(&BookEntity::new("Dune")).await.expect("should create book");
        assert_eq!(1, book_repo.delete(book_id).await.expect("should delete book"));
        assert_eq!(0, count_rows(&db, "book_inventory").await);
        assert!(matches!(book_repo.get(book_id).await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_search_and_query_books() {
        let book_repo = SqliteBookRepository::new(test_db().await);
        let category_id = book_repo.create_category(&CategoryEntity { category_id: 0, category_name: "Science Fiction".to_string() })
            .await.expect("should create category");
        for title in ["Dune", "Foundation", "Neuromancer"] {
            let mut book = BookEntity::new(title);
            book.category_id = Some(category_id);
            book_repo.create(&book).await.expect("should create book");
        }
        let res = book_repo.search("dun", BookSearchField::Title, None, 10).await.expect("should search");
        assert_eq!(1, res.records.len());
        let res = book_repo.search("fiction", BookSearchField::All, None, 10).await.expect("should search");
        assert_eq!(3, res.records.len());
        let res = book_repo.search("fiction", BookSearchField::Isbn, None, 10).await.expect("should search");
        assert_eq!(0, res.records.len());

        let res = book_repo.query(&HashMap::from([("category_id".to_string(), category_id.to_string())]), None, 2)
            .await.expect("should query");
        assert_eq!(2, res.records.len());
        assert_eq!("Neuromancer", res.records[0].title);
        let next = book_repo.query(&HashMap::from([("category_id".to_string(), category_id.to_string())]),
                                   res.next_page.as_deref(), 2).await.expect("should query");
        assert_eq!(1, next.records.len());
        assert_eq!(None, next.next_page);
    }

    #[tokio::test]
    async fn test_should_update_inventory_and_stats() {
        let book_repo = SqliteBookRepository::new(test_db().await);
        let book_id = book_repo.create(&BookEntity::new("Dune")).await.expect("should create book");
        let _ = book_repo.create(&BookEntity::new("Emma")).await.expect("should create book");
        let inventory = InventoryEntity { book_id, total_quantity: 10, available_quantity: 3 };
        assert_eq!(1, book_repo.update_inventory(&inventory).await.expect("should update inventory"));
        assert_eq!(inventory, book_repo.get_inventory(book_id).await.expect("should load inventory"));

        // available above total never leaves room for the copies on loan
        let res = book_repo.update_inventory(&InventoryEntity { book_id, total_quantity: 1, available_quantity: 3 }).await;
        assert_eq!(0, res.expect("should run update"));

        let stats = book_repo.statistics(5).await.expect("should return stats");
        assert_eq!(2, stats.total_books);
        assert_eq!(10, stats.total_quantity);
        assert_eq!(3, stats.available_quantity);
        assert_eq!(1, stats.out_of_stock);
        assert_eq!(1, stats.low_stock);
        assert_eq!(0, book_repo.count_open_loans(book_id).await.expect("should count"));
        assert_eq!(0, book_repo.count_outstanding_copies(book_id).await.expect("should count"));
    }

    #[tokio::test]
    async fn test_should_keep_inventory_covering_open_slips() {
        let db = test_db().await;
        let book_repo = SqliteBookRepository::new(db.clone());
        let book_id = book_repo.create(&BookEntity::new("Dune")).await.expect("should create book");
        let reader_id = seed_reader(&db, "Ana", "ACTIVE", "2026-01-01").await;
        for status in ["BORROWING", "LATE", "RETURNED"] {
            let slip_id = sqlx::query("INSERT INTO borrow_slips (reader_id, staff_id, borrow_date, return_due, status) VALUES (?, 1, '2025-05-01', '2025-05-15', ?)")
                .bind(reader_id).bind(status).execute(db.pool()).await.expect("should insert slip").last_insert_rowid();
            sqlx::query("INSERT INTO borrow_details (slip_id, book_id, quantity) VALUES (?, ?, 2)")
                .bind(slip_id).bind(book_id).execute(db.pool()).await.expect("should insert detail");
        }
        assert_eq!(4, book_repo.count_outstanding_copies(book_id).await.expect("should count"));

        let short = InventoryEntity { book_id, total_quantity: 3, available_quantity: 0 };
        assert_eq!(0, book_repo.update_inventory(&short).await.expect("should run update"));
        let covered = InventoryEntity { book_id, total_quantity: 6, available_quantity: 2 };
        assert_eq!(1, book_repo.update_inventory(&covered).await.expect("should update inventory"));
        assert_eq!(covered, book_repo.get_inventory(book_id).await.expect("should load inventory"));
    }
}
