use crate::books::repository::BookRepository;
use crate::books::repository::sqlite_book_repository::SqliteBookRepository;
use crate::utils::sqlite::Database;

pub fn create_book_repository(db: &Database) -> Box<dyn BookRepository> {
    Box::new(SqliteBookRepository::new(db.clone()))
}
