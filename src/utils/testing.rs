use std::sync::Arc;
use chrono::NaiveDate;
use crate::core::domain::Configuration;
use crate::utils::date::{parse_day, Clock, FixedClock};
use crate::utils::sqlite::Database;

pub(crate) async fn test_db() -> Database {
    Database::new_in_memory().await.expect("should open in-memory db")
}

pub(crate) fn test_config() -> Configuration {
    Configuration::new("test")
}

pub(crate) fn day(value: &str) -> NaiveDate {
    parse_day(value, "day").expect("should parse day")
}

pub(crate) fn fixed_clock(today: &str) -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(day(today)))
}

pub(crate) async fn seed_reader(db: &Database, full_name: &str, status: &str, card_end: &str) -> i64 {
    sqlx::query("INSERT INTO readers (full_name, card_start, card_end, status) VALUES (?, ?, ?, ?)")
        .bind(full_name)
        .bind("2024-01-01")
        .bind(card_end)
        .bind(status)
        .execute(db.pool())
        .await
        .expect("should seed reader")
        .last_insert_rowid()
}

pub(crate) async fn seed_book(db: &Database, title: &str, total: i64, available: i64) -> i64 {
    let book_id = sqlx::query("INSERT INTO books (title) VALUES (?)")
        .bind(title)
        .execute(db.pool())
        .await
        .expect("should seed book")
        .last_insert_rowid();
    sqlx::query("INSERT INTO book_inventory (book_id, total_quantity, available_quantity) VALUES (?, ?, ?)")
        .bind(book_id)
        .bind(total)
        .bind(available)
        .execute(db.pool())
        .await
        .expect("should seed inventory");
    book_id
}

pub(crate) async fn available_quantity(db: &Database, book_id: i64) -> i64 {
    sqlx::query_scalar("SELECT available_quantity FROM book_inventory WHERE book_id = ?")
        .bind(book_id)
        .fetch_one(db.pool())
        .await
        .expect("should load inventory")
}

pub(crate) async fn count_rows(db: &Database, table: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    sqlx::query_scalar(sql.as_str())
        .fetch_one(db.pool())
        .await
        .expect("should count rows")
}
