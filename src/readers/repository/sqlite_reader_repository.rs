use std::collections::HashMap;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Sqlite;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult, ReaderStatus};
use crate::core::repository::Repository;
use crate::readers::domain::model::{ReaderCriteria, ReaderEntity, ReaderSearchField, ReaderStatisticsEntity};
use crate::readers::repository::ReaderRepository;
use crate::utils::sqlite::{build_filter, from_rows, like_pattern, to_limit, to_offset, Database};

const READER_SELECT: &str = "SELECT reader_id, full_name, address, phone, email, card_start, card_end, status, reputation_score FROM readers";

const READER_COLUMNS: [&str; 8] = ["full_name", "address", "phone", "email", "card_start", "card_end",
    "status", "reputation_score"];

#[derive(Debug)]
pub struct SqliteReaderRepository {
    db: Database,
}

impl SqliteReaderRepository {
    pub fn new(db: Database) -> Self {
        Self {
            db,
        }
    }

    async fn fetch_page(&self, filter_expr: &str, values: Vec<String>,
                        page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderEntity>> {
        let offset = to_offset(page)?;
        let sql = format!("{}{} ORDER BY reader_id DESC LIMIT ? OFFSET ?", READER_SELECT, filter_expr);
        let mut query = sqlx::query_as::<Sqlite, ReaderEntity>(sql.as_str());
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
impl Repository<ReaderEntity> for SqliteReaderRepository {
    async fn create(&self, entity: &ReaderEntity) -> LibraryResult<i64> {
        let res = sqlx::query(
            "INSERT INTO readers (full_name, address, phone, email, card_start, card_end, status, reputation_score) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(entity.full_name.as_str())
            .bind(entity.address.as_deref())
            .bind(entity.phone.as_deref())
            .bind(entity.email.as_deref())
            .bind(entity.card_start)
            .bind(entity.card_end)
            .bind(entity.status.to_string())
            .bind(entity.reputation_score)
            .execute(self.db.pool())
            .await?;
        Ok(res.last_insert_rowid())
    }

    async fn update(&self, entity: &ReaderEntity) -> LibraryResult<usize> {
        let res = sqlx::query(
            "UPDATE readers SET full_name = ?, address = ?, phone = ?, email = ?, card_start = ?, card_end = ?, \
             status = ?, reputation_score = ? WHERE reader_id = ?")
            .bind(entity.full_name.as_str())
            .bind(entity.address.as_deref())
            .bind(entity.phone.as_deref())
            .bind(entity.email.as_deref())
            .bind(entity.card_start)
            .bind(entity.card_end)
            .bind(entity.status.to_string())
            .bind(entity.reputation_score)
            .bind(entity.reader_id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn get(&self, id: i64) -> LibraryResult<ReaderEntity> {
        let sql = format!("{} WHERE reader_id = ?", READER_SELECT);
        sqlx::query_as::<Sqlite, ReaderEntity>(sql.as_str())
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("reader {} not found", id).as_str()))
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        let res = sqlx::query("DELETE FROM readers WHERE reader_id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderEntity>> {
        let (filter_expr, values) = build_filter(predicate, &READER_COLUMNS)?;
        self.fetch_page(filter_expr.as_str(), values, page, page_size).await
    }
}

#[async_trait]
impl ReaderRepository for SqliteReaderRepository {
    async fn find_by_full_name(&self, full_name: &str) -> LibraryResult<ReaderEntity> {
        let sql = format!("{} WHERE full_name = ? ORDER BY reader_id LIMIT 1", READER_SELECT);
        sqlx::query_as::<Sqlite, ReaderEntity>(sql.as_str())
            .bind(full_name)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("reader '{}' not found", full_name).as_str()))
    }

    async fn search(&self, keyword: &str, field: ReaderSearchField,
                    page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderEntity>> {
        let columns = field.columns();
        let filter_expr = format!(" WHERE {}", columns.iter()
            .map(|c| format!("{} LIKE ?", c))
            .collect::<Vec<String>>()
            .join(" OR "));
        let pattern = like_pattern(keyword);
        let values = columns.iter().map(|_| pattern.clone()).collect();
        self.fetch_page(filter_expr.as_str(), values, page, page_size).await
    }

    async fn filter(&self, criteria: &ReaderCriteria,
                    page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderEntity>> {
        let mut clauses = vec![];
        let mut values = vec![];
        if let Some(status) = criteria.status {
            clauses.push("status = ?");
            values.push(status.to_string());
        }
        if let Some(min) = criteria.min_reputation {
            clauses.push("reputation_score >= ?");
            values.push(min.to_string());
        }
        if let Some(max) = criteria.max_reputation {
            clauses.push("reputation_score <= ?");
            values.push(max.to_string());
        }
        if let Some((from, until)) = criteria.card_end_between {
            clauses.push("card_end BETWEEN ? AND ?");
            values.push(from.to_string());
            values.push(until.to_string());
        }
        let filter_expr = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        self.fetch_page(filter_expr.as_str(), values, page, page_size).await
    }

    async fn count_open_slips(&self, reader_id: i64) -> LibraryResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_slips WHERE reader_id = ? AND status IN ('BORROWING', 'LATE')")
            .bind(reader_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn update_status(&self, reader_id: i64, status: ReaderStatus) -> LibraryResult<usize> {
        let res = sqlx::query("UPDATE readers SET status = ? WHERE reader_id = ?")
            .bind(status.to_string())
            .bind(reader_id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn update_reputation_score(&self, reader_id: i64, score: i64) -> LibraryResult<usize> {
        let res = sqlx::query("UPDATE readers SET reputation_score = ? WHERE reader_id = ?")
            .bind(score)
            .bind(reader_id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn update_card(&self, reader_id: i64, card_end: NaiveDate) -> LibraryResult<usize> {
        let res = sqlx::query("UPDATE readers SET card_end = ?, status = 'ACTIVE' WHERE reader_id = ?")
            .bind(card_end)
            .bind(reader_id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn find_expired(&self, today: NaiveDate) -> LibraryResult<Vec<ReaderEntity>> {
        let sql = format!("{} WHERE status = 'ACTIVE' AND card_end < ? ORDER BY card_end", READER_SELECT);
        let readers = sqlx::query_as::<Sqlite, ReaderEntity>(sql.as_str())
            .bind(today)
            .fetch_all(self.db.pool())
            .await?;
        Ok(readers)
    }

    async fn expire_lapsed(&self, today: NaiveDate) -> LibraryResult<usize> {
        let res = sqlx::query("UPDATE readers SET status = 'EXPIRED' WHERE status = 'ACTIVE' AND card_end < ?")
            .bind(today)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn statistics(&self, today: NaiveDate, expiring_until: NaiveDate) -> LibraryResult<ReaderStatisticsEntity> {
        let stats = sqlx::query_as::<Sqlite, ReaderStatisticsEntity>(
            r#"
            SELECT
                COUNT(*) AS total_readers,
                COALESCE(SUM(CASE WHEN status = 'ACTIVE' THEN 1 ELSE 0 END), 0) AS active_readers,
                COALESCE(SUM(CASE WHEN status = 'EXPIRED' THEN 1 ELSE 0 END), 0) AS expired_readers,
                COALESCE(SUM(CASE WHEN status = 'LOCKED' THEN 1 ELSE 0 END), 0) AS locked_readers,
                COALESCE(AVG(reputation_score), 0.0) AS avg_reputation,
                COALESCE(SUM(CASE WHEN card_end BETWEEN ? AND ? THEN 1 ELSE 0 END), 0) AS expiring_soon,
                COALESCE(SUM(CASE WHEN reputation_score >= 90 THEN 1 ELSE 0 END), 0) AS high_reputation,
                COALESCE(SUM(CASE WHEN reputation_score < 50 THEN 1 ELSE 0 END), 0) AS low_reputation
            FROM readers
            "#)
            .bind(today)
            .bind(expiring_until)
            .fetch_one(self.db.pool())
            .await?;
        Ok(stats)
    }
}
