pub mod sqlite_reader_repository;

use async_trait::async_trait;
use chrono::NaiveDate;
use crate::core::library::{LibraryResult, PaginatedResult, ReaderStatus};
use crate::core::repository::Repository;
use crate::readers::domain::model::{ReaderCriteria, ReaderEntity, ReaderSearchField, ReaderStatisticsEntity};

#[async_trait]
pub trait ReaderRepository: Repository<ReaderEntity> {
    // exact name match, the lowest id wins when names repeat
    async fn find_by_full_name(&self, full_name: &str) -> LibraryResult<ReaderEntity>;

    async fn search(&self, keyword: &str, field: ReaderSearchField,
                    page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderEntity>>;

    async fn filter(&self, criteria: &ReaderCriteria,
                    page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderEntity>>;

    // number of BORROWING or LATE slips of the reader
    async fn count_open_slips(&self, reader_id: i64) -> LibraryResult<i64>;

    async fn update_status(&self, reader_id: i64, status: ReaderStatus) -> LibraryResult<usize>;

    async fn update_reputation_score(&self, reader_id: i64, score: i64) -> LibraryResult<usize>;

    // sets card_end and status ACTIVE in one statement
    async fn update_card(&self, reader_id: i64, card_end: NaiveDate) -> LibraryResult<usize>;

    // ACTIVE readers whose card_end is before today
    async fn find_expired(&self, today: NaiveDate) -> LibraryResult<Vec<ReaderEntity>>;

    async fn expire_lapsed(&self, today: NaiveDate) -> LibraryResult<usize>;

    async fn statistics(&self, today: NaiveDate, expiring_until: NaiveDate) -> LibraryResult<ReaderStatisticsEntity>;
}
