pub mod sqlite_borrow_repository;

use std::collections::HashMap;
use async_trait::async_trait;
use chrono::NaiveDate;
use crate::borrow::domain::model::{BorrowListingEntity, BorrowSlipEntity, PenaltyEntity};
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;

// BorrowRepository keeps slips, details and stock in step; create and return_slip each run
// as a single transaction.
#[async_trait]
pub trait BorrowRepository: Repository<BorrowSlipEntity> {
    // marks an open slip RETURNED and credits every detail back to inventory
    async fn return_slip(&self, slip_id: i64, today: NaiveDate) -> LibraryResult<BorrowSlipEntity>;

    async fn list_borrows(&self, predicate: &HashMap<String, String>,
                          page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BorrowListingEntity>>;

    async fn mark_overdue(&self, today: NaiveDate) -> LibraryResult<usize>;

    // adds the amount to the matching detail's fine and stores the penalty
    async fn record_penalty(&self, penalty: &PenaltyEntity) -> LibraryResult<i64>;

    async fn find_penalties_by_reader(&self, reader_id: i64) -> LibraryResult<Vec<PenaltyEntity>>;
}
