use std::collections::HashMap;
use async_trait::async_trait;
use chrono::NaiveDate;
use crate::borrow::dto::{BorrowListingDto, BorrowRequest, BorrowSlipDto, Eligibility, PenaltyDto, SlipUpdate};
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryResult, PaginatedResult};

pub mod model;
pub mod service;

#[async_trait]
pub trait BorrowService: Sync + Send {
    // read-only, fails on the first unmet condition
    async fn check_eligibility(&self, req: &BorrowRequest) -> LibraryResult<Eligibility>;
    async fn create_borrow(&self, req: &BorrowRequest) -> LibraryResult<BorrowSlipDto>;
    async fn return_books(&self, slip_id: i64) -> LibraryResult<BorrowSlipDto>;
    async fn update_borrow(&self, update: &SlipUpdate) -> LibraryResult<()>;
    async fn find_borrow_by_id(&self, slip_id: i64) -> LibraryResult<BorrowSlipDto>;
    async fn find_borrows_by_reader(&self, reader_id: i64,
                                    page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BorrowSlipDto>>;
    async fn list_borrows(&self, predicate: &HashMap<String, String>,
                          page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BorrowListingDto>>;
    // BORROWING slips past their due date become LATE, returns how many changed
    async fn mark_overdue(&self) -> LibraryResult<usize>;
    async fn record_penalty(&self, penalty: &PenaltyDto) -> LibraryResult<i64>;
    async fn find_penalties_by_reader(&self, reader_id: i64) -> LibraryResult<Vec<PenaltyDto>>;
}

pub trait BorrowSlip: Identifiable {
    fn is_open(&self) -> bool;
    fn is_overdue(&self, today: NaiveDate) -> bool;
    fn total_quantity(&self) -> i64;
    fn total_fine(&self) -> f64;
}
