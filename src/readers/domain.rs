use std::collections::HashMap;
use async_trait::async_trait;
use chrono::NaiveDate;
use crate::core::domain::{Identifiable, LookupKey};
use crate::core::library::{LibraryResult, PaginatedResult, ReaderStatus, ReputationLevel};
use crate::readers::domain::model::ReaderSearchField;
use crate::readers::dto::{ReaderDto, ReaderFilter, ReaderStatistics};

pub mod model;
pub mod service;

#[async_trait]
pub trait ReaderService: Sync + Send {
    async fn add_reader(&self, reader: &ReaderDto) -> LibraryResult<i64>;
    async fn remove_reader(&self, id: i64) -> LibraryResult<()>;
    async fn update_reader(&self, reader: &ReaderDto) -> LibraryResult<()>;
    async fn find_reader_by_id(&self, id: i64) -> LibraryResult<ReaderDto>;
    async fn find_reader_by_name(&self, full_name: &str) -> LibraryResult<ReaderDto>;
    async fn find_reader(&self, key: &LookupKey) -> LibraryResult<ReaderDto>;
    async fn query_readers(&self, predicate: &HashMap<String, String>,
                           page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderDto>>;
    async fn search_readers(&self, keyword: &str, field: ReaderSearchField,
                            page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderDto>>;
    async fn filter_readers(&self, filter: &ReaderFilter,
                            page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderDto>>;
    async fn change_status(&self, id: i64, status: ReaderStatus) -> LibraryResult<()>;
    async fn update_reputation_score(&self, id: i64, score: i64) -> LibraryResult<()>;
    // returns the new card end date, the reader is re-activated
    async fn extend_card(&self, id: i64, days: Option<i64>) -> LibraryResult<NaiveDate>;
    async fn check_expired_cards(&self) -> LibraryResult<Vec<ReaderDto>>;
    // ACTIVE readers whose card ended before today become EXPIRED, returns how many changed
    async fn reconcile_expired(&self) -> LibraryResult<usize>;
    async fn statistics(&self) -> LibraryResult<ReaderStatistics>;
}

pub trait Reader: Identifiable {
    fn is_active(&self) -> bool;
    fn is_locked(&self) -> bool;
    // card_end strictly before today
    fn is_expired(&self, today: NaiveDate) -> bool;
    fn days_until_expiry(&self, today: NaiveDate) -> Option<i64>;
    fn reputation_level(&self) -> ReputationLevel;
    fn status_label(&self) -> &'static str;
}
