use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;
use crate::core::domain::{Configuration, LookupKey};
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult, ReaderStatus};
use crate::gateway::events::{publish_or_warn, EventPublisher};
use crate::readers::domain::ReaderService;
use crate::readers::domain::model::{ReaderCriteria, ReaderEntity, ReaderSearchField, ReaderStatisticsEntity};
use crate::readers::dto::{ReaderDto, ReaderFilter, ReaderStatistics};
use crate::readers::repository::ReaderRepository;
use crate::utils::date::{add_days, Clock};
use crate::utils::validator::{validate_address, validate_email, validate_full_name, validate_phone, validate_reputation_score};

pub struct ReaderServiceImpl {
    card_validity_days: i64,
    expiring_soon_days: i64,
    reader_repository: Box<dyn ReaderRepository>,
    events_publisher: Box<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ReaderServiceImpl {
    pub fn new(config: &Configuration, reader_repository: Box<dyn ReaderRepository>,
               events_publisher: Box<dyn EventPublisher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            card_validity_days: config.card_validity_days,
            expiring_soon_days: config.expiring_soon_days,
            reader_repository,
            events_publisher,
            clock,
        }
    }

    fn validate_reader(reader: &ReaderEntity) -> LibraryResult<()> {
        validate_full_name(reader.full_name.as_str())?;
        validate_phone(reader.phone.as_deref())?;
        validate_email(reader.email.as_deref())?;
        validate_address(reader.address.as_deref())?;
        if let (Some(start), Some(end)) = (reader.card_start, reader.card_end) {
            if start > end {
                return Err(LibraryError::validation("card_start must not be after card_end", Some("400".to_string())));
            }
        }
        validate_reputation_score(reader.reputation_score)
    }

    // a card still valid today keeps its remaining days, a lapsed or missing one restarts from today
    fn extended_card_end(&self, card_end: Option<NaiveDate>, days: i64) -> LibraryResult<NaiveDate> {
        let today = self.clock.today();
        match card_end {
            Some(end) if end >= today => add_days(end, days),
            _ => add_days(today, days),
        }
    }
}

#[async_trait]
impl ReaderService for ReaderServiceImpl {
    async fn add_reader(&self, reader: &ReaderDto) -> LibraryResult<i64> {
        let mut entity = ReaderEntity::from(reader);
        if entity.card_start.is_none() {
            entity.card_start = Some(self.clock.today());
        }
        Self::validate_reader(&entity)?;
        let reader_id = self.reader_repository.create(&entity).await?;
        info!("added reader {} '{}'", reader_id, entity.full_name);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::added("reader_added", "readers", reader_id, &entity)).await;
        Ok(reader_id)
    }

    async fn remove_reader(&self, id: i64) -> LibraryResult<()> {
        let reader = self.reader_repository.get(id).await?;
        let open_slips = self.reader_repository.count_open_slips(id).await?;
        if open_slips > 0 {
            return Err(LibraryError::conflict(format!("reader '{}' still has {} open borrow slips",
                                                      reader.full_name, open_slips).as_str()));
        }
        if self.reader_repository.delete(id).await? == 0 {
            return Err(LibraryError::not_found(format!("reader {} not found", id).as_str()));
        }
        info!("removed reader {}", id);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::deleted("reader_removed", "readers", id, &reader)).await;
        Ok(())
    }

    async fn update_reader(&self, reader: &ReaderDto) -> LibraryResult<()> {
        if reader.reader_id <= 0 {
            return Err(LibraryError::validation("reader id is required", Some("400".to_string())));
        }
        let entity = ReaderEntity::from(reader);
        Self::validate_reader(&entity)?;
        if self.reader_repository.update(&entity).await? == 0 {
            return Err(LibraryError::not_found(format!("reader {} not found", entity.reader_id).as_str()));
        }
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::updated("reader_updated", "readers", entity.reader_id, &entity)).await;
        Ok(())
    }

    async fn find_reader_by_id(&self, id: i64) -> LibraryResult<ReaderDto> {
        self.reader_repository.get(id).await.map(|r| ReaderDto::from(&r))
    }

    async fn find_reader_by_name(&self, full_name: &str) -> LibraryResult<ReaderDto> {
        self.reader_repository.find_by_full_name(full_name).await.map(|r| ReaderDto::from(&r))
    }

    async fn find_reader(&self, key: &LookupKey) -> LibraryResult<ReaderDto> {
        match key {
            LookupKey::Id(id) => self.find_reader_by_id(*id).await,
            LookupKey::Name(full_name) => self.find_reader_by_name(full_name.as_str()).await,
        }
    }

    async fn query_readers(&self, predicate: &HashMap<String, String>,
                           page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderDto>> {
        let res = self.reader_repository.query(predicate, page, page_size).await?;
        Ok(res.map(|r| ReaderDto::from(r)))
    }

    async fn search_readers(&self, keyword: &str, field: ReaderSearchField,
                            page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderDto>> {
        let res = self.reader_repository.search(keyword, field, page, page_size).await?;
        info!("found {} readers for '{}' by {}", res.records.len(), keyword, field);
        Ok(res.map(|r| ReaderDto::from(r)))
    }

    async fn filter_readers(&self, filter: &ReaderFilter,
                            page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReaderDto>> {
        let today = self.clock.today();
        let criteria = ReaderCriteria {
            status: filter.status,
            min_reputation: filter.min_reputation,
            max_reputation: filter.max_reputation,
            card_end_between: if filter.expiring_soon {
                Some((today, add_days(today, self.expiring_soon_days)?))
            } else {
                None
            },
        };
        let res = self.reader_repository.filter(&criteria, page, page_size).await?;
        Ok(res.map(|r| ReaderDto::from(r)))
    }

    async fn change_status(&self, id: i64, status: ReaderStatus) -> LibraryResult<()> {
        if self.reader_repository.update_status(id, status).await? == 0 {
            return Err(LibraryError::not_found(format!("reader {} not found", id).as_str()));
        }
        info!("reader {} is now {}", id, status);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::updated("reader_status_changed", "readers", id, &status)).await;
        Ok(())
    }

    async fn update_reputation_score(&self, id: i64, score: i64) -> LibraryResult<()> {
        validate_reputation_score(score)?;
        if self.reader_repository.update_reputation_score(id, score).await? == 0 {
            return Err(LibraryError::not_found(format!("reader {} not found", id).as_str()));
        }
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::updated("reader_score_changed", "readers", id, &score)).await;
        Ok(())
    }

    async fn extend_card(&self, id: i64, days: Option<i64>) -> LibraryResult<NaiveDate> {
        let days = days.unwrap_or(self.card_validity_days);
        if days <= 0 {
            return Err(LibraryError::validation(format!("extension must be a positive number of days, got {}", days).as_str(),
                                                Some("400".to_string())));
        }
        let reader = self.reader_repository.get(id).await?;
        let card_end = self.extended_card_end(reader.card_end, days)?;
        if self.reader_repository.update_card(id, card_end).await? == 0 {
            return Err(LibraryError::not_found(format!("reader {} not found", id).as_str()));
        }
        info!("extended card of reader {} to {}", id, card_end);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::updated("reader_card_extended", "readers", id, &card_end)).await;
        Ok(card_end)
    }

    async fn check_expired_cards(&self) -> LibraryResult<Vec<ReaderDto>> {
        let readers = self.reader_repository.find_expired(self.clock.today()).await?;
        Ok(readers.iter().map(ReaderDto::from).collect())
    }

    async fn reconcile_expired(&self) -> LibraryResult<usize> {
        let today = self.clock.today();
        let count = self.reader_repository.expire_lapsed(today).await?;
        info!("expired {} readers with cards ending before {}", count, today);
        if count > 0 {
            publish_or_warn(self.events_publisher.as_ref(),
                            DomainEvent::updated("readers_expired", "readers", 0,
                                                 &HashMap::from([("expired", count.to_string()), ("before", today.to_string())]))).await;
        }
        Ok(count)
    }

    async fn statistics(&self) -> LibraryResult<ReaderStatistics> {
        let today = self.clock.today();
        self.reader_repository.statistics(today, add_days(today, self.expiring_soon_days)?)
            .await.map(|s| ReaderStatistics::from(&s))
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl From<&ReaderEntity> for ReaderDto {
    fn from(other: &ReaderEntity) -> Self {
        Self {
            reader_id: other.reader_id,
            full_name: other.full_name.to_string(),
            address: other.address.clone(),
            phone: other.phone.clone(),
            email: other.email.clone(),
            card_start: other.card_start,
            card_end: other.card_end,
            status: other.status,
            reputation_score: other.reputation_score,
        }
    }
}

impl From<&ReaderDto> for ReaderEntity {
    fn from(other: &ReaderDto) -> Self {
        Self {
            reader_id: other.reader_id,
            full_name: other.full_name.trim().to_string(),
            address: non_blank(&other.address),
            phone: non_blank(&other.phone),
            email: non_blank(&other.email),
            card_start: other.card_start,
            card_end: other.card_end,
            status: other.status,
            reputation_score: other.reputation_score,
        }
    }
}

impl From<&ReaderStatisticsEntity> for ReaderStatistics {
    fn from(other: &ReaderStatisticsEntity) -> Self {
        Self {
            total_readers: other.total_readers,
            active_readers: other.active_readers,
            expired_readers: other.expired_readers,
            locked_readers: other.locked_readers,
            avg_reputation: (other.avg_reputation * 100.0).round() / 100.0,
            expiring_soon: other.expiring_soon,
            high_reputation: other.high_reputation,
            low_reputation: other.low_reputation,
        }
    }
}
