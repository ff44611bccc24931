use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;
use crate::borrow::domain::BorrowService;
use crate::borrow::domain::model::{BorrowDetailEntity, BorrowListingEntity, BorrowSlipEntity, PenaltyEntity};
use crate::borrow::dto::{BorrowDetailDto, BorrowListingDto, BorrowRequest, BorrowSlipDto, Eligibility, PenaltyDto, SlipUpdate};
use crate::borrow::repository::BorrowRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::gateway::events::{publish_or_warn, EventPublisher};
use crate::readers::domain::{Reader, ReaderService};
use crate::utils::date::Clock;

pub struct BorrowServiceImpl {
    loan_days: i64,
    default_staff_id: i64,
    reader_service: Box<dyn ReaderService>,
    catalog_service: Box<dyn CatalogService>,
    borrow_repository: Box<dyn BorrowRepository>,
    events_publisher: Box<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl BorrowServiceImpl {
    pub fn new(config: &Configuration, reader_service: Box<dyn ReaderService>,
               catalog_service: Box<dyn CatalogService>, borrow_repository: Box<dyn BorrowRepository>,
               events_publisher: Box<dyn EventPublisher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            loan_days: config.loan_days,
            default_staff_id: config.default_staff_id,
            reader_service,
            catalog_service,
            borrow_repository,
            events_publisher,
            clock,
        }
    }
}

#[async_trait]
impl BorrowService for BorrowServiceImpl {
    async fn check_eligibility(&self, req: &BorrowRequest) -> LibraryResult<Eligibility> {
        let quantity = req.quantity();
        if quantity < 1 {
            return Err(LibraryError::validation(format!("quantity must be at least 1, got {}", quantity).as_str(),
                                                Some("400".to_string())));
        }
        let reader = self.reader_service.find_reader(&req.reader).await?;
        if !reader.is_active() {
            return Err(LibraryError::ineligible_reader(
                format!("reader '{}' is {} and cannot borrow", reader.full_name, reader.status_label()).as_str()));
        }
        let book = self.catalog_service.find_book(&req.book).await?;
        if book.available_quantity < quantity {
            return Err(LibraryError::insufficient_stock(
                format!("'{}' has {} copies available, {} requested", book.title, book.available_quantity, quantity).as_str()));
        }
        Ok(Eligibility { reader, book, quantity })
    }

    async fn create_borrow(&self, req: &BorrowRequest) -> LibraryResult<BorrowSlipDto> {
        let eligibility = self.check_eligibility(req).await?;
        let staff_id = req.staff_id.unwrap_or(self.default_staff_id);
        let mut slip = BorrowSlipEntity::new(eligibility.reader.reader_id, staff_id, self.clock.today(), self.loan_days)?;
        slip.add_detail(eligibility.book.book_id, eligibility.quantity);
        let slip_id = self.borrow_repository.create(&slip).await?;
        let slip = self.borrow_repository.get(slip_id).await?;
        info!("reader {} borrowed {} x '{}' on slip {}, due {}", eligibility.reader.reader_id,
            eligibility.quantity, eligibility.book.title, slip.slip_id, slip.return_due);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::added("borrow_created", "borrows", slip.slip_id, &slip)
                            .map(|e| e.with_metadata("staff_id", staff_id.to_string().as_str()))).await;
        Ok(BorrowSlipDto::from(&slip))
    }

    async fn return_books(&self, slip_id: i64) -> LibraryResult<BorrowSlipDto> {
        let slip = self.borrow_repository.return_slip(slip_id, self.clock.today()).await?;
        let copies: i64 = slip.details.iter().map(|d| d.quantity).sum();
        info!("returned slip {} with {} copies", slip_id, copies);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::updated("borrow_returned", "borrows", slip_id, &slip)).await;
        Ok(BorrowSlipDto::from(&slip))
    }

    async fn update_borrow(&self, update: &SlipUpdate) -> LibraryResult<()> {
        let mut slip = self.borrow_repository.get(update.slip_id).await?;
        slip.borrow_date = update.borrow_date;
        slip.return_date = update.return_date;
        slip.status = update.status;
        if self.borrow_repository.update(&slip).await? == 0 {
            return Err(LibraryError::not_found(format!("borrow slip {} not found", update.slip_id).as_str()));
        }
        info!("slip {} overridden to {}", slip.slip_id, slip.status);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::updated("borrow_updated", "borrows", slip.slip_id, update)).await;
        Ok(())
    }

    async fn find_borrow_by_id(&self, slip_id: i64) -> LibraryResult<BorrowSlipDto> {
        self.borrow_repository.get(slip_id).await.map(|s| BorrowSlipDto::from(&s))
    }

    async fn find_borrows_by_reader(&self, reader_id: i64,
                                    page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BorrowSlipDto>> {
        let predicate = HashMap::from([("reader_id".to_string(), reader_id.to_string())]);
        let res = self.borrow_repository.query(&predicate, page, page_size).await?;
        Ok(res.map(|r| BorrowSlipDto::from(r)))
    }

    async fn list_borrows(&self, predicate: &HashMap<String, String>,
                          page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BorrowListingDto>> {
        let res = self.borrow_repository.list_borrows(predicate, page, page_size).await?;
        Ok(res.map(|r| BorrowListingDto::from(r)))
    }

    async fn mark_overdue(&self) -> LibraryResult<usize> {
        let today = self.clock.today();
        let count = self.borrow_repository.mark_overdue(today).await?;
        info!("marked {} slips late with return due before {}", count, today);
        if count > 0 {
            publish_or_warn(self.events_publisher.as_ref(),
                            DomainEvent::updated("borrows_overdue", "borrows", 0,
                                                 &HashMap::from([("late", count.to_string()), ("before", today.to_string())]))).await;
        }
        Ok(count)
    }

    async fn record_penalty(&self, penalty: &PenaltyDto) -> LibraryResult<i64> {
        if !penalty.amount.is_finite() || penalty.amount < 0.0 {
            return Err(LibraryError::validation(format!("penalty amount must be zero or more, got {}", penalty.amount).as_str(),
                                                Some("400".to_string())));
        }
        let entity = PenaltyEntity::from(penalty);
        let penalty_id = self.borrow_repository.record_penalty(&entity).await?;
        info!("recorded {} penalty {} of {} for reader {}", entity.penalty_type, penalty_id, entity.amount, entity.reader_id);
        publish_or_warn(self.events_publisher.as_ref(),
                        DomainEvent::added("penalty_recorded", "penalties", penalty_id, &entity)).await;
        Ok(penalty_id)
    }

    async fn find_penalties_by_reader(&self, reader_id: i64) -> LibraryResult<Vec<PenaltyDto>> {
        let penalties = self.borrow_repository.find_penalties_by_reader(reader_id).await?;
        Ok(penalties.iter().map(PenaltyDto::from).collect())
    }
}

impl From<&BorrowDetailEntity> for BorrowDetailDto {
    fn from(other: &BorrowDetailEntity) -> Self {
        Self {
            detail_id: other.detail_id,
            book_id: other.book_id,
            quantity: other.quantity,
            fine_amount: other.fine_amount,
        }
    }
}

impl From<&BorrowSlipEntity> for BorrowSlipDto {
    fn from(other: &BorrowSlipEntity) -> Self {
        Self {
            slip_id: other.slip_id,
            reader_id: other.reader_id,
            staff_id: other.staff_id,
            borrow_date: other.borrow_date,
            return_due: other.return_due,
            return_date: other.return_date,
            status: other.status,
            details: other.details.iter().map(BorrowDetailDto::from).collect(),
        }
    }
}

impl From<&BorrowListingEntity> for BorrowListingDto {
    fn from(other: &BorrowListingEntity) -> Self {
        Self {
            slip_id: other.slip_id,
            reader_id: other.reader_id,
            full_name: other.full_name.to_string(),
            book_id: other.book_id,
            title: other.title.to_string(),
            quantity: other.quantity,
            borrow_date: other.borrow_date,
            return_due: other.return_due,
            return_date: other.return_date,
            status: other.status,
        }
    }
}

impl From<&PenaltyEntity> for PenaltyDto {
    fn from(other: &PenaltyEntity) -> Self {
        Self {
            penalty_id: other.penalty_id,
            reader_id: other.reader_id,
            slip_id: other.slip_id,
            book_id: other.book_id,
            penalty_type: other.penalty_type,
            amount: other.amount,
            created_at: other.created_at,
        }
    }
}

impl From<&PenaltyDto> for PenaltyEntity {
    fn from(other: &PenaltyDto) -> Self {
        Self {
            penalty_id: other.penalty_id,
            reader_id: other.reader_id,
            slip_id: other.slip_id,
            book_id: other.book_id,
            penalty_type: other.penalty_type,
            amount: other.amount,
            created_at: other.created_at,
        }
    }
}
