use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::borrow::domain::BorrowSlip;
use crate::core::domain::{Identifiable, LookupKey};
use crate::core::library::{PenaltyKind, SlipStatus};
use crate::readers::dto::ReaderDto;

// BorrowRequest addresses reader and book by id or by exact name, quantity defaults to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub reader: LookupKey,
    pub book: LookupKey,
    pub quantity: Option<i64>,
    pub staff_id: Option<i64>,
}

impl BorrowRequest {
    pub fn new(reader: LookupKey, book: LookupKey) -> Self {
        Self {
            reader,
            book,
            quantity: None,
            staff_id: None,
        }
    }

    pub fn quantity(&self) -> i64 {
        self.quantity.unwrap_or(1)
    }
}

// Eligibility is the outcome of a passed eligibility check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eligibility {
    pub reader: ReaderDto,
    pub book: BookDto,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowDetailDto {
    pub detail_id: i64,
    pub book_id: i64,
    pub quantity: i64,
    pub fine_amount: f64,
}

// BorrowSlipDto is a data transfer object for Borrow service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowSlipDto {
    pub slip_id: i64,
    pub reader_id: i64,
    pub staff_id: i64,
    pub borrow_date: NaiveDate,
    pub return_due: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: SlipStatus,
    pub details: Vec<BorrowDetailDto>,
}

impl Identifiable for BorrowSlipDto {
    fn id(&self) -> i64 {
        self.slip_id
    }
}

impl BorrowSlip for BorrowSlipDto {
    fn is_open(&self) -> bool {
        self.status.is_open()
    }

    fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.return_due < today
    }

    fn total_quantity(&self) -> i64 {
        self.details.iter().map(|d| d.quantity).sum()
    }

    fn total_fine(&self) -> f64 {
        self.details.iter().map(|d| d.fine_amount).sum()
    }
}

// SlipUpdate overwrites dates and status as given, it never touches stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipUpdate {
    #[serde(default)]
    pub slip_id: i64,
    pub borrow_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: SlipStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowListingDto {
    pub slip_id: i64,
    pub reader_id: i64,
    pub full_name: String,
    pub book_id: i64,
    pub title: String,
    pub quantity: i64,
    pub borrow_date: NaiveDate,
    pub return_due: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: SlipStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyDto {
    #[serde(default)]
    pub penalty_id: i64,
    pub reader_id: i64,
    pub slip_id: i64,
    pub book_id: i64,
    pub penalty_type: PenaltyKind,
    pub amount: f64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl PenaltyDto {
    pub fn new(reader_id: i64, slip_id: i64, book_id: i64, penalty_type: PenaltyKind, amount: f64) -> Self {
        Self {
            penalty_id: 0,
            reader_id,
            slip_id,
            book_id,
            penalty_type,
            amount,
            created_at: None,
        }
    }
}
