use std::str::FromStr;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryResult, PenaltyKind, SlipStatus};
use crate::utils::date::add_days;

// BorrowSlipEntity is one checkout event, details are loaded separately from borrow_details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowSlipEntity {
    pub slip_id: i64,
    pub reader_id: i64,
    pub staff_id: i64,
    pub borrow_date: NaiveDate,
    pub return_due: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: SlipStatus,
    pub details: Vec<BorrowDetailEntity>,
}

impl BorrowSlipEntity {
    pub fn new(reader_id: i64, staff_id: i64, borrow_date: NaiveDate, loan_days: i64) -> LibraryResult<Self> {
        Ok(Self {
            slip_id: 0,
            reader_id,
            staff_id,
            borrow_date,
            return_due: add_days(borrow_date, loan_days)?,
            return_date: None,
            status: SlipStatus::Borrowing,
            details: vec![],
        })
    }

    pub fn add_detail(&mut self, book_id: i64, quantity: i64) {
        self.details.push(BorrowDetailEntity {
            detail_id: 0,
            slip_id: self.slip_id,
            book_id,
            quantity,
            fine_amount: 0.0,
        });
    }
}

impl Identifiable for BorrowSlipEntity {
    fn id(&self) -> i64 {
        self.slip_id
    }
}

impl<'r> FromRow<'r, SqliteRow> for BorrowSlipEntity {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            slip_id: row.try_get("slip_id")?,
            reader_id: row.try_get("reader_id")?,
            staff_id: row.try_get("staff_id")?,
            borrow_date: row.try_get("borrow_date")?,
            return_due: row.try_get("return_due")?,
            return_date: row.try_get("return_date")?,
            status: SlipStatus::from_str(status.as_str()).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            details: vec![],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BorrowDetailEntity {
    pub detail_id: i64,
    pub slip_id: i64,
    pub book_id: i64,
    pub quantity: i64,
    pub fine_amount: f64,
}

// BorrowListingEntity is one row of the borrow register: a slip detail with reader and title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowListingEntity {
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

impl<'r> FromRow<'r, SqliteRow> for BorrowListingEntity {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            slip_id: row.try_get("slip_id")?,
            reader_id: row.try_get("reader_id")?,
            full_name: row.try_get("full_name")?,
            book_id: row.try_get("book_id")?,
            title: row.try_get("title")?,
            quantity: row.try_get("quantity")?,
            borrow_date: row.try_get("borrow_date")?,
            return_due: row.try_get("return_due")?,
            return_date: row.try_get("return_date")?,
            status: SlipStatus::from_str(status.as_str()).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyEntity {
    pub penalty_id: i64,
    pub reader_id: i64,
    pub slip_id: i64,
    pub book_id: i64,
    pub penalty_type: PenaltyKind,
    pub amount: f64,
    pub created_at: Option<NaiveDateTime>,
}

impl<'r> FromRow<'r, SqliteRow> for PenaltyEntity {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let penalty_type: String = row.try_get("penalty_type")?;
        Ok(Self {
            penalty_id: row.try_get("penalty_id")?,
            reader_id: row.try_get("reader_id")?,
            slip_id: row.try_get("slip_id")?,
            book_id: row.try_get("book_id")?,
            penalty_type: PenaltyKind::from_str(penalty_type.as_str()).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            amount: row.try_get("amount")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::borrow::domain::model::BorrowSlipEntity;
    use crate::core::library::SlipStatus;
    use crate::utils::testing::day;

    #[tokio::test]
    async fn test_should_compute_return_due() {
        let slip = BorrowSlipEntity::new(1, 1, day("2025-01-01"), 14).expect("should build slip");
        assert_eq!(day("2025-01-15"), slip.return_due);
        assert_eq!(SlipStatus::Borrowing, slip.status);
        assert_eq!(None, slip.return_date);

        let slip = BorrowSlipEntity::new(1, 1, day("2024-12-25"), 14).expect("should build slip");
        assert_eq!(day("2025-01-08"), slip.return_due);
    }

    #[tokio::test]
    async fn test_should_add_details() {
        let mut slip = BorrowSlipEntity::new(1, 1, day("2025-01-01"), 14).expect("should build slip");
        slip.add_detail(7, 2);
        assert_eq!(1, slip.details.len());
        assert_eq!(2, slip.details[0].quantity);
        assert_eq!(0.0, slip.details[0].fine_amount);
    }
}
