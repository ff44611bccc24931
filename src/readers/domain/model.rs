use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, ReaderStatus};

// ReaderEntity is a library card holder as stored in the readers table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderEntity {
    pub reader_id: i64,
    pub full_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub card_start: Option<NaiveDate>,
    pub card_end: Option<NaiveDate>,
    pub status: ReaderStatus,
    pub reputation_score: i64,
}

impl ReaderEntity {
    pub fn new(full_name: &str, card_start: NaiveDate) -> Self {
        Self {
            reader_id: 0,
            full_name: full_name.to_string(),
            address: None,
            phone: None,
            email: None,
            card_start: Some(card_start),
            card_end: None,
            status: ReaderStatus::Active,
            reputation_score: 100,
        }
    }
}

impl Identifiable for ReaderEntity {
    fn id(&self) -> i64 {
        self.reader_id
    }
}

impl<'r> FromRow<'r, SqliteRow> for ReaderEntity {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            reader_id: row.try_get("reader_id")?,
            full_name: row.try_get("full_name")?,
            address: row.try_get("address")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            card_start: row.try_get("card_start")?,
            card_end: row.try_get("card_end")?,
            status: ReaderStatus::from_str(status.as_str()).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            reputation_score: row.try_get("reputation_score")?,
        })
    }
}

// ReaderCriteria is the combined filter used by the reader listing screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReaderCriteria {
    pub status: Option<ReaderStatus>,
    pub min_reputation: Option<i64>,
    pub max_reputation: Option<i64>,
    // inclusive card_end window
    pub card_end_between: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReaderStatisticsEntity {
    pub total_readers: i64,
    pub active_readers: i64,
    pub expired_readers: i64,
    pub locked_readers: i64,
    pub avg_reputation: f64,
    pub expiring_soon: i64,
    pub high_reputation: i64,
    pub low_reputation: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReaderSearchField {
    #[default]
    All,
    Name,
    Phone,
    Email,
    Address,
}

impl ReaderSearchField {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ReaderSearchField::All => &["full_name", "phone", "email", "address"],
            ReaderSearchField::Name => &["full_name"],
            ReaderSearchField::Phone => &["phone"],
            ReaderSearchField::Email => &["email"],
            ReaderSearchField::Address => &["address"],
        }
    }
}

impl FromStr for ReaderSearchField {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ReaderSearchField::All),
            "name" => Ok(ReaderSearchField::Name),
            "phone" => Ok(ReaderSearchField::Phone),
            "email" => Ok(ReaderSearchField::Email),
            "address" => Ok(ReaderSearchField::Address),
            _ => Err(LibraryError::validation(format!("cannot search readers by {}", s).as_str(), Some("400".to_string()))),
        }
    }
}

impl Display for ReaderSearchField {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ReaderSearchField::All => write!(f, "all"),
            ReaderSearchField::Name => write!(f, "name"),
            ReaderSearchField::Phone => write!(f, "phone"),
            ReaderSearchField::Email => write!(f, "email"),
            ReaderSearchField::Address => write!(f, "address"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use crate::core::library::ReaderStatus;
    use crate::readers::domain::model::{ReaderEntity, ReaderSearchField};
    use crate::utils::testing::day;

    #[tokio::test]
    async fn test_should_build_reader() {
        let reader = ReaderEntity::new("Ana Lima", day("2025-01-01"));
        assert_eq!(ReaderStatus::Active, reader.status);
        assert_eq!(100, reader.reputation_score);
        assert_eq!(None, reader.card_end);
    }

    #[tokio::test]
    async fn test_should_parse_search_field() {
        assert_eq!(ReaderSearchField::Email, ReaderSearchField::from_str("email").expect("should parse"));
        assert_eq!(4, ReaderSearchField::All.columns().len());
        assert!(ReaderSearchField::from_str("status").is_err());
    }
}
