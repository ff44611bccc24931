use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{message}")]
    NotFound {
        message: String,
    },
    // The reader exists but its status forbids borrowing (LOCKED or EXPIRED).
    #[error("{message}")]
    IneligibleReader {
        message: String,
    },
    #[error("{message}")]
    InsufficientStock {
        message: String,
    },
    #[error("{message}")]
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    // Uniqueness violation, or removal of an entity that still has open dependents.
    #[error("{message}")]
    Conflict {
        message: String,
    },
    #[error("{message}")]
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    #[error("{message}")]
    Serialization {
        message: String,
    },
    #[error("{message}")]
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn ineligible_reader(message: &str) -> LibraryError {
        LibraryError::IneligibleReader { message: message.to_string() }
    }

    pub fn insufficient_stock(message: &str) -> LibraryError {
        LibraryError::InsufficientStock { message: message.to_string() }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn conflict(message: &str) -> LibraryError {
        LibraryError::Conflict { message: message.to_string() }
    }

    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            _ => { false }
        }
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::runtime(
            format!("io error {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

/// A specialized Result type for repositories and services.
pub type LibraryResult<T> = Result<T, LibraryError>;

// It defines abstraction for paginated result
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    // The page token (row offset)
    pub page: Option<String>,
    // page size
    pub page_size: usize,
    // Next page if available
    pub next_page: Option<String>,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub fn new(page: Option<&str>, page_size: usize,
               next_page: Option<String>, records: Vec<T>) -> Self {
        PaginatedResult {
            page: page.map(str::to_string),
            page_size,
            next_page,
            records,
        }
    }

    pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> PaginatedResult<U> {
        PaginatedResult {
            page: self.page.clone(),
            page_size: self.page_size,
            next_page: self.next_page.clone(),
            records: self.records.iter().map(f).collect(),
        }
    }
}

fn unknown_value(kind: &str, value: &str, allowed: &[&str]) -> LibraryError {
    LibraryError::validation(
        format!("invalid {} '{}', must be one of: {}", kind, value, allowed.join(", ")).as_str(),
        Some("400".to_string()))
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReaderStatus {
    Active,
    Expired,
    Locked,
}

impl ReaderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReaderStatus::Active => "Active",
            ReaderStatus::Expired => "Expired",
            ReaderStatus::Locked => "Locked",
        }
    }
}

impl FromStr for ReaderStatus {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(ReaderStatus::Active),
            "EXPIRED" => Ok(ReaderStatus::Expired),
            "LOCKED" => Ok(ReaderStatus::Locked),
            _ => Err(unknown_value("reader status", s, &["ACTIVE", "EXPIRED", "LOCKED"])),
        }
    }
}

impl Display for ReaderStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ReaderStatus::Active => write!(f, "ACTIVE"),
            ReaderStatus::Expired => write!(f, "EXPIRED"),
            ReaderStatus::Locked => write!(f, "LOCKED"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlipStatus {
    Borrowing,
    Returned,
    Late,
    Lost,
}

impl SlipStatus {
    // Open slips still hold stock; only these may be returned.
    pub fn is_open(&self) -> bool {
        matches!(self, SlipStatus::Borrowing | SlipStatus::Late)
    }
}

impl FromStr for SlipStatus {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BORROWING" => Ok(SlipStatus::Borrowing),
            "RETURNED" => Ok(SlipStatus::Returned),
            "LATE" => Ok(SlipStatus::Late),
            "LOST" => Ok(SlipStatus::Lost),
            _ => Err(unknown_value("slip status", s, &["BORROWING", "RETURNED", "LATE", "LOST"])),
        }
    }
}

impl Display for SlipStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SlipStatus::Borrowing => write!(f, "BORROWING"),
            SlipStatus::Returned => write!(f, "RETURNED"),
            SlipStatus::Late => write!(f, "LATE"),
            SlipStatus::Lost => write!(f, "LOST"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PenaltyKind {
    Late,
    Lost,
    Damaged,
}

impl FromStr for PenaltyKind {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LATE" => Ok(PenaltyKind::Late),
            "LOST" => Ok(PenaltyKind::Lost),
            "DAMAGED" => Ok(PenaltyKind::Damaged),
            _ => Err(unknown_value("penalty type", s, &["LATE", "LOST", "DAMAGED"])),
        }
    }
}

impl Display for PenaltyKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PenaltyKind::Late => write!(f, "LATE"),
            PenaltyKind::Lost => write!(f, "LOST"),
            PenaltyKind::Damaged => write!(f, "DAMAGED"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn from_available(available: i64, low_stock_threshold: i64) -> Self {
        if available <= 0 {
            StockStatus::OutOfStock
        } else if available < low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

impl Display for StockStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "In stock"),
            StockStatus::LowStock => write!(f, "Low stock"),
            StockStatus::OutOfStock => write!(f, "Out of stock"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum ReputationLevel {
    Excellent,
    Good,
    Average,
    Poor,
}

impl From<i64> for ReputationLevel {
    fn from(score: i64) -> Self {
        if score >= 90 {
            ReputationLevel::Excellent
        } else if score >= 75 {
            ReputationLevel::Good
        } else if score >= 50 {
            ReputationLevel::Average
        } else {
            ReputationLevel::Poor
        }
    }
}

impl Display for ReputationLevel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ReputationLevel::Excellent => write!(f, "Excellent"),
            ReputationLevel::Good => write!(f, "Good"),
            ReputationLevel::Average => write!(f, "Average"),
            ReputationLevel::Poor => write!(f, "Poor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use crate::core::library::{LibraryError, PenaltyKind, ReaderStatus, ReputationLevel, SlipStatus, StockStatus};

    #[tokio::test]
    async fn test_should_create_not_found_error() {
        assert!(matches!(LibraryError::not_found("test"), LibraryError::NotFound{ message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_ineligible_reader_error() {
        assert!(matches!(LibraryError::ineligible_reader("test"), LibraryError::IneligibleReader{ message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_insufficient_stock_error() {
        assert!(matches!(LibraryError::insufficient_stock("test"), LibraryError::InsufficientStock{ message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_validation_error() {
        assert!(matches!(LibraryError::validation("test", None), LibraryError::Validation{ message: _, reason_code: _ }));
    }

    #[tokio::test]
    async fn test_should_create_conflict_error() {
        assert!(matches!(LibraryError::conflict("test"), LibraryError::Conflict{ message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_database_error() {
        assert!(matches!(LibraryError::database("test", None, false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_display_message_only() {
        assert_eq!("book 7 not found", LibraryError::not_found("book 7 not found").to_string());
        assert_eq!("locked", LibraryError::validation("locked", Some("400".to_string())).to_string());
    }

    #[tokio::test]
    async fn test_should_create_retryable_error() {
        assert!(!LibraryError::database("test", None, false).retryable());
        assert!(LibraryError::database("test", None, true).retryable());
        assert!(!LibraryError::conflict("test").retryable());
        assert!(!LibraryError::not_found("test").retryable());
        assert!(!LibraryError::validation("test", None).retryable());
        assert!(!LibraryError::serialization("test").retryable());
        assert!(!LibraryError::runtime("test", None).retryable());
    }

    #[tokio::test]
    async fn test_should_format_reader_status() {
        for status in vec![ReaderStatus::Active, ReaderStatus::Expired, ReaderStatus::Locked] {
            let str_status = ReaderStatus::from_str(status.to_string().as_str()).expect("should parse");
            assert_eq!(status, str_status);
        }
        assert!(ReaderStatus::from_str("BANNED").is_err());
    }

    #[tokio::test]
    async fn test_should_format_slip_status() {
        for status in vec![SlipStatus::Borrowing, SlipStatus::Returned, SlipStatus::Late, SlipStatus::Lost] {
            let str_status = SlipStatus::from_str(status.to_string().as_str()).expect("should parse");
            assert_eq!(status, str_status);
        }
        assert!(SlipStatus::Borrowing.is_open());
        assert!(SlipStatus::Late.is_open());
        assert!(!SlipStatus::Returned.is_open());
        assert!(!SlipStatus::Lost.is_open());
    }

    #[tokio::test]
    async fn test_should_format_penalty_kind() {
        assert_eq!(PenaltyKind::Damaged, PenaltyKind::from_str("DAMAGED").expect("should parse"));
        assert!(PenaltyKind::from_str("late").is_err());
    }

    #[tokio::test]
    async fn test_should_derive_stock_status() {
        assert_eq!(StockStatus::OutOfStock, StockStatus::from_available(0, 5));
        assert_eq!(StockStatus::LowStock, StockStatus::from_available(4, 5));
        assert_eq!(StockStatus::InStock, StockStatus::from_available(5, 5));
    }

    #[tokio::test]
    async fn test_should_derive_reputation_level() {
        assert_eq!(ReputationLevel::Excellent, ReputationLevel::from(90));
        assert_eq!(ReputationLevel::Good, ReputationLevel::from(75));
        assert_eq!(ReputationLevel::Average, ReputationLevel::from(50));
        assert_eq!(ReputationLevel::Poor, ReputationLevel::from(49));
    }
}
