use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::{ReaderStatus, ReputationLevel};
use crate::readers::domain::Reader;

fn default_reputation() -> i64 {
    100
}

fn default_status() -> ReaderStatus {
    ReaderStatus::Active
}

// ReaderDto is a data transfer object for Reader service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderDto {
    #[serde(default)]
    pub reader_id: i64,
    pub full_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub card_start: Option<NaiveDate>,
    pub card_end: Option<NaiveDate>,
    #[serde(default = "default_status")]
    pub status: ReaderStatus,
    #[serde(default = "default_reputation")]
    pub reputation_score: i64,
}

impl ReaderDto {
    pub fn new(full_name: &str, card_end: Option<NaiveDate>) -> ReaderDto {
        ReaderDto {
            reader_id: 0,
            full_name: full_name.to_string(),
            address: None,
            phone: None,
            email: None,
            card_start: None,
            card_end,
            status: ReaderStatus::Active,
            reputation_score: 100,
        }
    }
}

impl Identifiable for ReaderDto {
    fn id(&self) -> i64 {
        self.reader_id
    }
}

impl Reader for ReaderDto {
    fn is_active(&self) -> bool {
        self.status == ReaderStatus::Active
    }

    fn is_locked(&self) -> bool {
        self.status == ReaderStatus::Locked
    }

    fn is_expired(&self, today: NaiveDate) -> bool {
        self.card_end.map(|end| end < today).unwrap_or(false)
    }

    fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.card_end.map(|end| (end - today).num_days())
    }

    fn reputation_level(&self) -> ReputationLevel {
        ReputationLevel::from(self.reputation_score)
    }

    fn status_label(&self) -> &'static str {
        self.status.label()
    }
}

// ReaderFilter is what the listing screen sends, expiring_soon selects cards ending
// within the configured window that have not lapsed yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReaderFilter {
    pub status: Option<ReaderStatus>,
    pub min_reputation: Option<i64>,
    pub max_reputation: Option<i64>,
    #[serde(default)]
    pub expiring_soon: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderStatistics {
    pub total_readers: i64,
    pub active_readers: i64,
    pub expired_readers: i64,
    pub locked_readers: i64,
    pub avg_reputation: f64,
    pub expiring_soon: i64,
    pub high_reputation: i64,
    pub low_reputation: i64,
}
