use std::env;
use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::RepositoryStore;

pub const DATABASE_URL_ENV_VAR: &str = "LMS_DATABASE_URL";
pub const STORE_ENV_VAR: &str = "LMS_STORE";
pub const LISTEN_ADDR_ENV_VAR: &str = "LMS_LISTEN_ADDR";
pub const LOG_LEVEL_ENV_VAR: &str = "LMS_LOG_LEVEL";
pub const LOAN_DAYS_ENV_VAR: &str = "LMS_LOAN_DAYS";
pub const CARD_VALIDITY_DAYS_ENV_VAR: &str = "LMS_CARD_VALIDITY_DAYS";
pub const STAFF_ID_ENV_VAR: &str = "LMS_STAFF_ID";

const MAX_PERIOD_DAYS: i64 = 36_500;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> i64;
}

// LookupKey addresses a reader or a book either by identity or by its exact name/title.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupKey {
    Id(i64),
    Name(String),
}

impl Display for LookupKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            LookupKey::Id(id) => write!(f, "{}", id),
            LookupKey::Name(name) => write!(f, "'{}'", name),
        }
    }
}

// Configuration abstracts config options for library system
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub loan_days: i64,
    pub card_validity_days: i64,
    pub expiring_soon_days: i64,
    pub low_stock_threshold: i64,
    pub default_staff_id: i64,
    pub store: RepositoryStore,
    pub database_url: String,
    pub listen_addr: String,
    pub log_level: String,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            loan_days: 14,
            card_validity_days: 365,
            expiring_soon_days: 30,
            low_stock_threshold: 5,
            default_staff_id: 1,
            store: RepositoryStore::InMemorySqlite,
            database_url: "sqlite://library.db".to_string(),
            listen_addr: "127.0.0.1:3000".to_string(),
            log_level: "info".to_string(),
        }
    }

    // Defaults overridden by LMS_* environment variables; unparsable numbers keep the default.
    pub fn from_env(branch_id: &str) -> LibraryResult<Self> {
        let mut config = Configuration::new(branch_id);
        if let Ok(url) = env::var(DATABASE_URL_ENV_VAR) {
            config.database_url = url;
            config.store = RepositoryStore::Sqlite;
        }
        if let Ok(store) = env::var(STORE_ENV_VAR) {
            config.store = RepositoryStore::from(store);
        }
        if let Ok(addr) = env::var(LISTEN_ADDR_ENV_VAR) {
            config.listen_addr = addr;
        }
        if let Ok(level) = env::var(LOG_LEVEL_ENV_VAR) {
            config.log_level = level;
        }
        config.loan_days = env_number(LOAN_DAYS_ENV_VAR, config.loan_days);
        config.card_validity_days = env_number(CARD_VALIDITY_DAYS_ENV_VAR, config.card_validity_days);
        config.default_staff_id = env_number(STAFF_ID_ENV_VAR, config.default_staff_id);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LibraryResult<()> {
        check_period(LOAN_DAYS_ENV_VAR, self.loan_days)?;
        check_period(CARD_VALIDITY_DAYS_ENV_VAR, self.card_validity_days)?;
        check_period("expiring_soon_days", self.expiring_soon_days)
    }
}

fn check_period(name: &str, days: i64) -> LibraryResult<()> {
    if !(1..=MAX_PERIOD_DAYS).contains(&days) {
        return Err(LibraryError::validation(
            format!("{} must be between 1 and {} days, got {}", name, MAX_PERIOD_DAYS, days).as_str(), None));
    }
    Ok(())
}

fn env_number(name: &str, default: i64) -> i64 {
    env::var(name).ok().and_then(|v| v.parse::<i64>().ok()).unwrap_or(default)
}
