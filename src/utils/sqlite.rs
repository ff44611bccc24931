use std::cmp;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{ConnectOptions, Executor};
use tracing::info;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::RepositoryStore;

pub const MAX_PAGE_SIZE: usize = 500;

const OPERATORS: [&str; 7] = ["=", "!=", "<", "<=", ">", ">=", "LIKE"];

const INITIAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS authors (
    author_id INTEGER PRIMARY KEY AUTOINCREMENT,
    author_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS publishers (
    publisher_id INTEGER PRIMARY KEY AUTOINCREMENT,
    publisher_name TEXT NOT NULL,
    address TEXT,
    phone TEXT
);

CREATE TABLE IF NOT EXISTS books (
    book_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author_id INTEGER REFERENCES authors(author_id),
    category_id INTEGER REFERENCES categories(category_id),
    publisher_id INTEGER REFERENCES publishers(publisher_id),
    publish_year INTEGER,
    isbn TEXT UNIQUE,
    barcode TEXT UNIQUE,
    price REAL CHECK (price IS NULL OR price >= 0),
    description TEXT
);

CREATE TABLE IF NOT EXISTS book_inventory (
    book_id INTEGER PRIMARY KEY REFERENCES books(book_id) ON DELETE CASCADE,
    total_quantity INTEGER NOT NULL DEFAULT 0,
    available_quantity INTEGER NOT NULL DEFAULT 0,
    CHECK (available_quantity >= 0 AND available_quantity <= total_quantity)
);

CREATE TABLE IF NOT EXISTS readers (
    reader_id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    address TEXT,
    phone TEXT,
    email TEXT,
    card_start TEXT,
    card_end TEXT,
    status TEXT NOT NULL DEFAULT 'ACTIVE' CHECK (status IN ('ACTIVE', 'EXPIRED', 'LOCKED')),
    reputation_score INTEGER NOT NULL DEFAULT 100 CHECK (reputation_score BETWEEN 0 AND 100)
);

CREATE INDEX IF NOT EXISTS readers_status_ndx ON readers (status, card_end);

CREATE TABLE IF NOT EXISTS borrow_slips (
    slip_id INTEGER PRIMARY KEY AUTOINCREMENT,
    reader_id INTEGER NOT NULL REFERENCES readers(reader_id),
    staff_id INTEGER NOT NULL,
    borrow_date TEXT NOT NULL,
    return_due TEXT NOT NULL,
    return_date TEXT,
    status TEXT NOT NULL DEFAULT 'BORROWING' CHECK (status IN ('BORROWING', 'RETURNED', 'LATE', 'LOST'))
);

CREATE INDEX IF NOT EXISTS borrow_slips_reader_ndx ON borrow_slips (reader_id, status);

CREATE TABLE IF NOT EXISTS borrow_details (
    detail_id INTEGER PRIMARY KEY AUTOINCREMENT,
    slip_id INTEGER NOT NULL REFERENCES borrow_slips(slip_id) ON DELETE CASCADE,
    book_id INTEGER NOT NULL REFERENCES books(book_id),
    quantity INTEGER NOT NULL CHECK (quantity >= 1),
    fine_amount REAL NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS borrow_details_book_ndx ON borrow_details (book_id);

CREATE TABLE IF NOT EXISTS penalties (
    penalty_id INTEGER PRIMARY KEY AUTOINCREMENT,
    reader_id INTEGER NOT NULL REFERENCES readers(reader_id),
    slip_id INTEGER NOT NULL REFERENCES borrow_slips(slip_id),
    book_id INTEGER NOT NULL REFERENCES books(book_id),
    penalty_type TEXT NOT NULL CHECK (penalty_type IN ('LATE', 'LOST', 'DAMAGED')),
    amount REAL NOT NULL CHECK (amount >= 0),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    event_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    event_group TEXT NOT NULL,
    event_key TEXT NOT NULL,
    kind TEXT NOT NULL,
    metadata TEXT NOT NULL,
    json_data TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

const MIGRATIONS: [(i64, &str, &str); 1] = [
    (1, "initial_schema", INITIAL_SCHEMA),
];

// Database is the store handle threaded through factories and repositories.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(url: &str) -> LibraryResult<Self> {
        let connect_opts = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_opts)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    // A single connection that is never recycled, since the data lives only in that connection.
    pub async fn new_in_memory() -> LibraryResult<Self> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?
            .foreign_keys(true)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> LibraryResult<()> {
        self.pool.execute(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        ).await?;

        for (id, name, sql) in MIGRATIONS.iter() {
            let applied: Option<i64> = sqlx::query_scalar("SELECT id FROM _migrations WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            if applied.is_some() {
                continue;
            }
            let mut tx = self.pool.begin().await?;
            tx.execute(*sql).await?;
            sqlx::query("INSERT INTO _migrations (id, name) VALUES (?, ?)")
                .bind(id)
                .bind(name)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            info!("applied migration {} {}", id, name);
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// helper method to open the store selected by configuration
pub async fn build_database(config: &Configuration) -> LibraryResult<Database> {
    match config.store {
        RepositoryStore::Sqlite => {
            Database::connect(config.database_url.as_str()).await
        }
        RepositoryStore::InMemorySqlite => {
            Database::new_in_memory().await
        }
    }
}

// add_filter_expr appends `column op ?` for a predicate key such as `card_end:<`. Only
// whitelisted columns and operators are accepted, values are always bound.
pub fn add_filter_expr(k: &str, columns: &[&str], filter_expr: &mut String) -> LibraryResult<()> {
    let mut op = "=";
    let mut ks = k;
    let parts = k.split(':').collect::<Vec<&str>>();
    if parts.len() > 1 {
        ks = parts[0];
        op = parts[1];
    }
    if !columns.contains(&ks) {
        return Err(LibraryError::validation(format!("cannot filter on {}", ks).as_str(), Some("400".to_string())));
    }
    let op = op.to_uppercase();
    if !OPERATORS.contains(&op.as_str()) {
        return Err(LibraryError::validation(format!("unsupported operator {}", op).as_str(), Some("400".to_string())));
    }
    if filter_expr.is_empty() {
        filter_expr.push_str(format!(" WHERE {} {} ?", ks, op).as_str());
    } else {
        filter_expr.push_str(format!(" AND {} {} ?", ks, op).as_str());
    }
    Ok(())
}

// build_filter turns a predicate map into a WHERE clause plus the values to bind, in key order.
pub fn build_filter(predicate: &HashMap<String, String>, columns: &[&str]) -> LibraryResult<(String, Vec<String>)> {
    let mut keys = predicate.keys().collect::<Vec<&String>>();
    keys.sort();
    let mut filter_expr = String::new();
    let mut values = Vec::with_capacity(keys.len());
    for k in keys {
        add_filter_expr(k.as_str(), columns, &mut filter_expr)?;
        if let Some(v) = predicate.get(k) {
            values.push(v.to_string());
        }
    }
    Ok((filter_expr, values))
}

pub fn to_offset(page: Option<&str>) -> LibraryResult<i64> {
    match page {
        Some(p) if !p.is_empty() => p.parse::<i64>().map_err(|_| LibraryError::validation(
            format!("invalid page token {}", p).as_str(), Some("400".to_string()))),
        _ => Ok(0),
    }
}

pub fn to_limit(page_size: usize) -> i64 {
    cmp::min(cmp::max(page_size, 1), MAX_PAGE_SIZE) as i64
}

pub fn from_rows<T>(page: Option<&str>, page_size: usize, offset: i64, records: Vec<T>) -> PaginatedResult<T> {
    let next_page = if records.len() as i64 == to_limit(page_size) {
        Some((offset + records.len() as i64).to_string())
    } else {
        None
    };
    PaginatedResult::new(page, page_size, next_page, records)
}

// like_pattern wraps a keyword for a LIKE comparison, the pattern itself is bound.
pub fn like_pattern(keyword: &str) -> String {
    format!("%{}%", keyword.trim())
}

impl From<sqlx::Error> for LibraryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                LibraryError::not_found("record not found")
            }
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    LibraryError::conflict(format!("duplicate value: {}", db_err.message()).as_str())
                } else if db_err.is_foreign_key_violation() {
                    LibraryError::conflict(format!("record is referenced by other records: {}", db_err.message()).as_str())
                } else if db_err.is_check_violation() {
                    LibraryError::validation(format!("constraint violated: {}", db_err.message()).as_str(), Some("400".to_string()))
                } else {
                    LibraryError::database(format!("sqlite database error {}", db_err.message()).as_str(),
                                           db_err.code().map(|c| c.to_string()), false)
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                LibraryError::database(format!("sqlite database unavailable {:?}", err).as_str(), None, true)
            }
            _ => {
                LibraryError::database(format!("sqlite database error {:?}", err).as_str(), None, false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::utils::sqlite::{build_database, build_filter, from_rows, to_offset, Database};

    #[tokio::test]
    async fn test_should_migrate_in_memory() {
        let db = Database::new_in_memory().await.expect("should open db");
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .fetch_all(db.pool()).await.expect("should list tables");
        for name in ["authors", "book_inventory", "books", "borrow_details", "borrow_slips",
            "categories", "events", "penalties", "publishers", "readers"] {
            assert!(tables.contains(&name.to_string()), "missing table {}", name);
        }
        // running migrations twice is a no-op
        db.migrate().await.expect("should migrate again");
    }

    #[tokio::test]
    async fn test_should_open_file_database() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("library.db");
        let mut config = Configuration::new("test");
        config.store = crate::core::repository::RepositoryStore::Sqlite;
        config.database_url = format!("sqlite://{}", path.display());
        let db = build_database(&config).await.expect("should open db");
        assert!(path.exists());
        assert!(!db.pool().is_closed());
    }

    #[tokio::test]
    async fn test_should_build_filter() {
        let predicate = HashMap::from([
            ("status".to_string(), "ACTIVE".to_string()),
            ("card_end:<".to_string(), "2025-01-01".to_string()),
        ]);
        let (expr, values) = build_filter(&predicate, &["status", "card_end"]).expect("should build");
        assert_eq!(" WHERE card_end < ? AND status = ?", expr);
        assert_eq!(vec!["2025-01-01".to_string(), "ACTIVE".to_string()], values);
    }

    #[tokio::test]
    async fn test_should_reject_unknown_columns_and_operators() {
        let predicate = HashMap::from([("1=1; DROP TABLE readers".to_string(), "x".to_string())]);
        assert!(matches!(build_filter(&predicate, &["status"]), Err(LibraryError::Validation { .. })));
        let predicate = HashMap::from([("status:IN".to_string(), "x".to_string())]);
        assert!(matches!(build_filter(&predicate, &["status"]), Err(LibraryError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_should_page_rows() {
        assert_eq!(0, to_offset(None).expect("should parse"));
        assert_eq!(20, to_offset(Some("20")).expect("should parse"));
        assert!(to_offset(Some("abc")).is_err());
        let res = from_rows(Some("0"), 2, 0, vec![1, 2]);
        assert_eq!(Some("2".to_string()), res.next_page);
        let res = from_rows(Some("2"), 2, 2, vec![3]);
        assert_eq!(None, res.next_page);
    }
}
