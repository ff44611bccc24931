use async_trait::async_trait;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryResult;
use crate::gateway::events::EventPublisher;
use crate::utils::date::DATE_FMT;
use crate::utils::sqlite::Database;

#[derive(Debug)]
pub struct SqlitePublisher {
    db: Database,
}

impl SqlitePublisher {
    pub fn new(db: Database) -> Self {
        Self {
            db,
        }
    }
}

#[async_trait]
impl EventPublisher for SqlitePublisher {
    async fn publish(&self, event: &DomainEvent) -> LibraryResult<()> {
        let metadata = serde_json::to_string(&event.metadata)?;
        sqlx::query(
            "INSERT INTO events (event_id, name, event_group, event_key, kind, metadata, json_data, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(event.event_id.as_str())
            .bind(event.name.as_str())
            .bind(event.group.as_str())
            .bind(event.key.as_str())
            .bind(event.kind.as_str())
            .bind(metadata)
            .bind(event.json_data.as_str())
            .bind(event.created_at.format(DATE_FMT).to_string())
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}
