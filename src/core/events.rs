use std::collections::HashMap;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::utils::date::serializer;

// DomainEventType defines type of event for domain changes
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum DomainEventType {
    Added,
    Updated,
    Deleted,
}

impl DomainEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainEventType::Added => "Added",
            DomainEventType::Updated => "Updated",
            DomainEventType::Deleted => "Deleted",
        }
    }
}

// DomainEvent records a committed change to readers, books or borrow slips
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_id: String,
    pub name: String,
    pub group: String,
    pub key: String,
    pub kind: DomainEventType,
    pub metadata: HashMap<String, String>,
    pub json_data: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl DomainEvent {
    pub fn added<T: Serialize>(name: &str, group: &str, key: i64, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(Self::build(name, group, key, DomainEventType::Added, json))
    }

    pub fn updated<T: Serialize>(name: &str, group: &str, key: i64, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(Self::build(name, group, key, DomainEventType::Updated, json))
    }

    pub fn deleted<T: Serialize>(name: &str, group: &str, key: i64, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(Self::build(name, group, key, DomainEventType::Deleted, json))
    }

    pub fn with_metadata(mut self, k: &str, v: &str) -> Self {
        self.metadata.insert(k.to_string(), v.to_string());
        self
    }

    fn build(name: &str, group: &str, key: i64, kind: DomainEventType, json: String) -> DomainEvent {
        DomainEvent {
            event_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            group: group.to_string(),
            key: key.to_string(),
            kind,
            metadata: HashMap::new(),
            json_data: json,
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::{DomainEvent, DomainEventType};

    #[tokio::test]
    async fn test_should_build_added() {
        let data = HashMap::from([("a", 1), ("b", 2)]);
        let event = DomainEvent::added("borrow_created", "borrow", 7, &data).expect("build event");
        assert_eq!("borrow_created", event.name.as_str());
        assert_eq!("7", event.key.as_str());
        assert_eq!(DomainEventType::Added, event.kind);
    }

    #[tokio::test]
    async fn test_should_build_updated_with_metadata() {
        let event = DomainEvent::updated("reader_status", "readers", 3, &"LOCKED")
            .expect("build event")
            .with_metadata("operator", "1");
        assert_eq!(DomainEventType::Updated, event.kind);
        assert_eq!(Some(&"1".to_string()), event.metadata.get("operator"));
        assert_eq!("\"LOCKED\"", event.json_data.as_str());
    }

    #[tokio::test]
    async fn test_should_build_deleted() {
        let event = DomainEvent::deleted("books", "books", 1, &1).expect("build event");
        assert_eq!(DomainEventType::Deleted, event.kind);
        assert_eq!("Deleted", event.kind.as_str());
    }
}
