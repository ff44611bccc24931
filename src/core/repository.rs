use async_trait::async_trait;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::gateway::GatewayPublisherVia;

#[async_trait]
pub trait Repository<Entity>: Sync + Send {
    // create an entity and return its generated id
    async fn create(&self, entity: &Entity) -> LibraryResult<i64>;

    // updates an entity
    async fn update(&self, entity: &Entity) -> LibraryResult<usize>;

    // get an entity
    async fn get(&self, id: i64) -> LibraryResult<Entity>;

    // delete an entity
    async fn delete(&self, id: i64) -> LibraryResult<usize>;

    // find by column predicates, keys may carry an operator suffix such as `card_end:<`
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Entity>>;
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    Sqlite,
    InMemorySqlite,
}

impl RepositoryStore {
    pub fn gateway_publisher(&self) -> GatewayPublisherVia {
        match self {
            RepositoryStore::Sqlite => { GatewayPublisherVia::Sqlite }
            RepositoryStore::InMemorySqlite => { GatewayPublisherVia::Logs }
        }
    }
}

impl From<String> for RepositoryStore {
    fn from(s: String) -> Self {
        match s.as_str() {
            "memory" | "InMemorySqlite" => RepositoryStore::InMemorySqlite,
            _ => RepositoryStore::Sqlite,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::repository::RepositoryStore;
    use crate::gateway::GatewayPublisherVia;

    #[tokio::test]
    async fn test_should_select_publisher() {
        assert_eq!(GatewayPublisherVia::Sqlite, RepositoryStore::Sqlite.gateway_publisher());
        assert_eq!(GatewayPublisherVia::Logs, RepositoryStore::InMemorySqlite.gateway_publisher());
        assert_eq!(RepositoryStore::InMemorySqlite, RepositoryStore::from("memory".to_string()));
        assert_eq!(RepositoryStore::Sqlite, RepositoryStore::from("file".to_string()));
    }
}
