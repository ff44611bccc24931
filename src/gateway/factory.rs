use crate::gateway::events::EventPublisher;
use crate::gateway::GatewayPublisherVia;
use crate::gateway::logs::publisher::LogPublisher;
use crate::gateway::sqlite::publisher::SqlitePublisher;
use crate::utils::sqlite::Database;

pub fn create_publisher(via: GatewayPublisherVia, db: &Database) -> Box<dyn EventPublisher> {
    match via {
        GatewayPublisherVia::Sqlite => {
            Box::new(SqlitePublisher::new(db.clone()))
        }
        GatewayPublisherVia::Logs => {
            Box::new(LogPublisher::new())
        }
    }
}
