use async_trait::async_trait;
use tracing::warn;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryResult;

#[async_trait]
pub trait EventPublisher: Sync + Send {
    async fn publish(&self, event: &DomainEvent) -> LibraryResult<()>;
}

// publish_or_warn records an event for a change that is already committed, so a failing
// audit write is logged instead of failing the operation.
pub async fn publish_or_warn(publisher: &dyn EventPublisher, event: serde_json::Result<DomainEvent>) {
    match event {
        Ok(event) => {
            if let Err(err) = publisher.publish(&event).await {
                warn!("failed to publish {} event {}: {}", event.name, event.key, err);
            }
        }
        Err(err) => {
            warn!("failed to build event: {}", err);
        }
    }
}
