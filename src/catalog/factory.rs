use std::sync::Arc;
use crate::books::factory;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;
use crate::core::domain::Configuration;
use crate::gateway::factory::create_publisher;
use crate::utils::date::Clock;
use crate::utils::sqlite::Database;

pub fn create_catalog_service(config: &Configuration, db: &Database, clock: Arc<dyn Clock>) -> Box<dyn CatalogService> {
    let book_repo = factory::create_book_repository(db);
    let publisher = create_publisher(config.store.gateway_publisher(), db);
    Box::new(CatalogServiceImpl::new(config, book_repo, publisher, clock))
}
