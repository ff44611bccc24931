use std::sync::Arc;
use crate::core::domain::Configuration;
use crate::gateway::factory::create_publisher;
use crate::readers::domain::ReaderService;
use crate::readers::domain::service::ReaderServiceImpl;
use crate::readers::repository::ReaderRepository;
use crate::readers::repository::sqlite_reader_repository::SqliteReaderRepository;
use crate::utils::date::Clock;
use crate::utils::sqlite::Database;

pub fn create_reader_repository(db: &Database) -> Box<dyn ReaderRepository> {
    Box::new(SqliteReaderRepository::new(db.clone()))
}

pub fn create_reader_service(config: &Configuration, db: &Database, clock: Arc<dyn Clock>) -> Box<dyn ReaderService> {
    let reader_repo = create_reader_repository(db);
    let publisher = create_publisher(config.store.gateway_publisher(), db);
    Box::new(ReaderServiceImpl::new(config, reader_repo, publisher, clock))
}
