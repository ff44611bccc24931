use std::sync::Arc;
use crate::borrow::domain::BorrowService;
use crate::borrow::domain::service::BorrowServiceImpl;
use crate::borrow::repository::BorrowRepository;
use crate::borrow::repository::sqlite_borrow_repository::SqliteBorrowRepository;
use crate::catalog::factory::create_catalog_service;
use crate::core::domain::Configuration;
use crate::gateway::factory::create_publisher;
use crate::readers::factory::create_reader_service;
use crate::utils::date::Clock;
use crate::utils::sqlite::Database;

pub fn create_borrow_repository(db: &Database) -> Box<dyn BorrowRepository> {
    Box::new(SqliteBorrowRepository::new(db.clone()))
}

pub fn create_borrow_service(config: &Configuration, db: &Database, clock: Arc<dyn Clock>) -> Box<dyn BorrowService> {
    let reader_svc = create_reader_service(config, db, clock.clone());
    let catalog_svc = create_catalog_service(config, db, clock.clone());
    let borrow_repo = create_borrow_repository(db);
    let publisher = create_publisher(config.store.gateway_publisher(), db);
    Box::new(BorrowServiceImpl::new(config, reader_svc, catalog_svc, borrow_repo, publisher, clock))
}
