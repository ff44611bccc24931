use std::collections::HashMap;
use async_trait::async_trait;
use serde::Serialize;
use crate::borrow::domain::BorrowService;
use crate::borrow::dto::BorrowListingDto;
use crate::core::command::{Command, CommandError};
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};

pub struct ListBorrowsCommand {
    borrow_service: Box<dyn BorrowService>,
}

impl ListBorrowsCommand {
    pub fn new(borrow_service: Box<dyn BorrowService>) -> Self {
        Self {
            borrow_service,
        }
    }
}

#[derive(Debug, Default)]
pub struct ListBorrowsCommandRequest {
    pub page: Option<String>,
    pub page_size: Option<usize>,
    pub predicate: HashMap<String, String>,
}

impl ListBorrowsCommandRequest {
    // everything but paging is a column predicate over the borrow register
    pub fn from_params(mut params: HashMap<String, String>) -> LibraryResult<Self> {
        let page_size = match params.remove("page_size") {
            Some(s) => Some(s.parse::<usize>().map_err(|_| LibraryError::validation(
                format!("invalid page_size {}", s).as_str(), Some("400".to_string())))?),
            None => None,
        };
        Ok(Self {
            page: params.remove("page"),
            page_size,
            predicate: params,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ListBorrowsCommandResponse {
    pub borrows: PaginatedResult<BorrowListingDto>,
}

#[async_trait]
impl Command<ListBorrowsCommandRequest, ListBorrowsCommandResponse> for ListBorrowsCommand {
    async fn execute(&self, req: ListBorrowsCommandRequest) -> Result<ListBorrowsCommandResponse, CommandError> {
        self.borrow_service.list_borrows(&req.predicate, req.page.as_deref(), req.page_size.unwrap_or(50))
            .await.map_err(CommandError::from).map(|borrows| ListBorrowsCommandResponse { borrows })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::borrow::command::list_borrows_cmd::{ListBorrowsCommand, ListBorrowsCommandRequest};
    use crate::borrow::domain::BorrowService;
    use crate::borrow::dto::BorrowRequest;
    use crate::borrow::factory;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::LookupKey;
    use crate::utils::testing::{fixed_clock, seed_book, seed_reader, test_config, test_db};

    #[tokio::test]
    async fn test_should_run_list_borrows() {
        let db = test_db().await;
        let ana = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let bruno = seed_reader(&db, "Bruno Costa", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 3, 3).await;
        let borrow_svc = factory::create_borrow_service(&test_config(), &db, fixed_clock("2025-01-01"));
        for reader_id in [ana, bruno] {
            let _ = borrow_svc.create_borrow(&BorrowRequest::new(LookupKey::Id(reader_id), LookupKey::Id(book_id)))
                .await.expect("should borrow");
        }

        let cmd = ListBorrowsCommand::new(borrow_svc);
        let res = cmd.execute(ListBorrowsCommandRequest::default()).await.expect("should list");
        assert_eq!(2, res.borrows.records.len());
        assert_eq!("Bruno Costa", res.borrows.records[0].full_name);

        let req = ListBorrowsCommandRequest::from_params(HashMap::from([
            ("full_name".to_string(), "Ana Lima".to_string()),
            ("page_size".to_string(), "10".to_string()),
        ])).expect("should parse params");
        let res = cmd.execute(req).await.expect("should list");
        assert_eq!(1, res.borrows.records.len());
        assert_eq!(ana, res.borrows.records[0].reader_id);

        let req = ListBorrowsCommandRequest::from_params(HashMap::from([("slip_id; --".to_string(), "1".to_string())]))
            .expect("should parse params");
        assert!(matches!(cmd.execute(req).await, Err(CommandError::Validation { .. })));
        assert!(ListBorrowsCommandRequest::from_params(HashMap::from([("page_size".to_string(), "x".to_string())])).is_err());
    }
}
