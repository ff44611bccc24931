use std::collections::HashMap;
use std::str::FromStr;
use async_trait::async_trait;
use serde::Serialize;
use crate::core::command::{Command, CommandError};
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult, ReaderStatus};
use crate::readers::domain::ReaderService;
use crate::readers::domain::model::ReaderSearchField;
use crate::readers::dto::{ReaderDto, ReaderFilter};

pub struct QueryReadersCommand {
    reader_service: Box<dyn ReaderService>,
}

impl QueryReadersCommand {
    pub fn new(reader_service: Box<dyn ReaderService>) -> Self {
        Self {
            reader_service,
        }
    }
}

// Lookup modes in priority order: keyword search, listing filter, raw column predicates.
#[derive(Debug, Default)]
pub struct QueryReadersCommandRequest {
    pub keyword: Option<String>,
    pub field: ReaderSearchField,
    pub filter: Option<ReaderFilter>,
    pub page: Option<String>,
    pub page_size: Option<usize>,
    pub predicate: HashMap<String, String>,
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> LibraryResult<T> {
    value.parse::<T>().map_err(|_| LibraryError::validation(
        format!("invalid {} {}", name, value).as_str(), Some("400".to_string())))
}

impl QueryReadersCommandRequest {
    pub fn from_params(mut params: HashMap<String, String>) -> LibraryResult<Self> {
        let field = match params.remove("field") {
            Some(f) => ReaderSearchField::from_str(f.as_str())?,
            None => ReaderSearchField::All,
        };
        let page_size = match params.remove("page_size") {
            Some(s) => Some(parse_number::<usize>("page_size", s.as_str())?),
            None => None,
        };
        let mut filter = ReaderFilter::default();
        let mut filtered = false;
        if let Some(s) = params.remove("status") {
            filter.status = Some(ReaderStatus::from_str(s.as_str())?);
            filtered = true;
        }
        if let Some(s) = params.remove("min_reputation") {
            filter.min_reputation = Some(parse_number("min_reputation", s.as_str())?);
            filtered = true;
        }
        if let Some(s) = params.remove("max_reputation") {
            filter.max_reputation = Some(parse_number("max_reputation", s.as_str())?);
            filtered = true;
        }
        if let Some(s) = params.remove("expiring_soon") {
            filter.expiring_soon = s == "true" || s == "1";
            filtered = true;
        }
        Ok(Self {
            keyword: params.remove("keyword"),
            field,
            filter: if filtered { Some(filter) } else { None },
            page: params.remove("page"),
            page_size,
            predicate: params,
        })
    }

    pub fn search(keyword: &str, field: ReaderSearchField) -> Self {
        Self {
            keyword: Some(keyword.to_string()),
            field,
            ..Default::default()
        }
    }

    pub fn filtered(filter: ReaderFilter) -> Self {
        Self {
            filter: Some(filter),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryReadersCommandResponse {
    pub readers: PaginatedResult<ReaderDto>,
}

#[async_trait]
impl Command<QueryReadersCommandRequest, QueryReadersCommandResponse> for QueryReadersCommand {
    async fn execute(&self, req: QueryReadersCommandRequest) -> Result<QueryReadersCommandResponse, CommandError> {
        let page_size = req.page_size.unwrap_or(50);
        let page = req.page.as_deref();
        let res = if let Some(keyword) = req.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            self.reader_service.search_readers(keyword, req.field, page, page_size).await
        } else if let Some(filter) = &req.filter {
            self.reader_service.filter_readers(filter, page, page_size).await
        } else {
            self.reader_service.query_readers(&req.predicate, page, page_size).await
        };
        res.map_err(CommandError::from).map(|readers| QueryReadersCommandResponse { readers })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::command::{Command, CommandError};
    use crate::core::library::ReaderStatus;
    use crate::readers::command::query_readers_cmd::{QueryReadersCommand, QueryReadersCommandRequest};
    use crate::readers::domain::model::ReaderSearchField;
    use crate::readers::dto::ReaderFilter;
    use crate::readers::factory;
    use crate::utils::testing::{fixed_clock, seed_reader, test_config, test_db};

    #[tokio::test]
    async fn test_should_split_params() {
        let req = QueryReadersCommandRequest::from_params(HashMap::from([
            ("status".to_string(), "LOCKED".to_string()),
            ("min_reputation".to_string(), "50".to_string()),
            ("page".to_string(), "10".to_string()),
        ])).expect("should parse params");
        let filter = req.filter.expect("should build filter");
        assert_eq!(Some(ReaderStatus::Locked), filter.status);
        assert_eq!(Some(50), filter.min_reputation);
        assert_eq!(Some("10".to_string()), req.page);
        assert!(req.predicate.is_empty());

        assert!(QueryReadersCommandRequest::from_params(HashMap::from([("status".to_string(), "GONE".to_string())])).is_err());
        assert!(QueryReadersCommandRequest::from_params(HashMap::from([("max_reputation".to_string(), "x".to_string())])).is_err());
    }

    #[tokio::test]
    async fn test_should_run_query_readers() {
        let db = test_db().await;
        let _ = seed_reader(&db, "Ana Lima", "ACTIVE", "2025-01-15").await;
        let _ = seed_reader(&db, "Bruno Costa", "LOCKED", "2026-01-01").await;
        let cmd = QueryReadersCommand::new(factory::create_reader_service(&test_config(), &db, fixed_clock("2025-01-01")));

        let res = cmd.execute(QueryReadersCommandRequest::search("costa", ReaderSearchField::Name)).await.expect("should search");
        assert_eq!(1, res.readers.records.len());

        let filter = ReaderFilter { expiring_soon: true, ..Default::default() };
        let res = cmd.execute(QueryReadersCommandRequest::filtered(filter)).await.expect("should filter");
        assert_eq!("Ana Lima", res.readers.records[0].full_name);

        let res = cmd.execute(QueryReadersCommandRequest::default()).await.expect("should list");
        assert_eq!(2, res.readers.records.len());

        let mut req = QueryReadersCommandRequest::default();
        req.predicate = HashMap::from([("reader_id; --".to_string(), "1".to_string())]);
        assert!(matches!(cmd.execute(req).await, Err(CommandError::Validation { .. })));
    }
}
