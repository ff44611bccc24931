use std::collections::HashMap;
use std::str::FromStr;
use async_trait::async_trait;
use serde::Serialize;
use crate::books::domain::model::BookSearchField;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};

pub struct QueryBooksCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl QueryBooksCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

// A keyword runs a LIKE search, otherwise the remaining parameters are column predicates.
#[derive(Debug, Default)]
pub struct QueryBooksCommandRequest {
    pub keyword: Option<String>,
    pub field: BookSearchField,
    pub page: Option<String>,
    pub page_size: Option<usize>,
    pub predicate: HashMap<String, String>,
}

impl QueryBooksCommandRequest {
    // from_params splits query-string parameters into paging, search and predicate parts.
    pub fn from_params(mut params: HashMap<String, String>) -> LibraryResult<Self> {
        let field = match params.remove("field") {
            Some(f) => BookSearchField::from_str(f.as_str())?,
            None => BookSearchField::All,
        };
        let page_size = match params.remove("page_size") {
            Some(s) => Some(s.parse::<usize>().map_err(|_| LibraryError::validation(
                format!("invalid page_size {}", s).as_str(), Some("400".to_string())))?),
            None => None,
        };
        Ok(Self {
            keyword: params.remove("keyword"),
            field,
            page: params.remove("page"),
            page_size,
            predicate: params,
        })
    }

    pub fn search(keyword: &str, field: BookSearchField) -> Self {
        Self {
            keyword: Some(keyword.to_string()),
            field,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryBooksCommandResponse {
    pub books: PaginatedResult<BookDto>,
}

#[async_trait]
impl Command<QueryBooksCommandRequest, QueryBooksCommandResponse> for QueryBooksCommand {
    async fn execute(&self, req: QueryBooksCommandRequest) -> Result<QueryBooksCommandResponse, CommandError> {
        let page_size = req.page_size.unwrap_or(50);
        let res = match req.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(keyword) => {
                self.catalog_service.search_books(keyword, req.field, req.page.as_deref(), page_size).await
            }
            None => {
                self.catalog_service.query_books(&req.predicate, req.page.as_deref(), page_size).await
            }
        };
        res.map_err(CommandError::from).map(|books| QueryBooksCommandResponse { books })
    }
}
