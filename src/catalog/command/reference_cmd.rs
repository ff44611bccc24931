use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::{AuthorEntity, CategoryEntity, PublisherEntity};
use crate::catalog::domain::CatalogService;
use crate::core::command::{Acknowledged, Command, CommandError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Author,
    Category,
    Publisher,
}

pub struct AddReferenceCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl AddReferenceCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddReferenceCommandRequest {
    #[serde(skip_deserializing, default = "default_kind")]
    pub kind: ReferenceKind,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

fn default_kind() -> ReferenceKind {
    ReferenceKind::Author
}

impl AddReferenceCommandRequest {
    pub fn new(kind: ReferenceKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            address: None,
            phone: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddReferenceCommandResponse {
    pub kind: ReferenceKind,
    pub id: i64,
    pub name: String,
}

impl Acknowledged for AddReferenceCommandResponse {
    fn message(&self) -> String {
        match self.kind {
            ReferenceKind::Author => format!("Author '{}' added", self.name),
            ReferenceKind::Category => format!("Category '{}' added", self.name),
            ReferenceKind::Publisher => format!("Publisher '{}' added", self.name),
        }
    }

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }
}

#[async_trait]
impl Command<AddReferenceCommandRequest, AddReferenceCommandResponse> for AddReferenceCommand {
    async fn execute(&self, req: AddReferenceCommandRequest) -> Result<AddReferenceCommandResponse, CommandError> {
        let res = match req.kind {
            ReferenceKind::Author => self.catalog_service.add_author(req.name.as_str()).await,
            ReferenceKind::Category => self.catalog_service.add_category(req.name.as_str()).await,
            ReferenceKind::Publisher => {
                let publisher = PublisherEntity {
                    publisher_id: 0,
                    publisher_name: req.name.trim().to_string(),
                    address: req.address.clone(),
                    phone: req.phone.clone(),
                };
                self.catalog_service.add_publisher(&publisher).await
            }
        };
        res.map_err(CommandError::from).map(|id| AddReferenceCommandResponse {
            kind: req.kind,
            id,
            name: req.name.trim().to_string(),
        })
    }
}

pub struct ListReferencesCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl ListReferencesCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListReferencesCommandResponse {
    pub authors: Vec<AuthorEntity>,
    pub categories: Vec<CategoryEntity>,
    pub publishers: Vec<PublisherEntity>,
}

#[async_trait]
impl Command<(), ListReferencesCommandResponse> for ListReferencesCommand {
    async fn execute(&self, _req: ()) -> Result<ListReferencesCommandResponse, CommandError> {
        Ok(ListReferencesCommandResponse {
            authors: self.catalog_service.find_authors().await?,
            categories: self.catalog_service.find_categories().await?,
            publishers: self.catalog_service.find_publishers().await?,
        })
    }
}
