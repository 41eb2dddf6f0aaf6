use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A schema-less JSON document as it crosses the store boundary
pub type Document = Map<String, Value>;

/// Errors from the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid document identifier: {0}")]
    InvalidId(String),

    #[error("Document conversion failed: {0}")]
    Conversion(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The two logical collections of the restaurant database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Foods,
    Cart,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Foods => "foods",
            Collection::Cart => "cart",
        }
    }
}

/// Generated document identifier. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(ObjectId);

impl DocumentId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn parse(s: &str) -> StoreResult<Self> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| StoreError::InvalidId(s.to_string()))
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// Find-many parameters: optional equality filter, skip and limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Option<(String, String)>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl FindQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn field_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            filter: Some((field.into(), value.into())),
            ..Self::default()
        }
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// A limit of zero means "no limit", as with the database driver
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = if limit == 0 { None } else { Some(limit) };
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match &self.filter {
            None => true,
            Some((field, value)) => doc.get(field).and_then(Value::as_str) == Some(value.as_str()),
        }
    }
}

/// Fields returned by a projected lookup. `_id` is always included.
#[derive(Debug, Clone, Copy)]
pub struct Projection(pub &'static [&'static str]);

impl Projection {
    pub fn apply(&self, doc: &Document) -> Document {
        doc.iter()
            .filter(|(k, _)| k.as_str() == "_id" || self.0.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Minimal operation set over the restaurant collections.
///
/// Operations are independent; there are no transactions and concurrent
/// writes to one document resolve last-writer-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_many(&self, collection: Collection, query: FindQuery) -> StoreResult<Vec<Document>>;

    async fn find_by_id(
        &self,
        collection: Collection,
        id: DocumentId,
        projection: Projection,
    ) -> StoreResult<Option<Document>>;

    async fn estimated_count(&self, collection: Collection) -> StoreResult<u64>;

    async fn insert_one(&self, collection: Collection, doc: Document) -> StoreResult<InsertOneResult>;

    /// Set the given fields on the document, creating it under `id` if absent
    async fn upsert_fields(
        &self,
        collection: Collection,
        id: DocumentId,
        fields: Document,
    ) -> StoreResult<UpdateResult>;

    async fn delete_by_id(&self, collection: Collection, id: DocumentId) -> StoreResult<DeleteResult>;

    async fn ping(&self) -> StoreResult<()>;

    /// Release connections; called once after the server stops
    async fn shutdown(&self) {}
}
