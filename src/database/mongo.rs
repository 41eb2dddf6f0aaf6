use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc},
    options::{
        ClientOptions, FindOneOptions, FindOptions, ServerApi, ServerApiVersion, UpdateOptions,
    },
    Client, Database,
};
use tracing::info;

use super::convert::{id_to_string, to_bson_document, to_json_document, to_json_documents};
use super::store::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, FindQuery, InsertOneResult,
    Projection, StoreResult, UpdateResult,
};

/// MongoDB-backed store. One client is opened at startup and shared by
/// every request for the life of the process.
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Open the client and verify connectivity with a ping
    pub async fn connect(uri: &str, database_name: &str) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(uri).await?;
        options.server_api = Some(stable_api());
        let client = Client::with_options(options)?;
        let db = client.database(database_name);
        let store = Self { client, db };

        store.ping().await?;
        info!("Pinged deployment; connected to database {}", database_name);

        Ok(store)
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<bson::Document> {
        self.db.collection(collection.name())
    }
}

/// Pin the Stable API v1, rejecting commands outside it and deprecated ones
fn stable_api() -> ServerApi {
    ServerApi::builder()
        .version(ServerApiVersion::V1)
        .strict(true)
        .deprecation_errors(true)
        .build()
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_many(&self, collection: Collection, query: FindQuery) -> StoreResult<Vec<Document>> {
        let mut filter = bson::Document::new();
        if let Some((field, value)) = &query.filter {
            filter.insert(field.as_str(), value.as_str());
        }
        let options = FindOptions::builder()
            .skip(query.skip)
            .limit(query.limit.map(|l| l as i64))
            .build();

        let cursor = self.collection(collection).find(filter, options).await?;
        let docs: Vec<bson::Document> = cursor.try_collect().await?;

        Ok(to_json_documents(docs))
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: DocumentId,
        projection: Projection,
    ) -> StoreResult<Option<Document>> {
        let mut fields = bson::Document::new();
        for field in projection.0 {
            fields.insert(*field, 1);
        }
        let options = FindOneOptions::builder().projection(fields).build();

        let found = self
            .collection(collection)
            .find_one(doc! { "_id": id.object_id() }, options)
            .await?;

        Ok(found.map(to_json_document))
    }

    async fn estimated_count(&self, collection: Collection) -> StoreResult<u64> {
        Ok(self.collection(collection).estimated_document_count(None).await?)
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> StoreResult<InsertOneResult> {
        let doc = to_bson_document(&doc)?;
        let result = self.collection(collection).insert_one(doc, None).await?;

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id_to_string(result.inserted_id),
        })
    }

    async fn upsert_fields(
        &self,
        collection: Collection,
        id: DocumentId,
        fields: Document,
    ) -> StoreResult<UpdateResult> {
        let set = to_bson_document(&fields)?;
        let options = UpdateOptions::builder().upsert(true).build();

        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id.object_id() }, doc! { "$set": set }, options)
            .await?;

        let upserted_id = result.upserted_id.map(id_to_string);
        Ok(UpdateResult {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(upserted_id.is_some()),
            upserted_id,
        })
    }

    async fn delete_by_id(&self, collection: Collection, id: DocumentId) -> StoreResult<DeleteResult> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": id.object_id() }, None)
            .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        info!("Closed database client");
    }
}
