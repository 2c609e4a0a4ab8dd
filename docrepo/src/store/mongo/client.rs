use super::convert::{
    driver_error, from_bson, from_bson_document, to_bson_document, to_bson_filter, to_bson_sort,
};
use crate::collection::{Document, FindOptions, UpdateOptions, WriteResult};
use crate::errors::DocRepoResult;
use crate::filter::Filter;
use crate::store::{
    DocumentCursor, StoreClient, StoreClientProvider, StoreCollection, StoreCollectionProvider,
    StoreDatabase, StoreDatabaseProvider,
};
use mongodb::bson;
use mongodb::sync::{Client, Collection, Database};

/// MongoDB client. The driver pools connections internally, so one client
/// should be shared by every repository talking to the same deployment.
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
}

impl MongoClient {
    /// Parses the connection string and creates a driver client. The driver
    /// connects lazily; an unreachable server surfaces on the first operation.
    pub fn connect(connection_string: &str) -> DocRepoResult<MongoClient> {
        let client = Client::with_uri_str(connection_string)
            .map_err(|e| driver_error("Failed to create MongoDB client", e))?;
        log::info!("Created MongoDB client");
        Ok(MongoClient { client })
    }

    /// Wraps an already configured driver client.
    pub fn from_driver(client: Client) -> StoreClient {
        StoreClient::new(MongoClient { client })
    }
}

impl StoreClientProvider for MongoClient {
    fn backend_name(&self) -> String {
        "mongodb".to_string()
    }

    fn database(&self, name: &str) -> DocRepoResult<StoreDatabase> {
        Ok(StoreDatabase::new(MongoDatabase {
            database: self.client.database(name),
        }))
    }
}

#[derive(Clone)]
pub struct MongoDatabase {
    database: Database,
}

impl StoreDatabaseProvider for MongoDatabase {
    fn name(&self) -> String {
        self.database.name().to_string()
    }

    fn collection(&self, name: &str) -> DocRepoResult<StoreCollection> {
        Ok(StoreCollection::new(MongoCollection {
            collection: self.database.collection::<bson::Document>(name),
        }))
    }

    fn list_collection_names(&self) -> DocRepoResult<Vec<String>> {
        self.database
            .list_collection_names()
            .run()
            .map_err(|e| driver_error("Failed to list collections", e))
    }

    fn drop_collection(&self, name: &str) -> DocRepoResult<()> {
        self.database
            .collection::<bson::Document>(name)
            .drop()
            .run()
            .map_err(|e| driver_error(&format!("Failed to drop collection '{}'", name), e))
    }
}

#[derive(Clone)]
pub struct MongoCollection {
    collection: Collection<bson::Document>,
}

impl StoreCollectionProvider for MongoCollection {
    fn name(&self) -> String {
        self.collection.name().to_string()
    }

    fn insert_one(&self, document: Document) -> DocRepoResult<WriteResult> {
        let result = self
            .collection
            .insert_one(to_bson_document(&document))
            .run()
            .map_err(|e| driver_error("Failed to insert document", e))?;
        Ok(WriteResult::inserted(vec![from_bson(result.inserted_id)]))
    }

    fn insert_many(&self, documents: Vec<Document>) -> DocRepoResult<WriteResult> {
        let documents: Vec<bson::Document> = documents.iter().map(to_bson_document).collect();
        let result = self
            .collection
            .insert_many(documents)
            .ordered(true)
            .run()
            .map_err(|e| driver_error("Failed to insert documents", e))?;

        let mut ids: Vec<(usize, bson::Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);
        Ok(WriteResult::inserted(
            ids.into_iter().map(|(_, id)| from_bson(id)).collect(),
        ))
    }

    fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        options: &UpdateOptions,
    ) -> DocRepoResult<WriteResult> {
        let result = self
            .collection
            .replace_one(to_bson_filter(filter)?, to_bson_document(&replacement))
            .upsert(options.is_insert_if_absent())
            .run()
            .map_err(|e| driver_error("Failed to replace document", e))?;
        Ok(WriteResult::updated(
            result.matched_count,
            result.modified_count,
            result.upserted_id.map(from_bson),
        ))
    }

    fn update_many(&self, filter: &Filter, update: Document) -> DocRepoResult<WriteResult> {
        let mut modification = bson::Document::new();
        modification.insert("$set", to_bson_document(&update));
        let result = self
            .collection
            .update_many(to_bson_filter(filter)?, modification)
            .run()
            .map_err(|e| driver_error("Failed to update documents", e))?;
        Ok(WriteResult::updated(
            result.matched_count,
            result.modified_count,
            None,
        ))
    }

    fn delete_one(&self, filter: &Filter) -> DocRepoResult<WriteResult> {
        let result = self
            .collection
            .delete_one(to_bson_filter(filter)?)
            .run()
            .map_err(|e| driver_error("Failed to delete document", e))?;
        Ok(WriteResult::deleted(result.deleted_count))
    }

    fn delete_many(&self, filter: &Filter) -> DocRepoResult<WriteResult> {
        let result = self
            .collection
            .delete_many(to_bson_filter(filter)?)
            .run()
            .map_err(|e| driver_error("Failed to delete documents", e))?;
        Ok(WriteResult::deleted(result.deleted_count))
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> DocRepoResult<DocumentCursor> {
        let mut action = self.collection.find(to_bson_filter(filter)?);
        if let Some(sort_by) = options.sorted_fields() {
            if !sort_by.is_empty() {
                action = action.sort(to_bson_sort(sort_by));
            }
        }
        if let Some(skip) = options.skip_count() {
            action = action.skip(skip);
        }
        if let Some(limit) = options.limit_count() {
            action = action.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let cursor = action
            .run()
            .map_err(|e| driver_error("Failed to query documents", e))?;
        Ok(DocumentCursor::new(cursor.map(|item| {
            item.map(from_bson_document)
                .map_err(|e| driver_error("Failed to read query results", e))
        })))
    }

    fn count(&self, filter: &Filter) -> DocRepoResult<u64> {
        self.collection
            .count_documents(to_bson_filter(filter)?)
            .run()
            .map_err(|e| driver_error("Failed to count documents", e))
    }
}
