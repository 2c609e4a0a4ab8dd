use crate::collection::{Document, FindOptions, UpdateOptions, WriteResult};
use crate::common::{SortOrder, Value, DOC_ID};
use crate::config::Configuration;
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::filter::{field, Filter};
use crate::policy::SerializationPolicy;
use crate::repository::entity_mapper::EntityMapper;
use crate::repository::{
    Entity, IdType, IdentifierAccessor, ObjectCursor, RepositoryFactory, SearchOptions,
    SearchResult,
};
use crate::store::{StoreClient, StoreCollection, StoreDatabase};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Typed CRUD and search over the collection that stores `T`.
///
/// A repository is a cheap handle: cloning it shares the same client and
/// collection, and it can be sent across threads.
///
/// # Creating a repository
///
/// ```rust,ignore
/// use docrepo::repository::DocumentRepository;
///
/// let repository = DocumentRepository::<CarModel>::connect("memory://", "garage")?;
/// let id = repository.create(&car)?;
/// let found = repository.get(&id.to_string())?;
/// ```
///
/// Filters, sort fields and partial updates use declared field names; the
/// repository translates them per the factory's [SerializationPolicy], and the
/// identifier field always maps to `_id`.
pub struct DocumentRepository<T: Entity> {
    inner: Arc<DocumentRepositoryInner<T>>,
}

impl<T: Entity> Clone for DocumentRepository<T> {
    fn clone(&self) -> Self {
        DocumentRepository {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Entity> Debug for DocumentRepository<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRepository")
            .field("database", &self.inner.database.name())
            .field("collection", &self.inner.collection.name())
            .field("policy", self.inner.mapper.policy())
            .finish()
    }
}

struct DocumentRepositoryInner<T: Entity> {
    configuration: Configuration,
    client: StoreClient,
    database: StoreDatabase,
    collection: StoreCollection,
    mapper: Arc<EntityMapper<T>>,
}

impl<T: Entity> DocumentRepository<T> {
    pub(crate) fn new(
        configuration: Configuration,
        client: StoreClient,
        database: StoreDatabase,
        collection: StoreCollection,
        policy: SerializationPolicy,
    ) -> Self {
        DocumentRepository {
            inner: Arc::new(DocumentRepositoryInner {
                configuration,
                client,
                database,
                collection,
                mapper: Arc::new(EntityMapper::new(policy)),
            }),
        }
    }

    /// Connects with the default policy and binds to `T`'s collection.
    pub fn connect(connection_string: &str, database: &str) -> DocRepoResult<Self> {
        RepositoryFactory::new(
            Configuration::connection_string(connection_string, database),
            SerializationPolicy::default(),
        )?
        .repository::<T>()
    }

    /// Binds to `T`'s collection through an existing client, with the default
    /// policy.
    pub fn with_client(client: StoreClient, database: &str) -> DocRepoResult<Self> {
        RepositoryFactory::new(
            Configuration::client(client, database),
            SerializationPolicy::default(),
        )?
        .repository::<T>()
    }

    /// Inserts the entity and returns its stored identifier, assigned by the
    /// backend when the entity's identifier is empty.
    pub fn create(&self, entity: &T) -> DocRepoResult<Value> {
        let document = self.inner.mapper.to_document(entity)?;
        log::debug!("Inserting document into '{}'", self.collection_name());

        let result = self.inner.collection.insert_one(document)?;
        result.into_inserted_ids().into_iter().next().ok_or_else(|| {
            log::error!("Backend returned no identifier for the inserted document");
            DocRepoError::new(
                "Backend returned no identifier for the inserted document",
                ErrorKind::BackendError,
            )
        })
    }

    /// Inserts the entities in order and returns their stored identifiers.
    ///
    /// The insert is not atomic: when one document fails, the documents before
    /// it may stay inserted.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] for an empty slice.
    pub fn create_many(&self, entities: &[T]) -> DocRepoResult<Vec<Value>> {
        if entities.is_empty() {
            log::error!("Nothing to insert, entity list is empty");
            return Err(DocRepoError::new(
                "Nothing to insert, entity list is empty",
                ErrorKind::InvalidArgument,
            ));
        }

        let documents = self.inner.mapper.to_documents(entities)?;
        log::debug!(
            "Inserting {} documents into '{}'",
            documents.len(),
            self.collection_name()
        );
        let result = self.inner.collection.insert_many(documents)?;
        Ok(result.into_inserted_ids())
    }

    /// Sets the fields of `update` on every document matching the filter, and
    /// leaves other fields untouched. `None` matches every document.
    ///
    /// Returns whether the backend acknowledged the write.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] for an empty update.
    pub fn update_by_query(&self, filter: Option<Filter>, update: &Document) -> DocRepoResult<bool> {
        if update.is_empty() {
            log::error!("Update document cannot be empty");
            return Err(DocRepoError::new(
                "Update document cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }

        let filter = self.stored_filter(filter);
        let update = self.inner.mapper.stored_update(update);
        log::debug!("Updating '{}' where {}", self.collection_name(), filter);

        let result = self.inner.collection.update_many(&filter, update)?;
        Ok(result.acknowledged())
    }

    /// Deletes the document with the given identifier.
    ///
    /// Returns whether the backend acknowledged the delete, also when no
    /// document had that identifier.
    ///
    /// # Errors
    ///
    /// - [ErrorKind::InvalidArgument] for a blank identifier.
    /// - [ErrorKind::InvalidId] if the identifier does not parse as `T::Id`.
    pub fn delete(&self, id: &str) -> DocRepoResult<bool> {
        let filter = self.id_filter(id)?;
        log::debug!("Deleting from '{}' where {}", self.collection_name(), filter);

        let result = self.inner.collection.delete_one(&filter)?;
        Ok(result.acknowledged())
    }

    /// Deletes every document matching the filter. `None` deletes the whole
    /// collection.
    pub fn delete_by_query(&self, filter: Option<Filter>) -> DocRepoResult<bool> {
        if filter.as_ref().map_or(true, Filter::is_match_all) {
            log::warn!(
                "Deleting every document of '{}', no filter given",
                self.collection_name()
            );
        }

        let filter = self.stored_filter(filter);
        let result = self.inner.collection.delete_many(&filter)?;
        log::debug!(
            "Deleted {} documents from '{}'",
            result.deleted_count(),
            self.collection_name()
        );
        Ok(result.acknowledged())
    }

    /// Finds the entity with the given identifier.
    ///
    /// # Errors
    ///
    /// Same identifier checks as [Self::delete].
    pub fn get(&self, id: &str) -> DocRepoResult<Option<T>> {
        let filter = self.id_filter(id)?;
        let mut cursor = self
            .inner
            .collection
            .find(&filter, &FindOptions::new().limit(1))?;

        match cursor.next() {
            Some(document) => Ok(Some(self.inner.mapper.to_entity(document?)?)),
            None => Ok(None),
        }
    }

    /// Every stored entity, in the backend's natural order.
    pub fn get_all(&self) -> DocRepoResult<Vec<T>> {
        let cursor = self.inner.collection.find(&Filter::All, &FindOptions::new())?;
        ObjectCursor::new(cursor, self.inner.mapper.clone()).to_vec()
    }

    /// One page of entities matching the filter plus the total match count.
    ///
    /// The backend sorts, then skips `page_number * page_size` documents, then
    /// takes `page_size`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] for a zero page size or an offset beyond
    /// 64 bits.
    pub fn search(
        &self,
        filter: Option<Filter>,
        options: &SearchOptions,
    ) -> DocRepoResult<SearchResult<T>> {
        let skip = options.skip()?;
        let filter = self.stored_filter(filter);

        let mut find_options = FindOptions::new().skip(skip).limit(options.page_size());
        if let Some(sort_field) = options.sort_field_name() {
            find_options = find_options.sort_by(
                &self.inner.mapper.stored_field(sort_field),
                SortOrder::from(options.sort_mode()),
            );
        }
        log::debug!(
            "Searching '{}' where {} with {:?}",
            self.collection_name(),
            filter,
            find_options
        );

        let cursor = self.inner.collection.find(&filter, &find_options)?;
        let count = self.inner.collection.count(&filter)?;
        Ok(SearchResult::new(
            count,
            ObjectCursor::new(cursor, self.inner.mapper.clone()),
        ))
    }

    /// Number of documents matching the filter. `None` counts everything.
    pub fn count(&self, filter: Option<Filter>) -> DocRepoResult<u64> {
        let filter = self.stored_filter(filter);
        self.inner.collection.count(&filter)
    }

    pub fn collection_name(&self) -> String {
        self.inner.collection.name()
    }

    pub fn database_name(&self) -> String {
        self.inner.database.name()
    }

    pub fn configuration(&self) -> &Configuration {
        &self.inner.configuration
    }

    pub fn policy(&self) -> &SerializationPolicy {
        self.inner.mapper.policy()
    }

    /// The client this repository talks through.
    pub fn client(&self) -> &StoreClient {
        &self.inner.client
    }

    fn stored_filter(&self, filter: Option<Filter>) -> Filter {
        let filter = filter.unwrap_or_default();
        if filter.contains_raw() {
            log::warn!(
                "Raw filter {} on '{}' is passed to the backend untranslated",
                filter,
                self.collection_name()
            );
        }
        self.inner.mapper.stored_filter(&filter)
    }

    fn id_filter(&self, id: &str) -> DocRepoResult<Filter> {
        if id.trim().is_empty() {
            log::error!("Identifier cannot be empty");
            return Err(DocRepoError::new(
                "Identifier cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }

        let id = T::Id::parse_id(id)?;
        Ok(field(DOC_ID).eq(self.inner.mapper.stored_id(id)))
    }
}

impl<T: IdentifierAccessor> DocumentRepository<T> {
    /// Replaces the stored document with the entity's identifier.
    ///
    /// Returns `true` when the backend acknowledged the write and a document
    /// matched; updating an identifier that is not stored returns `false`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidOperation] if the type has no identifier field or
    /// the entity's identifier is empty.
    pub fn update(&self, entity: &T) -> DocRepoResult<bool> {
        let result = self.replace(entity, &UpdateOptions::new(false))?;
        Ok(result.acknowledged() && result.matched_count() > 0)
    }

    /// Replaces the stored document with the entity's identifier, inserting it
    /// when absent. Returns whether the backend acknowledged the write.
    ///
    /// # Errors
    ///
    /// Same as [Self::update].
    pub fn upsert(&self, entity: &T) -> DocRepoResult<bool> {
        let result = self.replace(entity, &UpdateOptions::new(true))?;
        Ok(result.acknowledged())
    }

    fn replace(&self, entity: &T, options: &UpdateOptions) -> DocRepoResult<WriteResult> {
        let identifier = entity.resolve_identifier()?;
        if identifier.value().is_null() {
            log::error!(
                "Identifier field '{}' of '{}' has no value",
                identifier.field_name(),
                T::entity_name()
            );
            return Err(DocRepoError::new(
                &format!(
                    "Identifier field '{}' has no value to match",
                    identifier.field_name()
                ),
                ErrorKind::InvalidOperation,
            ));
        }

        let id = self.inner.mapper.stored_id(identifier.into_value());
        let filter = field(DOC_ID).eq(id);
        let document = self.inner.mapper.to_document(entity)?;
        log::debug!("Replacing in '{}' where {}", self.collection_name(), filter);

        self.inner.collection.replace_one(&filter, document, options)
    }
}
