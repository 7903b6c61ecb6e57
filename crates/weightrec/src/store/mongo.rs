//! MongoDB record store.
//!
//! Uses the driver's blocking API. One collection of entry documents; the
//! server assigns nothing, the driver generates `_id` on insert.

use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::sync::{Client, Collection};
use tracing::{debug, warn};

use crate::entry::{EntryId, NewEntry, WeightEntry};
use crate::error::{Error, Result};

use super::document::{self, DATE_FIELD};
use super::{redact_uri, RecordStore};

/// Server error code for a document that failed collection validation.
const DOCUMENT_VALIDATION_FAILURE: i32 = 121;

/// MongoDB-backed record store.
#[derive(Debug)]
pub struct MongoStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Build a client for `uri` and select the entry collection.
    ///
    /// The client connects lazily; use [`RecordStore::ping`] to check that
    /// the server is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the connection string cannot be parsed
    /// or the client cannot be created.
    pub fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let target = redact_uri(uri);
        let mut options = ClientOptions::parse(uri)
            .run()
            .map_err(|e| Error::connection(target.clone(), e.to_string()))?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.app_name.get_or_insert_with(|| "weightrec".to_string());

        let client =
            Client::with_options(options).map_err(|e| Error::connection(target, e.to_string()))?;
        let collection = client.database(database).collection::<Document>(collection);
        debug!(
            database,
            collection = collection.name(),
            "selected entry collection"
        );

        Ok(Self { client, collection })
    }
}

impl RecordStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .run()?;
        Ok(())
    }

    fn insert(&self, entry: &NewEntry) -> Result<EntryId> {
        let result = self
            .collection
            .insert_one(document::to_document(entry)?)
            .run()
            .map_err(classify)?;

        result
            .inserted_id
            .as_object_id()
            .map(EntryId::from)
            .ok_or_else(|| {
                Error::invalid_document(format!(
                    "store assigned a non-ObjectId _id: {}",
                    result.inserted_id
                ))
            })
    }

    fn fetch_all(&self) -> Result<Vec<WeightEntry>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { DATE_FIELD: 1 })
            .run()?;

        let mut entries = Vec::new();
        for stored in cursor {
            let stored = stored?;
            let entry = document::from_document(&stored).map_err(|e| {
                warn!(id = ?stored.get("_id"), "unreadable entry document: {e}");
                e
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    fn delete(&self, id: &EntryId) -> Result<u64> {
        let result = self
            .collection
            .delete_one(document::id_filter(id))
            .run()?;
        Ok(result.deleted_count)
    }

    fn update_weight(&self, id: &EntryId, weight: f64) -> Result<u64> {
        let result = self
            .collection
            .update_one(document::id_filter(id), document::set_weight(weight))
            .run()
            .map_err(classify)?;
        Ok(result.modified_count)
    }
}

/// Map schema-validation write failures to validation errors.
fn classify(err: mongodb::error::Error) -> Error {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DOCUMENT_VALIDATION_FAILURE =>
        {
            Error::invalid_document(write_error.message.clone())
        }
        _ => Error::Mongo(err),
    }
}
