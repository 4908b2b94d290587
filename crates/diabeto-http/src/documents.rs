//! Firestore REST document store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument, warn};

use diabeto_core::document::{Direction, Document, FieldWrite, OrderBy, StoredDocument, WriteFields, auto_id};
use diabeto_core::error::{Error, InvalidInputError};
use diabeto_core::traits::{AuthSession, DocumentStore};
use diabeto_core::types::{CollectionPath, DocumentId, DocumentPath};
use diabeto_core::{ApiKey, Result};

use crate::client::RestClient;

/// A document as returned by the REST API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteDocument {
    name: String,
    #[serde(default)]
    fields: Document,
    #[serde(default)]
    create_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    document: Option<RemoteDocument>,
}

#[derive(Debug, Serialize)]
struct CommitRequest {
    writes: Vec<Value>,
}

/// Quote a field name for use in a field path if it is not a plain
/// identifier.
fn field_path(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

/// Document store on the hosted database, acting as one session or
/// anonymously.
#[derive(Debug, Clone)]
pub struct RestDocuments {
    client: RestClient,
    project_id: String,
    api_key: ApiKey,
    session: Option<AuthSession>,
}

impl RestDocuments {
    pub fn new(client: RestClient, project_id: impl Into<String>, api_key: ApiKey, session: Option<AuthSession>) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            api_key,
            session,
        }
    }

    /// `projects/{id}/databases/(default)/documents`
    fn root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn name(&self, path: &DocumentPath) -> String {
        format!("{}/{}", self.root(), path)
    }

    fn bearer(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id_token.as_str())
    }

    fn key(&self) -> [(&str, &str); 1] {
        [("key", self.api_key.as_str())]
    }

    /// Turn a full resource name back into a document path.
    fn path_of(&self, name: &str) -> Result<DocumentPath> {
        let prefix = format!("{}/", self.root());
        let relative = name.strip_prefix(&prefix).ok_or_else(|| {
            Error::InvalidInput(InvalidInputError::DocumentPath {
                value: name.to_string(),
                reason: "outside this database".to_string(),
            })
        })?;
        DocumentPath::new(relative)
    }

    fn stored(&self, remote: RemoteDocument) -> Result<StoredDocument> {
        Ok(StoredDocument {
            path: self.path_of(&remote.name)?,
            fields: remote.fields,
            create_time: remote.create_time,
        })
    }

    /// Build one commit write. Value fields go in `update`, server values
    /// and increments in `updateTransforms`.
    fn write(&self, path: &DocumentPath, fields: &WriteFields, merge: bool) -> Result<Value> {
        let mut values = Map::new();
        let mut transforms = Vec::new();

        for (field, write) in fields.iter() {
            match write {
                FieldWrite::Value(value) => {
                    let encoded = serde_json::to_value(value).map_err(|e| {
                        Error::InvalidInput(InvalidInputError::Field {
                            field: field.clone(),
                            reason: e.to_string(),
                        })
                    })?;
                    values.insert(field.clone(), encoded);
                }
                FieldWrite::ServerTimestamp => transforms.push(json!({
                    "fieldPath": field_path(field),
                    "setToServerValue": "REQUEST_TIME",
                })),
                FieldWrite::Increment(by) => transforms.push(json!({
                    "fieldPath": field_path(field),
                    "increment": { "integerValue": by.to_string() },
                })),
            }
        }

        let mut write = Map::new();
        if merge {
            let mask: Vec<String> = values.keys().map(|k| field_path(k)).collect();
            write.insert("updateMask".to_string(), json!({ "fieldPaths": mask }));
        } else {
            write.insert("currentDocument".to_string(), json!({ "exists": false }));
        }
        write.insert(
            "update".to_string(),
            json!({ "name": self.name(path), "fields": values }),
        );
        if !transforms.is_empty() {
            write.insert("updateTransforms".to_string(), Value::Array(transforms));
        }
        Ok(Value::Object(write))
    }

    async fn commit(&self, write: Value) -> Result<()> {
        let path = format!("v1/{}:commit", self.root());
        let _: Value = self
            .client
            .post_json(&path, &self.key(), &CommitRequest { writes: vec![write] }, self.bearer())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RestDocuments {
    #[instrument(skip(self, fields), fields(%collection))]
    async fn add(&self, collection: &CollectionPath, fields: &WriteFields) -> Result<DocumentId> {
        let id = auto_id();
        let path = collection.doc(&id);
        self.commit(self.write(&path, fields, false)?).await?;
        debug!(%path, "document added");
        Ok(id)
    }

    #[instrument(skip(self), fields(%collection))]
    async fn list(
        &self,
        collection: &CollectionPath,
        order: &OrderBy,
    ) -> Result<Vec<StoredDocument>> {
        let parent = match collection.parent() {
            Some(doc) => self.name(&doc),
            None => self.root(),
        };
        let direction = match order.direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection.collection_id() }],
                "orderBy": [{
                    "field": { "fieldPath": field_path(&order.field) },
                    "direction": direction,
                }],
            }
        });

        let results: Vec<QueryResult> = self
            .client
            .post_json(&format!("v1/{parent}:runQuery"), &self.key(), &body, self.bearer())
            .await?;

        let mut docs = Vec::with_capacity(results.len());
        for remote in results.into_iter().filter_map(|r| r.document) {
            match self.stored(remote) {
                Ok(doc) => docs.push(doc),
                Err(err) => warn!(error = %err, "skipping unreadable query result"),
            }
        }
        debug!(count = docs.len(), "query returned");
        Ok(docs)
    }

    #[instrument(skip(self), fields(%path))]
    async fn get(&self, path: &DocumentPath) -> Result<Option<StoredDocument>> {
        let result: Result<RemoteDocument> = self
            .client
            .get_json(&format!("v1/{}", self.name(path)), &self.key(), self.bearer())
            .await;
        match result {
            Ok(remote) => Ok(Some(self.stored(remote)?)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self), fields(%path))]
    async fn delete(&self, path: &DocumentPath) -> Result<()> {
        self.client
            .delete(&format!("v1/{}", self.name(path)), &self.key(), self.bearer())
            .await
    }

    #[instrument(skip(self, fields), fields(%path))]
    async fn merge(&self, path: &DocumentPath, fields: &WriteFields) -> Result<()> {
        self.commit(self.write(path, fields, true)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diabeto_core::types::ServiceUrl;

    fn store() -> RestDocuments {
        let client = RestClient::new(ServiceUrl::new("https://firestore.googleapis.com").unwrap()).unwrap();
        RestDocuments::new(client, "diabeto", ApiKey::new("key"), None)
    }

    #[test]
    fn quotes_unusual_field_names() {
        assert_eq!(field_path("createdAt"), "createdAt");
        assert_eq!(field_path("_id"), "_id");
        assert_eq!(field_path("2fa"), "`2fa`");
        assert_eq!(field_path("a.b"), "`a.b`");
    }

    #[test]
    fn merge_write_masks_values_and_transforms_the_rest() {
        let store = store();
        let path = DocumentPath::new("daily_stats/2025-03-01").unwrap();
        let fields = WriteFields::new()
            .set("date", "2025-03-01")
            .increment("totalVisits", 1)
            .server_timestamp("lastUpdated");

        let write = store.write(&path, &fields, true).unwrap();

        assert_eq!(write["updateMask"]["fieldPaths"], json!(["date"]));
        assert_eq!(
            write["update"]["name"],
            "projects/diabeto/databases/(default)/documents/daily_stats/2025-03-01"
        );
        assert_eq!(write["update"]["fields"]["date"], json!({ "stringValue": "2025-03-01" }));
        let transforms = write["updateTransforms"].as_array().unwrap();
        assert!(transforms.contains(&json!({
            "fieldPath": "totalVisits",
            "increment": { "integerValue": "1" }
        })));
        assert!(transforms.contains(&json!({
            "fieldPath": "lastUpdated",
            "setToServerValue": "REQUEST_TIME"
        })));
        assert!(write.get("currentDocument").is_none());
    }

    #[test]
    fn add_write_requires_absent_document() {
        let store = store();
        let path = DocumentPath::new("users/u1/history/abc").unwrap();
        let write = store
            .write(&path, &WriteFields::new().set("response", "ok"), false)
            .unwrap();
        assert_eq!(write["currentDocument"], json!({ "exists": false }));
        assert!(write.get("updateMask").is_none());
        assert!(write.get("updateTransforms").is_none());
    }

    #[test]
    fn names_round_trip() {
        let store = store();
        let path = DocumentPath::new("users/u1/history/abc").unwrap();
        assert_eq!(store.path_of(&store.name(&path)).unwrap(), path);
        assert!(store.path_of("projects/other/databases/(default)/documents/a/b").is_err());
    }
}
