//! Scan history records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{StoredDocument, WriteFields};
use crate::error::{Error, InvalidInputError};
use crate::types::{CollectionPath, DocumentId, UserId};

/// Field holding the image URL.
pub const FIELD_IMAGE: &str = "image";
/// Field holding the English classification text.
pub const FIELD_RESPONSE: &str = "response";
/// Field holding the Hindi classification text.
pub const FIELD_RESPONSE_HINDI: &str = "responseHindi";
/// Server-assigned creation time; the only sort key.
pub const FIELD_CREATED_AT: &str = "createdAt";

/// Which per-user collection history records live in.
///
/// Both names hold the same record shape; `history1` entries simply never
/// carry a Hindi response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryCollection {
    #[default]
    History,
    History1,
}

impl HistoryCollection {
    /// Collection name under `users/{uid}`.
    pub fn name(self) -> &'static str {
        match self {
            HistoryCollection::History => "history",
            HistoryCollection::History1 => "history1",
        }
    }

    /// The collection path for `user`.
    pub fn path_for(self, user: &UserId) -> Result<CollectionPath, Error> {
        CollectionPath::user_scoped(user, self.name())
    }
}

impl fmt::Display for HistoryCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HistoryCollection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "history" => Ok(HistoryCollection::History),
            "history1" => Ok(HistoryCollection::History1),
            other => Err(Error::InvalidInput(InvalidInputError::Other {
                message: format!("unknown history collection '{other}'"),
            })),
        }
    }
}

/// One completed scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: DocumentId,
    pub image: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_hindi: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Decode a stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if `image`, `response` or `createdAt` is missing.
    pub fn from_document(doc: &StoredDocument) -> Result<Self, Error> {
        Ok(Self {
            id: doc.id(),
            image: doc.fields.require_str(FIELD_IMAGE)?.to_string(),
            response: doc.fields.require_str(FIELD_RESPONSE)?.to_string(),
            response_hindi: doc.fields.optional_str(FIELD_RESPONSE_HINDI).map(str::to_string),
            created_at: doc.fields.require_timestamp(FIELD_CREATED_AT)?,
        })
    }

    /// The field writes that create a new record.
    pub fn new_fields(image_url: &str, response: &str, response_hindi: Option<&str>) -> WriteFields {
        let mut fields = WriteFields::new()
            .set(FIELD_IMAGE, image_url)
            .set(FIELD_RESPONSE, response);
        if let Some(hindi) = response_hindi {
            fields = fields.set(FIELD_RESPONSE_HINDI, hindi);
        }
        fields.server_timestamp(FIELD_CREATED_AT)
    }

    /// Text to read aloud in Hindi, falling back to the English response.
    pub fn hindi_or_english(&self) -> &str {
        self.response_hindi.as_deref().unwrap_or(&self.response)
    }
}
