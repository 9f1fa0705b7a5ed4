//! Schema trait and the set of known record kinds

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::{validate_fields, Document, Field, FieldError, ValidationErrors};

/// Every record kind the site knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    CongregationStats,
    GalleryImage,
    ContactMessage,
    User,
    Product,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 5] = [
        Self::CongregationStats,
        Self::GalleryImage,
        Self::ContactMessage,
        Self::User,
        Self::Product,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CongregationStats => "congregation_stats",
            Self::GalleryImage => "gallery_image",
            Self::ContactMessage => "contact_message",
            Self::User => "user",
            Self::Product => "product",
        }
    }

    /// Collection used when no override is configured
    pub fn default_collection(&self) -> &'static str {
        match self {
            Self::CongregationStats => "congregationstats",
            Self::GalleryImage => "galleryimage",
            Self::ContactMessage => "contactmessage",
            Self::User => "user",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized || kind.default_collection() == normalized)
            .ok_or_else(|| format!("Unknown schema: {}", s))
    }
}

/// A record type with a declared field table.
///
/// Construction from a loose document always goes through validation, so a
/// value of a `Schema` type has passed every field rule.
pub trait Schema: Serialize + DeserializeOwned + Send + Sync {
    const KIND: SchemaKind;
    const FIELDS: &'static [Field];

    /// Validate a loosely-typed document and build the record.
    fn from_document(doc: &Document) -> Result<Self, ValidationErrors> {
        let normalized = validate_fields(Self::FIELDS, doc)?;
        serde_json::from_value(Value::Object(normalized)).map_err(|e| {
            ValidationErrors::new(vec![FieldError::new(
                "model_type",
                Self::KIND.as_str(),
                e.to_string(),
                Value::Object(doc.clone()),
            )])
        })
    }

    /// Validate a JSON value, rejecting anything that is not an object.
    fn from_value(value: &Value) -> Result<Self, ValidationErrors> {
        match value {
            Value::Object(doc) => Self::from_document(doc),
            other => Err(ValidationErrors::not_an_object(other.clone())),
        }
    }

    /// Re-run validation on a record built in code.
    fn validated(self) -> Result<Self, ValidationErrors> {
        let value = serde_json::to_value(&self).map_err(|e| {
            ValidationErrors::new(vec![FieldError::new(
                "model_type",
                Self::KIND.as_str(),
                e.to_string(),
                Value::Null,
            )])
        })?;
        Self::from_value(&value)
    }
}
