//! Contact messages submitted from the website

use serde::{Deserialize, Serialize};

use super::schema::{Schema, SchemaKind};
use super::validation::{Field, Rule};

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_SUBJECT_LEN: usize = 2;
pub const MIN_MESSAGE_LEN: usize = 5;
pub const MAX_MESSAGE_LEN: usize = 2000;

/// A message from the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl Schema for ContactMessage {
    const KIND: SchemaKind = SchemaKind::ContactMessage;
    const FIELDS: &'static [Field] = &[
        Field::required(
            "name",
            Rule::Str {
                min: MIN_NAME_LEN,
                max: None,
            },
        ),
        Field::required("email", Rule::Email),
        Field::required(
            "subject",
            Rule::Str {
                min: MIN_SUBJECT_LEN,
                max: None,
            },
        ),
        Field::required(
            "message",
            Rule::Str {
                min: MIN_MESSAGE_LEN,
                max: Some(MAX_MESSAGE_LEN),
            },
        ),
    ];
}
