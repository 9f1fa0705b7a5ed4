//! User record template. Not exposed over HTTP.

use serde::{Deserialize, Serialize};

use super::schema::{Schema, SchemaKind};
use super::validation::{Fallback, Field, Rule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub address: String,
    pub age: Option<i64>,
    pub is_active: bool,
}

impl Schema for User {
    const KIND: SchemaKind = SchemaKind::User;
    const FIELDS: &'static [Field] = &[
        Field::required("name", Rule::STR),
        Field::required("email", Rule::STR),
        Field::required("address", Rule::STR),
        Field::optional(
            "age",
            Rule::Int {
                ge: Some(0),
                le: Some(120),
            },
        ),
        Field::with_default("is_active", Rule::Bool, Fallback::Bool(true)),
    ];
}
