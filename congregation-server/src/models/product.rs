//! Product record template. Not exposed over HTTP.

use serde::{Deserialize, Serialize};

use super::schema::{Schema, SchemaKind};
use super::validation::{Fallback, Field, Rule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub description: Option<String>,
    /// Price in dollars
    pub price: f64,
    pub category: String,
    pub in_stock: bool,
}

impl Schema for Product {
    const KIND: SchemaKind = SchemaKind::Product;
    const FIELDS: &'static [Field] = &[
        Field::required("title", Rule::STR),
        Field::optional("description", Rule::STR),
        Field::required("price", Rule::Number { ge: Some(0.0) }),
        Field::required("category", Rule::STR),
        Field::with_default("in_stock", Rule::Bool, Fallback::Bool(true)),
    ];
}
