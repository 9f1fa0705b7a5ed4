//! Congregation statistics shown on the landing page

use serde::{Deserialize, Serialize};

use super::schema::{Schema, SchemaKind};
use super::validation::{Field, Rule};

const AGE: Rule = Rule::Int {
    ge: Some(0),
    le: Some(120),
};

const COUNT: Rule = Rule::Int {
    ge: Some(0),
    le: None,
};

/// One statistics entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongregationStats {
    pub publishers: i64,
    pub pioneers: i64,
    pub youngest_publisher: String,
    pub youngest_age: Option<i64>,
    pub oldest_publisher: String,
    pub oldest_age: Option<i64>,
    /// Who entered this entry
    pub updated_by: Option<String>,
}

impl Schema for CongregationStats {
    const KIND: SchemaKind = SchemaKind::CongregationStats;
    const FIELDS: &'static [Field] = &[
        Field::required("publishers", COUNT),
        Field::required("pioneers", COUNT),
        Field::required("youngest_publisher", Rule::STR),
        Field::optional("youngest_age", AGE),
        Field::required("oldest_publisher", Rule::STR),
        Field::optional("oldest_age", AGE),
        Field::optional("updated_by", Rule::STR),
    ];
}
