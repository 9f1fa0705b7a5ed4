//! Field-level validation
//!
//! Schemas declare their fields as a static table of [`Field`]s. Validation
//! walks the table against a loosely-typed document, collects every failing
//! field, and produces a normalized document (coerced values, defaults filled,
//! unknown keys dropped) that deserializes straight into the typed record.
//!
//! Diagnostics use the `{type, loc, msg, input, ctx}` shape that website
//! clients already parse.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use url::Url;

/// A document as it travels between the HTTP layer and the store.
pub type Document = Map<String, Value>;

/// Longest URL accepted by [`Rule::HttpUrl`].
const MAX_URL_LEN: usize = 2083;

/// Dot-atom local part.
static LOCAL_PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("invalid local part regex")
});

/// Dotted hostname of letters, digits and inner hyphens.
static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$")
        .expect("invalid domain regex")
});

/// Reserved names that can never receive mail.
const SPECIAL_USE_DOMAINS: &[&str] = &["arpa", "invalid", "local", "localhost", "onion", "test"];

/// Constraint applied to a single field value
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// String, length counted in characters
    Str { min: usize, max: Option<usize> },
    /// Integer with optional inclusive bounds
    Int { ge: Option<i64>, le: Option<i64> },
    /// Floating point number with optional lower bound
    Number { ge: Option<f64> },
    Bool,
    /// Syntactically valid email address
    Email,
    /// Absolute http(s) URL
    HttpUrl,
}

impl Rule {
    /// Unconstrained string
    pub const STR: Rule = Rule::Str { min: 0, max: None };
}

/// What happens when a field is absent
#[derive(Debug, Clone, Copy)]
pub enum Presence {
    Required,
    /// Absent or null becomes null
    Optional,
    /// Absent becomes the given value
    Default(Fallback),
}

/// Default value for [`Presence::Default`]
#[derive(Debug, Clone, Copy)]
pub enum Fallback {
    Int(i64),
    Bool(bool),
}

impl Fallback {
    fn to_value(self) -> Value {
        match self {
            Self::Int(n) => json!(n),
            Self::Bool(b) => json!(b),
        }
    }
}

/// One entry of a schema's field table
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub rule: Rule,
    pub presence: Presence,
}

impl Field {
    pub const fn required(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            presence: Presence::Optional,
        }
    }

    pub const fn with_default(name: &'static str, rule: Rule, fallback: Fallback) -> Self {
        Self {
            name,
            rule,
            presence: Presence::Default(fallback),
        }
    }
}

/// A single failed check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub loc: Vec<Value>,
    pub msg: String,
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Value>,
}

impl FieldError {
    pub fn new(kind: &'static str, field: &str, msg: impl Into<String>, input: Value) -> Self {
        Self {
            kind,
            loc: vec![json!(field)],
            msg: msg.into(),
            input,
            ctx: None,
        }
    }

    fn with_ctx(mut self, ctx: Value) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// Dotted location, e.g. `body.email`
    pub fn path(&self) -> String {
        self.loc
            .iter()
            .map(|seg| match seg {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// All failures found while validating one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// The input was not an object at all
    pub fn not_an_object(input: Value) -> Self {
        Self::new(vec![FieldError {
            kind: "model_attributes_type",
            loc: Vec::new(),
            msg: "Input should be a valid dictionary or object to extract fields from".into(),
            input,
            ctx: None,
        }])
    }

    /// No input was supplied
    pub fn missing_input() -> Self {
        Self::new(vec![FieldError {
            kind: "missing",
            loc: Vec::new(),
            msg: "Field required".into(),
            input: Value::Null,
            ctx: None,
        }])
    }

    /// Prefix every location, e.g. with `"body"` for request payloads
    pub fn located_at(mut self, prefix: &str) -> Self {
        for error in &mut self.errors {
            error.loc.insert(0, json!(prefix));
        }
        self
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation error{}",
            self.errors.len(),
            if self.errors.len() == 1 { "" } else { "s" }
        )?;
        for error in &self.errors {
            write!(f, "\n{}: {}", error.path(), error.msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate `input` against a field table.
///
/// Returns the normalized document on success. Every field is checked, so the
/// error list names all failing fields, in table order.
pub fn validate_fields(fields: &[Field], input: &Document) -> Result<Document, ValidationErrors> {
    let mut output = Document::new();
    let mut errors = Vec::new();

    for field in fields {
        let value = match (input.get(field.name), field.presence) {
            (None, Presence::Required) => {
                errors.push(FieldError::new(
                    "missing",
                    field.name,
                    "Field required",
                    Value::Object(input.clone()),
                ));
                continue;
            }
            (None, Presence::Default(fallback)) => {
                output.insert(field.name.to_owned(), fallback.to_value());
                continue;
            }
            (None, Presence::Optional) | (Some(Value::Null), Presence::Optional) => {
                output.insert(field.name.to_owned(), Value::Null);
                continue;
            }
            (Some(value), _) => value,
        };

        match check(field, value) {
            Ok(normalized) => {
                output.insert(field.name.to_owned(), normalized);
            }
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(output)
    } else {
        Err(ValidationErrors::new(errors))
    }
}

fn check(field: &Field, value: &Value) -> Result<Value, FieldError> {
    let name = field.name;
    match field.rule {
        Rule::Str { min, max } => {
            let s = expect_str(name, value)?;
            check_len(name, s, min, max)?;
            Ok(json!(s))
        }
        Rule::Int { ge, le } => {
            let n = coerce_int(name, value)?;
            if let Some(ge) = ge {
                if n < ge {
                    return Err(FieldError::new(
                        "greater_than_equal",
                        name,
                        format!("Input should be greater than or equal to {}", ge),
                        value.clone(),
                    )
                    .with_ctx(json!({ "ge": ge })));
                }
            }
            if let Some(le) = le {
                if n > le {
                    return Err(FieldError::new(
                        "less_than_equal",
                        name,
                        format!("Input should be less than or equal to {}", le),
                        value.clone(),
                    )
                    .with_ctx(json!({ "le": le })));
                }
            }
            Ok(json!(n))
        }
        Rule::Number { ge } => {
            let n = coerce_number(name, value)?;
            if let Some(ge) = ge {
                if n < ge {
                    return Err(FieldError::new(
                        "greater_than_equal",
                        name,
                        format!("Input should be greater than or equal to {}", ge),
                        value.clone(),
                    )
                    .with_ctx(json!({ "ge": ge })));
                }
            }
            Ok(json!(n))
        }
        Rule::Bool => coerce_bool(name, value).map(Value::Bool),
        Rule::Email => {
            let s = expect_str(name, value)?;
            normalize_email(s)
                .map(Value::String)
                .map_err(|reason| {
                    FieldError::new(
                        "value_error",
                        name,
                        format!("value is not a valid email address: {}", reason),
                        value.clone(),
                    )
                    .with_ctx(json!({ "reason": reason }))
                })
        }
        Rule::HttpUrl => {
            let s = expect_str(name, value).map_err(|_| {
                FieldError::new("url_type", name, "URL input should be a string or URL", value.clone())
            })?;
            parse_http_url(name, s, value).map(|url| json!(url.as_str()))
        }
    }
}

fn expect_str<'v>(name: &str, value: &'v Value) -> Result<&'v str, FieldError> {
    value.as_str().ok_or_else(|| {
        FieldError::new("string_type", name, "Input should be a valid string", value.clone())
    })
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn check_len(name: &str, s: &str, min: usize, max: Option<usize>) -> Result<(), FieldError> {
    let len = s.chars().count();
    if len < min {
        return Err(FieldError::new(
            "string_too_short",
            name,
            format!("String should have at least {} character{}", min, plural(min)),
            json!(s),
        )
        .with_ctx(json!({ "min_length": min })));
    }
    if let Some(max) = max {
        if len > max {
            return Err(FieldError::new(
                "string_too_long",
                name,
                format!("String should have at most {} character{}", max, plural(max)),
                json!(s),
            )
            .with_ctx(json!({ "max_length": max })));
        }
    }
    Ok(())
}

fn coerce_int(name: &str, value: &Value) -> Result<i64, FieldError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                Some(f) if f.is_finite() && f.fract() != 0.0 => Err(FieldError::new(
                    "int_from_float",
                    name,
                    "Input should be a valid integer, got a number with a fractional part",
                    value.clone(),
                )),
                _ => Err(FieldError::new(
                    "int_parsing_size",
                    name,
                    "Unable to parse input string as an integer, exceeded maximum size",
                    value.clone(),
                )),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            FieldError::new(
                "int_parsing",
                name,
                "Input should be a valid integer, unable to parse string as an integer",
                value.clone(),
            )
        }),
        _ => Err(FieldError::new(
            "int_type",
            name,
            "Input should be a valid integer",
            value.clone(),
        )),
    }
}

fn coerce_number(name: &str, value: &Value) -> Result<f64, FieldError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            FieldError::new("float_type", name, "Input should be a valid number", value.clone())
        }),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            FieldError::new(
                "float_parsing",
                name,
                "Input should be a valid number, unable to parse string as a number",
                value.clone(),
            )
        }),
        _ => Err(FieldError::new(
            "float_type",
            name,
            "Input should be a valid number",
            value.clone(),
        )),
    }
}

fn coerce_bool(name: &str, value: &Value) -> Result<bool, FieldError> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "y" | "t" => Some(true),
            "false" | "0" | "no" | "off" | "n" | "f" => Some(false),
            _ => None,
        },
        _ => None,
    };

    parsed.ok_or_else(|| {
        let (kind, msg) = if value.is_string() {
            ("bool_parsing", "Input should be a valid boolean, unable to interpret input")
        } else {
            ("bool_type", "Input should be a valid boolean")
        };
        FieldError::new(kind, name, msg, value.clone())
    })
}

/// Check an email address and lowercase its domain.
///
/// Reasons follow the wording of the `email-validator` package, which
/// website clients already display.
fn normalize_email(s: &str) -> Result<String, String> {
    let Some((local, domain)) = s.rsplit_once('@') else {
        return Err("An email address must have an @-sign.".into());
    };
    if local.is_empty() {
        return Err("There must be something before the @-sign.".into());
    }
    if domain.is_empty() {
        return Err("There must be something after the @-sign.".into());
    }
    if local.chars().count() > 64 {
        return Err("The email address is too long before the @-sign.".into());
    }
    check_local_part(local)?;

    let domain = domain.to_ascii_lowercase();
    check_domain(&domain)?;
    Ok(format!("{}@{}", local, domain))
}

fn check_local_part(local: &str) -> Result<(), String> {
    if local.starts_with('.') {
        return Err("An email address cannot start with a period.".into());
    }
    if local.ends_with('.') {
        return Err("An email address cannot have a period immediately before the @-sign.".into());
    }
    if local.contains("..") {
        return Err("An email address cannot have two periods in a row.".into());
    }
    if !LOCAL_PART_RE.is_match(local) {
        let mut bad: Vec<char> = local
            .chars()
            .filter(|c| *c != '.' && !LOCAL_PART_RE.is_match(&c.to_string()))
            .collect();
        bad.sort_unstable();
        bad.dedup();
        let listed: Vec<String> = bad.iter().map(|c| format!("'{}'", c)).collect();
        return Err(format!(
            "The email address contains invalid characters before the @-sign: {}.",
            listed.join(", ")
        ));
    }
    Ok(())
}

fn check_domain(domain: &str) -> Result<(), String> {
    if domain.starts_with('.') {
        return Err("An email address cannot have a period immediately after the @-sign.".into());
    }
    if domain.ends_with('.') {
        return Err("An email address cannot end with a period.".into());
    }
    if domain.contains("..") {
        return Err("An email address cannot have two periods in a row.".into());
    }
    if SPECIAL_USE_DOMAINS
        .iter()
        .any(|reserved| domain == *reserved || domain.ends_with(&format!(".{}", reserved)))
    {
        return Err(
            "The part after the @-sign is a special-use or reserved name that cannot be used with email."
                .into(),
        );
    }
    if !domain.contains('.') {
        return Err("The part after the @-sign is not valid. It should have a period.".into());
    }
    if !DOMAIN_RE.is_match(domain) {
        return Err("The part after the @-sign contains invalid characters.".into());
    }
    let tld = domain.rsplit('.').next().unwrap_or_default();
    if tld.chars().all(|c| c.is_ascii_digit()) {
        return Err("The part after the @-sign is not valid. It is not within a valid top-level domain.".into());
    }
    Ok(())
}

fn parse_http_url(name: &str, s: &str, input: &Value) -> Result<Url, FieldError> {
    if s.chars().count() > MAX_URL_LEN {
        return Err(FieldError::new(
            "url_too_long",
            name,
            format!("URL should have at most {} characters", MAX_URL_LEN),
            input.clone(),
        )
        .with_ctx(json!({ "max_length": MAX_URL_LEN })));
    }

    let url = Url::parse(s).map_err(|e| {
        FieldError::new(
            "url_parsing",
            name,
            format!("Input should be a valid URL, {}", e),
            input.clone(),
        )
        .with_ctx(json!({ "error": e.to_string() }))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FieldError::new(
            "url_scheme",
            name,
            "URL scheme should be 'http' or 'https'",
            input.clone(),
        )
        .with_ctx(json!({ "expected_schemes": "'http' or 'https'" })));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(FieldError::new(
            "url_parsing",
            name,
            "Input should be a valid URL, empty host",
            input.clone(),
        )
        .with_ctx(json!({ "error": "empty host" })));
    }

    Ok(url)
}
