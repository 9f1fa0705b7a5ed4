//! Custom Axum extractors

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderMap};
use serde_json::{json, Value};

use crate::models::{FieldError, Schema, ValidationErrors};
use super::error::ApiError;

/// Extract a JSON body and validate it against schema `T`.
///
/// The body is decoded as JSON when Content-Type is absent or a JSON type;
/// any other body is handed to the schema as raw text and rejected there.
/// Rejections are 422s listing every failing field under `body`.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Schema,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = json_or_unspecified(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Rejected {
                status: e.status(),
                message: e.body_text(),
            })?;

        let value = parse_body(&bytes, is_json)?;
        let record = T::from_value(&value).map_err(|e| e.located_at("body"))?;
        Ok(Self(record))
    }
}

/// True for a missing Content-Type, `application/json` or `application/*+json`.
fn json_or_unspecified(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    if value.trim().is_empty() {
        return true;
    }

    let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

fn parse_body(bytes: &[u8], is_json: bool) -> Result<Value, ValidationErrors> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationErrors::missing_input().located_at("body"));
    }
    if !is_json {
        let raw = String::from_utf8_lossy(bytes).into_owned();
        return Err(ValidationErrors::not_an_object(Value::String(raw)).located_at("body"));
    }

    serde_json::from_slice(bytes).map_err(|e| {
        let position = byte_offset(bytes, e.line(), e.column());
        ValidationErrors::new(vec![FieldError {
            kind: "json_invalid",
            loc: vec![json!("body"), json!(position)],
            msg: "JSON decode error".into(),
            input: json!({}),
            ctx: Some(json!({ "error": e.to_string() })),
        }])
    })
}

/// Byte offset of a 1-based line/column position reported by serde_json.
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = bytes
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    (line_start + column.saturating_sub(1)).min(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_missing() {
        let err = parse_body(b"  \n", true).unwrap_err();
        assert_eq!(err.errors()[0].kind, "missing");
        assert_eq!(err.errors()[0].loc, vec![json!("body")]);
    }

    #[test]
    fn broken_json_reports_position() {
        let err = parse_body(b"{\"name\": }", true).unwrap_err();
        let error = &err.errors()[0];
        assert_eq!(error.kind, "json_invalid");
        assert_eq!(error.loc, vec![json!("body"), json!(9)]);
    }

    #[test]
    fn non_json_body_is_not_an_object() {
        let err = parse_body(br#"{"name": "Jo"}"#, false).unwrap_err();
        let error = &err.errors()[0];
        assert_eq!(error.kind, "model_attributes_type");
        assert_eq!(error.loc, vec![json!("body")]);
        assert_eq!(error.input, json!(r#"{"name": "Jo"}"#));
    }

    fn headers_with(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    #[test]
    fn json_content_types() {
        assert!(json_or_unspecified(&HeaderMap::new()));
        assert!(json_or_unspecified(&headers_with("application/json")));
        assert!(json_or_unspecified(&headers_with("Application/JSON; charset=utf-8")));
        assert!(json_or_unspecified(&headers_with("application/merge-patch+json")));
        assert!(!json_or_unspecified(&headers_with("text/plain")));
        assert!(!json_or_unspecified(&headers_with("application/x-www-form-urlencoded")));
        assert!(!json_or_unspecified(&headers_with("text/json")));
    }

    #[test]
    fn offset_spans_lines() {
        let body = b"{\n  \"a\": x\n}";
        assert_eq!(byte_offset(body, 2, 8), 9);
    }
}
