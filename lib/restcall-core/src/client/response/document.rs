//! Structured view of a JSON response body.
//!
//! Queries accept two path syntaxes, detected from the prefix:
//! - `$...` is a JSONPath (RFC 9535), supporting wildcards and descendants
//! - `/...` (or the empty string for the root) is a JSON Pointer (RFC 6901)

use serde_json::Value;
use serde_json_path::JsonPath;

use crate::client::error::RestCallError;

/// A path into a [`JsonDocument`].
#[derive(Debug, Clone)]
enum PathSelector {
    Pointer(String),
    JsonPath(JsonPath),
}

impl PathSelector {
    fn parse(path: &str) -> Result<Self, RestCallError> {
        if path.starts_with('$') {
            let json_path =
                JsonPath::parse(path).map_err(|err| RestCallError::InvalidDocumentPath {
                    path: path.to_string(),
                    message: err.to_string(),
                })?;
            Ok(Self::JsonPath(json_path))
        } else if path.starts_with('/') || path.is_empty() {
            Ok(Self::Pointer(path.to_string()))
        } else {
            Err(RestCallError::InvalidDocumentPath {
                path: path.to_string(),
                message: "must start with '$' (JSONPath) or '/' (JSON Pointer)".to_string(),
            })
        }
    }

    fn select<'a>(&self, json: &'a Value) -> Vec<&'a Value> {
        match self {
            Self::Pointer(pointer) => json.pointer(pointer).into_iter().collect(),
            Self::JsonPath(path) => path.query(json).all(),
        }
    }
}

/// A parsed JSON response body, queried with existence and value lookups.
///
/// ```rust
/// use restcall_core::JsonDocument;
///
/// let document = JsonDocument::parse(r#"{"items": [{"id": 1}, {"id": 2}], "next": null}"#)?;
///
/// assert!(document.exists("/items/0/id")?);
/// assert_eq!(document.values("$.items[*].id")?.len(), 2);
/// assert!(document.is_null("$.next")?);
/// # Ok::<(), restcall_core::RestCallError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    root: Value,
}

impl JsonDocument {
    /// Parses a JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::JsonError`] if the text is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, RestCallError> {
        let root = serde_json::from_str(text)?;
        Ok(Self { root })
    }

    /// The document root.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Returns `true` if the path matches at least one node.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::InvalidDocumentPath`] if the path cannot be parsed.
    pub fn exists(&self, path: &str) -> Result<bool, RestCallError> {
        Ok(!self.values(path)?.is_empty())
    }

    /// The first node matched by the path.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::InvalidDocumentPath`] if the path cannot be parsed.
    pub fn value(&self, path: &str) -> Result<Option<&Value>, RestCallError> {
        Ok(self.values(path)?.into_iter().next())
    }

    /// Returns `true` if the first node matched by the path is `null`.
    ///
    /// A path matching nothing is not null.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::InvalidDocumentPath`] if the path cannot be parsed.
    pub fn is_null(&self, path: &str) -> Result<bool, RestCallError> {
        Ok(self.value(path)?.is_some_and(Value::is_null))
    }

    /// Every node matched by the path, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::InvalidDocumentPath`] if the path cannot be parsed.
    pub fn values(&self, path: &str) -> Result<Vec<&Value>, RestCallError> {
        let selector = PathSelector::parse(path)?;
        Ok(selector.select(&self.root))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document() -> JsonDocument {
        JsonDocument {
            root: json!({
                "id": "root",
                "items": [
                    {"id": "a", "tags": []},
                    {"id": "b", "tags": null}
                ],
                "nested": {"id": "nested"}
            }),
        }
    }

    #[test]
    fn test_pointer_queries() {
        let document = document();

        assert!(document.exists("/items/1/id").expect("valid path"));
        assert!(!document.exists("/items/2").expect("valid path"));
        assert_eq!(
            document.value("/nested/id").expect("valid path"),
            Some(&json!("nested"))
        );
        assert_eq!(
            document.value("").expect("valid path"),
            Some(document.root())
        );
    }

    #[test]
    fn test_json_path_queries() {
        let document = document();

        let ids = document.values("$.items[*].id").expect("valid path");
        assert_eq!(ids, vec![&json!("a"), &json!("b")]);

        let all_ids = document.values("$..id").expect("valid path");
        assert_eq!(all_ids.len(), 4);
    }

    #[test]
    fn test_is_null() {
        let document = document();

        assert!(document.is_null("$.items[1].tags").expect("valid path"));
        assert!(!document.is_null("/items/0/tags").expect("valid path"));
        assert!(!document.is_null("/missing").expect("valid path"));
    }

    #[test]
    fn test_invalid_paths() {
        let document = document();

        let relative = document.exists("items");
        insta::assert_snapshot!(
            relative.unwrap_err(),
            @"Invalid document path 'items': must start with '$' (JSONPath) or '/' (JSON Pointer)"
        );

        let broken = document.exists("$.items[");
        assert!(matches!(broken, Err(RestCallError::InvalidDocumentPath { .. })));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = JsonDocument::parse("{not json");

        assert!(matches!(result, Err(RestCallError::JsonError(_))));
    }
}
