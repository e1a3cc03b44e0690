//! Response of an executed call, with lazily derived views.

use std::sync::OnceLock;

mod document;
pub use self::document::JsonDocument;

use super::error::RestCallError;
use super::executor::{HttpResponse, ResponseHeader};

/// The response stored on a call after its execution.
///
/// The structured document is parsed on first access and kept. A new execution
/// replaces the whole view, so nothing derived from a previous response survives.
#[derive(Debug)]
pub(in crate::client) struct ResponseView {
    response: HttpResponse,
    document: OnceLock<JsonDocument>,
}

impl ResponseView {
    pub(in crate::client) fn new(response: HttpResponse) -> Self {
        Self {
            response,
            document: OnceLock::new(),
        }
    }

    pub(in crate::client) fn status_code(&self) -> u16 {
        self.response.status_code
    }

    pub(in crate::client) fn status_message(&self) -> &str {
        &self.response.status_message
    }

    pub(in crate::client) fn headers(&self) -> &[ResponseHeader] {
        &self.response.headers
    }

    /// First header with this name, names are compared case-insensitively.
    pub(in crate::client) fn header(&self, name: &str) -> Option<&str> {
        self.response
            .headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    pub(in crate::client) fn body(&self) -> &str {
        &self.response.body
    }

    pub(in crate::client) fn document(&self) -> Result<&JsonDocument, RestCallError> {
        if let Some(document) = self.document.get() {
            return Ok(document);
        }
        let document = JsonDocument::parse(&self.response.body)?;
        Ok(self.document.get_or_init(|| document))
    }
}
