//! Request descriptors.
//!
//! A [`RequestDescriptor`] says what to call (verb, path, query, body, and
//! whether credentials are attached) without saying where: the executor joins
//! the path onto its base address. Descriptors are built once through
//! [`RequestBuilder`] and are read-only afterwards.

use std::fmt;

use fieldsync_core::Filter;
use reqwest::Method;
use serde::Serialize;

use crate::error::SyncError;

// ============================================================================
// HTTP Verb
// ============================================================================

/// HTTP verbs used against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    /// Read.
    Get,
    /// Create or invoke a workflow.
    Post,
    /// Partial update.
    Patch,
    /// Full replace.
    Put,
    /// Hard delete.
    Delete,
}

impl HttpVerb {
    /// Returns the reqwest method.
    pub fn as_method(&self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Patch => Method::PATCH,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }

    /// Returns true for verbs that do not modify state.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

// ============================================================================
// Sort Order
// ============================================================================

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Returns the value of the `sort_order` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

// ============================================================================
// Request Descriptor
// ============================================================================

/// An immutable description of one backend call.
#[derive(Clone, PartialEq)]
pub struct RequestDescriptor {
    verb: HttpVerb,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    auth_required: bool,
}

impl RequestDescriptor {
    /// Starts a descriptor for `verb` on `path`.
    pub fn builder(verb: HttpVerb, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            verb,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth_required: true,
        }
    }

    /// Starts a GET descriptor.
    pub fn get(path: impl Into<String>) -> RequestBuilder {
        Self::builder(HttpVerb::Get, path)
    }

    /// Starts a POST descriptor.
    pub fn post(path: impl Into<String>) -> RequestBuilder {
        Self::builder(HttpVerb::Post, path)
    }

    /// Starts a PATCH descriptor.
    pub fn patch(path: impl Into<String>) -> RequestBuilder {
        Self::builder(HttpVerb::Patch, path)
    }

    /// Starts a DELETE descriptor.
    pub fn delete(path: impl Into<String>) -> RequestBuilder {
        Self::builder(HttpVerb::Delete, path)
    }

    /// The HTTP verb.
    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    /// The path relative to the base address.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns the value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The encoded body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Whether an authorization header is attached.
    pub fn auth_required(&self) -> bool {
        self.auth_required
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("auth_required", &self.auth_required)
            .finish()
    }
}

// ============================================================================
// Request Builder
// ============================================================================

/// Builder for a [`RequestDescriptor`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    verb: HttpVerb,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    auth_required: bool,
}

impl RequestBuilder {
    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds the `constraints` parameter. An empty filter adds nothing.
    pub fn constraints(self, filter: &Filter) -> Result<Self, SyncError> {
        if filter.is_empty() {
            return Ok(self);
        }
        let json = filter
            .to_json()
            .map_err(|e| SyncError::InvalidRequest(e.to_string()))?;
        Ok(self.query("constraints", json))
    }

    /// Adds `sort_field` and `sort_order`.
    #[must_use]
    pub fn sort(self, field: impl Into<String>, order: SortOrder) -> Self {
        self.query("sort_field", field.into())
            .query("sort_order", order.as_str())
    }

    /// Adds `cursor` and `limit`.
    #[must_use]
    pub fn page(self, offset: u64, limit: u32) -> Self {
        self.query("cursor", offset).query("limit", limit)
    }

    /// Encodes `body` as JSON.
    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, SyncError> {
        let bytes =
            serde_json::to_vec(body).map_err(|e| SyncError::InvalidRequest(e.to_string()))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Marks the call as not needing credentials.
    #[must_use]
    pub fn unauthenticated(mut self) -> Self {
        self.auth_required = false;
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> RequestDescriptor {
        RequestDescriptor {
            verb: self.verb,
            path: self.path,
            query: self.query,
            body: self.body,
            auth_required: self.auth_required,
        }
    }
}

// ============================================================================
// List Query
// ============================================================================

/// Scope of a collection query: filter and ordering.
///
/// Paging parameters are supplied separately, per page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    /// Constraints on the collection.
    pub filter: Filter,
    /// Sort field and direction.
    pub sort: Option<(String, SortOrder)>,
}

impl ListQuery {
    /// An unfiltered, unsorted query.
    pub fn new() -> Self {
        Self::default()
    }

    /// A query scoped by `filter`.
    pub fn filtered(filter: impl Into<Filter>) -> Self {
        Self {
            filter: filter.into(),
            sort: None,
        }
    }

    /// Sets the sort order.
    #[must_use]
    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    /// Builds the GET descriptor for one page of `path`.
    pub fn to_request(
        &self,
        path: impl Into<String>,
        offset: u64,
        limit: u32,
    ) -> Result<RequestDescriptor, SyncError> {
        let mut builder = RequestDescriptor::get(path)
            .page(offset, limit)
            .constraints(&self.filter)?;
        if let Some((field, order)) = &self.sort {
            builder = builder.sort(field.clone(), *order);
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_core::Constraint;
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let req = RequestDescriptor::get("obj/task").build();
        assert_eq!(req.verb(), HttpVerb::Get);
        assert_eq!(req.path(), "obj/task");
        assert!(req.auth_required());
        assert!(req.body().is_none());
        assert!(req.query().is_empty());
    }

    #[test]
    fn test_unauthenticated_workflow() {
        let req = RequestDescriptor::post("wf/reset-password")
            .unauthenticated()
            .build();
        assert!(!req.auth_required());
        assert!(!req.verb().is_read());
    }

    #[test]
    fn test_json_body() {
        let req = RequestDescriptor::patch("obj/task/1")
            .json_body(&json!({"title": "x"}))
            .unwrap()
            .build();
        assert_eq!(req.body(), Some(br#"{"title":"x"}"#.as_slice()));
    }

    #[test]
    fn test_empty_filter_adds_no_constraints() {
        let req = RequestDescriptor::get("obj/task")
            .constraints(&Filter::new())
            .unwrap()
            .build();
        assert!(req.query_value("constraints").is_none());
    }

    #[test]
    fn test_list_query_parameters() {
        let query = ListQuery::filtered(Constraint::equals("status", "open"))
            .sorted_by("created_date", SortOrder::Desc);
        let req = query.to_request("obj/task", 200, 100).unwrap();

        assert_eq!(req.query_value("cursor"), Some("200"));
        assert_eq!(req.query_value("limit"), Some("100"));
        assert_eq!(req.query_value("sort_field"), Some("created_date"));
        assert_eq!(req.query_value("sort_order"), Some("desc"));
        assert_eq!(
            req.query_value("constraints"),
            Some(r#"[{"key":"status","constraint_type":"equals","value":"open"}]"#)
        );
    }

    #[test]
    fn test_debug_hides_body() {
        let req = RequestDescriptor::post("obj/note")
            .json_body(&json!({"body": "secret"}))
            .unwrap()
            .build();
        let debug = format!("{req:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("body_len"));
    }
}
