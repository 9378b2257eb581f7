//! Content source - the headless CMS the blog reads from
//!
//! Everything the site shows comes from a [`ContentSource`]. Callers build one
//! from the site configuration (see [`crate::SpaceTraveling::source`]) and pass
//! it explicitly to the feed and navigation code.

mod fixture;
mod prismic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

pub use fixture::FixtureSource;
pub use prismic::PrismicSource;

/// Opaque continuation token pointing at the next page of results
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A query predicate. Only exact matches are needed by the blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// `[at(path, "value")]`
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    /// `document.type == doc_type`
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => write!(f, "[at({}, \"{}\")]", path, value),
        }
    }
}

/// Document metadata fields results can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderField {
    FirstPublicationDate,
    LastPublicationDate,
}

impl OrderField {
    fn as_str(self) -> &'static str {
        match self {
            OrderField::FirstPublicationDate => "document.first_publication_date",
            OrderField::LastPublicationDate => "document.last_publication_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub field: OrderField,
    pub descending: bool,
}

impl Ordering {
    pub fn asc(field: OrderField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: OrderField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "{} desc", self.field.as_str())
        } else {
            f.write_str(self.field.as_str())
        }
    }
}

/// A search request against the content API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub predicates: Vec<Predicate>,
    pub page_size: usize,
    /// Only return documents that come after this document id
    pub after: Option<String>,
    pub orderings: Vec<Ordering>,
    /// Content version; `None` means the published master ref
    pub content_ref: Option<String>,
}

impl QueryRequest {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicates: vec![predicate],
            page_size: 20,
            after: None,
            orderings: Vec::new(),
            content_ref: None,
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn after(mut self, id: impl Into<String>) -> Self {
        self.after = Some(id.into());
        self
    }

    pub fn order_by(mut self, ordering: Ordering) -> Self {
        self.orderings.push(ordering);
        self
    }

    pub fn content_ref(mut self, content_ref: Option<&str>) -> Self {
        self.content_ref = content_ref.map(str::to_string);
        self
    }

    /// `[[at(..)][at(..)]]`
    pub fn q_param(&self) -> String {
        let predicates: String = self.predicates.iter().map(|p| p.to_string()).collect();
        format!("[{}]", predicates)
    }

    /// `[field desc,field]`
    pub fn orderings_param(&self) -> Option<String> {
        if self.orderings.is_empty() {
            return None;
        }
        let parts: Vec<String> = self.orderings.iter().map(|o| o.to_string()).collect();
        Some(format!("[{}]", parts.join(",")))
    }
}

/// A page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<RawDocument>,
    #[serde(default)]
    pub next_page: Option<Cursor>,
}

/// A document exactly as the CMS returns it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Query/fetch capability of a headless CMS
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a search
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse>;

    /// Fetch the page a previous response pointed at
    async fn fetch_page(&self, cursor: &Cursor) -> Result<QueryResponse>;

    /// Look up a single document by its custom type and uid
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        content_ref: Option<&str>,
    ) -> Result<RawDocument> {
        let request = QueryRequest::new(Predicate::at(format!("my.{}.uid", doc_type), uid))
            .page_size(1)
            .content_ref(content_ref);
        let response = self.query(&request).await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(doc_type, uid))
    }

    /// Look up a single document by its id
    async fn get_by_id(&self, id: &str, content_ref: Option<&str>) -> Result<RawDocument> {
        let request = QueryRequest::new(Predicate::at("document.id", id))
            .page_size(1)
            .content_ref(content_ref);
        let response = self.query(&request).await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found("document", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params() {
        let request = QueryRequest::new(Predicate::document_type("posts"))
            .page_size(1)
            .after("XyZ")
            .order_by(Ordering::desc(OrderField::LastPublicationDate));

        assert_eq!(request.q_param(), r#"[[at(document.type, "posts")]]"#);
        assert_eq!(
            request.orderings_param().as_deref(),
            Some("[document.last_publication_date desc]")
        );
        assert_eq!(request.after.as_deref(), Some("XyZ"));
    }

    #[test]
    fn test_no_orderings() {
        let request = QueryRequest::new(Predicate::document_type("posts"));
        assert_eq!(request.orderings_param(), None);
    }

    #[test]
    fn test_parse_response() {
        let json = r#"{
            "page": 1,
            "results_per_page": 1,
            "next_page": "https://repo.cdn.prismic.io/api/v2/documents/search?page=2",
            "results": [
                {"id": "YF", "uid": "hello", "type": "posts",
                 "first_publication_date": null,
                 "last_publication_date": "2021-03-25T19:25:28+0000",
                 "data": {"title": "Hello"}}
            ]
        }"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].uid.as_deref(), Some("hello"));
        assert_eq!(response.results[0].first_publication_date, None);
        assert!(response.next_page.is_some());
    }

    #[test]
    fn test_parse_last_page() {
        let response: QueryResponse =
            serde_json::from_str(r#"{"results": [], "next_page": null}"#).unwrap();
        assert!(response.next_page.is_none());
    }
}
