//! Offline content source backed by a JSON file of raw documents
//!
//! Implements the same query semantics as the CMS: exact-match predicates,
//! orderings, `after` anchors, page sizes and `next_page` cursors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;
use std::fs;
use std::path::Path;

use super::{ContentSource, Cursor, OrderField, Predicate, QueryRequest, QueryResponse, RawDocument};
use crate::error::{Error, Result};

const CURSOR_PREFIX: &str = "fixture:";

/// Accepts either a bare array of documents or a saved search response
#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureFile {
    Documents(Vec<RawDocument>),
    Response { results: Vec<RawDocument> },
}

/// What a fixture cursor encodes: the original request and the page to serve
#[derive(Serialize, Deserialize)]
struct PageToken {
    request: QueryRequest,
    page: usize,
}

/// In-memory content source
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    documents: Vec<RawDocument>,
}

impl FixtureSource {
    pub fn new(documents: Vec<RawDocument>) -> Self {
        Self { documents }
    }

    /// Load documents from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read fixture {:?}: {}", path, e))?;
        let documents = match serde_json::from_str::<FixtureFile>(&content)? {
            FixtureFile::Documents(documents) => documents,
            FixtureFile::Response { results } => results,
        };
        tracing::debug!("Loaded {} fixture documents from {:?}", documents.len(), path);
        Ok(Self::new(documents))
    }

    pub fn documents(&self) -> &[RawDocument] {
        &self.documents
    }

    fn matching(&self, request: &QueryRequest) -> Vec<&RawDocument> {
        let mut matched: Vec<&RawDocument> = self
            .documents
            .iter()
            .filter(|doc| request.predicates.iter().all(|p| matches(doc, p)))
            .collect();

        // Stable sort: documents that compare equal keep file order
        matched.sort_by(|a, b| {
            for ordering in &request.orderings {
                let cmp = compare_field(a, b, ordering.field);
                let cmp = if ordering.descending { cmp.reverse() } else { cmp };
                if cmp != CmpOrdering::Equal {
                    return cmp;
                }
            }
            CmpOrdering::Equal
        });

        if let Some(after) = &request.after {
            if let Some(pos) = matched.iter().position(|d| d.id.as_deref() == Some(after.as_str())) {
                matched.drain(..=pos);
            }
        }

        matched
    }

    fn page(&self, request: &QueryRequest, page: usize) -> Result<QueryResponse> {
        let page_size = request.page_size.max(1);
        let matched = self.matching(request);
        let start = (page - 1)
            .checked_mul(page_size)
            .filter(|start| start.checked_add(page_size).is_some())
            .ok_or_else(|| Error::SourceUnavailable("invalid cursor: page out of range".to_string()))?;
        let results: Vec<RawDocument> = matched
            .iter()
            .skip(start)
            .take(page_size)
            .map(|d| (*d).clone())
            .collect();

        let next_page = if start + page_size < matched.len() {
            let token = PageToken {
                request: request.clone(),
                page: page + 1,
            };
            let encoded = serde_json::to_string(&token)
                .map_err(|e| Error::SourceUnavailable(e.to_string()))?;
            Some(Cursor::new(format!("{}{}", CURSOR_PREFIX, encoded)))
        } else {
            None
        };

        Ok(QueryResponse { results, next_page })
    }
}

#[async_trait]
impl ContentSource for FixtureSource {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        self.page(request, 1)
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<QueryResponse> {
        let token: PageToken = cursor
            .as_str()
            .strip_prefix(CURSOR_PREFIX)
            .and_then(|encoded| serde_json::from_str(encoded).ok())
            .ok_or_else(|| Error::SourceUnavailable(format!("invalid cursor {}", cursor)))?;
        self.page(&token.request, token.page.max(1))
    }
}

fn matches(doc: &RawDocument, predicate: &Predicate) -> bool {
    let Predicate::At { path, value } = predicate;
    match path.as_str() {
        "document.type" => doc.doc_type.as_deref() == Some(value.as_str()),
        "document.id" => doc.id.as_deref() == Some(value.as_str()),
        other => {
            // my.<type>.uid
            let mut parts = other.split('.');
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some("my"), Some(doc_type), Some("uid"), None) => {
                    doc.doc_type.as_deref() == Some(doc_type) && doc.uid.as_deref() == Some(value.as_str())
                }
                (Some("my"), Some(doc_type), Some(field), None) => {
                    doc.doc_type.as_deref() == Some(doc_type)
                        && doc.data.get(field).and_then(|v| v.as_str()) == Some(value.as_str())
                }
                _ => false,
            }
        }
    }
}

/// Compare two documents by a metadata date; documents without one sort last
fn compare_field(a: &RawDocument, b: &RawDocument, field: OrderField) -> CmpOrdering {
    let key = |d: &RawDocument| {
        let raw = match field {
            OrderField::FirstPublicationDate => d.first_publication_date.as_deref(),
            OrderField::LastPublicationDate => d.last_publication_date.as_deref(),
        };
        raw.and_then(crate::content::parse_timestamp)
    };
    match (key(a), key(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Ordering;

    fn doc(id: &str, uid: &str, first: &str, last: &str) -> RawDocument {
        RawDocument {
            id: Some(id.to_string()),
            uid: Some(uid.to_string()),
            doc_type: Some("posts".to_string()),
            first_publication_date: Some(first.to_string()),
            last_publication_date: Some(last.to_string()),
            data: serde_json::json!({ "title": uid }),
        }
    }

    fn source() -> FixtureSource {
        FixtureSource::new(vec![
            doc("B", "second", "2021-02-01T10:00:00+0000", "2021-02-01T10:00:00+0000"),
            doc("A", "first", "2021-01-01T10:00:00+0000", "2021-03-01T10:00:00+0000"),
            doc("C", "third", "2021-03-01T10:00:00+0000", "2021-03-02T10:00:00+0000"),
            RawDocument {
                doc_type: Some("authors".to_string()),
                ..doc("Z", "someone", "2021-01-01T10:00:00+0000", "2021-01-01T10:00:00+0000")
            },
        ])
    }

    fn uids(response: &QueryResponse) -> Vec<&str> {
        response
            .results
            .iter()
            .filter_map(|d| d.uid.as_deref())
            .collect()
    }

    #[tokio::test]
    async fn test_type_predicate_keeps_file_order() {
        let source = source();
        let request = QueryRequest::new(Predicate::document_type("posts"));
        let response = source.query(&request).await.unwrap();
        assert_eq!(uids(&response), vec!["second", "first", "third"]);
        assert!(response.next_page.is_none());
    }

    #[tokio::test]
    async fn test_pagination_cursor() {
        let source = source();
        let request = QueryRequest::new(Predicate::document_type("posts")).page_size(2);

        let first = source.query(&request).await.unwrap();
        assert_eq!(uids(&first), vec!["second", "first"]);
        let cursor = first.next_page.expect("more results");

        let second = source.fetch_page(&cursor).await.unwrap();
        assert_eq!(uids(&second), vec!["third"]);
        assert!(second.next_page.is_none());
    }

    #[tokio::test]
    async fn test_after_with_orderings() {
        let source = source();
        let request = QueryRequest::new(Predicate::document_type("posts"))
            .page_size(1)
            .after("B")
            .order_by(Ordering::desc(OrderField::FirstPublicationDate));
        let response = source.query(&request).await.unwrap();
        assert_eq!(uids(&response), vec!["first"]);

        let request = QueryRequest::new(Predicate::document_type("posts"))
            .page_size(1)
            .after("B")
            .order_by(Ordering::asc(OrderField::FirstPublicationDate));
        let response = source.query(&request).await.unwrap();
        assert_eq!(uids(&response), vec!["third"]);
    }

    #[tokio::test]
    async fn test_get_by_uid() {
        let source = source();
        let doc = source.get_by_uid("posts", "third", None).await.unwrap();
        assert_eq!(doc.id.as_deref(), Some("C"));

        let missing = source.get_by_uid("posts", "someone", None).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invalid_cursor() {
        let result = source().fetch_page(&Cursor::new("https://elsewhere")).await;
        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_cursor_page_out_of_range() {
        let request = QueryRequest::new(Predicate::document_type("posts")).page_size(20);
        let token = PageToken {
            request,
            page: usize::MAX,
        };
        let cursor = Cursor::new(format!(
            "{}{}",
            CURSOR_PREFIX,
            serde_json::to_string(&token).unwrap()
        ));

        let result = FixtureSource::new(vec![]).fetch_page(&cursor).await;
        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
        let result = source().fetch_page(&cursor).await;
        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
    }

    #[test]
    fn test_load_response_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(
            &path,
            r#"{"next_page": null, "results": [{"id": "A", "uid": "a", "type": "posts"}]}"#,
        )
        .unwrap();
        let source = FixtureSource::load(&path).unwrap();
        assert_eq!(source.documents().len(), 1);
    }
}
