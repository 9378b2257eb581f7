//! Previous / next post navigation

use serde::Serialize;

use crate::config::{NavigationConfig, NextOrdering};
use crate::content::Post;
use crate::error::Result;
use crate::source::{ContentSource, OrderField, Ordering, Predicate, QueryRequest};

/// Reference to a neighbouring post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavPost {
    pub uid: String,
    pub title: String,
    pub path: String,
}

impl From<&Post> for NavPost {
    fn from(post: &Post) -> Self {
        Self {
            uid: post.uid.clone(),
            title: post.data.title.clone(),
            path: post.path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationResult {
    pub previous: Option<NavPost>,
    pub next: Option<NavPost>,
}

/// Finds the posts adjacent to a given one with one `after` query per direction
#[derive(Debug, Clone)]
pub struct NavigationResolver {
    doc_type: String,
    next_ordering: NextOrdering,
}

impl NavigationResolver {
    pub fn new(doc_type: impl Into<String>, config: &NavigationConfig) -> Self {
        Self {
            doc_type: doc_type.into(),
            next_ordering: config.next_ordering,
        }
    }

    fn previous_request(&self, post: &Post, content_ref: Option<&str>) -> QueryRequest {
        self.adjacent(post, content_ref)
            .order_by(Ordering::desc(OrderField::FirstPublicationDate))
    }

    fn next_request(&self, post: &Post, content_ref: Option<&str>) -> QueryRequest {
        let ordering = match self.next_ordering {
            NextOrdering::LastPublicationDesc => Ordering::desc(OrderField::LastPublicationDate),
            NextOrdering::FirstPublicationAsc => Ordering::asc(OrderField::FirstPublicationDate),
        };
        self.adjacent(post, content_ref).order_by(ordering)
    }

    fn adjacent(&self, post: &Post, content_ref: Option<&str>) -> QueryRequest {
        QueryRequest::new(Predicate::document_type(&self.doc_type))
            .page_size(1)
            .after(post.id.as_str())
            .content_ref(content_ref)
    }

    /// Resolve both neighbours of `post`.
    ///
    /// A missing neighbour is `None`, never an error. The current post is
    /// never returned as its own neighbour.
    pub async fn resolve(
        &self,
        source: &dyn ContentSource,
        post: &Post,
        content_ref: Option<&str>,
    ) -> Result<NavigationResult> {
        let previous_request = self.previous_request(post, content_ref);
        let next_request = self.next_request(post, content_ref);

        let (previous, next) = tokio::try_join!(
            source.query(&previous_request),
            source.query(&next_request)
        )?;

        let pick = |results: Vec<crate::source::RawDocument>| -> Result<Option<NavPost>> {
            match results.first() {
                Some(raw) => {
                    let neighbour = Post::project(raw)?;
                    if neighbour.uid == post.uid {
                        Ok(None)
                    } else {
                        Ok(Some(NavPost::from(&neighbour)))
                    }
                }
                None => Ok(None),
            }
        };

        let result = NavigationResult {
            previous: pick(previous.results)?,
            next: pick(next.results)?,
        };
        tracing::debug!(
            "Navigation for {}: previous={:?} next={:?}",
            post.uid,
            result.previous.as_ref().map(|p| p.uid.as_str()),
            result.next.as_ref().map(|p| p.uid.as_str())
        );
        Ok(result)
    }
}
