//! Paginated post feed for the listing page
//!
//! A [`FeedState`] holds the posts loaded so far plus the cursor of the next
//! page. Loading more only ever appends; prior entries never move.

use serde::Serialize;

use crate::content::Post;
use crate::error::Result;
use crate::helpers::DateFormatter;
use crate::source::{ContentSource, Cursor, Predicate, QueryRequest, QueryResponse};

/// One page of projected posts and the cursor of the page after it
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub posts: Vec<Post>,
    pub next_page: Option<Cursor>,
}

impl Feed {
    /// Project every document of a response; fails on the first malformed one
    pub fn from_response(response: QueryResponse) -> Result<Self> {
        let posts = response
            .results
            .iter()
            .map(Post::project)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            posts,
            next_page: response.next_page,
        })
    }

    /// Query the first page of posts
    pub async fn fetch_first(
        source: &dyn ContentSource,
        doc_type: &str,
        page_size: usize,
        content_ref: Option<&str>,
    ) -> Result<Self> {
        let request = QueryRequest::new(Predicate::document_type(doc_type))
            .page_size(page_size)
            .content_ref(content_ref);
        let response = source.query(&request).await?;
        tracing::debug!(
            "First page: {} posts, more: {}",
            response.results.len(),
            response.next_page.is_some()
        );
        Self::from_response(response)
    }
}

/// A post plus its display date as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub uid: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Creation date formatted for the site locale ("" if never published)
    pub display_date: String,
    #[serde(skip)]
    pub post: Post,
}

impl FeedEntry {
    fn new(post: Post, formatter: &DateFormatter) -> Self {
        let display_date = post
            .first_publication_date
            .as_ref()
            .map(|d| formatter.date(d))
            .unwrap_or_default();
        Self {
            uid: post.uid.clone(),
            path: post.path(),
            title: post.data.title.clone(),
            subtitle: post.data.subtitle.clone(),
            author: post.data.author.clone(),
            display_date,
            post,
        }
    }
}

/// Posts loaded so far and where to continue
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedState {
    #[serde(rename = "results")]
    entries: Vec<FeedEntry>,
    next_page: Option<Cursor>,
}

impl FeedState {
    /// Seed the state with the first page, formatting every date once
    pub fn initialize(first_page: Feed, formatter: &DateFormatter) -> Self {
        let entries = first_page
            .posts
            .into_iter()
            .map(|post| FeedEntry::new(post, formatter))
            .collect();
        Self {
            entries,
            next_page: first_page.next_page,
        }
    }

    /// An empty state that continues from `cursor`
    pub fn from_cursor(cursor: Cursor) -> Self {
        Self {
            entries: Vec::new(),
            next_page: Some(cursor),
        }
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn next_page(&self) -> Option<&Cursor> {
        self.next_page.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch the page at the cursor and append it.
    ///
    /// Returns the number of appended posts. Without a cursor this is a no-op
    /// that never touches the source. On error the state is left exactly as
    /// it was, so the call can simply be retried.
    pub async fn load_more(
        &mut self,
        source: &dyn ContentSource,
        formatter: &DateFormatter,
    ) -> Result<usize> {
        let Some(cursor) = self.next_page.as_ref() else {
            tracing::debug!("Feed exhausted, nothing to load");
            return Ok(0);
        };

        let response = source.fetch_page(cursor).await.map_err(|e| {
            tracing::warn!("Failed to load more posts: {}", e);
            e
        })?;
        let page = Feed::from_response(response)?;

        let added = page.posts.len();
        self.entries.extend(
            page.posts
                .into_iter()
                .map(|post| FeedEntry::new(post, formatter)),
        );
        self.next_page = page.next_page;

        tracing::debug!(
            "Loaded {} more posts ({} total, more: {})",
            added,
            self.entries.len(),
            self.has_more()
        );
        Ok(added)
    }
}
