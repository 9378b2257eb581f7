//! Post model and projection from raw CMS documents

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::source::RawDocument;

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Slug, unique among posts
    pub uid: String,

    /// CMS document id (anchor for adjacency queries)
    pub id: String,

    /// Creation date; absent for documents never published
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    /// Last modification date
    pub last_publication_date: DateTime<FixedOffset>,

    pub data: PostData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<ContentSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub url: String,
}

/// A heading and the rich text under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub heading: String,
    pub body: Vec<RichTextFragment>,
}

/// One structured-text block, kept exactly as the CMS sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichTextFragment(pub serde_json::Value);

impl RichTextFragment {
    /// Plain text of the block ("" when it has none)
    pub fn text(&self) -> &str {
        self.0.get("text").and_then(|v| v.as_str()).unwrap_or("")
    }

    /// Block type, e.g. `paragraph` or `list-item`
    pub fn kind(&self) -> &str {
        self.0.get("type").and_then(|v| v.as_str()).unwrap_or("paragraph")
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for RichTextFragment {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Parse a CMS timestamp (`2021-03-25T19:25:28+0000`, RFC 3339 also accepted)
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
}

impl Post {
    /// Project a raw document into a post
    pub fn project(raw: &RawDocument) -> Result<Post> {
        let uid = raw
            .uid
            .clone()
            .ok_or_else(|| Error::malformed("uid", raw.id.as_deref().unwrap_or("?")))?;
        let id = raw
            .id
            .clone()
            .ok_or_else(|| Error::malformed("id", &uid))?;

        let first_publication_date = match raw.first_publication_date.as_deref() {
            None => None,
            Some(s) => Some(
                parse_timestamp(s)
                    .ok_or_else(|| Error::malformed("first_publication_date", &uid))?,
            ),
        };
        let last_publication_date = raw
            .last_publication_date
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| Error::malformed("last_publication_date", &uid))?;

        let data = raw
            .data
            .as_object()
            .ok_or_else(|| Error::malformed("data", &uid))?;
        let field = |name: &str| -> Result<String> {
            data.get(name)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| Error::malformed(format!("data.{}", name), &uid))
        };

        let banner_url = data
            .get("banner")
            .and_then(|b| b.get("url"))
            .and_then(|u| u.as_str())
            .ok_or_else(|| Error::malformed("data.banner.url", &uid))?;

        let sections = data
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| Error::malformed("data.content", &uid))?;
        let content = sections
            .iter()
            .enumerate()
            .map(|(i, section)| project_section(section, i, &uid))
            .collect::<Result<Vec<_>>>()?;

        Ok(Post {
            id,
            first_publication_date,
            last_publication_date,
            data: PostData {
                title: field("title")?,
                subtitle: field("subtitle")?,
                author: field("author")?,
                banner: Banner {
                    url: banner_url.to_string(),
                },
                content,
            },
            uid,
        })
    }

    /// Site-relative path of the post page
    pub fn path(&self) -> String {
        post_path(&self.uid)
    }
}

pub fn post_path(uid: &str) -> String {
    format!("/post/{}/", uid)
}

fn project_section(section: &serde_json::Value, index: usize, uid: &str) -> Result<ContentSection> {
    let heading = section
        .get("heading")
        .and_then(|h| h.as_str())
        .ok_or_else(|| Error::malformed(format!("data.content[{}].heading", index), uid))?;
    let body = section
        .get("body")
        .and_then(|b| b.as_array())
        .ok_or_else(|| Error::malformed(format!("data.content[{}].body", index), uid))?;

    Ok(ContentSection {
        heading: heading.to_string(),
        body: body.iter().cloned().map(RichTextFragment).collect(),
    })
}
