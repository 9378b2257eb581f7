//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable that overrides `source.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,
    pub logo: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub languages_dir: String,

    // Content API
    pub source: SourceConfig,

    // Listing
    pub listing: ListingConfig,

    // Prebuilt post pages
    pub prebuild: PrebuildConfig,

    pub navigation: NavigationConfig,
    pub edit_notice: EditNoticeConfig,
    pub comments: CommentsConfig,
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Space Traveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: "UTC".to_string(),
            logo: "/images/logo.svg".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            languages_dir: "languages".to_string(),

            source: SourceConfig::default(),
            listing: ListingConfig::default(),
            prebuild: PrebuildConfig::default(),
            navigation: NavigationConfig::default(),
            edit_notice: EditNoticeConfig::default(),
            comments: CommentsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides (secrets never need to live in the file)
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
                self.source.access_token = Some(token);
            }
        }
    }
}

/// Which content source backs the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Prismic-compatible HTTP API
    Prismic,
    /// Local JSON file with raw documents
    Fixture,
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// API entry point, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Path of the fixture file, relative to the site directory
    pub fixture: String,
    /// Custom type of blog posts
    pub document_type: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Prismic,
            endpoint: String::new(),
            access_token: None,
            fixture: "fixtures/posts.json".to_string(),
            document_type: "posts".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Listing page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub page_size: usize,
    pub date_format: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 1,
            date_format: "dd MMM yyyy".to_string(),
        }
    }
}

/// Which post pages are generated ahead of time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrebuildConfig {
    pub page_size: usize,
    /// Walk the whole feed instead of only the first page
    pub all: bool,
}

impl Default for PrebuildConfig {
    fn default() -> Self {
        Self {
            page_size: 2,
            all: false,
        }
    }
}

/// Ordering used to find the "next" post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextOrdering {
    /// `[document.last_publication_date desc]`
    LastPublicationDesc,
    /// `[document.first_publication_date]`
    FirstPublicationAsc,
}

/// Previous/next navigation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub next_ordering: NextOrdering,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            next_ordering: NextOrdering::LastPublicationDesc,
        }
    }
}

/// "Edited" notice configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditNoticeConfig {
    /// Render the modification time instead of the creation time
    pub use_modification_time: bool,
}

/// utterances comment widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// GitHub repository (`owner/name`); empty disables comments
    pub repo: String,
    pub issue_term: String,
    pub label: String,
    pub theme: String,
    pub crossorigin: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            issue_term: "pathname".to_string(),
            label: "comment :speech_balloon:".to_string(),
            theme: "photon-dark".to_string(),
            crossorigin: "anonymous".to_string(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Seconds between background regenerations (0 disables)
    pub revalidate_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            revalidate_secs: 60 * 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Space Traveling");
        assert_eq!(config.language, "pt-BR");
        assert_eq!(config.listing.page_size, 1);
        assert_eq!(config.prebuild.page_size, 2);
        assert_eq!(
            config.navigation.next_ordering,
            NextOrdering::LastPublicationDesc
        );
        assert!(!config.edit_notice.use_modification_time);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
language: en
source:
  kind: fixture
  fixture: data/posts.json
listing:
  page_size: 5
navigation:
  next_ordering: first_publication_asc
comments:
  repo: someone/blog-comments
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.source.kind, SourceKind::Fixture);
        assert_eq!(config.source.fixture, "data/posts.json");
        assert_eq!(config.source.document_type, "posts");
        assert_eq!(config.listing.page_size, 5);
        assert_eq!(config.listing.date_format, "dd MMM yyyy");
        assert_eq!(
            config.navigation.next_ordering,
            NextOrdering::FirstPublicationAsc
        );
        assert_eq!(config.comments.repo, "someone/blog-comments");
        assert_eq!(config.comments.issue_term, "pathname");
    }
}
