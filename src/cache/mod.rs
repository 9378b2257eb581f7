//! Cache module for incremental generation
//!
//! Tracks, per prebuilt post, a fingerprint of everything its page shows
//! that can change on the CMS side: the post revision and its neighbours.
//! Unchanged posts are not re-rendered.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::navigation::NavigationResult;

/// Cache directory, relative to the site directory
pub const CACHE_DIR: &str = ".space-traveling-cache";
const CACHE_FILE: &str = "db.json";

/// Represents a cached prebuilt post page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Revision of the post when its page was rendered
    pub last_publication_date: String,
    /// Hash of the revision and the navigation links
    pub fingerprint: u64,
    /// Output path relative to public dir
    pub output_path: String,
}

/// Cache database for tracking post changes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheDb {
    /// Version of the cache format
    pub version: u32,
    /// Hash of the site config (changes trigger full rebuild)
    pub config_hash: u64,
    /// Cached entries keyed by post uid
    pub posts: HashMap<String, CacheEntry>,
}

impl CacheDb {
    /// Current cache format version
    const VERSION: u32 = 1;

    /// Load cache from disk, or create a new empty cache
    pub fn load(base_dir: &Path) -> Self {
        let cache_path = base_dir.join(CACHE_DIR).join(CACHE_FILE);
        if let Ok(content) = fs::read_to_string(&cache_path) {
            match serde_json::from_str::<CacheDb>(&content) {
                Ok(cache) if cache.version == Self::VERSION => return cache,
                Ok(_) => tracing::info!("Cache version mismatch, rebuilding cache"),
                Err(e) => tracing::warn!("Ignoring unreadable cache {:?}: {}", cache_path, e),
            }
        }
        Self::default()
    }

    /// Save cache to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let cache_dir = base_dir.join(CACHE_DIR);
        fs::create_dir_all(&cache_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(cache_dir.join(CACHE_FILE), content)?;
        Ok(())
    }

    /// Create a new cache with version set
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// The current state of one prebuilt post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostState {
    pub uid: String,
    pub last_publication_date: String,
    pub fingerprint: u64,
    pub output_path: String,
}

impl PostState {
    pub fn new(post: &Post, navigation: &NavigationResult, output_path: impl Into<String>) -> Self {
        Self {
            uid: post.uid.clone(),
            last_publication_date: post.last_publication_date.to_rfc3339(),
            fingerprint: fingerprint(post, navigation),
            output_path: output_path.into(),
        }
    }
}

/// Change detection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Posts whose page must be (re)rendered
    pub changed_posts: Vec<String>,
    /// Posts that are no longer prebuilt; their output paths
    pub deleted_posts: Vec<String>,
    /// Whether to regenerate everything (config changed, forced, no cache)
    pub full_rebuild: bool,
}

impl ChangeSet {
    /// Create a changeset indicating full rebuild is needed
    pub fn full_rebuild() -> Self {
        Self {
            changed_posts: Vec::new(),
            deleted_posts: Vec::new(),
            full_rebuild: true,
        }
    }

    /// Create an empty changeset (no changes)
    pub fn empty() -> Self {
        Self {
            changed_posts: Vec::new(),
            deleted_posts: Vec::new(),
            full_rebuild: false,
        }
    }

    /// Check if any changes were detected
    pub fn has_changes(&self) -> bool {
        self.full_rebuild || !self.changed_posts.is_empty() || !self.deleted_posts.is_empty()
    }

    /// Whether the page of `uid` must be rendered
    pub fn needs_render(&self, uid: &str) -> bool {
        self.full_rebuild || self.changed_posts.iter().any(|u| u == uid)
    }

    /// Get summary of changes for logging
    pub fn summary(&self) -> String {
        if self.full_rebuild {
            return "full rebuild required".to_string();
        }

        let mut parts = Vec::new();
        if !self.changed_posts.is_empty() {
            parts.push(format!("{} posts changed", self.changed_posts.len()));
        }
        if !self.deleted_posts.is_empty() {
            parts.push(format!("{} posts removed", self.deleted_posts.len()));
        }

        if parts.is_empty() {
            "no changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Calculate a hash for text content
pub fn hash_content(content: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Calculate hash for site config
pub fn hash_config(config: &SiteConfig) -> Result<u64> {
    Ok(hash_content(&serde_yaml::to_string(config)?))
}

/// Hash of a post revision plus the neighbours its page links to
pub fn fingerprint(post: &Post, navigation: &NavigationResult) -> u64 {
    use std::collections::hash_map::DefaultHasher;

    let mut hasher = DefaultHasher::new();
    post.uid.hash(&mut hasher);
    post.last_publication_date.to_rfc3339().hash(&mut hasher);
    for neighbour in [&navigation.previous, &navigation.next] {
        match neighbour {
            Some(nav) => {
                nav.uid.hash(&mut hasher);
                nav.title.hash(&mut hasher);
            }
            None => 0u8.hash(&mut hasher),
        }
    }
    hasher.finish()
}

/// Detect changes between current state and cached state
pub fn detect_changes(
    cache: &CacheDb,
    config_hash: u64,
    current: &[PostState],
    public_dir: &Path,
) -> ChangeSet {
    if cache.is_empty() {
        return ChangeSet::full_rebuild();
    }

    if config_hash != cache.config_hash {
        tracing::info!("Config changed, full rebuild required");
        return ChangeSet::full_rebuild();
    }

    let mut changeset = ChangeSet::empty();

    for state in current {
        let unchanged = cache
            .posts
            .get(&state.uid)
            .map(|cached| cached.fingerprint == state.fingerprint)
            .unwrap_or(false);
        let output_exists = public_dir.join(&state.output_path).is_file();

        if !unchanged || !output_exists {
            tracing::debug!("Post changed: {}", state.uid);
            changeset.changed_posts.push(state.uid.clone());
        }
    }

    let current_uids: HashSet<&str> = current.iter().map(|s| s.uid.as_str()).collect();
    for (uid, cached) in &cache.posts {
        if !current_uids.contains(uid.as_str()) {
            tracing::debug!("Post no longer prebuilt: {}", uid);
            changeset.deleted_posts.push(cached.output_path.clone());
        }
    }
    changeset.deleted_posts.sort();

    changeset
}

/// Update cache with current state
pub fn update_cache(cache: &mut CacheDb, config_hash: u64, current: &[PostState]) {
    cache.version = CacheDb::VERSION;
    cache.config_hash = config_hash;
    cache.posts = current
        .iter()
        .map(|state| {
            (
                state.uid.clone(),
                CacheEntry {
                    last_publication_date: state.last_publication_date.clone(),
                    fingerprint: state.fingerprint,
                    output_path: state.output_path.clone(),
                },
            )
        })
        .collect();
}
