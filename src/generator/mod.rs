//! Generator module - writes the static site using the built-in Tera templates

mod pages;

pub use pages::PageRenderer;

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;

use crate::cache::{self, CacheDb, PostState};
use crate::content::Post;
use crate::feed::{Feed, FeedState};
use crate::source::ContentSource;
use crate::SpaceTraveling;

/// Output of the fallback page for posts that are not prebuilt
pub const LOADING_PAGE: &str = "post/loading.html";
pub const NOT_FOUND_PAGE: &str = "404.html";

/// What a generation run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Posts on the listing page
    pub listed: usize,
    pub rendered: usize,
    pub skipped: usize,
    pub removed: usize,
}

/// Static site generator
pub struct Generator {
    app: SpaceTraveling,
    pages: PageRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(app: &SpaceTraveling) -> Result<Self> {
        let pages = PageRenderer::new(&app.config, app.i18n()?, app.formatter()?)?;
        Ok(Self {
            app: app.clone(),
            pages,
        })
    }

    pub fn pages(&self) -> &PageRenderer {
        &self.pages
    }

    /// Generate the entire site; `force` ignores the build cache
    pub async fn generate(
        &self,
        source: &dyn ContentSource,
        force: bool,
    ) -> Result<GenerateSummary> {
        let public_dir = &self.app.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {:?}", public_dir))?;

        let mut summary = GenerateSummary::default();

        // Listing page
        let listing = self.pages.first_page(source, None).await?;
        summary.listed = listing.len();
        write_page(public_dir, "index.html", &self.pages.listing(&listing, false)?)?;

        // Post pages
        let posts = self.prebuilt_posts(source).await?;
        let mut rendered = Vec::with_capacity(posts.len());
        for post in posts {
            let navigation = self.pages.resolve_navigation(source, &post).await?;
            let state = PostState::new(&post, &navigation, post_output_path(&post));
            rendered.push((post, navigation, state));
        }

        let config_hash = cache::hash_config(&self.app.config)?;
        let mut cache_db = CacheDb::load(&self.app.base_dir);
        let states: Vec<PostState> = rendered.iter().map(|(_, _, s)| s.clone()).collect();
        let changeset = if force {
            tracing::info!("Full generation (forced)");
            cache::ChangeSet::full_rebuild()
        } else {
            cache::detect_changes(&cache_db, config_hash, &states, public_dir)
        };
        tracing::info!("Changes detected: {}", changeset.summary());

        for (post, navigation, state) in &rendered {
            if !changeset.needs_render(&post.uid) {
                summary.skipped += 1;
                continue;
            }
            let html = self.pages.post_page(post, navigation, false)?;
            write_page(public_dir, &state.output_path, &html)?;
            tracing::debug!("Generated post: {}", state.output_path);
            summary.rendered += 1;
        }

        for output_path in &changeset.deleted_posts {
            let path = public_dir.join(output_path);
            if path.is_file() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {:?}", path))?;
                if let Some(parent) = path.parent() {
                    // Only removes the directory once it is empty
                    let _ = fs::remove_dir(parent);
                }
                tracing::debug!("Removed post: {}", output_path);
                summary.removed += 1;
            }
        }

        // Fallback pages
        write_page(public_dir, LOADING_PAGE, &self.pages.loading()?)?;
        write_page(public_dir, NOT_FOUND_PAGE, &self.pages.not_found(false)?)?;

        cache::update_cache(&mut cache_db, config_hash, &states);
        cache_db.save(&self.app.base_dir)?;

        tracing::info!(
            "Generated {} posts ({} unchanged, {} removed), {} on the listing",
            summary.rendered,
            summary.skipped,
            summary.removed,
            summary.listed
        );
        Ok(summary)
    }

    /// The posts rendered ahead of time: the first `prebuild.page_size`
    /// posts, or every post when `prebuild.all` is set
    async fn prebuilt_posts(&self, source: &dyn ContentSource) -> Result<Vec<Post>> {
        let config = &self.app.config;
        let first = Feed::fetch_first(
            source,
            &config.source.document_type,
            config.prebuild.page_size,
            None,
        )
        .await?;
        let mut state = FeedState::initialize(first, self.pages.formatter());

        if config.prebuild.all {
            while state.has_more() {
                state.load_more(source, self.pages.formatter()).await?;
            }
        }

        Ok(state.entries().iter().map(|e| e.post.clone()).collect())
    }
}

/// Prebuilt page of a post, relative to the public dir
pub fn post_output_path(post: &Post) -> String {
    format!("{}index.html", post.path().trim_start_matches('/'))
}

fn write_page(public_dir: &Path, relative: &str, html: &str) -> Result<()> {
    let output_path = public_dir.join(relative);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(&output_path, html)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
    Ok(())
}
