//! Page rendering shared by the static generator and the server

use anyhow::Result;
use tera::Context;

use crate::comments;
use crate::config::SiteConfig;
use crate::content::{EditDetector, Post, ReadingMetrics};
use crate::error;
use crate::feed::{Feed, FeedState};
use crate::helpers::{full_url_for, open_graph, DateFormatter};
use crate::i18n::I18n;
use crate::navigation::{NavigationResolver, NavigationResult};
use crate::source::ContentSource;
use crate::templates::{PostView, SiteData, TemplateRenderer};

/// Renders the listing, post and fallback pages of a site
pub struct PageRenderer {
    config: SiteConfig,
    renderer: TemplateRenderer,
    i18n: I18n,
    formatter: DateFormatter,
    edit_detector: EditDetector,
    navigation: NavigationResolver,
    site: SiteData,
}

impl PageRenderer {
    pub fn new(config: &SiteConfig, i18n: I18n, formatter: DateFormatter) -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::new()?,
            edit_detector: EditDetector::new(&config.edit_notice, &i18n),
            navigation: NavigationResolver::new(
                config.source.document_type.as_str(),
                &config.navigation,
            ),
            site: SiteData::from_config(config),
            config: config.clone(),
            i18n,
            formatter,
        })
    }

    pub fn formatter(&self) -> &DateFormatter {
        &self.formatter
    }

    /// First page of the listing, ready to render
    pub async fn first_page(
        &self,
        source: &dyn ContentSource,
        content_ref: Option<&str>,
    ) -> error::Result<FeedState> {
        let feed = Feed::fetch_first(
            source,
            &self.config.source.document_type,
            self.config.listing.page_size,
            content_ref,
        )
        .await?;
        Ok(FeedState::initialize(feed, &self.formatter))
    }

    /// Fetch a post by uid together with its neighbours
    pub async fn load_post(
        &self,
        source: &dyn ContentSource,
        uid: &str,
        content_ref: Option<&str>,
    ) -> error::Result<(Post, NavigationResult)> {
        let raw = source
            .get_by_uid(&self.config.source.document_type, uid, content_ref)
            .await?;
        let post = Post::project(&raw)?;
        let navigation = self.navigation.resolve(source, &post, content_ref).await?;
        Ok((post, navigation))
    }

    pub async fn resolve_navigation(
        &self,
        source: &dyn ContentSource,
        post: &Post,
    ) -> error::Result<NavigationResult> {
        self.navigation.resolve(source, post, None).await
    }

    /// Derive the display data of a post
    pub fn post_view(&self, post: &Post) -> PostView {
        let metrics = ReadingMetrics::estimate(post);
        let minutes = metrics.minutes.to_string();
        PostView {
            uid: post.uid.clone(),
            path: post.path(),
            title: post.data.title.clone(),
            subtitle: post.data.subtitle.clone(),
            author: post.data.author.clone(),
            banner: post.data.banner.url.clone(),
            display_date: post
                .first_publication_date
                .as_ref()
                .map(|d| self.formatter.date(d))
                .unwrap_or_default(),
            word_count: metrics.word_count,
            reading_time: self.i18n.format("reading_time", &[("minutes", &minutes)]),
            edit_notice: self.edit_detector.detect(
                post.first_publication_date,
                post.last_publication_date,
                &self.formatter,
            ),
            content: post.data.content.clone(),
        }
    }

    fn base_context(&self, preview: bool) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("t", self.i18n.all());
        context.insert("preview", &preview);
        context
    }

    pub fn listing(&self, state: &FeedState, preview: bool) -> Result<String> {
        let mut context = self.base_context(preview);
        context.insert("posts", state.entries());
        context.insert("next_page", &state.next_page());
        self.renderer.render("index.html", &context)
    }

    pub fn post_page(
        &self,
        post: &Post,
        navigation: &NavigationResult,
        preview: bool,
    ) -> Result<String> {
        let view = self.post_view(post);
        let mut context = self.base_context(preview);
        context.insert(
            "open_graph",
            &open_graph(
                &view.title,
                &view.subtitle,
                &full_url_for(&self.config, &view.path),
                Some(&view.banner),
                &self.config.title,
            ),
        );
        context.insert("post", &view);
        context.insert("navigation", navigation);
        context.insert("comments", &comments::render(&self.config.comments));
        self.renderer.render("post.html", &context)
    }

    /// Shell shown while a post that was not prebuilt is being fetched
    pub fn loading(&self) -> Result<String> {
        self.renderer.render("loading.html", &self.base_context(false))
    }

    pub fn not_found(&self, preview: bool) -> Result<String> {
        self.renderer
            .render("not_found.html", &self.base_context(preview))
    }

    pub fn unavailable(&self, preview: bool) -> Result<String> {
        self.renderer
            .render("unavailable.html", &self.base_context(preview))
    }
}
