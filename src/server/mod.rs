//! Site server: prebuilt pages, on-demand post rendering, "load more" API and
//! preview mode

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::content::Post;
use crate::error::Error;
use crate::feed::FeedState;
use crate::generator::{Generator, NOT_FOUND_PAGE};
use crate::helpers::url_for;
use crate::source::{ContentSource, Cursor};
use crate::SpaceTraveling;

/// Cookie holding the preview ref
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

/// Server state
pub struct ServerState {
    app: SpaceTraveling,
    source: Arc<dyn ContentSource>,
    generator: Generator,
}

impl ServerState {
    pub fn new(app: &SpaceTraveling, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            app: app.clone(),
            source,
            generator: Generator::new(app)?,
        })
    }

    fn public_dir(&self) -> &PathBuf {
        &self.app.public_dir
    }
}

/// Start the server
pub async fn start(app: &SpaceTraveling, ip: &str, port: u16, open: bool) -> Result<()> {
    let source: Arc<dyn ContentSource> = Arc::from(app.source()?);
    let state = Arc::new(ServerState::new(app, source)?);

    if !app.public_dir.join("index.html").exists() {
        tracing::info!("No generated site found, generating");
        if let Err(e) = state.generator.generate(state.source.as_ref(), false).await {
            tracing::warn!("Initial generation failed: {:#}", e);
        }
    }

    let revalidate_secs = app.config.server.revalidate_secs;
    if revalidate_secs > 0 {
        tokio::spawn(revalidate(state.clone(), Duration::from_secs(revalidate_secs)));
    }

    let router = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

pub fn router(state: Arc<ServerState>) -> Router {
    let public_dir = state.public_dir().clone();
    let static_files = ServeDir::new(&public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(public_dir.join(NOT_FOUND_PAGE)));

    Router::new()
        .route("/", get(index_handler))
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .route("/api/posts", get(posts_api_handler))
        .route("/api/post/:slug", get(render_post_handler))
        .route("/api/preview", get(preview_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Regenerate the static output periodically
async fn revalidate(state: Arc<ServerState>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        tracing::debug!("Revalidating generated pages");
        if let Err(e) = state.generator.generate(state.source.as_ref(), false).await {
            tracing::warn!("Revalidation failed: {:#}", e);
        }
    }
}

fn preview_ref(jar: &CookieJar) -> Option<String> {
    jar.get(PREVIEW_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn html_response(status: StatusCode, page: Result<String>) -> Response {
    match page {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template error: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Error page for a failed source call; post routes show any document
/// problem as not found
fn failure(state: &ServerState, err: &Error, preview: bool, post_route: bool) -> Response {
    let pages = state.generator.pages();
    match err {
        Error::NotFound { .. } => html_response(StatusCode::NOT_FOUND, pages.not_found(preview)),
        Error::MalformedDocument { .. } if post_route => {
            tracing::error!("{}", err);
            html_response(StatusCode::NOT_FOUND, pages.not_found(preview))
        }
        Error::MalformedDocument { .. } => {
            tracing::error!("{}", err);
            html_response(StatusCode::INTERNAL_SERVER_ERROR, pages.unavailable(preview))
        }
        Error::SourceUnavailable(_) => {
            tracing::warn!("{}", err);
            html_response(StatusCode::BAD_GATEWAY, pages.unavailable(preview))
        }
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::MalformedDocument { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        Error::SourceUnavailable(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Listing page, rendered per request
async fn index_handler(State(state): State<Arc<ServerState>>, jar: CookieJar) -> Response {
    let preview = preview_ref(&jar);
    let pages = state.generator.pages();
    match pages
        .first_page(state.source.as_ref(), preview.as_deref())
        .await
    {
        Ok(feed) => html_response(StatusCode::OK, pages.listing(&feed, preview.is_some())),
        Err(e) => failure(&state, &e, preview.is_some(), false),
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Post page: the prebuilt file when there is one, otherwise the loading
/// shell, which fetches the rendered page from `/api/post/:slug`
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Response {
    let preview = preview_ref(&jar);
    let pages = state.generator.pages();

    if !is_valid_slug(&slug) {
        return html_response(StatusCode::NOT_FOUND, pages.not_found(preview.is_some()));
    }

    // Drafts are never prebuilt
    if preview.is_some() {
        return render_post(&state, &slug, preview.as_deref()).await;
    }

    let prebuilt = state.public_dir().join("post").join(&slug).join("index.html");
    if let Ok(html) = tokio::fs::read_to_string(&prebuilt).await {
        return Html(html).into_response();
    }

    tracing::debug!("Post {} is not prebuilt, serving the loading page", slug);
    html_response(StatusCode::OK, pages.loading())
}

/// A post page rendered on demand
async fn render_post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Response {
    let preview = preview_ref(&jar);
    if !is_valid_slug(&slug) {
        return html_response(
            StatusCode::NOT_FOUND,
            state.generator.pages().not_found(preview.is_some()),
        );
    }
    render_post(&state, &slug, preview.as_deref()).await
}

async fn render_post(state: &ServerState, slug: &str, preview: Option<&str>) -> Response {
    let pages = state.generator.pages();
    tracing::debug!("Rendering post {} on demand", slug);
    match pages.load_post(state.source.as_ref(), slug, preview).await {
        Ok((post, navigation)) => html_response(
            StatusCode::OK,
            pages.post_page(&post, &navigation, preview.is_some()),
        ),
        Err(e) => failure(state, &e, preview.is_some(), true),
    }
}

#[derive(Debug, Deserialize)]
struct PostsQuery {
    cursor: Option<String>,
}

/// Next page of the listing as JSON
async fn posts_api_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PostsQuery>,
) -> Response {
    let Some(cursor) = query.cursor.filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "missing cursor" })),
        )
            .into_response();
    };

    let mut feed = FeedState::from_cursor(Cursor::new(cursor));
    match feed
        .load_more(state.source.as_ref(), state.generator.pages().formatter())
        .await
    {
        Ok(_) => Json(feed).into_response(),
        Err(e) => {
            tracing::warn!("Load more failed: {}", e);
            (
                status_for(&e),
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    token: Option<String>,
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

/// Enter preview mode and redirect to the previewed document
async fn preview_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PreviewQuery>,
    jar: CookieJar,
) -> Response {
    let config = &state.app.config;
    let Some(token) = query.token.filter(|t| !t.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing preview token").into_response();
    };

    let mut location = url_for(config, "/");
    if let Some(id) = query.document_id.as_deref() {
        match state.source.get_by_id(id, Some(&token)).await {
            Ok(raw) => match Post::project(&raw) {
                Ok(post) => location = url_for(config, &post.path()),
                Err(e) => tracing::warn!("Previewed document is not a post: {}", e),
            },
            Err(e) => tracing::warn!("Failed to resolve previewed document {}: {}", id, e),
        }
    }

    tracing::info!("Entering preview mode");
    let cookie = Cookie::build((PREVIEW_COOKIE, token))
        .path("/")
        .http_only(true);
    (jar.add(cookie), Redirect::to(&location)).into_response()
}

async fn exit_preview_handler(
    State(state): State<Arc<ServerState>>,
    jar: CookieJar,
) -> Response {
    tracing::info!("Leaving preview mode");
    let jar = jar.remove(Cookie::build(PREVIEW_COOKIE).path("/"));
    (jar, Redirect::to(&url_for(&state.app.config, "/"))).into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::raw_post;
    use crate::source::FixtureSource;
    use axum::body::to_bytes;
    use axum::http::header;

    fn state(dir: &std::path::Path) -> Arc<ServerState> {
        let app = SpaceTraveling::with_config(dir, SiteConfig::default());
        let source = FixtureSource::new(vec![
            raw_post("A", "primeiro", Some("2021-03-25T19:25:28+0000"), "2021-03-25T19:25:28+0000"),
            raw_post("B", "segundo", Some("2021-04-02T08:00:00+0000"), "2021-04-02T08:00:00+0000"),
        ]);
        Arc::new(ServerState::new(&app, Arc::new(source)).unwrap())
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// A jar as extracted from a request carrying the preview cookie
    fn preview_jar() -> CookieJar {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("{}=preview-ref", PREVIEW_COOKIE).parse().unwrap(),
        );
        CookieJar::from_headers(&headers)
    }

    #[tokio::test]
    async fn test_index() {
        let dir = tempfile::tempdir().unwrap();
        let response = index_handler(State(state(dir.path())), CookieJar::new()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;
        assert!(html.contains("Title of primeiro"));
        assert!(!html.contains("exit-preview"));
    }

    #[tokio::test]
    async fn test_index_in_preview() {
        let dir = tempfile::tempdir().unwrap();
        let response = index_handler(State(state(dir.path())), preview_jar()).await;
        assert!(body(response).await.contains("/api/exit-preview"));
    }

    #[tokio::test]
    async fn test_post_not_prebuilt_serves_loading_page() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let response = post_handler(
            State(state.clone()),
            Path("segundo".to_string()),
            CookieJar::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;
        assert!(html.contains("Carregando..."));
        assert!(html.contains(r#"data-endpoint="/api/post/""#));
        assert!(!html.contains("Title of segundo"));

        // What the loading page fetches
        let response = render_post_handler(
            State(state),
            Path("segundo".to_string()),
            CookieJar::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("<h1>Title of segundo</h1>"));
    }

    #[tokio::test]
    async fn test_post_prebuilt_and_preview() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let prebuilt = dir.path().join("public/post/segundo");
        std::fs::create_dir_all(&prebuilt).unwrap();
        std::fs::write(prebuilt.join("index.html"), "prebuilt page").unwrap();

        let response = post_handler(
            State(state.clone()),
            Path("segundo".to_string()),
            CookieJar::new(),
        )
        .await;
        assert_eq!(body(response).await, "prebuilt page");

        // Preview always renders fresh content
        let response =
            post_handler(State(state), Path("segundo".to_string()), preview_jar()).await;
        let html = body(response).await;
        assert!(html.contains("<h1>Title of segundo</h1>"));
        assert!(html.contains("/api/exit-preview"));
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let response = render_post_handler(
            State(state.clone()),
            Path("nope".to_string()),
            CookieJar::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body(response).await.contains("Post não encontrado"));

        let response =
            post_handler(State(state.clone()), Path("..".to_string()), CookieJar::new()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            render_post_handler(State(state), Path("..".to_string()), CookieJar::new()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_posts_api() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let first = state
            .generator
            .pages()
            .first_page(state.source.as_ref(), None)
            .await
            .unwrap();
        let cursor = first.next_page().unwrap().to_string();

        let response = posts_api_handler(
            State(state.clone()),
            Query(PostsQuery {
                cursor: Some(cursor),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body(response).await).unwrap();
        assert_eq!(json["results"][0]["uid"], "segundo");
        assert_eq!(json["results"][0]["display_date"], "02 abr 2021");
        assert!(json["next_page"].is_null());

        let response = posts_api_handler(State(state.clone()), Query(PostsQuery { cursor: None })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = posts_api_handler(
            State(state),
            Query(PostsQuery {
                cursor: Some("garbage".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_preview_cookie_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let response = preview_handler(
            State(state.clone()),
            Query(PreviewQuery {
                token: Some("preview-ref".to_string()),
                document_id: Some("B".to_string()),
            }),
            CookieJar::new(),
        )
        .await;
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/post/segundo/");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("io.prismic.preview=preview-ref"));

        let response = exit_preview_handler(State(state), preview_jar()).await;
        assert_eq!(response.headers()[header::LOCATION], "/");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("io.prismic.preview="));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("como-utilizar-hooks"));
        assert!(!is_valid_slug(".."));
        assert!(!is_valid_slug(""));
    }
}
