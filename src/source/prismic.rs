//! Prismic REST API client

use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

use super::{ContentSource, Cursor, QueryRequest, QueryResponse};
use crate::config::SourceConfig;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("space-traveling/", env!("CARGO_PKG_VERSION"));

/// How long a fetched master ref is reused before asking the API again
const MASTER_REF_TTL: Duration = Duration::from_secs(5);

/// API entry point response (`GET /api/v2`)
#[derive(Debug, Deserialize)]
struct ApiInfo {
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    value: String,
    #[serde(rename = "isMasterRef", default)]
    is_master: bool,
}

/// Content source backed by a Prismic repository
pub struct PrismicSource {
    endpoint: Url,
    access_token: Option<String>,
    client: reqwest::Client,
    master_ref: Mutex<Option<(Instant, String)>>,
}

impl PrismicSource {
    /// Build a client from the `source` section of the site config
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let endpoint = Url::parse(config.endpoint.trim_end_matches('/'))
            .map_err(|e| Error::SourceUnavailable(format!("invalid endpoint: {}", e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::SourceUnavailable(format!(
                "invalid endpoint: {}",
                endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint,
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            client,
            master_ref: Mutex::new(None),
        })
    }

    /// Resolve the ref to query: an explicit (preview) ref or the master ref
    async fn resolve_ref(&self, content_ref: Option<&str>) -> Result<String> {
        if let Some(content_ref) = content_ref {
            return Ok(content_ref.to_string());
        }

        let mut cached = self.master_ref.lock().await;
        if let Some((fetched_at, value)) = cached.as_ref() {
            if fetched_at.elapsed() < MASTER_REF_TTL {
                return Ok(value.clone());
            }
        }

        let mut url = self.endpoint.clone();
        self.append_token(&mut url);
        let info: ApiInfo = self.get_json(&url).await?;
        let master = info
            .refs
            .into_iter()
            .find(|r| r.is_master)
            .ok_or_else(|| Error::SourceUnavailable("API exposes no master ref".to_string()))?;

        tracing::debug!("Master ref: {}", master.value);
        *cached = Some((Instant::now(), master.value.clone()));
        Ok(master.value)
    }

    fn search_url(&self, request: &QueryRequest, content_ref: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(["documents", "search"]);
        }

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", content_ref);
            pairs.append_pair("q", &request.q_param());
            pairs.append_pair("pageSize", &request.page_size.to_string());
            if let Some(after) = &request.after {
                pairs.append_pair("after", after);
            }
            if let Some(orderings) = request.orderings_param() {
                pairs.append_pair("orderings", &orderings);
            }
        }
        self.append_token(&mut url);
        url
    }

    fn append_token(&self, url: &mut Url) {
        let Some(token) = &self.access_token else {
            return;
        };
        if url.query_pairs().any(|(k, _)| k == "access_token") {
            return;
        }
        url.query_pairs_mut().append_pair("access_token", token);
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &Url) -> Result<T> {
        tracing::debug!("GET {}", redact(url));
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!(
                "HTTP status {} (url: {})",
                status,
                redact(url)
            )));
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl ContentSource for PrismicSource {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let content_ref = self.resolve_ref(request.content_ref.as_deref()).await?;
        let url = self.search_url(request, &content_ref);
        self.get_json(&url).await
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<QueryResponse> {
        let mut url = Url::parse(cursor.as_str())
            .map_err(|e| Error::SourceUnavailable(format!("invalid cursor {}: {}", cursor, e)))?;
        // Cursors may come from clients; never send the token elsewhere
        if url.origin() != self.endpoint.origin() {
            return Err(Error::SourceUnavailable(format!(
                "cursor points outside the repository: {}",
                redact(&url)
            )));
        }
        self.append_token(&mut url);
        self.get_json(&url).await
    }
}

/// Strip the access token before a URL ends up in logs or errors
fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "access_token") {
        return url.to_string();
    }
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == "access_token" {
                (k.into_owned(), "***".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
