//! List site content

use anyhow::Result;

use crate::content::ReadingMetrics;
use crate::feed::{Feed, FeedEntry, FeedState};
use crate::generator::post_output_path;
use crate::source::ContentSource;
use crate::SpaceTraveling;

/// List site content by type
pub async fn run(app: &SpaceTraveling, content_type: &str) -> Result<()> {
    let source = app.source()?;
    for line in lines(app, source.as_ref(), content_type).await? {
        println!("{}", line);
    }
    Ok(())
}

async fn lines(
    app: &SpaceTraveling,
    source: &dyn ContentSource,
    content_type: &str,
) -> Result<Vec<String>> {
    let mut out = Vec::new();
    match content_type {
        "post" | "posts" => {
            let posts = all_posts(app, source).await?;
            out.push(format!("Posts ({}):", posts.len()));
            for entry in &posts {
                let metrics = ReadingMetrics::estimate(&entry.post);
                out.push(format!(
                    "  {} - {} [{}] {} min",
                    entry.display_date, entry.title, entry.uid, metrics.minutes
                ));
            }
        }
        "route" | "routes" => {
            let posts = all_posts(app, source).await?;
            let prebuilt = if app.config.prebuild.all {
                posts.len()
            } else {
                app.config.prebuild.page_size
            };
            out.push(format!("Routes ({}):", posts.len() + 1));
            out.push("  / -> index.html".to_string());
            for (i, entry) in posts.iter().enumerate() {
                if i < prebuilt {
                    out.push(format!("  {} -> {}", entry.path, post_output_path(&entry.post)));
                } else {
                    out.push(format!("  {} (on demand)", entry.path));
                }
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, route", content_type);
        }
    }
    Ok(out)
}

/// Walk the whole feed in the order the source returns it
async fn all_posts(app: &SpaceTraveling, source: &dyn ContentSource) -> Result<Vec<FeedEntry>> {
    let formatter = app.formatter()?;
    let first = Feed::fetch_first(
        source,
        &app.config.source.document_type,
        app.config.listing.page_size,
        None,
    )
    .await?;
    let mut state = FeedState::initialize(first, &formatter);
    while state.has_more() {
        state.load_more(source, &formatter).await?;
    }
    Ok(state.entries().to_vec())
}
