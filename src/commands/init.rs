//! Initialize a new site

use anyhow::Result;
use chrono::{Duration, Utc};
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::{SpaceTraveling, CONFIG_FILE};

const CONFIG_TEMPLATE: &str = r#"# Space Traveling configuration

# Site
title: Space Traveling
description: ''
language: pt-BR
timezone: America/Sao_Paulo
logo: /images/logo.svg

# URL
url: http://localhost:4000
root: /

# Directory
public_dir: public
languages_dir: languages

# Content API
source:
  # prismic | fixture
  kind: fixture
  # e.g. https://my-repo.cdn.prismic.io/api/v2
  endpoint: ''
  # Prefer the PRISMIC_ACCESS_TOKEN environment variable
  access_token:
  fixture: fixtures/posts.json
  document_type: posts
  timeout_secs: 10

# Home page
listing:
  page_size: 1
  date_format: dd MMM yyyy

# Post pages rendered ahead of time
prebuild:
  page_size: 2
  all: false

navigation:
  # last_publication_desc | first_publication_asc
  next_ordering: last_publication_desc

edit_notice:
  use_modification_time: false

# utterances comments; leave repo empty to disable
comments:
  repo: ''
  issue_term: pathname
  label: 'comment :speech_balloon:'
  theme: photon-dark
  crossorigin: anonymous

server:
  # Seconds between background regenerations, 0 disables
  revalidate_secs: 600
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("fixtures"))?;
    fs::create_dir_all(target_dir.join("languages"))?;

    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }
    fs::write(&config_path, CONFIG_TEMPLATE)?;

    let fixture = serde_json::to_string_pretty(&sample_documents())?;
    fs::write(target_dir.join("fixtures/posts.json"), fixture)?;

    Ok(())
}

/// Two sample posts in the shape the content API returns
fn sample_documents() -> serde_json::Value {
    let now = Utc::now();
    let created = (now - Duration::days(1)).format("%Y-%m-%dT%H:%M:%S%z").to_string();
    let edited = now.format("%Y-%m-%dT%H:%M:%S%z").to_string();

    json!([
        {
            "id": "hello-world",
            "uid": "hello-world",
            "type": "posts",
            "first_publication_date": created,
            "last_publication_date": created,
            "data": {
                "title": "Hello World",
                "subtitle": "Your very first post",
                "author": "Space Traveler",
                "banner": { "url": "/images/banner.png" },
                "content": [
                    {
                        "heading": "Quick start",
                        "body": [
                            {
                                "type": "paragraph",
                                "text": "Edit fixtures/posts.json or point the source at your CMS.",
                                "spans": []
                            }
                        ]
                    }
                ]
            }
        },
        {
            "id": "second-post",
            "uid": "second-post",
            "type": "posts",
            "first_publication_date": created,
            "last_publication_date": edited,
            "data": {
                "title": "Second post",
                "subtitle": "This one was edited after publishing",
                "author": "Space Traveler",
                "banner": { "url": "/images/banner.png" },
                "content": [
                    {
                        "heading": "Commands",
                        "body": [
                            { "type": "list-item", "text": "space-traveling generate", "spans": [] },
                            { "type": "list-item", "text": "space-traveling server", "spans": [] }
                        ]
                    }
                ]
            }
        }
    ])
}

/// Run the init command with an existing instance
pub fn run(app: &SpaceTraveling) -> Result<()> {
    init_site(&app.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;
    use crate::content::Post;
    use crate::source::FixtureSource;

    #[test]
    fn test_init_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let app = SpaceTraveling::new(dir.path()).unwrap();
        assert_eq!(app.config.source.kind, SourceKind::Fixture);
        assert_eq!(app.config.listing.page_size, 1);
        assert!(app.config.comments.repo.is_empty());

        let fixture = FixtureSource::load(app.fixture_path()).unwrap();
        let posts: Vec<Post> = fixture
            .documents()
            .iter()
            .map(|doc| Post::project(doc).unwrap())
            .collect();
        assert_eq!(posts.len(), 2);
        assert!(posts[1].last_publication_date > posts[1].first_publication_date.unwrap());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "title: Mine\n").unwrap();
        assert!(init_site(dir.path()).is_err());
        assert_eq!(
            fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap(),
            "title: Mine\n"
        );
    }
}
