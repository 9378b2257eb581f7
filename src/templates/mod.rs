//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{render_rich_text, ContentSection, EditNotice, RichTextFragment};
use crate::helpers::{html_escape, meta_generator, url_for};

/// Template renderer with the embedded templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Keep `/` unescaped so paths and URLs stay readable
        tera.set_escape_fn(html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("space/layout.html")),
            ("index.html", include_str!("space/index.html")),
            ("post.html", include_str!("space/post.html")),
            ("loading.html", include_str!("space/loading.html")),
            ("not_found.html", include_str!("space/not_found.html")),
            ("unavailable.html", include_str!("space/unavailable.html")),
        ])?;

        tera.register_filter("rich_text", rich_text_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: structured text blocks to HTML
fn rich_text_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let fragments: Vec<RichTextFragment> = serde_json::from_value(value.clone())
        .map_err(|e| tera::Error::msg(format!("rich_text: expected a list of blocks: {}", e)))?;
    Ok(tera::Value::String(render_rich_text(&fragments)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub logo: String,
    pub url: String,
    /// Root path, always ending with `/`
    pub root: String,
    pub generator: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            logo: url_for(config, &config.logo),
            url: config.url.clone(),
            root: url_for(config, "/"),
            generator: meta_generator(),
        }
    }
}

/// Everything the post template shows about a post
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub uid: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: String,
    pub display_date: String,
    pub word_count: usize,
    /// e.g. `4 min`
    pub reading_time: String,
    pub edit_notice: Option<EditNotice>,
    pub content: Vec<ContentSection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_templates_parse() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_escaping_keeps_paths() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(&SiteConfig::default()));
        context.insert("t", &HashMap::from([("not_found".to_string(), "<b>".to_string())]));
        context.insert("preview", &false);

        let html = renderer.render("not_found.html", &context).unwrap();
        assert!(html.contains(r#"<a href="/">"#));
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn test_rich_text_filter() {
        let value = json!([{ "type": "paragraph", "text": "a < b", "spans": [] }]);
        let html = rich_text_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(html, tera::Value::String("<p>a &lt; b</p>".to_string()));

        assert!(rich_text_filter(&json!("text"), &HashMap::new()).is_err());
    }

    #[test]
    fn test_site_data_paths() {
        let config = SiteConfig {
            root: "/blog".to_string(),
            ..SiteConfig::default()
        };
        let site = SiteData::from_config(&config);
        assert_eq!(site.root, "/blog/");
        assert_eq!(site.logo, "/blog/images/logo.svg");
    }
}
