//! Structured text (rich text) to HTML

use serde::Deserialize;

use super::RichTextFragment;
use crate::helpers::html_escape;

/// An inline annotation over a character range of a block's text
#[derive(Debug, Clone, Deserialize)]
struct Span {
    start: usize,
    end: usize,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<SpanData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SpanData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

impl Span {
    fn open_tag(&self) -> String {
        let data = self.data.clone().unwrap_or_default();
        match self.kind.as_str() {
            "strong" => "<strong>".to_string(),
            "em" => "<em>".to_string(),
            "hyperlink" => {
                let href = html_escape(data.url.as_deref().unwrap_or("#"));
                match data.target.as_deref() {
                    Some(target) => format!(
                        r#"<a href="{}" target="{}" rel="noopener noreferrer">"#,
                        href,
                        html_escape(target)
                    ),
                    None => format!(r#"<a href="{}">"#, href),
                }
            }
            "label" => format!(
                r#"<span class="{}">"#,
                html_escape(data.label.as_deref().unwrap_or(""))
            ),
            _ => "<span>".to_string(),
        }
    }

    fn close_tag(&self) -> &'static str {
        match self.kind.as_str() {
            "strong" => "</strong>",
            "em" => "</em>",
            "hyperlink" => "</a>",
            _ => "</span>",
        }
    }
}

/// Render a sequence of structured-text blocks to HTML.
///
/// Consecutive list items are grouped into a single `<ul>` / `<ol>`.
pub fn render_rich_text(fragments: &[RichTextFragment]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for fragment in fragments {
        let list = match fragment.kind() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list;
        }

        html.push_str(&render_block(fragment));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn render_block(fragment: &RichTextFragment) -> String {
    let raw = fragment.raw();
    match fragment.kind() {
        kind @ ("heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6") => {
            let level = &kind["heading".len()..];
            format!("<h{}>{}</h{}>", level, render_inline(fragment), level)
        }
        "preformatted" => format!("<pre>{}</pre>", render_inline(fragment)),
        "list-item" | "o-list-item" => format!("<li>{}</li>", render_inline(fragment)),
        "image" => {
            let url = raw.get("url").and_then(|v| v.as_str()).unwrap_or("");
            let alt = raw.get("alt").and_then(|v| v.as_str()).unwrap_or("");
            format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                html_escape(url),
                html_escape(alt)
            )
        }
        "embed" => {
            let oembed = raw.get("oembed");
            let embed_html = oembed
                .and_then(|o| o.get("html"))
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let embed_url = oembed
                .and_then(|o| o.get("embed_url"))
                .and_then(|v| v.as_str())
                .unwrap_or("");
            format!(
                r#"<div data-oembed="{}">{}</div>"#,
                html_escape(embed_url),
                embed_html
            )
        }
        _ => format!("<p>{}</p>", render_inline(fragment)),
    }
}

/// Render a block's text with its spans applied
fn render_inline(fragment: &RichTextFragment) -> String {
    let chars: Vec<char> = fragment.text().chars().collect();
    let mut spans: Vec<Span> = fragment
        .raw()
        .get("spans")
        .cloned()
        .and_then(|s| serde_json::from_value(s).ok())
        .unwrap_or_default();
    spans.retain(|s| s.start < s.end);
    // Outer spans open first
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::new();
    let mut open: Vec<&Span> = Vec::new();

    for i in 0..=chars.len() {
        // Close spans ending here; reopen the ones closed only to keep nesting valid
        if open.iter().any(|s| s.end <= i) {
            let mut reopen = Vec::new();
            while let Some(span) = open.pop() {
                out.push_str(span.close_tag());
                if span.end > i {
                    reopen.push(span);
                }
                if !open.iter().any(|s| s.end <= i) {
                    break;
                }
            }
            for span in reopen.into_iter().rev() {
                out.push_str(&span.open_tag());
                open.push(span);
            }
        }

        if i == chars.len() {
            break;
        }

        for span in spans.iter().filter(|s| s.start == i) {
            out.push_str(&span.open_tag());
            open.push(span);
        }

        match chars[i] {
            '\n' => out.push_str("<br />"),
            c => {
                let mut buf = [0u8; 4];
                out.push_str(&html_escape(c.encode_utf8(&mut buf)));
            }
        }
    }

    while let Some(span) = open.pop() {
        out.push_str(span.close_tag());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragments(values: Vec<serde_json::Value>) -> Vec<RichTextFragment> {
        values.into_iter().map(RichTextFragment).collect()
    }

    #[test]
    fn test_paragraphs_and_headings() {
        let html = render_rich_text(&fragments(vec![
            json!({ "type": "heading2", "text": "Title", "spans": [] }),
            json!({ "type": "paragraph", "text": "Hello", "spans": [] }),
        ]));
        assert_eq!(html, "<h2>Title</h2><p>Hello</p>");
    }

    #[test]
    fn test_list_items_grouped() {
        let html = render_rich_text(&fragments(vec![
            json!({ "type": "list-item", "text": "a", "spans": [] }),
            json!({ "type": "list-item", "text": "b", "spans": [] }),
            json!({ "type": "o-list-item", "text": "c", "spans": [] }),
            json!({ "type": "paragraph", "text": "d", "spans": [] }),
        ]));
        assert_eq!(
            html,
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol><p>d</p>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_rich_text(&fragments(vec![
            json!({ "type": "paragraph", "text": "<script>alert(1)</script> & co" }),
        ]));
        assert_eq!(
            html,
            "<p>&lt;script&gt;alert(1)&lt;/script&gt; &amp; co</p>"
        );
    }

    #[test]
    fn test_spans() {
        let html = render_rich_text(&fragments(vec![json!({
            "type": "paragraph",
            "text": "Read the docs now",
            "spans": [
                { "start": 0, "end": 4, "type": "strong" },
                { "start": 9, "end": 13, "type": "hyperlink",
                  "data": { "url": "https://example.com", "target": "_blank" } }
            ]
        })]));
        assert_eq!(
            html,
            r#"<p><strong>Read</strong> the <a href="https://example.com" target="_blank" rel="noopener noreferrer">docs</a> now</p>"#
        );
    }

    #[test]
    fn test_overlapping_spans_stay_nested() {
        let html = render_rich_text(&fragments(vec![json!({
            "type": "paragraph",
            "text": "abcd",
            "spans": [
                { "start": 0, "end": 2, "type": "strong" },
                { "start": 1, "end": 4, "type": "em" }
            ]
        })]));
        assert_eq!(html, "<p><strong>a<em>b</em></strong><em>cd</em></p>");
    }

    #[test]
    fn test_newlines_and_images() {
        let html = render_rich_text(&fragments(vec![
            json!({ "type": "preformatted", "text": "line1\nline2", "spans": [] }),
            json!({ "type": "image", "url": "https://img/x.png", "alt": "An \"image\"" }),
        ]));
        assert_eq!(
            html,
            r#"<pre>line1<br />line2</pre><p class="block-img"><img src="https://img/x.png" alt="An &quot;image&quot;" /></p>"#
        );
    }
}
