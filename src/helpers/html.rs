//! HTML helper functions

/// Generate Open Graph meta tags
pub fn open_graph(
    title: &str,
    description: &str,
    url: &str,
    image: Option<&str>,
    site_name: &str,
) -> String {
    let mut tags = vec![
        r#"<meta property="og:type" content="article">"#.to_string(),
        format!(
            r#"<meta property="og:title" content="{}">"#,
            html_escape(title)
        ),
        format!(r#"<meta property="og:url" content="{}">"#, html_escape(url)),
        format!(
            r#"<meta property="og:site_name" content="{}">"#,
            html_escape(site_name)
        ),
    ];

    if !description.is_empty() {
        tags.push(format!(
            r#"<meta property="og:description" content="{}">"#,
            html_escape(description)
        ));
    }

    if let Some(img) = image.filter(|i| !i.is_empty()) {
        tags.push(format!(
            r#"<meta property="og:image" content="{}">"#,
            html_escape(img)
        ));
    }

    tags.join("\n")
}

/// Generate meta generator tag
pub fn meta_generator() -> String {
    format!(
        r#"<meta name="generator" content="space-traveling {}">"#,
        env!("CARGO_PKG_VERSION")
    )
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_open_graph() {
        let tags = open_graph(
            "Como utilizar Hooks",
            "Pensando em sincronização",
            "https://spacetraveling.dev/post/como-utilizar-hooks/",
            Some("https://images.prismic.io/banner.png"),
            "spacetraveling",
        );
        assert!(tags.contains(r#"og:title" content="Como utilizar Hooks""#));
        assert!(tags.contains("og:description"));
        assert!(tags.contains("og:image"));

        let bare = open_graph("t", "", "u", Some(""), "s");
        assert!(!bare.contains("og:description"));
        assert!(!bare.contains("og:image"));
    }

    #[test]
    fn test_meta_generator() {
        assert!(meta_generator().contains("space-traveling"));
    }
}
