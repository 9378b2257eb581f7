//! utterances comment widget

use crate::config::CommentsConfig;
use crate::helpers::html_escape;

pub const UTTERANCES_SCRIPT: &str = "https://utteranc.es/client.js";

/// Id of the container the widget script is injected into
pub const MOUNT_ID: &str = "inject-comment";

pub fn is_enabled(config: &CommentsConfig) -> bool {
    !config.repo.trim().is_empty()
}

/// Mount point plus the utterances script, or `None` when comments are off
pub fn render(config: &CommentsConfig) -> Option<String> {
    if !is_enabled(config) {
        return None;
    }

    Some(format!(
        r#"<div id="{}"><script src="{}" repo="{}" issue-term="{}" label="{}" theme="{}" crossorigin="{}" async></script></div>"#,
        MOUNT_ID,
        UTTERANCES_SCRIPT,
        html_escape(config.repo.trim()),
        html_escape(&config.issue_term),
        html_escape(&config.label),
        html_escape(&config.theme),
        html_escape(&config.crossorigin),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_repo() {
        let config = CommentsConfig::default();
        assert!(!is_enabled(&config));
        assert_eq!(render(&config), None);
    }

    #[test]
    fn test_render() {
        let config = CommentsConfig {
            repo: "someone/blog-comments".to_string(),
            ..CommentsConfig::default()
        };
        let html = render(&config).unwrap();

        assert!(html.starts_with(r#"<div id="inject-comment"><script src="https://utteranc.es/client.js""#));
        assert!(html.contains(r#"repo="someone/blog-comments""#));
        assert!(html.contains(r#"issue-term="pathname""#));
        assert!(html.contains(r#"label="comment :speech_balloon:""#));
        assert!(html.contains(r#"theme="photon-dark""#));
        assert!(html.contains(r#"crossorigin="anonymous""#));
        assert_eq!(html.matches("<script").count(), 1);
    }
}
