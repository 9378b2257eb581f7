//! URL helper functions

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/como-utilizar-hooks/") // -> "/blog/post/como-utilizar-hooks/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }

    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/x/") // -> "https://spacetraveling.dev/post/x/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://spacetraveling.dev/".to_string(),
            root: "/blog/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/post/a/"), "/blog/post/a/");
        assert_eq!(url_for(&config, "images/logo.svg"), "/blog/images/logo.svg");
        assert_eq!(url_for(&config, "/"), "/blog/");
        assert_eq!(
            url_for(&config, "https://images.prismic.io/x.png"),
            "https://images.prismic.io/x.png"
        );
    }

    #[test]
    fn test_url_for_default_root() {
        let config = SiteConfig::default();
        assert_eq!(url_for(&config, "/post/a/"), "/post/a/");
        assert_eq!(url_for(&config, ""), "/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/post/a/"),
            "https://spacetraveling.dev/blog/post/a/"
        );
    }
}
