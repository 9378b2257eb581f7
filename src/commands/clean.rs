//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::cache::CACHE_DIR;
use crate::SpaceTraveling;

/// Clean the public directory and the build cache
pub fn run(app: &SpaceTraveling) -> Result<()> {
    if app.public_dir.exists() {
        fs::remove_dir_all(&app.public_dir)?;
        tracing::info!("Deleted: {:?}", app.public_dir);
    }

    let cache_dir = app.base_dir.join(CACHE_DIR);
    if cache_dir.exists() {
        fs::remove_dir_all(&cache_dir)?;
        tracing::info!("Deleted: {:?}", cache_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_clean() {
        let dir = tempfile::tempdir().unwrap();
        let app = SpaceTraveling::with_config(dir.path(), SiteConfig::default());
        fs::create_dir_all(app.public_dir.join("post/a")).unwrap();
        fs::create_dir_all(dir.path().join(CACHE_DIR)).unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Keep\n").unwrap();

        run(&app).unwrap();
        assert!(!app.public_dir.exists());
        assert!(!dir.path().join(CACHE_DIR).exists());
        assert!(dir.path().join("_config.yml").exists());

        // Nothing left to clean
        run(&app).unwrap();
    }
}
