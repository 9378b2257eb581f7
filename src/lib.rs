//! space-traveling: a blog generator and preview server backed by a headless CMS
//!
//! Posts are fetched from a Prismic-compatible content API (or a local
//! fixture file), projected into display records and rendered with Tera
//! templates embedded in the binary.

pub mod cache;
pub mod commands;
pub mod comments;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod navigation;
pub mod server;
pub mod source;
pub mod templates;

pub use error::Error;

use anyhow::Result;
use std::path::{Path, PathBuf};

use config::{SiteConfig, SourceKind};
use helpers::DateFormatter;
use i18n::I18n;
use source::{ContentSource, FixtureSource, PrismicSource};

/// Configuration file, relative to the site directory
pub const CONFIG_FILE: &str = "_config.yml";

/// The main application
#[derive(Clone)]
pub struct SpaceTraveling {
    /// Site configuration
    pub config: SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl SpaceTraveling {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            SiteConfig::load(&config_path)?
        } else {
            let mut config = SiteConfig::default();
            config.apply_env();
            config
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// Build the content source the configuration names
    pub fn source(&self) -> Result<Box<dyn ContentSource>> {
        Ok(match self.config.source.kind {
            SourceKind::Prismic => Box::new(PrismicSource::new(&self.config.source)?),
            SourceKind::Fixture => {
                Box::new(FixtureSource::load(self.fixture_path())?)
            }
        })
    }

    /// Fixture file of the offline source
    pub fn fixture_path(&self) -> PathBuf {
        self.base_dir.join(&self.config.source.fixture)
    }

    /// UI strings of the site language, with the site's overrides
    pub fn i18n(&self) -> Result<I18n> {
        let mut i18n = I18n::new(&self.config.language);
        i18n.load_overrides(self.base_dir.join(&self.config.languages_dir))?;
        Ok(i18n)
    }

    pub fn formatter(&self) -> Result<DateFormatter> {
        DateFormatter::from_config(&self.config)
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }

    /// Generate the static site
    pub async fn generate(&self, force: bool) -> Result<()> {
        commands::generate::run(self, force).await
    }

    /// Clean the public directory and the build cache
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = SpaceTraveling::new(dir.path()).unwrap();
        assert_eq!(app.config.title, "Space Traveling");
        assert_eq!(app.public_dir, dir.path().join("public"));
        assert_eq!(app.fixture_path(), dir.path().join("fixtures/posts.json"));
    }

    #[test]
    fn test_missing_fixture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.source.kind = SourceKind::Fixture;
        let app = SpaceTraveling::with_config(dir.path(), config);
        assert!(app.source().is_err());
    }
}
