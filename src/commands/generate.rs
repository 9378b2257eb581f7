//! Generate static files

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::fs;
use std::time::Duration;

use crate::cache::CACHE_DIR;
use crate::config::SourceKind;
use crate::generator::{GenerateSummary, Generator};
use crate::{SpaceTraveling, CONFIG_FILE};

/// Generate the static site; `force` ignores the build cache
pub async fn run(app: &SpaceTraveling, force: bool) -> Result<()> {
    run_with_summary(app, force).await.map(|_| ())
}

pub async fn run_with_summary(app: &SpaceTraveling, force: bool) -> Result<GenerateSummary> {
    let start = std::time::Instant::now();

    let source = app.source()?;
    let summary = Generator::new(app)?.generate(source.as_ref(), force).await?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());
    Ok(summary)
}

/// Watch the configuration (and the fixture file) and regenerate on change
pub async fn watch(app: &SpaceTraveling) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            let _ = tx.send(res);
        },
    )?;

    let config_path = app.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    let languages_dir = app.base_dir.join(&app.config.languages_dir);
    if languages_dir.exists() {
        debouncer
            .watcher()
            .watch(&languages_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", languages_dir);
    }

    if app.config.source.kind == SourceKind::Fixture {
        let fixture = app.fixture_path();
        if fixture.exists() {
            debouncer
                .watcher()
                .watch(&fixture, RecursiveMode::NonRecursive)?;
            tracing::debug!("Watching: {:?}", fixture);
        }
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    while let Some(res) = rx.recv().await {
        match res {
            Ok(events) => {
                for event in &events {
                    tracing::info!("File changed: {}", event.path.display());
                }

                // The configuration itself may have changed
                let app = match SpaceTraveling::new(&app.base_dir) {
                    Ok(app) => app,
                    Err(e) => {
                        tracing::error!("Failed to reload configuration: {:#}", e);
                        continue;
                    }
                };
                if let Err(e) = run(&app, false).await {
                    tracing::error!("Generation failed: {:#}", e);
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// Clear the build cache
pub fn clear_cache(app: &SpaceTraveling) -> Result<()> {
    let cache_dir = app.base_dir.join(CACHE_DIR);
    if cache_dir.exists() {
        fs::remove_dir_all(&cache_dir)?;
        tracing::info!("Cache cleared");
    }
    Ok(())
}
