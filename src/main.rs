//! CLI entry point for space-traveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use space_traveling::commands;
use space_traveling::SpaceTraveling;

#[derive(Parser)]
#[command(name = "space-traveling")]
#[command(version)]
#[command(about = "A blog generator and preview server backed by a headless CMS", long_about = None)]
struct Cli {
    /// Site directory (defaults to the current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site with sample content
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch the configuration and fixture for changes
        #[arg(short, long)]
        watch: bool,

        /// Ignore the build cache and render every page
        #[arg(short, long)]
        force: bool,
    },

    /// Serve the site, rendering posts that were not prebuilt on demand
    #[command(alias = "s")]
    Server {
        /// Listen port
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Bind address
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open the site in a browser once listening
        #[arg(short, long)]
        open: bool,
    },

    /// Remove generated output and the build cache
    Clean,

    /// List posts or routes
    List {
        /// Type of content to list (post, route)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Print the version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "space_traveling=debug,info"
    } else {
        "space_traveling=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::Generate { watch, force } => {
            let app = SpaceTraveling::new(&base_dir)?;
            tracing::info!("Generating static files...");

            app.generate(force).await?;
            println!("Generated successfully!");

            if watch {
                commands::generate::watch(&app).await?;
            }
        }

        Commands::Server { port, ip, open } => {
            let app = SpaceTraveling::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            space_traveling::server::start(&app, &ip, port, open).await?;
        }

        Commands::Clean => {
            let app = SpaceTraveling::new(&base_dir)?;
            app.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let app = SpaceTraveling::new(&base_dir)?;
            commands::list::run(&app, &r#type).await?;
        }

        Commands::Version => {
            println!("space-traveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
