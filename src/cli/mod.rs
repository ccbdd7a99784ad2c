use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};

use crate::{catalog::store::Catalog, config, http::server::HttpServer, signer::S3UrlSigner};

#[derive(Parser)]
#[command(name = "audiogate")]
#[command(version = "0.1")]
#[command(about = "Gatekeeper API for a privately stored music library")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the gatekeeper HTTP server
    Serve,
    /// Create the catalog schema in the configured database
    Init,
    /// Print the public song catalog
    List,
}

/// Entrypoint for CLI
pub fn run() {
    env_logger::init();

    let cli = Cli::parse();

    let cfg = config::Config::load(&cli.config).expect("Failed to load config");

    match &cli.command {
        Commands::Serve => {
            let catalog =
                Catalog::new(&cfg.database).expect("Failed to open the catalog database");
            let signer =
                S3UrlSigner::new(&cfg.object_store).expect("Failed to set up the URL signer");

            let http_server = HttpServer::new(
                catalog,
                Arc::new(signer),
                cfg.stream.url_ttl_secs,
                cfg.http,
            );

            println!(
                "Gatekeeper API running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::Init => {
            // opening the pool creates the tables if they are missing
            Catalog::new(&cfg.database).expect("Failed to initialize the catalog database");
            println!("Catalog schema ready");
        }

        Commands::List => {
            let catalog =
                Catalog::new(&cfg.database).expect("Failed to open the catalog database");

            let songs = catalog.list_songs().expect("Failed to list songs");

            if songs.is_empty() {
                println!("Catalog is empty");
            }
            for song in songs {
                println!("{:>5}  {} - {}", song.id, song.artist, song.title);
            }
        }
    }
}
