use clap::{Parser, Subcommand};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::config;
use crate::domain::track::TrackId;
use crate::recognition::orchestrator::{self, RecognitionOutcome};
use crate::recognition::provider::AuddProvider;
use crate::storage::operations::Storage;

#[derive(Parser)]
#[command(name = "tunedex")]
#[command(version = "0.1")]
#[command(about = "Music track catalogue with fragment recognition")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run http server hosting the catalogue and recognition endpoints
    Serve,
    /// Add a track to the catalogue
    Add { title: String, artist: String },
    /// Remove a track by id
    Remove { id: i64 },
    /// List catalogued tracks
    List,
    /// Recognize an audio fragment and look it up in the catalogue
    Recognize {
        /// Path to the audio file
        file: PathBuf,
    },
}

fn build_provider(cfg: &config::ProviderConfig) -> AuddProvider {
    let api_token = std::env::var(&cfg.api_key_env)
        .expect("provider API key environment variable is not set");
    AuddProvider::new(cfg, api_token)
}

/// Entrypoint for CLI
pub fn run() {
    env_logger::init();

    let cli = Cli::parse();

    let cfg = config::Config::load(cli.config.to_str().unwrap()).unwrap();

    match &cli.command {
        Commands::Serve {} => {
            println!("Starting HTTP server...");

            let storage =
                Storage::new(&cfg.database).expect("Failed to initialize storage");
            let provider = Arc::new(build_provider(&cfg.provider));

            let http_server = crate::http::server::HttpServer::new(storage, provider, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::Add { title, artist } => {
            let mut storage =
                Storage::new(&cfg.database).expect("Failed to initialize storage");

            let id = storage.add_track(title, artist).unwrap();
            println!("Created track {id}: {title} - {artist}");
        }

        Commands::Remove { id } => {
            let mut storage =
                Storage::new(&cfg.database).expect("Failed to initialize storage");

            storage.remove_track(TrackId(*id)).unwrap();
            println!("Removed track {id}");
        }

        Commands::List {} => {
            let mut storage =
                Storage::new(&cfg.database).expect("Failed to initialize storage");

            let tracks = storage.list_tracks().unwrap();

            if tracks.is_empty() {
                println!("Catalogue is empty");
            }
            for track in tracks {
                println!("{}: {} - {}", track.id, track.title, track.artist);
            }
        }

        Commands::Recognize { file } => {
            let storage = Mutex::new(
                Storage::new(&cfg.database).expect("Failed to initialize storage"),
            );
            let provider = build_provider(&cfg.provider);

            let audio = std::fs::read(file).expect("Failed to read audio file");

            match orchestrator::recognize_fragment(&provider, &storage, &audio).unwrap() {
                RecognitionOutcome::Matched(track) => {
                    println!("Matched track {}: {} - {}", track.id, track.title, track.artist);
                }
                RecognitionOutcome::NotRecognized => {
                    println!("Track not recognized");
                }
                RecognitionOutcome::RecognizedNotCatalogued => {
                    println!("Recognized, but no matching track in catalogue");
                }
            }
        }
    }
}
