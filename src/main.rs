//! Video Catalog CLI
//!
//! Front-end for the library service: populate the index, enrich entries
//! with probed metadata and generate thumbnails.

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use video_catalog::{LibraryConfig, LibraryError, PopulateOutcome, VideoLibrary};

/// Video library indexer and thumbnailer
#[derive(Parser)]
#[command(name = "video_catalog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the JSON configuration file
    #[arg(short = 'c', long, default_value = "config.json", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Populate the library index, preferring the cache snapshot
    Scan {
        /// Ignore the cache and re-walk every root
        #[arg(short = 'f', long)]
        force: bool,

        /// Print the resulting index as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe video details, for the whole library or a single entry
    Probe {
        /// Root, directory and file name of a single entry;
        /// omit to enrich the whole library
        #[arg(num_args = 3, value_names = ["ROOT", "DIR", "NAME"])]
        entry: Vec<String>,
    },

    /// Generate a thumbnail for one video
    Thumb {
        /// Full path of the video, must live under a configured root
        path: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match LibraryConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("could not read config {:?}: {}", cli.config, e);
            return ExitCode::FAILURE;
        }
    };

    let library = VideoLibrary::new(config);
    let result = match cli.command {
        Commands::Scan { force, json } => scan(&library, force, json),
        Commands::Probe { entry } => probe(&library, &entry),
        Commands::Thumb { path } => thumb(&library, &path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn scan(library: &VideoLibrary, force: bool, json: bool) -> Result<(), LibraryError> {
    let outcome = library.populate_library(force)?;
    match outcome {
        PopulateOutcome::AlreadyRunning => info!("populate already in progress, request dropped"),
        PopulateOutcome::LoadedFromCache => info!("index loaded from cache"),
        PopulateOutcome::FreshWalk => info!("index rebuilt from a fresh walk"),
    }

    if outcome == PopulateOutcome::FreshWalk && library.config().stat_videos {
        let report = library.probe_all()?;
        info!(
            "enriched {} entries ({} checkpoints)",
            report.probed, report.checkpoints
        );
    }

    let index = library.get_libraries();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&index).map_err(std::io::Error::other)?
        );
    } else {
        println!("Scan completed:");
        println!("  Roots: {}", index.iter().count());
        println!("  Entries: {}", index.total_entries());
        println!("  Unprobed: {}", index.unprobed_keys().len());
    }
    Ok(())
}

fn probe(library: &VideoLibrary, entry: &[String]) -> Result<(), LibraryError> {
    if library.populate_library(false)? == PopulateOutcome::AlreadyRunning {
        info!("populate already in progress, probing what is indexed so far");
    }

    match entry {
        [root, dir, name] => match library.probe_one(root, dir, name)? {
            Some(entry) => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&entry).map_err(std::io::Error::other)?
                );
            }
            None => println!("No such entry: {} / {} / {}", root, dir, name),
        },
        [] => {
            let report = library.probe_all()?;
            println!(
                "Probed {} entries ({} checkpoints written)",
                report.probed, report.checkpoints
            );
        }
        _ => unreachable!("clap enforces exactly zero or three values"),
    }
    Ok(())
}

fn thumb(library: &VideoLibrary, path: &str) -> Result<(), LibraryError> {
    if !library.is_path_valid(path) {
        println!("Path is outside the configured roots or does not exist: {}", path);
        return Ok(());
    }

    match library.take_screenshots(path) {
        Ok(thumb) => {
            println!("{}", thumb.display());
            Ok(())
        }
        Err(LibraryError::ThumbnailLocked(path)) => {
            println!("Thumbnail generation is already in progress for {:?}", path);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
