use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::utils::constants::DEFAULT_DATABASE_FILE;

#[derive(Parser)]
#[command(name = "ghcn-weather-api")]
#[command(about = "Station weather data ingestion and query API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load an observation file into the database and rebuild the yearly summary
    Ingest {
        #[arg(short, long, help = "Input observation file")]
        input_file: PathBuf,

        #[arg(short, long, default_value = DEFAULT_DATABASE_FILE)]
        database: PathBuf,

        #[arg(
            short,
            long,
            help = "Station identifier [default: derived from the input file name]"
        )]
        station_id: Option<String>,
    },

    /// Serve the HTTP query API over an ingested database
    Serve {
        #[arg(short, long, default_value = DEFAULT_DATABASE_FILE)]
        database: PathBuf,

        #[arg(short, long, default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
    },
}
