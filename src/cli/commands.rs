use crate::api;
use crate::cli::args::{Cli, Commands};
use crate::error::{Result, WeatherError};
use crate::readers::ObservationReader;
use crate::store::Database;
use crate::utils::constants::SUMMARY_PREVIEW_ROWS;
use crate::utils::progress::ProgressReporter;
use tracing::Level;

pub async fn run(cli: Cli) -> Result<()> {
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(log_level)
            .finish(),
    )
    .map_err(|e| WeatherError::Server(e.to_string()))?;

    match cli.command {
        Commands::Ingest {
            input_file,
            database,
            station_id,
        } => {
            println!("Ingesting observation data...");
            println!("Input file: {}", input_file.display());
            println!("Database: {}", database.display());

            let reader = ObservationReader::new();
            let station_id = match station_id {
                Some(id) => id,
                None => reader.extract_station_id_from_path(&input_file)?,
            };
            println!("Station: {}", station_id);

            let progress = ProgressReporter::new_spinner("Loading observations...", false);

            let observations =
                reader.read_observations_with_station_id(&input_file, &station_id)?;
            progress.set_message("Writing to database...");

            let mut db = Database::open(&database)?;
            let loaded = db.replace_observations(&observations)?;
            let duplicates = db.deduplicate()?;
            let years = db.rebuild_summary()?;

            progress.finish_with_message(&format!(
                "Ingested {} observations for station {}",
                loaded - duplicates,
                station_id
            ));

            println!(
                "\nLoaded {} rows, removed {} duplicates, summarized {} station-years",
                loaded, duplicates, years
            );

            println!("\nYearly summary (first {} rows):", SUMMARY_PREVIEW_ROWS);
            for (i, summary) in db
                .summary_preview(SUMMARY_PREVIEW_ROWS)?
                .iter()
                .enumerate()
            {
                println!("{}. {}", i + 1, summary.preview_line());
            }

            println!("\nIngest complete!");
        }

        Commands::Serve { database, bind } => {
            let db = Database::open(&database)?;
            if !db.is_ingested()? {
                return Err(WeatherError::MissingData(format!(
                    "no weather data in {}; run `ingest` first",
                    database.display()
                )));
            }

            println!("Serving weather API on http://{}", bind);
            api::serve(db, bind).await?;
        }
    }

    Ok(())
}
