mod cli;
mod commands;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use envirosense_core::config::API_KEY_ENV;
use envirosense_core::{AppError, Config};
use envirosense_services::{EnviroRepository, LocalStore, SqliteMeasurementStore};
use envirosense_weather::{Coordinate, FixedLocationProvider, OpenWeatherClient, WeatherError};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = envirosense_core::init() {
        eprintln!("{:#}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    let store = SqliteMeasurementStore::open(config.database_path())
        .map_err(AppError::from)
        .context("Failed to open measurement store")?;
    let api = build_client(&config, cli.cmd.needs_api())?;
    let repo = EnviroRepository::new(api, LocalStore::new(store));

    tracing::debug!("EnviroSense started, data at {}", config.database_path().display());

    match cli.cmd {
        Command::Fetch(args) => {
            let coordinate = args
                .coordinate()
                .or_else(|| config.location.coordinate())
                .map(|(lat, lon)| Coordinate::new(lat, lon));
            let provider = FixedLocationProvider::new(coordinate);
            commands::fetch(&repo, &provider, args.save).await
        }
        Command::History { limit } => commands::history(&repo, limit).await,
        Command::Show { id } => commands::show(&repo, id).await,
        Command::Delete { id } => commands::delete(&repo, id).await,
        Command::Clear => commands::clear(&repo).await,
        Command::Count => commands::count(&repo).await,
        Command::Stats { limit } => commands::stats(&repo, limit).await,
        Command::Share { id } => commands::share(&repo, id).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let (config, _) = match path {
        Some(path) => Config::load_validated_from(path)?,
        None => Config::load_validated()?,
    };
    Ok(config)
}

fn build_client(config: &Config, needs_api: bool) -> Result<OpenWeatherClient> {
    match OpenWeatherClient::from_config(&config.api) {
        Ok(client) => Ok(client),
        // Storage-only commands never reach the API.
        Err(WeatherError::MissingApiKey) if !needs_api => {
            Ok(OpenWeatherClient::new(&config.api, String::new()).map_err(AppError::from)?)
        }
        Err(WeatherError::MissingApiKey) => anyhow::bail!(
            "No OpenWeatherMap API key configured. Set {} or api.api_key in {}.",
            API_KEY_ENV,
            config.config_dir.join("config.toml").display()
        ),
        Err(e) => Err(AppError::from(e).into()),
    }
}

fn report(err: &anyhow::Error) {
    tracing::error!("{:#}", err);

    match err.downcast_ref::<AppError>() {
        Some(app @ AppError::Config(_)) => {
            eprintln!("{}", app.user_message());
            eprintln!("{}", app);
        }
        Some(app) if app.needs_permission() => {
            eprintln!("{}", app.user_message());
            eprintln!("Grant location access, or pass --lat and --lon.");
        }
        Some(app) => {
            eprintln!("{}", app.user_message());
            eprintln!("Try again.");
        }
        None => eprintln!("Error: {:#}", err),
    }
}
