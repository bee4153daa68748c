use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "envirosense",
    version,
    about = "Current weather and air quality for a location, with a local history."
)]
pub struct Cli {
    /// Config file to use instead of the default one
    #[arg(long, env = "ENVIROSENSE_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch current conditions for a coordinate
    Fetch(FetchArgs),
    /// List saved measurements, newest first
    History {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show one saved measurement in full
    Show { id: i64 },
    /// Delete one saved measurement
    Delete { id: i64 },
    /// Delete every saved measurement
    Clear,
    /// Number of saved measurements
    Count,
    /// Averages over the most recent measurements
    Stats {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Print a saved measurement as shareable text
    Share { id: i64 },
}

impl Command {
    /// Whether the command talks to the weather API.
    pub fn needs_api(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Latitude; falls back to `[location]` in the config
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Longitude; falls back to `[location]` in the config
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
    /// Save the result to the local history
    #[arg(long)]
    pub save: bool,
}

impl FetchArgs {
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fetch_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "envirosense", "fetch", "--lat", "-33.87", "--lon", "151.21", "--save",
        ])
        .unwrap();

        match cli.cmd {
            Command::Fetch(args) => {
                assert_eq!(args.coordinate(), Some((-33.87, 151.21)));
                assert!(args.save);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["envirosense", "fetch", "--lat", "10"]).is_err());
    }

    #[test]
    fn test_stats_default_limit() {
        let cli = Cli::try_parse_from(["envirosense", "stats"]).unwrap();
        assert!(matches!(cli.cmd, Command::Stats { limit: 10 }));
        assert!(!cli.cmd.needs_api());
    }
}
