use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Database settings come from `IKLIM_DB_*` environment variables (or `.env`).
#[derive(Debug, Parser)]
#[command(about = "Iklim weather observation service.")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the JSON API
    Http {
        #[arg(env = "IKLIM_SERVER_ADDRESS", default_value = "127.0.0.1:8000")]
        address: std::net::SocketAddr,
    },
    /// Test the database connection
    Check,
    /// Print database summary statistics
    Stats,
    /// Print observations as JSON lines
    Observations(ObservationArgs),
    Db(DbCommand),
}

#[derive(Debug, Parser)]
pub struct ObservationArgs {
    /// Start date (inclusive)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// End date (inclusive)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    #[arg(long)]
    pub region_id: Option<i32>,
    #[arg(long)]
    pub station_id: Option<i32>,
    #[arg(long)]
    pub limit: Option<i64>,
}

#[derive(Debug, Parser)]
pub struct DbCommand {
    #[command(subcommand)]
    pub cmd: DbSubCommand,
}

#[derive(Debug, Subcommand)]
pub enum DbSubCommand {
    Migrate,
    /// Drop every table and re-run migrations
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_observations() {
        let cli = Cli::try_parse_from([
            "iklim",
            "observations",
            "--from",
            "2024-01-01",
            "--region-id",
            "3",
            "--limit",
            "50",
        ])
        .unwrap();

        match cli.cmd {
            Command::Observations(args) => {
                assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(args.to, None);
                assert_eq!(args.region_id, Some(3));
                assert_eq!(args.limit, Some(50));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_db_reset() {
        let cli = Cli::try_parse_from(["iklim", "db", "reset", "--yes"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Command::Db(DbCommand {
                cmd: DbSubCommand::Reset { yes: true }
            })
        ));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        assert!(Cli::try_parse_from(["iklim", "observations", "--from", "01-2024"]).is_err());
    }
}
