use clap::Parser;
use cli::{Cli, Command, DbSubCommand};
use dialoguer::Confirm;
use std::sync::Arc;

use config::Config;
use dashboard::Dashboard;
use store::PgStore;

mod aggregate;
mod cache;
mod cli;
mod config;
mod dashboard;
mod db;
mod error;
mod models;
mod query;
mod repos;
mod server;
mod shaping;
mod store;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Cli::parse();
    let config = Config::from_env()?;
    let pool = db::pool(&config.db);
    let dashboard = Arc::new(Dashboard::new(PgStore::new(pool.clone()), &config));

    match args.cmd {
        Command::Http { address } => server::run(address, dashboard).await,
        Command::Check => {
            if !dashboard.test_connection().await {
                anyhow::bail!("Could not connect to database {:?}", config.db.dbname);
            }
            println!("Connected to database {:?}", config.db.dbname);
        }
        Command::Stats => {
            let stats = dashboard.fetch_database_stats().await.into_result()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Observations(args) => {
            let rows = dashboard
                .fetch_observations(args.from, args.to, args.region_id, args.station_id, args.limit)
                .await
                .into_result()?;
            for row in shaping::shape(rows) {
                println!("{}", serde_json::to_string(&row.to_display_record())?);
            }
        }
        Command::Db(db_cmd) => match db_cmd.cmd {
            DbSubCommand::Migrate => db::migrate(&pool).await?,
            DbSubCommand::Reset { yes } => {
                let confirmed = yes
                    || Confirm::new()
                        .with_prompt(format!(
                            "Drop every table in database {:?}?",
                            config.db.dbname
                        ))
                        .default(false)
                        .interact()?;
                if confirmed {
                    db::reset(&pool).await?;
                } else {
                    log::info!("Reset cancelled");
                }
            }
        },
    }

    Ok(())
}
