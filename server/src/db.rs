use bb8_postgres::PostgresConnectionManager;
use tokio_postgres::NoTls;

use crate::config::DbConfig;
use crate::error::Result;

pub type Pool = bb8::Pool<PostgresConnectionManager<NoTls>>;
pub type Client<'a> = bb8::PooledConnection<'a, PostgresConnectionManager<NoTls>>;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

const DROP_STMT: &str = "DROP TABLE IF EXISTS \
    observasi_cuaca, stasiun, arah_angin, wilayah, provinsi, refinery_schema_history \
    CASCADE";

/// Builds the pool without connecting. An unreachable store surfaces on
/// checkout as `Error::Connection`, not at startup.
pub fn pool(conf: &DbConfig) -> Pool {
    let mgr = PostgresConnectionManager::new(conf.to_pg_config(), NoTls);

    bb8::Pool::builder()
        .max_size(conf.pool_size)
        .connection_timeout(conf.connect_timeout)
        .build_unchecked(mgr)
}

pub async fn health(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;
    client.simple_query("SELECT 1").await?;
    Ok(())
}

pub async fn migrate(pool: &Pool) -> anyhow::Result<()> {
    let mut conn = pool.dedicated_connection().await?;
    let report = embedded::migrations::runner().run_async(&mut conn).await?;
    for migration in report.applied_migrations() {
        log::info!("Applied migration {}", migration);
    }
    Ok(())
}

pub async fn reset(pool: &Pool) -> anyhow::Result<()> {
    {
        let client = pool.get().await?;
        client.batch_execute(DROP_STMT).await?;
        log::warn!("Dropped all observation tables");
    }
    migrate(pool).await
}
