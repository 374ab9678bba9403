use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db;
use crate::error::Result;
use crate::models::{
    DatabaseStats, ObservationRow, Province, Region, SampleObservation, StationRow, StationStats,
    WindDirection,
};
use crate::query::ObservationFilter;
use crate::repos;

/// Read access to the observation database. Every call is one logical
/// operation on its own connection.
#[async_trait]
pub trait WeatherStore: Send + Sync {
    async fn ping(&self) -> Result<()>;
    async fn observations(&self, filter: &ObservationFilter) -> Result<Vec<ObservationRow>>;
    async fn sample_observations(&self, limit: i64) -> Result<Vec<SampleObservation>>;
    async fn stations(&self) -> Result<Vec<StationRow>>;
    async fn regions(&self) -> Result<Vec<Region>>;
    async fn provinces(&self) -> Result<Vec<Province>>;
    async fn wind_directions(&self) -> Result<Vec<WindDirection>>;
    async fn database_stats(&self, today: NaiveDate) -> Result<DatabaseStats>;
    async fn available_years(&self) -> Result<Vec<i32>>;
    async fn station_stats(&self, station_id: i32) -> Result<StationStats>;
}

/// Postgres-backed store. Each method checks a connection out of the pool;
/// the checkout guard hands it back when the method returns, on any path.
#[derive(Clone)]
pub struct PgStore {
    pool: db::Pool,
}

impl PgStore {
    pub fn new(pool: db::Pool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl WeatherStore for PgStore {
    async fn ping(&self) -> Result<()> {
        db::health(&self.pool).await
    }

    async fn observations(&self, filter: &ObservationFilter) -> Result<Vec<ObservationRow>> {
        let client = self.pool.get().await?;
        repos::observations::filtered(&client, filter).await
    }

    async fn sample_observations(&self, limit: i64) -> Result<Vec<SampleObservation>> {
        let client = self.pool.get().await?;
        repos::observations::sample(&client, limit).await
    }

    async fn stations(&self) -> Result<Vec<StationRow>> {
        let client = self.pool.get().await?;
        repos::stations::mappable(&client).await
    }

    async fn regions(&self) -> Result<Vec<Region>> {
        let client = self.pool.get().await?;
        repos::regions::list(&client).await
    }

    async fn provinces(&self) -> Result<Vec<Province>> {
        let client = self.pool.get().await?;
        repos::regions::provinces(&client).await
    }

    async fn wind_directions(&self) -> Result<Vec<WindDirection>> {
        let client = self.pool.get().await?;
        repos::wind_directions::list(&client).await
    }

    async fn database_stats(&self, today: NaiveDate) -> Result<DatabaseStats> {
        let client = self.pool.get().await?;
        repos::stats::database(&client, today).await
    }

    async fn available_years(&self) -> Result<Vec<i32>> {
        let client = self.pool.get().await?;
        repos::stats::available_years(&client).await
    }

    async fn station_stats(&self, station_id: i32) -> Result<StationStats> {
        let client = self.pool.get().await?;
        repos::stations::stats(&client, station_id).await
    }
}
