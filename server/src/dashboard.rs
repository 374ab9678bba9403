use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::aggregate::{self, ClimateCategory, StationClimate};
use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{Error, Failure, Result};
use crate::models::{
    DatabaseStats, ObservationRow, Province, Region, SampleObservation, StationRow, StationStats,
    WindDirection,
};
use crate::query::{clamp_limit, ObservationFilter};
use crate::shaping::{self, ShapedObservation};
use crate::store::WeatherStore;

/// Region selection meaning "no region filter".
pub const ALL_REGIONS: &str = "Semua Wilayah";

pub const DEFAULT_SAMPLE_LIMIT: i64 = 100;
pub const TOP_REGIONS: usize = 10;

/// Data plus, when the fetch failed, why. Failed fetches carry empty data so
/// callers can always render; `error` tells "no rows" apart from "failed".
#[derive(Clone, Debug, Serialize)]
pub struct Fetched<T> {
    pub data: T,
    pub error: Option<Failure>,
}

impl<T> Fetched<T> {
    pub fn ok(data: T) -> Self {
        Fetched { data, error: None }
    }

    #[cfg(test)]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> std::result::Result<T, Failure> {
        match self.error {
            Some(failure) => Err(failure),
            None => Ok(self.data),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            error: self.error,
        }
    }
}

fn degrade<T: Default>(what: &str, result: Result<T>) -> Fetched<T> {
    match result {
        Ok(data) => Fetched::ok(data),
        Err(err) => {
            log::error!("Failed to fetch {}: {:?}", what, err);
            Fetched {
                data: T::default(),
                error: Some(Failure::from(&err)),
            }
        }
    }
}

/// Filter selection for the cached pipeline. The region is picked by name.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoadRequest {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub region: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub region: Option<String>,
    pub limit: i64,
}

fn selected_region(name: Option<&str>) -> Option<&str> {
    name.map(str::trim)
        .filter(|name| !name.is_empty() && *name != ALL_REGIONS)
}

#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub metrics: aggregate::SummaryMetrics,
    pub monthly: Vec<aggregate::MonthlySummary>,
    pub weekday_rainfall: Vec<aggregate::WeekdayRainfall>,
    pub top_regions: Vec<aggregate::RegionRainfall>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LatestByStation {
    pub stations: Vec<StationClimate>,
    pub categories: BTreeMap<ClimateCategory, usize>,
}

pub struct Dashboard<S> {
    store: S,
    cache: TtlCache<CacheKey, Vec<ShapedObservation>>,
    default_limit: i64,
}

impl<S: WeatherStore> Dashboard<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Dashboard {
            store,
            cache: TtlCache::new(config.cache.ttl, config.cache.capacity),
            default_limit: config.default_limit,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn test_connection(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(err) => {
                log::error!("Connection test failed: {:?}", err);
                false
            }
        }
    }

    pub async fn fetch_observations(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        region_id: Option<i32>,
        station_id: Option<i32>,
        limit: Option<i64>,
    ) -> Fetched<Vec<ObservationRow>> {
        let filter = ObservationFilter::new(
            start,
            end,
            region_id,
            station_id,
            Some(limit.unwrap_or(self.default_limit)),
        );
        degrade("observations", self.store.observations(&filter).await)
    }

    pub async fn fetch_sample_observations(
        &self,
        limit: Option<i64>,
    ) -> Fetched<Vec<SampleObservation>> {
        let limit = limit.unwrap_or(DEFAULT_SAMPLE_LIMIT);
        degrade("sample observations", self.store.sample_observations(limit).await)
    }

    pub async fn fetch_stations(&self) -> Fetched<Vec<StationRow>> {
        degrade("stations", self.store.stations().await)
    }

    pub async fn fetch_regions(&self) -> Fetched<Vec<Region>> {
        degrade("regions", self.store.regions().await)
    }

    pub async fn fetch_provinces(&self) -> Fetched<Vec<Province>> {
        degrade("provinces", self.store.provinces().await)
    }

    pub async fn fetch_wind_directions(&self) -> Fetched<Vec<WindDirection>> {
        degrade("wind directions", self.store.wind_directions().await)
    }

    pub async fn fetch_database_stats(&self) -> Fetched<Option<DatabaseStats>> {
        let today = Utc::now().date_naive();
        degrade(
            "database stats",
            self.store.database_stats(today).await.map(Some),
        )
    }

    pub async fn fetch_available_years(&self) -> Fetched<Vec<i32>> {
        degrade("available years", self.store.available_years().await)
    }

    pub async fn fetch_station_stats(&self, station_id: i32) -> Fetched<Option<StationStats>> {
        degrade(
            "station stats",
            self.store.station_stats(station_id).await.map(Some),
        )
    }

    pub fn display_column_names(&self) -> &'static [(&'static str, &'static str); 19] {
        shaping::display_column_names()
    }

    /// Looks a region up by display name. Unknown names select every region.
    async fn resolve_region(&self, name: Option<&str>) -> Result<Option<i32>> {
        let Some(name) = selected_region(name) else {
            return Ok(None);
        };
        let regions = self.store.regions().await?;
        match regions.iter().find(|region| region.name == name) {
            Some(region) => Ok(Some(region.id)),
            None => {
                log::warn!("Unknown region {:?}, not filtering by region", name);
                Ok(None)
            }
        }
    }

    /// Fetches and shapes observations, memoized per (start, end, region,
    /// limit) for the cache window.
    pub async fn load_observations(
        &self,
        request: &LoadRequest,
    ) -> Fetched<Arc<Vec<ShapedObservation>>> {
        let key = CacheKey {
            start: request.start,
            end: request.end,
            region: selected_region(request.region.as_deref()).map(str::to_string),
            limit: clamp_limit(request.limit.unwrap_or(self.default_limit)),
        };

        let result = self
            .cache
            .get_or_try_insert_with(key.clone(), || async {
                let region_id = self.resolve_region(key.region.as_deref()).await?;
                let filter =
                    ObservationFilter::new(key.start, key.end, region_id, None, Some(key.limit));
                let rows = self.store.observations(&filter).await?;
                log::info!("Loaded {} observations for {:?}", rows.len(), key);
                Ok::<_, Error>(shaping::shape(rows))
            })
            .await;

        degrade("dashboard observations", result)
    }

    pub async fn display_records(
        &self,
        request: &LoadRequest,
    ) -> Fetched<Vec<serde_json::Map<String, serde_json::Value>>> {
        self.load_observations(request)
            .await
            .map(|rows| rows.iter().map(ShapedObservation::to_display_record).collect())
    }

    pub async fn summary(&self, request: &LoadRequest) -> Fetched<Summary> {
        self.load_observations(request).await.map(|rows| Summary {
            metrics: aggregate::summary_metrics(&rows),
            monthly: aggregate::monthly_summary(&rows),
            weekday_rainfall: aggregate::rainfall_by_weekday(&rows),
            top_regions: aggregate::rainfall_by_region(&rows, TOP_REGIONS),
        })
    }

    pub async fn latest_by_station(&self, request: &LoadRequest) -> Fetched<LatestByStation> {
        self.load_observations(request).await.map(|rows| {
            let stations = aggregate::station_climates(&rows);
            let categories = aggregate::category_counts(&stations);
            LatestByStation {
                stations,
                categories,
            }
        })
    }
}
