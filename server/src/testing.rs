use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::models::{
    DatabaseStats, DateRange, ObservationRow, Province, Region, SampleObservation, StationRow,
    StationStats, WindDirection,
};
use crate::query::{clamp_limit, ObservationFilter};
use crate::repos::stats::recent_since;
use crate::store::WeatherStore;

pub struct StationFixture {
    pub id: i32,
    pub name: String,
    pub region_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub struct ObservationFixture {
    pub station_id: i32,
    pub date: NaiveDate,
    pub temp_mean: Option<f64>,
    pub precipitation: Option<f64>,
    pub humidity_mean: Option<f64>,
    pub wind_speed_mean: Option<f64>,
}

/// In-memory store applying the same join, filter, ordering and limit rules
/// as the SQL statements.
#[derive(Default)]
pub struct MemoryStore {
    pub provinces: Vec<Province>,
    /// Region and the province it belongs to.
    pub regions: Vec<(Region, Option<i32>)>,
    pub stations: Vec<StationFixture>,
    pub observations: Vec<ObservationFixture>,
    pub wind_directions: Vec<WindDirection>,
    pub observation_calls: AtomicUsize,
    pub failing: AtomicBool,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

impl MemoryStore {
    /// Two regions in one province: R1 with 10 stations, R2 with 5, one
    /// observation per station per day for the first ten days of 2024.
    pub fn two_regions() -> Self {
        let mut store = MemoryStore {
            provinces: vec![Province {
                id: 11,
                name: "Aceh".to_string(),
            }],
            regions: vec![
                (
                    Region {
                        id: 1,
                        name: "R1".to_string(),
                    },
                    Some(11),
                ),
                (
                    Region {
                        id: 2,
                        name: "R2".to_string(),
                    },
                    Some(11),
                ),
            ],
            wind_directions: vec![WindDirection {
                code: "N".to_string(),
                name: "North".to_string(),
                name_id: Some("Utara".to_string()),
            }],
            ..Default::default()
        };

        for i in 0..15 {
            let region_id = if i < 10 { 1 } else { 2 };
            store.stations.push(StationFixture {
                id: 100 + i,
                name: format!("Stasiun {:02}", i),
                region_id: Some(region_id),
                latitude: Some(5.0 + i as f64 * 0.1),
                longitude: Some(95.0 + i as f64 * 0.1),
            });
        }

        for day in 1..=10 {
            for station in 0..15 {
                store.observations.push(ObservationFixture {
                    station_id: 100 + station,
                    date: date(2024, 1, day),
                    temp_mean: Some(25.0 + station as f64 * 0.2),
                    precipitation: Some(if day % 2 == 0 { 12.0 } else { 0.0 }),
                    humidity_mean: Some(80.0),
                    wind_speed_mean: Some(2.0),
                });
            }
        }

        store
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn observation_calls(&self) -> usize {
        self.observation_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Error::Connection(bb8::RunError::TimedOut))
        } else {
            Ok(())
        }
    }

    fn station(&self, id: i32) -> Option<&StationFixture> {
        self.stations.iter().find(|s| s.id == id)
    }

    fn region(&self, id: Option<i32>) -> Option<&(Region, Option<i32>)> {
        id.and_then(|id| self.regions.iter().find(|(r, _)| r.id == id))
    }

    fn province_name(&self, id: Option<i32>) -> Option<String> {
        id.and_then(|id| self.provinces.iter().find(|p| p.id == id))
            .map(|p| p.name.clone())
    }

    fn joined(&self, index: usize, obs: &ObservationFixture) -> Option<ObservationRow> {
        let station = self.station(obs.station_id)?;
        let region = self.region(station.region_id);
        Some(ObservationRow {
            id: index as i64 + 1,
            station_id: obs.station_id,
            date: Some(obs.date.to_string()),
            temp_mean: obs.temp_mean,
            temp_min: obs.temp_mean.map(|t| t - 3.0),
            temp_max: obs.temp_mean.map(|t| t + 5.0),
            precipitation: obs.precipitation,
            humidity_mean: obs.humidity_mean,
            wind_speed_mean: obs.wind_speed_mean,
            station_name: station.name.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
            region_name: region.map(|(r, _)| r.name.clone()),
            province_name: self.province_name(region.and_then(|(_, p)| *p)),
            ..Default::default()
        })
    }
}

#[async_trait]
impl WeatherStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.check()
    }

    async fn observations(&self, filter: &ObservationFilter) -> Result<Vec<ObservationRow>> {
        self.observation_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut matching: Vec<(NaiveDate, ObservationRow)> = self
            .observations
            .iter()
            .enumerate()
            .filter(|(_, obs)| filter.dates.contains(obs.date))
            .filter(|(_, obs)| filter.station_id.map_or(true, |id| obs.station_id == id))
            .filter(|(_, obs)| match filter.region_id {
                Some(region_id) => self
                    .station(obs.station_id)
                    .map_or(false, |s| s.region_id == Some(region_id)),
                None => true,
            })
            .filter_map(|(i, obs)| self.joined(i, obs).map(|row| (obs.date, row)))
            .collect();

        matching.sort_by(|a, b| b.0.cmp(&a.0));
        matching.truncate(filter.effective_limit() as usize);
        Ok(matching.into_iter().map(|(_, row)| row).collect())
    }

    async fn sample_observations(&self, limit: i64) -> Result<Vec<SampleObservation>> {
        self.check()?;
        let mut rows: Vec<SampleObservation> = self
            .observations
            .iter()
            .enumerate()
            .map(|(i, obs)| SampleObservation {
                id: i as i64 + 1,
                station_id: obs.station_id,
                date: obs.date,
                temp_mean: obs.temp_mean,
                humidity_mean: obs.humidity_mean,
                precipitation: obs.precipitation,
                wind_speed_mean: obs.wind_speed_mean,
                wind_dir_code: None,
            })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(clamp_limit(limit) as usize);
        Ok(rows)
    }

    async fn stations(&self) -> Result<Vec<StationRow>> {
        self.check()?;
        let mut rows: Vec<StationRow> = self
            .stations
            .iter()
            .filter_map(|s| {
                let region = self.region(s.region_id);
                Some(StationRow {
                    id: s.id,
                    name: s.name.clone(),
                    latitude: s.latitude?,
                    longitude: s.longitude?,
                    region_name: region.map(|(r, _)| r.name.clone()),
                    province_name: self.province_name(region.and_then(|(_, p)| *p)),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn regions(&self) -> Result<Vec<Region>> {
        self.check()?;
        let mut regions: Vec<Region> = self.regions.iter().map(|(r, _)| r.clone()).collect();
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(regions)
    }

    async fn provinces(&self) -> Result<Vec<Province>> {
        self.check()?;
        let mut provinces = self.provinces.clone();
        provinces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(provinces)
    }

    async fn wind_directions(&self) -> Result<Vec<WindDirection>> {
        self.check()?;
        let mut directions = self.wind_directions.clone();
        directions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(directions)
    }

    async fn database_stats(&self, today: NaiveDate) -> Result<DatabaseStats> {
        self.check()?;
        let since = recent_since(today);
        let dates = || self.observations.iter().map(|o| o.date);
        Ok(DatabaseStats {
            total_observations: self.observations.len() as i64,
            total_stations: self.stations.len() as i64,
            date_range: DateRange::new(dates().min(), dates().max()),
            last_30_days: dates().filter(|d| *d >= since).count() as i64,
            total_regions: self.regions.len() as i64,
            total_provinces: self.provinces.len() as i64,
        })
    }

    async fn available_years(&self) -> Result<Vec<i32>> {
        self.check()?;
        let mut years: Vec<i32> = self
            .observations
            .iter()
            .map(|o| chrono::Datelike::year(&o.date))
            .collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        Ok(years)
    }

    async fn station_stats(&self, station_id: i32) -> Result<StationStats> {
        self.check()?;
        let rows: Vec<&ObservationFixture> = self
            .observations
            .iter()
            .filter(|o| o.station_id == station_id)
            .collect();

        fn mean(v: &[f64]) -> Option<f64> {
            (!v.is_empty()).then(|| v.iter().sum::<f64>() / v.len() as f64)
        }
        let values = |f: fn(&ObservationFixture) -> Option<f64>| -> Vec<f64> {
            rows.iter().filter_map(|o| f(o)).collect()
        };

        let temps = values(|o| o.temp_mean);
        let rain = values(|o| o.precipitation);
        Ok(StationStats {
            total_days: rows.len() as i64,
            mean_temperature: mean(&temps),
            min_temperature: temps.iter().copied().reduce(f64::min),
            max_temperature: temps.iter().copied().reduce(f64::max),
            total_precipitation: (!rain.is_empty()).then(|| rain.iter().sum()),
            mean_humidity: mean(&values(|o| o.humidity_mean)),
            mean_wind_speed: mean(&values(|o| o.wind_speed_mean)),
        })
    }
}
