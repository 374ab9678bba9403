//! Aggregations behind the dashboard views. Missing measurements are skipped,
//! never counted as zero.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::shaping::ShapedObservation;

pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu",
];

/// Running mean/sum/min/max over optional values.
#[derive(Clone, Copy, Debug, Default)]
struct Acc {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Acc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.count += 1;
            self.sum += v;
            self.min = Some(self.min.map_or(v, |m| m.min(v)));
            self.max = Some(self.max.map_or(v, |m| m.max(v)));
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    fn total(&self) -> Option<f64> {
        (self.count > 0).then_some(self.sum)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub observations: usize,
    pub mean_temperature: Option<f64>,
    pub total_precipitation: Option<f64>,
    pub max_precipitation: Option<f64>,
    pub mean_humidity: Option<f64>,
    pub mean_wind_speed: Option<f64>,
    pub rainy_days: usize,
    /// Percentage of observations with precipitation above zero.
    pub rainy_share: f64,
}

pub fn summary_metrics(rows: &[ShapedObservation]) -> SummaryMetrics {
    let mut temp = Acc::default();
    let mut rain = Acc::default();
    let mut humidity = Acc::default();
    let mut wind = Acc::default();
    let mut rainy_days = 0;

    for obs in rows {
        temp.push(obs.row.temp_mean);
        rain.push(obs.row.precipitation);
        humidity.push(obs.row.humidity_mean);
        wind.push(obs.row.wind_speed_mean);
        if obs.row.precipitation.map_or(false, |p| p > 0.0) {
            rainy_days += 1;
        }
    }

    let rainy_share = if rows.is_empty() {
        0.0
    } else {
        rainy_days as f64 / rows.len() as f64 * 100.0
    };

    SummaryMetrics {
        observations: rows.len(),
        mean_temperature: temp.mean(),
        total_precipitation: rain.total(),
        max_precipitation: rain.max,
        mean_humidity: humidity.mean(),
        mean_wind_speed: wind.mean(),
        rainy_days,
        rainy_share,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: u32,
    pub month_name: &'static str,
    pub mean_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub total_precipitation: Option<f64>,
    pub mean_humidity: Option<f64>,
}

/// One entry per calendar month present in `rows`, January first.
pub fn monthly_summary(rows: &[ShapedObservation]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<u32, [Acc; 5]> = BTreeMap::new();

    for obs in rows {
        let Some(month) = obs.month() else { continue };
        let accs = months.entry(month).or_default();
        accs[0].push(obs.row.temp_mean);
        accs[1].push(obs.row.temp_min);
        accs[2].push(obs.row.temp_max);
        accs[3].push(obs.row.precipitation);
        accs[4].push(obs.row.humidity_mean);
    }

    months
        .into_iter()
        .map(|(month, [mean, min, max, rain, humidity])| MonthlySummary {
            month,
            month_name: MONTH_NAMES[(month - 1) as usize],
            mean_temperature: mean.mean(),
            min_temperature: min.min,
            max_temperature: max.max,
            total_precipitation: rain.total(),
            mean_humidity: humidity.mean(),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeekdayRainfall {
    pub weekday: u32,
    pub weekday_name: &'static str,
    pub total_precipitation: f64,
}

/// Always seven entries, Monday first.
pub fn rainfall_by_weekday(rows: &[ShapedObservation]) -> Vec<WeekdayRainfall> {
    let mut totals = [0.0; 7];
    for obs in rows {
        if let (Some(day), Some(rain)) = (obs.weekday(), obs.row.precipitation) {
            totals[day as usize] += rain;
        }
    }

    totals
        .iter()
        .enumerate()
        .map(|(day, total)| WeekdayRainfall {
            weekday: day as u32,
            weekday_name: WEEKDAY_NAMES[day],
            total_precipitation: *total,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegionRainfall {
    pub province_name: Option<String>,
    pub region_name: Option<String>,
    pub total_precipitation: f64,
    pub mean_precipitation: Option<f64>,
    pub max_precipitation: Option<f64>,
    pub observations: usize,
}

/// Regions ranked by total precipitation, at most `top` of them.
pub fn rainfall_by_region(rows: &[ShapedObservation], top: usize) -> Vec<RegionRainfall> {
    let mut groups: HashMap<(Option<&str>, Option<&str>), (Acc, usize)> = HashMap::new();

    for obs in rows {
        let key = (
            obs.row.province_name.as_deref(),
            obs.row.region_name.as_deref(),
        );
        let (acc, n) = groups.entry(key).or_default();
        acc.push(obs.row.precipitation);
        *n += 1;
    }

    let mut ranked: Vec<RegionRainfall> = groups
        .into_iter()
        .map(|((province, region), (acc, n))| RegionRainfall {
            province_name: province.map(str::to_string),
            region_name: region.map(str::to_string),
            total_precipitation: acc.sum,
            mean_precipitation: acc.mean(),
            max_precipitation: acc.max,
            observations: n,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_precipitation
            .partial_cmp(&a.total_precipitation)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.region_name.cmp(&b.region_name))
    });
    ranked.truncate(top);
    ranked
}

/// First row per station in input order. With rows sorted most recent first
/// this is each station's latest observation.
pub fn latest_per_station(rows: &[ShapedObservation]) -> Vec<&ShapedObservation> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|obs| seen.insert(obs.row.station_id))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateCategory {
    CoolDry,
    CoolWet,
    WarmDry,
    WarmHumid,
    HotDry,
    HotWet,
    Normal,
}

impl ClimateCategory {
    const COOL_BELOW: f64 = 22.0;
    const HOT_FROM: f64 = 28.0;
    const WET_FROM: f64 = 10.0;

    /// Classifies a day by mean temperature (°C) and precipitation (mm).
    /// Missing inputs fall back to `Normal`.
    pub fn classify(temperature: Option<f64>, precipitation: Option<f64>) -> Self {
        let (Some(t), Some(p)) = (temperature, precipitation) else {
            return ClimateCategory::Normal;
        };
        if t.is_nan() || p.is_nan() {
            return ClimateCategory::Normal;
        }
        let wet = p >= Self::WET_FROM;
        match (t, wet) {
            (t, false) if t < Self::COOL_BELOW => ClimateCategory::CoolDry,
            (t, true) if t < Self::COOL_BELOW => ClimateCategory::CoolWet,
            (t, false) if t < Self::HOT_FROM => ClimateCategory::WarmDry,
            (t, true) if t < Self::HOT_FROM => ClimateCategory::WarmHumid,
            (_, false) => ClimateCategory::HotDry,
            (_, true) => ClimateCategory::HotWet,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClimateCategory::CoolDry => "Sejuk & Kering",
            ClimateCategory::CoolWet => "Sejuk & Basah",
            ClimateCategory::WarmDry => "Hangat & Kering",
            ClimateCategory::WarmHumid => "Hangat & Lembab",
            ClimateCategory::HotDry => "Panas & Kering",
            ClimateCategory::HotWet => "Panas & Basah",
            ClimateCategory::Normal => "Normal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationClimate {
    pub station_id: i32,
    pub station_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: Option<chrono::NaiveDate>,
    pub mean_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub mean_humidity: Option<f64>,
    pub mean_wind_speed: Option<f64>,
    pub category: ClimateCategory,
    pub category_label: &'static str,
}

pub fn station_climates(rows: &[ShapedObservation]) -> Vec<StationClimate> {
    latest_per_station(rows)
        .into_iter()
        .map(|obs| {
            let category = ClimateCategory::classify(obs.row.temp_mean, obs.row.precipitation);
            StationClimate {
                station_id: obs.row.station_id,
                station_name: obs.row.station_name.clone(),
                latitude: obs.row.latitude,
                longitude: obs.row.longitude,
                date: obs.date,
                mean_temperature: obs.row.temp_mean,
                precipitation: obs.row.precipitation,
                mean_humidity: obs.row.humidity_mean,
                mean_wind_speed: obs.row.wind_speed_mean,
                category,
                category_label: category.label(),
            }
        })
        .collect()
}

pub fn category_counts(stations: &[StationClimate]) -> BTreeMap<ClimateCategory, usize> {
    let mut counts = BTreeMap::new();
    for station in stations {
        *counts.entry(station.category).or_insert(0) += 1;
    }
    counts
}
