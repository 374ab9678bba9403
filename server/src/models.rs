use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_postgres::Row;

/// One row of the joined observation query. Field names on the wire are the
/// storage identifiers; `shaping` maps them to display labels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    #[serde(rename = "id_observasi")]
    pub id: i64,
    #[serde(rename = "id_stasiun")]
    pub station_id: i32,
    /// Raw date as returned by the store, coerced during shaping.
    #[serde(rename = "tanggal")]
    pub date: Option<String>,
    #[serde(rename = "suhu_minimum")]
    pub temp_min: Option<f64>,
    #[serde(rename = "suhu_maksimum")]
    pub temp_max: Option<f64>,
    #[serde(rename = "suhu_rata_rata")]
    pub temp_mean: Option<f64>,
    #[serde(rename = "kelembaban_rata_rata")]
    pub humidity_mean: Option<f64>,
    #[serde(rename = "curah_hujan")]
    pub precipitation: Option<f64>,
    #[serde(rename = "durasi_sinar_matahari")]
    pub sunshine_hours: Option<f64>,
    #[serde(rename = "kecepatan_angin_maksimum")]
    pub wind_speed_max: Option<f64>,
    #[serde(rename = "arah_angin_maksimum")]
    pub wind_dir_max: Option<i32>,
    #[serde(rename = "kecepatan_angin_rata_rata")]
    pub wind_speed_mean: Option<f64>,
    #[serde(rename = "kode_arah_angin")]
    pub wind_dir_code: Option<String>,
    #[serde(rename = "nama_stasiun")]
    pub station_name: String,
    #[serde(rename = "lintang")]
    pub latitude: Option<f64>,
    #[serde(rename = "bujur")]
    pub longitude: Option<f64>,
    #[serde(rename = "nama_wilayah")]
    pub region_name: Option<String>,
    #[serde(rename = "nama_provinsi")]
    pub province_name: Option<String>,
    #[serde(rename = "nama_arah_angin")]
    pub wind_dir_name: Option<String>,
}

impl TryFrom<&Row> for ObservationRow {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(ObservationRow {
            id: row.try_get("id_observasi")?,
            station_id: row.try_get("id_stasiun")?,
            date: row.try_get("tanggal")?,
            temp_min: row.try_get("suhu_minimum")?,
            temp_max: row.try_get("suhu_maksimum")?,
            temp_mean: row.try_get("suhu_rata_rata")?,
            humidity_mean: row.try_get("kelembaban_rata_rata")?,
            precipitation: row.try_get("curah_hujan")?,
            sunshine_hours: row.try_get("durasi_sinar_matahari")?,
            wind_speed_max: row.try_get("kecepatan_angin_maksimum")?,
            wind_dir_max: row.try_get("arah_angin_maksimum")?,
            wind_speed_mean: row.try_get("kecepatan_angin_rata_rata")?,
            wind_dir_code: row.try_get("kode_arah_angin")?,
            station_name: row.try_get("nama_stasiun")?,
            latitude: row.try_get("lintang")?,
            longitude: row.try_get("bujur")?,
            region_name: row.try_get("nama_wilayah")?,
            province_name: row.try_get("nama_provinsi")?,
            wind_dir_name: row.try_get("nama_arah_angin")?,
        })
    }
}

/// A raw `observasi_cuaca` row, without joins.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleObservation {
    #[serde(rename = "id_observasi")]
    pub id: i64,
    #[serde(rename = "id_stasiun")]
    pub station_id: i32,
    #[serde(rename = "tanggal")]
    pub date: NaiveDate,
    #[serde(rename = "suhu_rata_rata")]
    pub temp_mean: Option<f64>,
    #[serde(rename = "kelembaban_rata_rata")]
    pub humidity_mean: Option<f64>,
    #[serde(rename = "curah_hujan")]
    pub precipitation: Option<f64>,
    #[serde(rename = "kecepatan_angin_rata_rata")]
    pub wind_speed_mean: Option<f64>,
    #[serde(rename = "kode_arah_angin")]
    pub wind_dir_code: Option<String>,
}

impl TryFrom<&Row> for SampleObservation {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(SampleObservation {
            id: row.try_get("id_observasi")?,
            station_id: row.try_get("id_stasiun")?,
            date: row.try_get("tanggal")?,
            temp_mean: row.try_get("suhu_rata_rata")?,
            humidity_mean: row.try_get("kelembaban_rata_rata")?,
            precipitation: row.try_get("curah_hujan")?,
            wind_speed_mean: row.try_get("kecepatan_angin_rata_rata")?,
            wind_dir_code: row.try_get("kode_arah_angin")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationRow {
    #[serde(rename = "id_stasiun")]
    pub id: i32,
    #[serde(rename = "nama_stasiun")]
    pub name: String,
    #[serde(rename = "lintang")]
    pub latitude: f64,
    #[serde(rename = "bujur")]
    pub longitude: f64,
    #[serde(rename = "nama_wilayah")]
    pub region_name: Option<String>,
    #[serde(rename = "nama_provinsi")]
    pub province_name: Option<String>,
}

impl TryFrom<&Row> for StationRow {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(StationRow {
            id: row.try_get("id_stasiun")?,
            name: row.try_get("nama_stasiun")?,
            latitude: row.try_get("lintang")?,
            longitude: row.try_get("bujur")?,
            region_name: row.try_get("nama_wilayah")?,
            province_name: row.try_get("nama_provinsi")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Region {
    #[serde(rename = "id_wilayah")]
    pub id: i32,
    #[serde(rename = "nama_wilayah")]
    pub name: String,
}

impl TryFrom<&Row> for Region {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Region {
            id: row.try_get("id_wilayah")?,
            name: row.try_get("nama_wilayah")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Province {
    #[serde(rename = "id_provinsi")]
    pub id: i32,
    #[serde(rename = "nama_provinsi")]
    pub name: String,
}

impl TryFrom<&Row> for Province {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Province {
            id: row.try_get("id_provinsi")?,
            name: row.try_get("nama_provinsi")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WindDirection {
    #[serde(rename = "kode_arah")]
    pub code: String,
    #[serde(rename = "nama_arah")]
    pub name: String,
    /// Indonesian name, e.g. "Utara" for "N".
    #[serde(rename = "nama_arah_id")]
    pub name_id: Option<String>,
}

impl TryFrom<&Row> for WindDirection {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(WindDirection {
            code: row.try_get("kode_arah")?,
            name: row.try_get("nama_arah")?,
            name_id: row.try_get("nama_arah_id")?,
        })
    }
}

/// Aggregates over every observation of one station. A station without
/// observations has a zero count and no aggregates.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StationStats {
    pub total_days: i64,
    pub mean_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub total_precipitation: Option<f64>,
    pub mean_humidity: Option<f64>,
    pub mean_wind_speed: Option<f64>,
}

impl TryFrom<&Row> for StationStats {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(StationStats {
            total_days: row.try_get("total_hari")?,
            mean_temperature: row.try_get("suhu_rata")?,
            min_temperature: row.try_get("suhu_minimum")?,
            max_temperature: row.try_get("suhu_maksimum")?,
            total_precipitation: row.try_get("total_hujan")?,
            mean_humidity: row.try_get("kelembaban_rata")?,
            mean_wind_speed: row.try_get("angin_rata")?,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateRange {
    Span { first: NaiveDate, last: NaiveDate },
    #[default]
    NoData,
}

impl DateRange {
    pub fn new(first: Option<NaiveDate>, last: Option<NaiveDate>) -> Self {
        match (first, last) {
            (Some(first), Some(last)) => DateRange::Span { first, last },
            _ => DateRange::NoData,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::Span { first, last } => write!(
                f,
                "{} sampai {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            ),
            DateRange::NoData => write!(f, "Data tidak tersedia"),
        }
    }
}

impl Serialize for DateRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DatabaseStats {
    pub total_observations: i64,
    pub total_stations: i64,
    pub date_range: DateRange,
    pub last_30_days: i64,
    pub total_regions: i64,
    pub total_provinces: i64,
}

impl TryFrom<&Row> for DatabaseStats {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(DatabaseStats {
            total_observations: row.try_get("total_observasi")?,
            total_stations: row.try_get("total_stasiun")?,
            date_range: DateRange::new(row.try_get("tanggal_min")?, row.try_get("tanggal_maks")?),
            last_30_days: row.try_get("terbaru_30_hari")?,
            total_regions: row.try_get("total_wilayah")?,
            total_provinces: row.try_get("total_provinsi")?,
        })
    }
}
