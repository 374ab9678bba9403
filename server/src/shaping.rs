use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::models::ObservationRow;

/// Storage field → display label, in query column order.
pub const DISPLAY_COLUMNS: [(&str, &str); 19] = [
    ("id_observasi", "ID Observasi"),
    ("id_stasiun", "ID Stasiun"),
    ("tanggal", "Tanggal"),
    ("suhu_minimum", "Suhu Minimum"),
    ("suhu_maksimum", "Suhu Maksimum"),
    ("suhu_rata_rata", "Suhu Rata-rata"),
    ("kelembaban_rata_rata", "Kelembaban Rata-rata"),
    ("curah_hujan", "Curah Hujan"),
    ("durasi_sinar_matahari", "Durasi Sinar Matahari"),
    ("kecepatan_angin_maksimum", "Kecepatan Angin Maksimum"),
    ("arah_angin_maksimum", "Arah Angin Maksimum"),
    ("kecepatan_angin_rata_rata", "Kecepatan Angin Rata-rata"),
    ("kode_arah_angin", "Kode Arah Angin"),
    ("nama_stasiun", "Nama Stasiun"),
    ("lintang", "Lintang"),
    ("bujur", "Bujur"),
    ("nama_wilayah", "Nama Wilayah"),
    ("nama_provinsi", "Nama Provinsi"),
    ("nama_arah_angin", "Nama Arah Angin"),
];

const DATE_FIELD: &str = "tanggal";

pub fn display_column_names() -> &'static [(&'static str, &'static str); 19] {
    &DISPLAY_COLUMNS
}

pub fn display_label(field: &str) -> Option<&'static str> {
    DISPLAY_COLUMNS
        .iter()
        .find(|(storage, _)| *storage == field)
        .map(|(_, label)| *label)
}

/// An observation whose date has been coerced to a calendar date. `date` is
/// `None` when the stored value could not be read as one.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedObservation {
    pub row: ObservationRow,
    pub date: Option<NaiveDate>,
}

impl ShapedObservation {
    pub fn month(&self) -> Option<u32> {
        self.date.map(|d| d.month())
    }

    /// 0 for Monday through 6 for Sunday.
    pub fn weekday(&self) -> Option<u32> {
        self.date.map(|d| d.weekday().num_days_from_monday())
    }

    /// The row as a JSON object keyed by display label.
    pub fn to_display_record(&self) -> Map<String, Value> {
        let mut storage = match serde_json::to_value(&self.row) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let date = self
            .date
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null);
        storage.insert(DATE_FIELD.to_string(), date);
        rename_columns(storage)
    }
}

/// Renames storage keys to display labels. Keys without a label are kept
/// unchanged.
pub fn rename_columns(record: Map<String, Value>) -> Map<String, Value> {
    record
        .into_iter()
        .map(|(key, value)| match display_label(&key) {
            Some(label) => (label.to_string(), value),
            None => (key, value),
        })
        .collect()
}

/// Accepts ISO dates, which is what the observation query always selects
/// (`to_char(.., 'YYYY-MM-DD')`, independent of the session DateStyle), and
/// the day-first `DD/MM/YYYY` / `DD/MM/YY` forms of BMKG spreadsheet exports.
/// Two-digit years are taken as 20xx.
pub fn parse_date(raw: &str) -> Result<NaiveDate, Error> {
    let value = raw.trim();
    let shape_error = || Error::Shape {
        field: DATE_FIELD,
        value: raw.to_string(),
    };

    // Tolerate a trailing time part, e.g. "2020-01-01 00:00:00".
    let day_part = value.split_whitespace().next().unwrap_or("");

    if let Ok(date) = NaiveDate::parse_from_str(day_part, "%Y-%m-%d") {
        return Ok(date);
    }

    let parts: Vec<&str> = day_part.split('/').collect();
    if parts.len() != 3 {
        return Err(shape_error());
    }
    let day: u32 = parts[0].parse().map_err(|_| shape_error())?;
    let month: u32 = parts[1].parse().map_err(|_| shape_error())?;
    let year: i32 = match parts[2].len() {
        2 => 2000 + parts[2].parse::<i32>().map_err(|_| shape_error())?,
        4 => parts[2].parse().map_err(|_| shape_error())?,
        _ => return Err(shape_error()),
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(shape_error)
}

pub fn shape_row(row: ObservationRow) -> ShapedObservation {
    let date = match row.date.as_deref() {
        Some(raw) => match parse_date(raw) {
            Ok(date) => Some(date),
            Err(err) => {
                log::debug!("Observation {}: {}", row.id, err);
                None
            }
        },
        None => None,
    };
    ShapedObservation { row, date }
}

pub fn shape(rows: Vec<ObservationRow>) -> Vec<ShapedObservation> {
    rows.into_iter().map(shape_row).collect()
}
