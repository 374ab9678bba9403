use chrono::{NaiveDate, TimeDelta};

use crate::db;
use crate::error::Result;
use crate::models::DatabaseStats;

pub const RECENT_WINDOW_DAYS: i64 = 30;

// One statement, so all six figures come from the same snapshot.
const DATABASE_STMT: &str = r#"
    SELECT
        (SELECT COUNT(*) FROM observasi_cuaca) AS total_observasi,
        (SELECT COUNT(*) FROM stasiun) AS total_stasiun,
        (SELECT MIN(tanggal) FROM observasi_cuaca) AS tanggal_min,
        (SELECT MAX(tanggal) FROM observasi_cuaca) AS tanggal_maks,
        (SELECT COUNT(*) FROM observasi_cuaca WHERE tanggal >= $1) AS terbaru_30_hari,
        (SELECT COUNT(*) FROM wilayah) AS total_wilayah,
        (SELECT COUNT(*) FROM provinsi) AS total_provinsi"#;

const YEARS_STMT: &str = r#"
    SELECT DISTINCT CAST(EXTRACT(YEAR FROM tanggal) AS INTEGER) AS tahun
    FROM observasi_cuaca
    WHERE tanggal IS NOT NULL
    ORDER BY tahun DESC"#;

pub fn recent_since(today: NaiveDate) -> NaiveDate {
    today - TimeDelta::days(RECENT_WINDOW_DAYS)
}

pub async fn database<'a>(client: &db::Client<'a>, today: NaiveDate) -> Result<DatabaseStats> {
    let since = recent_since(today);
    let row = client.query_one(DATABASE_STMT, &[&since]).await?;
    let stats = DatabaseStats::try_from(&row)?;
    Ok(stats)
}

pub async fn available_years<'a>(client: &db::Client<'a>) -> Result<Vec<i32>> {
    let rows = client.query(YEARS_STMT, &[]).await?;
    let years = rows
        .iter()
        .map(|row| row.try_get::<_, Option<i32>>("tahun"))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(years.into_iter().flatten().collect())
}
