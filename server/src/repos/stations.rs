use crate::db;
use crate::error::Result;
use crate::models::{StationRow, StationStats};

const MAPPABLE_STMT: &str = r#"
    SELECT
        s.id_stasiun,
        s.nama_stasiun,
        s.lintang,
        s.bujur,
        w.nama_wilayah,
        p.nama_provinsi
    FROM stasiun s
    LEFT JOIN wilayah w ON s.id_wilayah = w.id_wilayah
    LEFT JOIN provinsi p ON w.id_provinsi = p.id_provinsi
    WHERE s.lintang IS NOT NULL
    AND s.bujur IS NOT NULL
    ORDER BY s.nama_stasiun"#;

// Aggregates over zero rows still return one row: count 0, NULL aggregates.
const STATS_STMT: &str = r#"
    SELECT
        COUNT(*) AS total_hari,
        AVG(suhu_rata_rata) AS suhu_rata,
        MIN(suhu_rata_rata) AS suhu_minimum,
        MAX(suhu_rata_rata) AS suhu_maksimum,
        SUM(curah_hujan) AS total_hujan,
        AVG(kelembaban_rata_rata) AS kelembaban_rata,
        AVG(kecepatan_angin_rata_rata) AS angin_rata
    FROM observasi_cuaca
    WHERE id_stasiun = $1"#;

/// Stations with both coordinates set, the only ones a map can place.
pub async fn mappable<'a>(client: &db::Client<'a>) -> Result<Vec<StationRow>> {
    let rows = client.query(MAPPABLE_STMT, &[]).await?;
    let stations = super::from_rows(rows)?;
    Ok(stations)
}

pub async fn stats<'a>(client: &db::Client<'a>, station_id: i32) -> Result<StationStats> {
    let row = client.query_one(STATS_STMT, &[&station_id]).await?;
    let stats = StationStats::try_from(&row)?;
    Ok(stats)
}
