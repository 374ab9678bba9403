use crate::db;
use crate::error::Result;
use crate::models::{ObservationRow, SampleObservation};
use crate::query::{self, ObservationFilter};

pub async fn filtered<'a>(
    client: &db::Client<'a>,
    filter: &ObservationFilter,
) -> Result<Vec<ObservationRow>> {
    let stmt = query::observations(filter);
    log::debug!("Observation query {:?} with {:?}", filter, stmt.params);
    let rows = client.query(stmt.sql.as_str(), &stmt.sql_params()).await?;
    let observations = super::from_rows(rows)?;
    Ok(observations)
}

pub async fn sample<'a>(client: &db::Client<'a>, limit: i64) -> Result<Vec<SampleObservation>> {
    let stmt = "SELECT id_observasi, id_stasiun, tanggal, suhu_rata_rata, kelembaban_rata_rata, \
                curah_hujan, kecepatan_angin_rata_rata, kode_arah_angin \
                FROM observasi_cuaca \
                ORDER BY tanggal DESC \
                LIMIT $1";
    let rows = client.query(stmt, &[&query::clamp_limit(limit)]).await?;
    let observations = super::from_rows(rows)?;
    Ok(observations)
}
