use crate::db;
use crate::error::Result;
use crate::models::WindDirection;

pub async fn list<'a>(client: &db::Client<'a>) -> Result<Vec<WindDirection>> {
    let stmt = "SELECT kode_arah, nama_arah, nama_arah_id FROM arah_angin ORDER BY nama_arah";
    let rows = client.query(stmt, &[]).await?;
    let directions = super::from_rows(rows)?;
    Ok(directions)
}
