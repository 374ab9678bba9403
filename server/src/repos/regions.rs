use crate::db;
use crate::error::Result;
use crate::models::{Province, Region};

pub async fn list<'a>(client: &db::Client<'a>) -> Result<Vec<Region>> {
    let stmt = "SELECT id_wilayah, nama_wilayah FROM wilayah ORDER BY nama_wilayah";
    let rows = client.query(stmt, &[]).await?;
    let regions = super::from_rows(rows)?;
    Ok(regions)
}

pub async fn provinces<'a>(client: &db::Client<'a>) -> Result<Vec<Province>> {
    let stmt = "SELECT id_provinsi, nama_provinsi FROM provinsi ORDER BY nama_provinsi";
    let rows = client.query(stmt, &[]).await?;
    let provinces = super::from_rows(rows)?;
    Ok(provinces)
}
