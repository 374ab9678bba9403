use chrono::NaiveDate;
use tokio_postgres::types::ToSql;

pub const DEFAULT_LIMIT: i64 = 10_000;

/// Row limits below zero mean "no rows"; `LIMIT 0` is valid and returns none.
pub fn clamp_limit(limit: i64) -> i64 {
    limit.max(0)
}

/// Which date bounds apply to an observation query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DateFilter {
    #[default]
    Unbounded,
    From(NaiveDate),
    Until(NaiveDate),
    /// Inclusive on both ends.
    Between(NaiveDate, NaiveDate),
}

impl DateFilter {
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => DateFilter::Between(start, end),
            (Some(start), None) => DateFilter::From(start),
            (None, Some(end)) => DateFilter::Until(end),
            (None, None) => DateFilter::Unbounded,
        }
    }

    #[cfg(test)]
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DateFilter::Unbounded => true,
            DateFilter::From(start) => date >= start,
            DateFilter::Until(end) => date <= end,
            DateFilter::Between(start, end) => start <= date && date <= end,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObservationFilter {
    pub dates: DateFilter,
    pub region_id: Option<i32>,
    pub station_id: Option<i32>,
    pub limit: i64,
}

impl Default for ObservationFilter {
    fn default() -> Self {
        ObservationFilter {
            dates: DateFilter::default(),
            region_id: None,
            station_id: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ObservationFilter {
    pub fn new(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        region_id: Option<i32>,
        station_id: Option<i32>,
        limit: Option<i64>,
    ) -> Self {
        ObservationFilter {
            dates: DateFilter::from_bounds(start, end),
            region_id,
            station_id,
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// The limit actually sent to the store; never negative.
    pub fn effective_limit(&self) -> i64 {
        clamp_limit(self.limit)
    }
}

/// A typed statement parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Date(NaiveDate),
    Int(i32),
    BigInt(i64),
}

impl Param {
    pub fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            Param::Date(d) => d,
            Param::Int(i) => i,
            Param::BigInt(i) => i,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Param>,
}

impl Statement {
    pub fn sql_params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(Param::as_sql).collect()
    }
}

const OBSERVATIONS_SELECT: &str = r#"
    SELECT
        oc.id_observasi,
        oc.id_stasiun,
        to_char(oc.tanggal, 'YYYY-MM-DD') AS tanggal,
        oc.suhu_minimum,
        oc.suhu_maksimum,
        oc.suhu_rata_rata,
        oc.kelembaban_rata_rata,
        oc.curah_hujan,
        oc.durasi_sinar_matahari,
        oc.kecepatan_angin_maksimum,
        oc.arah_angin_maksimum,
        oc.kecepatan_angin_rata_rata,
        oc.kode_arah_angin,
        s.nama_stasiun,
        s.lintang,
        s.bujur,
        w.nama_wilayah,
        p.nama_provinsi,
        aa.nama_arah AS nama_arah_angin
    FROM observasi_cuaca oc
    JOIN stasiun s ON oc.id_stasiun = s.id_stasiun
    LEFT JOIN wilayah w ON s.id_wilayah = w.id_wilayah
    LEFT JOIN provinsi p ON w.id_provinsi = p.id_provinsi
    LEFT JOIN arah_angin aa ON oc.kode_arah_angin = aa.kode_arah
    WHERE 1=1"#;

struct Builder {
    sql: String,
    params: Vec<Param>,
}

impl Builder {
    fn new(base: &str) -> Self {
        Builder {
            sql: base.to_string(),
            params: Vec::new(),
        }
    }

    /// Registers a parameter and returns its `$n` placeholder.
    fn bind(&mut self, param: Param) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    fn and(&mut self, predicate: &str) {
        self.sql.push_str(" AND ");
        self.sql.push_str(predicate);
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

pub fn observations(filter: &ObservationFilter) -> Statement {
    let mut b = Builder::new(OBSERVATIONS_SELECT);

    match filter.dates {
        DateFilter::Between(start, end) => {
            let start = b.bind(Param::Date(start));
            let end = b.bind(Param::Date(end));
            b.and(&format!("oc.tanggal BETWEEN {} AND {}", start, end));
        }
        DateFilter::From(start) => {
            let start = b.bind(Param::Date(start));
            b.and(&format!("oc.tanggal >= {}", start));
        }
        DateFilter::Until(end) => {
            let end = b.bind(Param::Date(end));
            b.and(&format!("oc.tanggal <= {}", end));
        }
        DateFilter::Unbounded => {}
    }

    if let Some(region_id) = filter.region_id {
        let p = b.bind(Param::Int(region_id));
        b.and(&format!("w.id_wilayah = {}", p));
    }

    if let Some(station_id) = filter.station_id {
        let p = b.bind(Param::Int(station_id));
        b.and(&format!("s.id_stasiun = {}", p));
    }

    let limit = b.bind(Param::BigInt(filter.effective_limit()));
    b.sql
        .push_str(&format!(" ORDER BY oc.tanggal DESC LIMIT {}", limit));

    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tail(stmt: &Statement) -> &str {
        stmt.sql
            .split("WHERE 1=1")
            .nth(1)
            .expect("statement keeps the WHERE 1=1 anchor")
    }

    // =========================================================================
    // DateFilter
    // =========================================================================

    #[test]
    fn test_from_bounds_selects_each_variant() {
        let a = date(2020, 1, 1);
        let b = date(2020, 12, 31);

        assert_eq!(DateFilter::from_bounds(Some(a), Some(b)), DateFilter::Between(a, b));
        assert_eq!(DateFilter::from_bounds(Some(a), None), DateFilter::From(a));
        assert_eq!(DateFilter::from_bounds(None, Some(b)), DateFilter::Until(b));
        assert_eq!(DateFilter::from_bounds(None, None), DateFilter::Unbounded);
    }

    #[test]
    fn test_end_only_is_not_unbounded() {
        let filter = DateFilter::from_bounds(None, Some(date(2015, 6, 30)));
        assert!(filter.contains(date(2015, 6, 30)));
        assert!(!filter.contains(date(2015, 7, 1)));
    }

    #[test]
    fn test_between_is_inclusive() {
        let filter = DateFilter::Between(date(2020, 3, 1), date(2020, 3, 31));
        assert!(filter.contains(date(2020, 3, 1)));
        assert!(filter.contains(date(2020, 3, 31)));
        assert!(!filter.contains(date(2020, 2, 29)));
        assert!(!filter.contains(date(2020, 4, 1)));
    }

    #[test]
    fn test_half_open_matches_far_bound() {
        let start = date(2018, 5, 10);
        let end = date(2019, 1, 1);
        let far_past = NaiveDate::MIN;
        let far_future = NaiveDate::MAX;

        for d in [date(2000, 1, 1), start, date(2018, 12, 31), end, date(2030, 1, 1)] {
            assert_eq!(
                DateFilter::From(start).contains(d),
                DateFilter::Between(start, far_future).contains(d)
            );
            assert_eq!(
                DateFilter::Until(end).contains(d),
                DateFilter::Between(far_past, end).contains(d)
            );
        }
    }

    // =========================================================================
    // Statement building
    // =========================================================================

    #[test]
    fn test_unfiltered_query_only_limits() {
        let stmt = observations(&ObservationFilter::default());

        assert_eq!(tail(&stmt), " ORDER BY oc.tanggal DESC LIMIT $1");
        assert_eq!(stmt.params, vec![Param::BigInt(DEFAULT_LIMIT)]);
    }

    #[test]
    fn test_between_dates() {
        let filter = ObservationFilter::new(
            Some(date(2020, 1, 1)),
            Some(date(2020, 12, 31)),
            None,
            None,
            Some(500),
        );
        let stmt = observations(&filter);

        assert_eq!(
            tail(&stmt),
            " AND oc.tanggal BETWEEN $1 AND $2 ORDER BY oc.tanggal DESC LIMIT $3"
        );
        assert_eq!(
            stmt.params,
            vec![
                Param::Date(date(2020, 1, 1)),
                Param::Date(date(2020, 12, 31)),
                Param::BigInt(500),
            ]
        );
    }

    #[test]
    fn test_start_only() {
        let filter = ObservationFilter::new(Some(date(2022, 7, 1)), None, None, None, None);
        let stmt = observations(&filter);

        assert_eq!(
            tail(&stmt),
            " AND oc.tanggal >= $1 ORDER BY oc.tanggal DESC LIMIT $2"
        );
        assert_eq!(stmt.params[0], Param::Date(date(2022, 7, 1)));
    }

    #[test]
    fn test_end_only() {
        let filter = ObservationFilter::new(None, Some(date(2012, 12, 31)), None, None, None);
        let stmt = observations(&filter);

        assert_eq!(
            tail(&stmt),
            " AND oc.tanggal <= $1 ORDER BY oc.tanggal DESC LIMIT $2"
        );
        assert_eq!(stmt.params[0], Param::Date(date(2012, 12, 31)));
    }

    #[test]
    fn test_all_filters_number_placeholders_in_order() {
        let filter = ObservationFilter::new(
            Some(date(2020, 1, 1)),
            Some(date(2020, 6, 30)),
            Some(7),
            Some(96001),
            Some(250),
        );
        let stmt = observations(&filter);

        assert_eq!(
            tail(&stmt),
            " AND oc.tanggal BETWEEN $1 AND $2 AND w.id_wilayah = $3 AND s.id_stasiun = $4 \
             ORDER BY oc.tanggal DESC LIMIT $5"
        );
        assert_eq!(
            stmt.params,
            vec![
                Param::Date(date(2020, 1, 1)),
                Param::Date(date(2020, 6, 30)),
                Param::Int(7),
                Param::Int(96001),
                Param::BigInt(250),
            ]
        );
        assert_eq!(stmt.sql_params().len(), 5);
    }

    #[test]
    fn test_station_without_region() {
        let filter = ObservationFilter::new(None, None, None, Some(96171), None);
        let stmt = observations(&filter);

        assert_eq!(
            tail(&stmt),
            " AND s.id_stasiun = $1 ORDER BY oc.tanggal DESC LIMIT $2"
        );
    }

    #[test]
    fn test_zero_limit_is_sent_as_zero() {
        let filter = ObservationFilter::new(None, None, None, None, Some(0));
        let stmt = observations(&filter);
        assert_eq!(stmt.params, vec![Param::BigInt(0)]);
    }

    #[test]
    fn test_negative_limit_is_clamped_to_zero() {
        let filter = ObservationFilter::new(None, None, None, None, Some(-5));
        let stmt = observations(&filter);
        assert_eq!(stmt.params, vec![Param::BigInt(0)]);
        assert_eq!(clamp_limit(-1), 0);
        assert_eq!(clamp_limit(25), 25);
    }

    #[test]
    fn test_joins_are_fixed() {
        let stmt = observations(&ObservationFilter::default());
        assert!(stmt.sql.contains("JOIN stasiun s ON oc.id_stasiun = s.id_stasiun"));
        assert!(stmt.sql.contains("LEFT JOIN wilayah w ON s.id_wilayah = w.id_wilayah"));
        assert!(stmt.sql.contains("LEFT JOIN provinsi p ON w.id_provinsi = p.id_provinsi"));
        assert!(stmt
            .sql
            .contains("LEFT JOIN arah_angin aa ON oc.kode_arah_angin = aa.kode_arah"));
    }

    #[test]
    fn test_date_text_does_not_depend_on_datestyle() {
        let stmt = observations(&ObservationFilter::default());
        assert!(stmt
            .sql
            .contains("to_char(oc.tanggal, 'YYYY-MM-DD') AS tanggal"));
        assert!(!stmt.sql.contains("::text"));
    }
}
