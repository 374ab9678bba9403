use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::dashboard::{Dashboard, LoadRequest};
use crate::store::WeatherStore;

type Shared<S> = Arc<Dashboard<S>>;

pub async fn run<S: WeatherStore + 'static>(address: SocketAddr, dashboard: Shared<S>) {
    let cors = warp::cors().allow_any_origin().allow_methods(vec!["GET"]);
    log::info!("Listening on {}", address);
    warp::serve(routes(dashboard).with(cors)).run(address).await
}

pub fn routes<S: WeatherStore + 'static>(
    dashboard: Shared<S>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health_route = warp::path!("health")
        .and(with_dashboard(dashboard.clone()))
        .and_then(health::<S>);

    let observations_route = warp::path!("observations")
        .and(warp::query::<ObservationQuery>())
        .and(with_dashboard(dashboard.clone()))
        .and_then(observations::<S>);

    let sample_route = warp::path!("observations" / "sample")
        .and(warp::query::<LimitQuery>())
        .and(with_dashboard(dashboard.clone()))
        .and_then(sample::<S>);

    let records_route = warp::path!("dashboard" / "observations")
        .and(warp::query::<LoadRequest>())
        .and(with_dashboard(dashboard.clone()))
        .and_then(dashboard_records::<S>);

    let summary_route = warp::path!("dashboard" / "summary")
        .and(warp::query::<LoadRequest>())
        .and(with_dashboard(dashboard.clone()))
        .and_then(dashboard_summary::<S>);

    let latest_route = warp::path!("dashboard" / "latest")
        .and(warp::query::<LoadRequest>())
        .and(with_dashboard(dashboard.clone()))
        .and_then(dashboard_latest::<S>);

    let stations_route = warp::path!("stations")
        .and(with_dashboard(dashboard.clone()))
        .and_then(stations::<S>);

    let station_stats_route = warp::path!("stations" / i32 / "stats")
        .and(with_dashboard(dashboard.clone()))
        .and_then(station_stats::<S>);

    let regions_route = warp::path!("regions")
        .and(with_dashboard(dashboard.clone()))
        .and_then(regions::<S>);

    let provinces_route = warp::path!("provinces")
        .and(with_dashboard(dashboard.clone()))
        .and_then(provinces::<S>);

    let wind_directions_route = warp::path!("wind-directions")
        .and(with_dashboard(dashboard.clone()))
        .and_then(wind_directions::<S>);

    let years_route = warp::path!("years")
        .and(with_dashboard(dashboard.clone()))
        .and_then(years::<S>);

    let stats_route = warp::path!("stats")
        .and(with_dashboard(dashboard.clone()))
        .and_then(database_stats::<S>);

    let columns_route = warp::path!("columns")
        .and(with_dashboard(dashboard))
        .and_then(columns::<S>);

    warp::get()
        .and(
            health_route
                .or(observations_route)
                .or(sample_route)
                .or(records_route)
                .or(summary_route)
                .or(latest_route)
                .or(stations_route)
                .or(station_stats_route)
                .or(regions_route)
                .or(provinces_route)
                .or(wind_directions_route)
                .or(years_route)
                .or(stats_route)
                .or(columns_route),
        )
        .recover(rejection)
}

fn with_dashboard<S: WeatherStore + 'static>(
    dashboard: Shared<S>,
) -> impl Filter<Extract = (Shared<S>,), Error = Infallible> + Clone {
    warp::any().map(move || dashboard.clone())
}

#[derive(Debug, Deserialize)]
pub struct ObservationQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub region_id: Option<i32>,
    pub station_id: Option<i32>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
struct HealthStatus {
    connected: bool,
}

pub async fn health<S: WeatherStore>(dashboard: Shared<S>) -> Result<impl Reply, Infallible> {
    let connected = dashboard.test_connection().await;
    let code = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&HealthStatus { connected }),
        code,
    ))
}

pub async fn observations<S: WeatherStore>(
    query: ObservationQuery,
    dashboard: Shared<S>,
) -> Result<impl Reply, Infallible> {
    let rows = dashboard
        .fetch_observations(
            query.start,
            query.end,
            query.region_id,
            query.station_id,
            query.limit,
        )
        .await;
    Ok(warp::reply::json(&rows))
}

pub async fn sample<S: WeatherStore>(
    query: LimitQuery,
    dashboard: Shared<S>,
) -> Result<impl Reply, Infallible> {
    let rows = dashboard.fetch_sample_observations(query.limit).await;
    Ok(warp::reply::json(&rows))
}

pub async fn dashboard_records<S: WeatherStore>(
    request: LoadRequest,
    dashboard: Shared<S>,
) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&dashboard.display_records(&request).await))
}

pub async fn dashboard_summary<S: WeatherStore>(
    request: LoadRequest,
    dashboard: Shared<S>,
) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&dashboard.summary(&request).await))
}

pub async fn dashboard_latest<S: WeatherStore>(
    request: LoadRequest,
    dashboard: Shared<S>,
) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&dashboard.latest_by_station(&request).await))
}

pub async fn stations<S: WeatherStore>(dashboard: Shared<S>) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&dashboard.fetch_stations().await))
}

pub async fn station_stats<S: WeatherStore>(
    station_id: i32,
    dashboard: Shared<S>,
) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(
        &dashboard.fetch_station_stats(station_id).await,
    ))
}

pub async fn regions<S: WeatherStore>(dashboard: Shared<S>) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&dashboard.fetch_regions().await))
}

pub async fn provinces<S: WeatherStore>(dashboard: Shared<S>) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&dashboard.fetch_provinces().await))
}

pub async fn wind_directions<S: WeatherStore>(
    dashboard: Shared<S>,
) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&dashboard.fetch_wind_directions().await))
}

pub async fn years<S: WeatherStore>(dashboard: Shared<S>) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&dashboard.fetch_available_years().await))
}

pub async fn database_stats<S: WeatherStore>(
    dashboard: Shared<S>,
) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&dashboard.fetch_database_stats().await))
}

#[derive(Serialize)]
struct Column {
    field: &'static str,
    label: &'static str,
}

pub async fn columns<S: WeatherStore>(dashboard: Shared<S>) -> Result<impl Reply, Infallible> {
    let columns: Vec<Column> = dashboard
        .display_column_names()
        .iter()
        .map(|&(field, label)| Column { field, label })
        .collect();
    Ok(warp::reply::json(&columns))
}

#[derive(Serialize)]
struct ErrorMessage {
    code: u16,
    message: String,
}

pub async fn rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found.")
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query parameters.")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
    } else {
        log::error!("Error: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
    };

    let json = warp::reply::json(&ErrorMessage {
        code: code.as_u16(),
        message: message.into(),
    });

    Ok(warp::reply::with_status(json, code))
}
