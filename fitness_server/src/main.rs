//! Read-only HTTP query endpoint over a post-sync dataset snapshot.
//!
//! The server runs one sync cycle at startup, then serves the immutable
//! snapshot; requests never trigger another sync.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use fitness_core::query::{filter_by_date, filter_by_energy_threshold, filter_by_names, DateBound};
use fitness_core::{synchronize, Config, Dataset, Result, DATE_FORMAT};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "fitness-server")]
#[command(about = "Read-only HTTP query endpoint for the fitness dataset", long_about = None)]
struct Cli {
    /// Bind address, e.g. 127.0.0.1:8080
    #[arg(long)]
    bind: Option<String>,

    /// Override the cache file path
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Override the export source directory
    #[arg(long)]
    source_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct WorkoutQuery {
    /// Comma-separated workout names, matched case-insensitively.
    workout: Option<String>,
    /// Minimum active energy, as a decimal string.
    calories: Option<String>,
    /// Inclusive start date (`YYYY-MM-DD`) over the workout start time.
    start: Option<String>,
    /// Inclusive end date (`YYYY-MM-DD`) over the workout start time.
    end: Option<String>,
}

#[tokio::main]
async fn main() {
    fitness_core::logging::init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let cache_path = cli.cache.unwrap_or_else(|| config.data.cache_path.clone());
    let source_dir = cli
        .source_dir
        .unwrap_or_else(|| config.data.source_dir.clone());
    let bind = cli.bind.unwrap_or_else(|| config.server.bind.clone());

    // One sync cycle before serving; the snapshot is immutable afterwards.
    let outcome = synchronize(&cache_path, &source_dir)?;
    tracing::info!(
        "Serving {} workouts and {} metrics (watermark {:?})",
        outcome.dataset.workouts.len(),
        outcome.dataset.metrics.len(),
        outcome.watermark
    );

    let listener = TcpListener::bind(&bind)
        .await
        .map_err(fitness_core::Error::Io)?;
    let addr = listener.local_addr().map_err(fitness_core::Error::Io)?;
    tracing::info!("Listening on {}", addr);

    let app = build_router(Arc::new(outcome.dataset));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(fitness_core::Error::Io)?;

    Ok(())
}

fn build_router(snapshot: Arc<Dataset>) -> Router {
    Router::new()
        .route("/api/workouts", get(get_workouts))
        .with_state(snapshot)
}

async fn get_workouts(
    State(snapshot): State<Arc<Dataset>>,
    Query(params): Query<WorkoutQuery>,
) -> Response {
    let mut workouts = snapshot.workouts.clone();

    if let Some(names) = params.workout.as_deref() {
        workouts = filter_by_names(&workouts, names);
    }

    if let Some(raw) = params.calories.as_deref() {
        let threshold: f64 = match raw.parse() {
            Ok(t) => t,
            Err(_) => {
                return plain_error(
                    StatusCode::BAD_REQUEST,
                    "Error parsing calories threshold",
                );
            }
        };
        workouts = filter_by_energy_threshold(&workouts, threshold);
    }

    if let Some(raw) = params.start.as_deref() {
        match chrono::NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => workouts = filter_by_date(&workouts, date, DateBound::Start),
            Err(_) => {
                return plain_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error filtering workout data by start date",
                );
            }
        }
    }

    if let Some(raw) = params.end.as_deref() {
        match chrono::NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => workouts = filter_by_date(&workouts, date, DateBound::End),
            Err(_) => {
                return plain_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error filtering workout data by end date",
                );
            }
        }
    }

    (StatusCode::OK, Json(workouts)).into_response()
}

fn plain_error(status: StatusCode, message: &'static str) -> Response {
    (status, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitness_core::{Measurement, Workout};
    use std::net::SocketAddr;

    fn workout(name: &str, start: &str, energy: f64) -> Workout {
        Workout {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.into(),
            start: start.into(),
            end: start.into(),
            duration_seconds: 1800.0,
            distance: None,
            active_energy_burned: (energy > 0.0).then(|| Measurement {
                units: "kcal".into(),
                quantity: energy,
            }),
            intensity: None,
            location: None,
            humidity: None,
            temperature: None,
            lap_length: None,
        }
    }

    fn test_snapshot() -> Arc<Dataset> {
        Arc::new(Dataset {
            workouts: vec![
                workout("Pool Swim", "2024-01-05 08:00:00 -0500", 300.0),
                workout("Outdoor Run", "2024-02-10 07:00:00 -0500", 450.0),
                workout("Outdoor Cycle", "2024-03-20 09:00:00 -0500", 600.0),
            ],
            metrics: vec![],
        })
    }

    async fn spawn_test_server(snapshot: Arc<Dataset>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral listener");
        let addr = listener.local_addr().expect("resolve listener addr");
        let app = build_router(snapshot);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        addr
    }

    #[tokio::test]
    async fn test_unfiltered_returns_all_workouts() {
        let addr = spawn_test_server(test_snapshot()).await;
        let body: Vec<serde_json::Value> =
            reqwest::get(format!("http://{}/api/workouts", addr))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        assert_eq!(body.len(), 3);
    }

    #[tokio::test]
    async fn test_name_filter_is_case_insensitive_equality() {
        let addr = spawn_test_server(test_snapshot()).await;
        let body: Vec<serde_json::Value> = reqwest::get(format!(
            "http://{}/api/workouts?workout=pool%20swim,outdoor%20run",
            addr
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
        assert_eq!(body.len(), 2);
    }

    #[tokio::test]
    async fn test_calories_threshold_filters() {
        let addr = spawn_test_server(test_snapshot()).await;
        let body: Vec<serde_json::Value> =
            reqwest::get(format!("http://{}/api/workouts?calories=450", addr))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        assert_eq!(body.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_calories_is_bad_request() {
        let addr = spawn_test_server(test_snapshot()).await;
        let resp = reqwest::get(format!("http://{}/api/workouts?calories=lots", addr))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body = resp.text().await.unwrap();
        assert!(body.contains("calories"));
    }

    #[tokio::test]
    async fn test_date_range_filters() {
        let addr = spawn_test_server(test_snapshot()).await;
        let body: Vec<serde_json::Value> = reqwest::get(format!(
            "http://{}/api/workouts?start=2024-02-01&end=2024-02-28",
            addr
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["name"], "Outdoor Run");
    }

    #[tokio::test]
    async fn test_malformed_date_is_internal_error() {
        let addr = spawn_test_server(test_snapshot()).await;
        let resp = reqwest::get(format!("http://{}/api/workouts?start=february", addr))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_response_uses_export_field_names() {
        let addr = spawn_test_server(test_snapshot()).await;
        let body: Vec<serde_json::Value> =
            reqwest::get(format!("http://{}/api/workouts?workout=pool%20swim", addr))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        assert_eq!(body[0]["activeEnergyBurned"]["qty"], 300.0);
        assert_eq!(body[0]["duration"], 1800.0);
    }
}
