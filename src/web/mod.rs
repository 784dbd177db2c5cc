pub mod error;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use log::info;
use tokio::net::TcpListener;

use crate::{
    config::Config,
    dataset::{read_pricing_dataset, Table},
    models::{
        car_listing::CarListing,
        prediction::{PredictionFeatures, PredictionResponse},
    },
    pricing::{PredictionService, PricingModel},
    services::cars::{sample_rng, sample_rows, search_model_key},
};

pub use error::ApiError;

pub const WELCOME_MESSAGE: &str = "Welcome to the GetAround pricing API! It estimates the daily rental price you should ask for your car. Predictions come from a regression model fitted on rentals collected by the GetAround data team.";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub predictor: PredictionService,
}

impl AppState {
    pub fn new(config: Arc<Config>, model: Arc<PricingModel>) -> Self {
        let predictor = PredictionService::new(model, config.strict_categories);
        AppState { config, predictor }
    }
}

type CarsResponse = Json<Table<CarListing>>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/sample", get(load_sample_cars))
        .route("/Search_model_key/:model_key", get(search_cars))
        .route("/search_model_key/:model_key", get(search_cars))
        .route("/predict", post(predict))
        .layer(middleware::from_fn(cors_layer))
        .with_state(state)
}

pub async fn start_http_server(
    state: AppState,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) -> Result<()> {
    let bind_addr = state.config.http_bind_address.clone();

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind http listener on {bind_addr}"))?;
    info!("Pricing API listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .context("HTTP server crashed")
}

async fn cors_layer(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        apply_cors_headers(response.headers_mut());
        *response.status_mut() = StatusCode::NO_CONTENT;
        response
    } else {
        let mut response = next.run(req).await;
        apply_cors_headers(response.headers_mut());
        response
    }
}

fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    headers.insert(
        axum::http::header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
}

/// Re-reads the pricing file on the blocking pool.
async fn load_cars(config: &Arc<Config>) -> Result<Table<CarListing>, ApiError> {
    let path = config.pricing_dataset_path.clone();
    let cars = tokio::task::spawn_blocking(move || read_pricing_dataset(path)).await??;
    Ok(cars)
}

async fn index() -> Json<&'static str> {
    Json(WELCOME_MESSAGE)
}

async fn load_sample_cars(State(state): State<AppState>) -> Result<CarsResponse, ApiError> {
    let cars = load_cars(&state.config).await?;
    let mut rng = sample_rng(state.config.sample_seed);
    let sample = sample_rows(&cars, state.config.sample_size, &mut rng).cloned();

    info!("GET /sample returned {} of {} rows", sample.len(), cars.len());
    Ok(Json(sample))
}

async fn search_cars(
    State(state): State<AppState>,
    Path(model_key): Path<String>,
) -> Result<CarsResponse, ApiError> {
    let cars = load_cars(&state.config).await?;
    let found = search_model_key(&cars, &model_key).cloned();

    info!("GET /Search_model_key/{model_key} matched {} rows", found.len());
    Ok(Json(found))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionFeatures>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(features) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    let predictions = state.predictor.predict(&features)?;

    info!(
        "POST /predict {} {} -> {predictions:.2}",
        features.model_key, features.car_type
    );
    Ok(Json(PredictionResponse { predictions }))
}
