pub mod charts;
pub mod data;
pub mod page;
pub mod report;
pub mod svg;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{body::Bytes, extract::State, response::Html, routing::get, Router};
use chrono::Local;
use log::info;
use tokio::net::TcpListener;

use crate::{config::Config, dataset::read_delay_dataset};
use report::DashboardReport;

/// Dataset and rendered page, loaded once and kept for the life of the process.
#[derive(Clone)]
pub struct DashboardState {
    pub report: Arc<DashboardReport>,
    page: Bytes,
}

impl DashboardState {
    pub fn load(config: &Config) -> Result<Self> {
        info!("Loading delay dataset from {}", config.delay_dataset_path);
        let records = read_delay_dataset(&config.delay_dataset_path)?;
        let report = DashboardReport::build(
            &records,
            config.late_threshold_minutes,
            config.histogram_bins,
        );
        info!(
            "Loaded {} rentals, {} returned late",
            report.row_count, report.late_count
        );

        let page = page::render_page(&records, &report, Local::now());
        Ok(DashboardState {
            report: Arc::new(report),
            page: Bytes::from(page),
        })
    }
}

pub fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(show_dashboard))
        .with_state(state)
}

async fn show_dashboard(State(state): State<DashboardState>) -> Html<Bytes> {
    Html(state.page.clone())
}

pub async fn start_dashboard_server(
    state: DashboardState,
    bind_addr: &str,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind dashboard listener on {bind_addr}"))?;
    info!("Dashboard listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .context("Dashboard server crashed")
}
