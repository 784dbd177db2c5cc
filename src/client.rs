use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::models::{
    car_listing::CarListing,
    prediction::{PredictionFeatures, PredictionResponse},
};

/// Typed client for the pricing API.
#[derive(Debug, Clone)]
pub struct PricingClient {
    base_url: String,
    http: reqwest::Client,
}

impl PricingClient {
    pub fn new(base_url: &str) -> Self {
        PricingClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn welcome(&self) -> Result<String> {
        let response = self
            .http
            .get(self.url("/"))
            .send()
            .await
            .context("Failed to reach pricing API")?;
        parse(response).await
    }

    /// Sampled rows keyed by row index. The map drops the sampled order.
    pub async fn sample(&self) -> Result<BTreeMap<usize, CarListing>> {
        let response = self
            .http
            .get(self.url("/sample"))
            .send()
            .await
            .context("Failed to reach pricing API")?;
        parse(response).await
    }

    pub async fn search_model_key(&self, model_key: &str) -> Result<BTreeMap<usize, CarListing>> {
        let mut url = reqwest::Url::parse(&self.url("/Search_model_key/"))
            .context("Invalid pricing API URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Pricing API URL cannot be a base"))?
            .pop_if_empty()
            .push(model_key);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to reach pricing API")?;
        parse(response).await
    }

    pub async fn predict(&self, features: &PredictionFeatures) -> Result<f64> {
        let response = self
            .http
            .post(self.url("/predict"))
            .json(features)
            .send()
            .await
            .context("Failed to reach pricing API")?;
        let parsed: PredictionResponse = parse(response).await?;
        Ok(parsed.predictions)
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(anyhow!("Pricing API endpoint not found (404)"));
    }

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!(
            "Pricing API responded with error {}: {}",
            status,
            body
        ));
    }

    response
        .json()
        .await
        .context("Failed to deserialize pricing API response")
}
