use std::sync::Arc;

use thiserror::Error;

use super::{
    frame::{FeatureFrame, FeatureValue},
    model::{ModelError, PricingModel},
};
use crate::models::prediction::PredictionFeatures;

#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("unknown value {value:?} for {field:?}, expected one of: {}", allowed.join(", "))]
    UnknownCategory {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone)]
pub struct PredictionService {
    model: Arc<PricingModel>,
    strict_categories: bool,
}

impl PredictionService {
    pub fn new(model: Arc<PricingModel>, strict_categories: bool) -> Self {
        PredictionService {
            model,
            strict_categories,
        }
    }

    pub fn predict(&self, features: &PredictionFeatures) -> Result<f64, PredictionError> {
        let frame = FeatureFrame::from(features);
        if self.strict_categories {
            self.check_categories(&frame)?;
        }
        Ok(self.model.predict(&frame)?)
    }

    fn check_categories(&self, frame: &FeatureFrame) -> Result<(), PredictionError> {
        for (column, value) in frame.columns() {
            let FeatureValue::Text(value) = value else {
                continue;
            };
            let Some(allowed) = self.model.known_categories(column) else {
                continue;
            };
            if !allowed.contains(&value.as_str()) {
                return Err(PredictionError::UnknownCategory {
                    field: column.to_string(),
                    value: value.clone(),
                    allowed: allowed.into_iter().map(str::to_string).collect(),
                });
            }
        }
        Ok(())
    }
}
