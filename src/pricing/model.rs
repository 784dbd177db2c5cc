use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use log::info;
use nalgebra::DVector;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use thiserror::Error;

use super::frame::{FeatureFrame, FeatureValue};

static SHARED_MODEL: OnceCell<(PathBuf, Arc<PricingModel>)> = OnceCell::new();

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("feature frame has no column {0:?}")]
    MissingColumn(String),
    #[error("column {column:?} should be a {expected}, got a {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("found unknown category {value:?} in column {column:?} during transform")]
    UnknownCategory { column: String, value: String },
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),
}

/// What the encoder does with a category it was not fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    #[default]
    Error,
    /// Encode as all zeros, leaving the intercept to carry the prediction.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSpec {
    Numeric {
        name: String,
        mean: f64,
        scale: f64,
        coefficient: f64,
    },
    Categorical {
        name: String,
        categories: BTreeMap<String, f64>,
        #[serde(default)]
        unknown: UnknownCategoryPolicy,
    },
    Boolean {
        name: String,
        coefficient: f64,
    },
}

impl FeatureSpec {
    pub fn name(&self) -> &str {
        match self {
            FeatureSpec::Numeric { name, .. }
            | FeatureSpec::Categorical { name, .. }
            | FeatureSpec::Boolean { name, .. } => name,
        }
    }

    fn width(&self) -> usize {
        match self {
            FeatureSpec::Categorical { categories, .. } => categories.len(),
            _ => 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    name: String,
    target: String,
    intercept: f64,
    features: Vec<FeatureSpec>,
}

/// Fitted pricing pipeline: standardized numerics, one-hot categoricals and
/// boolean flags feeding a linear regressor.
#[derive(Debug, Clone)]
pub struct PricingModel {
    name: String,
    target: String,
    intercept: f64,
    features: Vec<FeatureSpec>,
    weights: DVector<f64>,
}

impl PricingModel {
    fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if !artifact.intercept.is_finite() {
            return Err(ModelError::InvalidArtifact("intercept is not finite".to_string()));
        }
        if artifact.features.is_empty() {
            return Err(ModelError::InvalidArtifact("no features".to_string()));
        }

        let mut weights = Vec::with_capacity(artifact.features.iter().map(FeatureSpec::width).sum());
        for spec in &artifact.features {
            if artifact
                .features
                .iter()
                .filter(|other| other.name() == spec.name())
                .count()
                > 1
            {
                return Err(ModelError::InvalidArtifact(format!(
                    "feature {:?} is declared twice",
                    spec.name()
                )));
            }

            match spec {
                FeatureSpec::Numeric {
                    name,
                    mean,
                    scale,
                    coefficient,
                } => {
                    if *scale == 0.0 || !scale.is_finite() || !mean.is_finite() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "feature {name:?} has an unusable scaler"
                        )));
                    }
                    weights.push(*coefficient);
                }
                FeatureSpec::Categorical {
                    name, categories, ..
                } => {
                    if categories.is_empty() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "feature {name:?} has no categories"
                        )));
                    }
                    weights.extend(categories.values().copied());
                }
                FeatureSpec::Boolean { coefficient, .. } => weights.push(*coefficient),
            }
        }

        if let Some(spec) = artifact.features.iter().find(|spec| match spec {
            FeatureSpec::Numeric { coefficient, .. } | FeatureSpec::Boolean { coefficient, .. } => {
                !coefficient.is_finite()
            }
            FeatureSpec::Categorical { categories, .. } => {
                categories.values().any(|c| !c.is_finite())
            }
        }) {
            return Err(ModelError::InvalidArtifact(format!(
                "feature {:?} has a non-finite coefficient",
                spec.name()
            )));
        }

        Ok(PricingModel {
            name: artifact.name,
            target: artifact.target,
            intercept: artifact.intercept,
            features: artifact.features,
            weights: DVector::from_vec(weights),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ModelArtifact =
            serde_json::from_str(json).context("failed to decode model artifact")?;
        Ok(PricingModel::from_artifact(artifact)?)
    }

    /// Categories the encoder was fitted on, `None` if `column` is not categorical.
    pub fn known_categories(&self, column: &str) -> Option<Vec<&str>> {
        self.features.iter().find_map(|spec| match spec {
            FeatureSpec::Categorical {
                name, categories, ..
            } if name == column => Some(categories.keys().map(String::as_str).collect()),
            _ => None,
        })
    }

    fn encode(&self, frame: &FeatureFrame) -> Result<DVector<f64>, ModelError> {
        let mut encoded = Vec::with_capacity(self.weights.len());

        for spec in &self.features {
            let value = frame
                .get(spec.name())
                .ok_or_else(|| ModelError::MissingColumn(spec.name().to_string()))?;
            let mismatch = |expected| ModelError::TypeMismatch {
                column: spec.name().to_string(),
                expected,
                found: value.kind(),
            };

            match (spec, value) {
                (FeatureSpec::Numeric { mean, scale, .. }, FeatureValue::Number(v)) => {
                    encoded.push((v - mean) / scale)
                }
                (FeatureSpec::Numeric { .. }, _) => return Err(mismatch("number")),
                (
                    FeatureSpec::Categorical {
                        name,
                        categories,
                        unknown,
                    },
                    FeatureValue::Text(v),
                ) => {
                    if !categories.contains_key(v) && *unknown == UnknownCategoryPolicy::Error {
                        return Err(ModelError::UnknownCategory {
                            column: name.clone(),
                            value: v.clone(),
                        });
                    }
                    encoded.extend(
                        categories
                            .keys()
                            .map(|category| if category == v { 1.0 } else { 0.0 }),
                    );
                }
                (FeatureSpec::Categorical { .. }, _) => return Err(mismatch("text")),
                (FeatureSpec::Boolean { .. }, FeatureValue::Flag(v)) => {
                    encoded.push(if *v { 1.0 } else { 0.0 })
                }
                (FeatureSpec::Boolean { .. }, _) => return Err(mismatch("boolean")),
            }
        }

        Ok(DVector::from_vec(encoded))
    }

    pub fn predict(&self, frame: &FeatureFrame) -> Result<f64, ModelError> {
        let encoded = self.encode(frame)?;
        Ok(self.intercept + self.weights.dot(&encoded))
    }
}

pub fn load_model(path: impl AsRef<Path>) -> Result<PricingModel> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model artifact {}", path.display()))?;
    let model = PricingModel::from_json(&json)
        .with_context(|| format!("failed to load model artifact {}", path.display()))?;
    info!(
        "Loaded model {:?} predicting {:?} from {}",
        model.name,
        model.target,
        path.display()
    );
    Ok(model)
}

/// Loads the artifact on first call and hands out the same instance afterwards.
/// The process holds one model: asking for a different path later is an error.
pub fn shared_model(path: impl AsRef<Path>) -> Result<Arc<PricingModel>> {
    let path = path.as_ref();
    let (loaded_from, model) = SHARED_MODEL.get_or_try_init(|| {
        load_model(path).map(|model| (path.to_path_buf(), Arc::new(model)))
    })?;
    if loaded_from != path {
        bail!(
            "model already loaded from {}, refusing to switch to {}",
            loaded_from.display(),
            path.display()
        );
    }
    Ok(Arc::clone(model))
}
