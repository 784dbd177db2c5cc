pub mod frame;
pub mod model;
pub mod service;

pub use frame::{FeatureFrame, FeatureValue};
pub use model::{load_model, shared_model, ModelError, PricingModel};
pub use service::{PredictionError, PredictionService};
