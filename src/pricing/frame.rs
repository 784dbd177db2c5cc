use crate::models::prediction::PredictionFeatures;

/// Column order of the single-row frame handed to the model.
pub const FEATURE_COLUMNS: [&str; 13] = [
    "model_key",
    "mileage",
    "engine_power",
    "fuel",
    "paint_color",
    "car_type",
    "private_parking_available",
    "has_gps",
    "has_air_conditioning",
    "automatic_car",
    "has_getaround_connect",
    "has_speed_regulator",
    "winter_tires",
];

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl FeatureValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Number(_) => "number",
            FeatureValue::Text(_) => "text",
            FeatureValue::Flag(_) => "boolean",
        }
    }
}

/// A single row of named feature values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(&'static str, FeatureValue)>,
}

impl FeatureFrame {
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(column, _)| *column == name)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &(&'static str, FeatureValue)> {
        self.columns.iter()
    }
}

impl From<&PredictionFeatures> for FeatureFrame {
    fn from(features: &PredictionFeatures) -> Self {
        use FeatureValue::{Flag, Number, Text};

        let values = [
            Text(features.model_key.clone()),
            Number(features.mileage),
            Number(features.engine_power),
            Text(features.fuel.clone()),
            Text(features.paint_color.clone()),
            Text(features.car_type.clone()),
            Flag(features.private_parking_available),
            Flag(features.has_gps),
            Flag(features.has_air_conditioning),
            Flag(features.automatic_car),
            Flag(features.has_getaround_connect),
            Flag(features.has_speed_regulator),
            Flag(features.winter_tires),
        ];

        FeatureFrame {
            columns: FEATURE_COLUMNS.into_iter().zip(values).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_keeps_column_order() {
        let features = PredictionFeatures {
            model_key: "Peugeot".to_string(),
            mileage: 140000.0,
            engine_power: 100.0,
            fuel: "petrol".to_string(),
            paint_color: "black".to_string(),
            car_type: "sedan".to_string(),
            private_parking_available: true,
            has_gps: true,
            has_air_conditioning: true,
            automatic_car: false,
            has_getaround_connect: false,
            has_speed_regulator: true,
            winter_tires: true,
        };

        let frame = FeatureFrame::from(&features);
        let names: Vec<&str> = frame.columns().map(|(name, _)| *name).collect();

        assert_eq!(names, FEATURE_COLUMNS.to_vec());
        assert_eq!(frame.get("fuel"), Some(&FeatureValue::Text("petrol".to_string())));
        assert_eq!(frame.get("automatic_car"), Some(&FeatureValue::Flag(false)));
        assert_eq!(frame.get("rental_price_per_day"), None);
    }
}
