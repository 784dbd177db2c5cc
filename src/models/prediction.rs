use serde::{de::Error, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Feature record accepted by `/predict`. Field names are part of the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFeatures {
    pub model_key: String,
    #[serde(deserialize_with = "finite_number")]
    pub mileage: f64,
    #[serde(deserialize_with = "finite_number")]
    pub engine_power: f64,
    pub fuel: String,
    pub paint_color: String,
    pub car_type: String,
    #[serde(deserialize_with = "flag")]
    pub private_parking_available: bool,
    #[serde(deserialize_with = "flag")]
    pub has_gps: bool,
    #[serde(deserialize_with = "flag")]
    pub has_air_conditioning: bool,
    #[serde(deserialize_with = "flag")]
    pub automatic_car: bool,
    #[serde(deserialize_with = "flag")]
    pub has_getaround_connect: bool,
    #[serde(deserialize_with = "flag")]
    pub has_speed_regulator: bool,
    #[serde(deserialize_with = "flag")]
    pub winter_tires: bool,
}

/// A JSON number or a numeric string. `null`, NaN and infinities are rejected.
fn finite_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let number = match Value::deserialize(deserializer)? {
        Value::Number(num) => num
            .as_f64()
            .ok_or_else(|| D::Error::custom("invalid number"))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}")))?,
        other => return Err(D::Error::custom(format!("expected a number, got {other}"))),
    };
    if !number.is_finite() {
        return Err(D::Error::custom("expected a finite number"));
    }
    Ok(number)
}

/// A JSON bool, `0`/`1`, or one of `true`, `True`, `false`, `False`.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) if s == "true" || s == "True" => Ok(true),
        Value::String(s) if s == "false" || s == "False" => Ok(false),
        Value::Number(num) if num.as_u64() == Some(1) => Ok(true),
        Value::Number(num) if num.as_u64() == Some(0) => Ok(false),
        other => Err(D::Error::custom(format!("expected a boolean, got {other}"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predictions: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_documented_example() {
        let body = r#"{"model_key":"Peugeot","mileage":140000,"engine_power":100,"fuel":"petrol","paint_color":"black","car_type":"sedan","private_parking_available":true,"has_gps":true,"has_air_conditioning":true,"automatic_car":false,"has_getaround_connect":false,"has_speed_regulator":true,"winter_tires":true}"#;
        let features: PredictionFeatures = serde_json::from_str(body).unwrap();
        assert_eq!(features.model_key, "Peugeot");
        assert_eq!(features.mileage, 140000.0);
        assert!(features.winter_tires);
        assert!(!features.automatic_car);
    }

    #[test]
    fn coerces_numeric_strings() {
        let body = r#"{"model_key":"Audi","mileage":"12000.5","engine_power":"135","fuel":"diesel","paint_color":"grey","car_type":"suv","private_parking_available":false,"has_gps":false,"has_air_conditioning":false,"automatic_car":true,"has_getaround_connect":true,"has_speed_regulator":false,"winter_tires":false}"#;
        let features: PredictionFeatures = serde_json::from_str(body).unwrap();
        assert_eq!(features.mileage, 12000.5);
        assert_eq!(features.engine_power, 135.0);
    }

    fn with_field(field: &str, value: Value) -> Result<PredictionFeatures, serde_json::Error> {
        let mut body: Value = serde_json::from_str(r#"{"model_key":"Audi","mileage":12000,"engine_power":135,"fuel":"diesel","paint_color":"grey","car_type":"suv","private_parking_available":false,"has_gps":false,"has_air_conditioning":false,"automatic_car":true,"has_getaround_connect":true,"has_speed_regulator":false,"winter_tires":false}"#).unwrap();
        body[field] = value;
        serde_json::from_value(body)
    }

    #[test]
    fn accepts_textual_and_numeric_flags() {
        assert!(with_field("has_gps", "True".into()).unwrap().has_gps);
        assert!(with_field("has_gps", 1.into()).unwrap().has_gps);
        assert!(!with_field("has_gps", "false".into()).unwrap().has_gps);
    }

    #[test]
    fn rejects_values_that_are_not_flags() {
        assert!(with_field("has_gps", "banana".into()).is_err());
        assert!(with_field("has_gps", Value::Null).is_err());
        assert!(with_field("has_gps", 2.into()).is_err());
    }

    #[test]
    fn rejects_null_and_non_finite_numbers() {
        assert!(with_field("mileage", Value::Null).is_err());
        assert!(with_field("mileage", "NaN".into()).is_err());
        assert!(with_field("engine_power", "inf".into()).is_err());
        assert!(with_field("mileage", "lots".into()).is_err());
    }

    #[test]
    fn missing_field_is_rejected() {
        let body = r#"{"model_key":"Audi","mileage":1}"#;
        assert!(serde_json::from_str::<PredictionFeatures>(body).is_err());
    }
}
