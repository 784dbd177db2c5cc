use serde::{Deserialize, Serialize};
use serde_this_or_that::as_bool;

/// One row of the pricing dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarListing {
    pub model_key: String,
    pub mileage: f64,
    pub engine_power: f64,
    pub fuel: String,
    pub paint_color: String,
    pub car_type: String,
    #[serde(deserialize_with = "as_bool")]
    pub private_parking_available: bool,
    #[serde(deserialize_with = "as_bool")]
    pub has_gps: bool,
    #[serde(deserialize_with = "as_bool")]
    pub has_air_conditioning: bool,
    #[serde(deserialize_with = "as_bool")]
    pub automatic_car: bool,
    #[serde(deserialize_with = "as_bool")]
    pub has_getaround_connect: bool,
    #[serde(deserialize_with = "as_bool")]
    pub has_speed_regulator: bool,
    #[serde(deserialize_with = "as_bool")]
    pub winter_tires: bool,
    pub rental_price_per_day: f64,
}
