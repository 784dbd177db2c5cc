use serde::{Deserialize, Serialize};

pub const CHECKIN_MOBILE: &str = "mobile";
pub const CHECKIN_CONNECT: &str = "connect";

/// One row of the delay analysis dataset. Empty cells are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayRecord {
    pub rental_id: u64,
    pub car_id: u64,
    pub checkin_type: String,
    pub state: String,
    pub delay_at_checkout_in_minutes: Option<f64>,
    pub previous_ended_rental_id: Option<f64>,
    pub time_delta_with_previous_rental_in_minutes: Option<f64>,
}

impl DelayRecord {
    /// 1 when the checkout delay is strictly above `threshold_minutes`.
    pub fn late_flag(&self, threshold_minutes: f64) -> u8 {
        match self.delay_at_checkout_in_minutes {
            Some(delay) if delay > threshold_minutes => 1,
            _ => 0,
        }
    }

    pub fn positive_time_delta(&self) -> Option<f64> {
        self.time_delta_with_previous_rental_in_minutes
            .filter(|delta| *delta > 0.0)
    }
}
