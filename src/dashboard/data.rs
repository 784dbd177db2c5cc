use std::collections::BTreeSet;

use crate::{dataset::Table, models::delay::DelayRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeltVariable {
    TimeDelta,
    CheckoutDelay,
}

impl MeltVariable {
    pub fn column(&self) -> &'static str {
        match self {
            MeltVariable::TimeDelta => "time_delta_with_previous_rental_in_minutes",
            MeltVariable::CheckoutDelay => "delay_at_checkout_in_minutes",
        }
    }
}

/// Long-format row: one measured value of one rental.
#[derive(Debug, Clone, PartialEq)]
pub struct MeltedRow<'a> {
    pub car_id: u64,
    pub rental_id: u64,
    pub state: &'a str,
    pub checkin_type: &'a str,
    pub variable: MeltVariable,
    pub value: f64,
}

pub fn late_flags(records: &Table<DelayRecord>, threshold_minutes: f64) -> Vec<u8> {
    records
        .iter()
        .map(|record| record.late_flag(threshold_minutes))
        .collect()
}

/// Drops rentals missing either the time gap or the checkout delay, then stacks
/// both columns into `(variable, value)` rows: all gaps first, then all delays.
pub fn melt(records: &Table<DelayRecord>) -> Vec<MeltedRow<'_>> {
    let complete: Vec<(&DelayRecord, f64, f64)> = records
        .iter()
        .filter_map(|record| {
            let gap = record.time_delta_with_previous_rental_in_minutes?;
            let delay = record.delay_at_checkout_in_minutes?;
            Some((record, gap, delay))
        })
        .collect();

    let gaps = complete
        .iter()
        .map(|(record, gap, _)| (*record, MeltVariable::TimeDelta, *gap));
    let delays = complete
        .iter()
        .map(|(record, _, delay)| (*record, MeltVariable::CheckoutDelay, *delay));

    gaps.chain(delays)
        .map(|(record, variable, value)| MeltedRow {
            car_id: record.car_id,
            rental_id: record.rental_id,
            state: &record.state,
            checkin_type: &record.checkin_type,
            variable,
            value,
        })
        .collect()
}

pub fn fleet_size(melted: &[MeltedRow<'_>]) -> usize {
    melted
        .iter()
        .map(|row| row.car_id)
        .collect::<BTreeSet<_>>()
        .len()
}
