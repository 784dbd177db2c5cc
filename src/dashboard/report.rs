use super::{
    charts::{
        bin_edges, ecdf, group_by_first_seen, histogram, pie, BarMode, EcdfChart, EcdfCurve,
        HistNorm, Histogram, PieChart,
    },
    data::{fleet_size, late_flags, melt, MeltVariable, MeltedRow},
};
use crate::{
    dataset::Table,
    models::delay::{DelayRecord, CHECKIN_CONNECT, CHECKIN_MOBILE},
};

pub const CHECKOUT_DELAY_RANGE: (f64, f64) = (-400.0, 400.0);
pub const THRESHOLD_RANGE: (f64, f64) = (0.0, 600.0);

/// Everything the dashboard page shows, computed once per process.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardReport {
    pub row_count: usize,
    pub late_count: usize,
    pub late_threshold_minutes: f64,
    pub late_by_state: PieChart,
    pub time_delta_histogram: Histogram,
    pub time_delta_share: PieChart,
    pub checkout_delay_histogram: Histogram,
    pub fleet_size: usize,
    pub ecdf_mobile: EcdfChart,
    pub ecdf_connect: EcdfChart,
}

impl DashboardReport {
    pub fn build(records: &Table<DelayRecord>, late_threshold_minutes: f64, bins: usize) -> Self {
        let flags = late_flags(records, late_threshold_minutes);

        let late_by_state = pie(
            "Impact of the delay on the reservation: can the reservation be cancelled or not?",
            records
                .iter()
                .zip(&flags)
                .map(|(record, flag)| (record.state.as_str(), f64::from(*flag))),
        );

        let with_gap: Vec<&DelayRecord> = records
            .iter()
            .filter(|record| record.positive_time_delta().is_some())
            .collect();

        let gaps = group_by_first_seen(with_gap.iter().filter_map(|record| {
            record
                .positive_time_delta()
                .map(|gap| (record.checkin_type.as_str(), gap))
        }));
        let (gap_min, gap_max) = gaps
            .iter()
            .flat_map(|(_, values)| values.iter().copied())
            .fold(None, |range: Option<(f64, f64)>, v| match range {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })
            .unwrap_or((0.0, 1.0));
        let time_delta_histogram = histogram(
            "Frequency of car rentals by agreement",
            MeltVariable::TimeDelta.column(),
            gaps,
            bin_edges(gap_min, gap_max, bins),
            BarMode::Stack,
            HistNorm::Count,
        );

        let time_delta_share = pie(
            "Share of time between rentals by checkin type",
            records.iter().filter_map(|record| {
                record
                    .positive_time_delta()
                    .map(|gap| (record.checkin_type.as_str(), gap))
            }),
        );

        let delays = group_by_first_seen(with_gap.iter().filter_map(|record| {
            record
                .delay_at_checkout_in_minutes
                .map(|delay| (record.checkin_type.as_str(), delay))
        }));
        let checkout_delay_histogram = histogram(
            "How does delay impact check-out timing?",
            "Delay at checkout (minutes)",
            delays,
            bin_edges(CHECKOUT_DELAY_RANGE.0, CHECKOUT_DELAY_RANGE.1, bins),
            BarMode::Overlay,
            HistNorm::Percent,
        );

        let melted = melt(records);

        DashboardReport {
            row_count: records.len(),
            late_count: flags.iter().filter(|flag| **flag == 1).count(),
            late_threshold_minutes,
            late_by_state,
            time_delta_histogram,
            time_delta_share,
            checkout_delay_histogram,
            fleet_size: fleet_size(&melted),
            ecdf_mobile: threshold_ecdf("Mobile", &melted, CHECKIN_MOBILE),
            ecdf_connect: threshold_ecdf("Connect", &melted, CHECKIN_CONNECT),
        }
    }
}

fn threshold_ecdf(title: &str, melted: &[MeltedRow<'_>], checkin_type: &str) -> EcdfChart {
    let rows: Vec<&MeltedRow<'_>> = melted
        .iter()
        .filter(|row| row.checkin_type == checkin_type)
        .collect();

    let curves = [MeltVariable::TimeDelta, MeltVariable::CheckoutDelay]
        .into_iter()
        .map(|variable| {
            let values: Vec<f64> = rows
                .iter()
                .filter(|row| row.variable == variable)
                .map(|row| row.value)
                .collect();
            EcdfCurve {
                name: variable.column().to_string(),
                points: ecdf(&values),
            }
        })
        .filter(|curve| !curve.points.is_empty())
        .collect();

    EcdfChart {
        title: title.to_string(),
        x_label: "threshold (minutes)".to_string(),
        x_range: THRESHOLD_RANGE,
        curves,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        car_id: u64,
        checkin_type: &str,
        state: &str,
        delay: Option<f64>,
        gap: Option<f64>,
    ) -> DelayRecord {
        DelayRecord {
            rental_id: car_id + 1000,
            car_id,
            checkin_type: checkin_type.to_string(),
            state: state.to_string(),
            delay_at_checkout_in_minutes: delay,
            previous_ended_rental_id: gap.map(|_| 1.0),
            time_delta_with_previous_rental_in_minutes: gap,
        }
    }

    fn records() -> Table<DelayRecord> {
        Table {
            rows: vec![
                record(1, "mobile", "ended", Some(30.0), Some(60.0)),
                record(2, "mobile", "canceled", Some(5.0), None),
                record(3, "connect", "ended", Some(-20.0), Some(120.0)),
                record(4, "connect", "ended", Some(11.0), Some(0.0)),
                record(5, "mobile", "canceled", Some(90.0), Some(300.0)),
                record(6, "connect", "ended", None, Some(30.0)),
            ]
            .into_iter()
            .enumerate()
            .collect(),
        }
    }

    #[test]
    fn counts_late_rentals_per_state() {
        let report = DashboardReport::build(&records(), 10.0, 4);

        assert_eq!(report.row_count, 6);
        assert_eq!(report.late_count, 3);
        let slices: Vec<(&str, f64)> = report
            .late_by_state
            .slices
            .iter()
            .map(|slice| (slice.label.as_str(), slice.value))
            .collect();
        assert_eq!(slices, vec![("ended", 2.0), ("canceled", 1.0)]);
    }

    #[test]
    fn time_gap_charts_skip_non_positive_gaps() {
        let report = DashboardReport::build(&records(), 10.0, 4);

        let counted: f64 = report
            .time_delta_histogram
            .series
            .iter()
            .flat_map(|series| series.bins.iter())
            .sum();
        assert_eq!(counted, 4.0);
        assert_eq!(report.time_delta_histogram.edges.first(), Some(&30.0));
        assert_eq!(report.time_delta_histogram.edges.last(), Some(&300.0));

        let shares: Vec<(&str, f64)> = report
            .time_delta_share
            .slices
            .iter()
            .map(|slice| (slice.label.as_str(), slice.value))
            .collect();
        assert_eq!(shares, vec![("mobile", 360.0), ("connect", 150.0)]);
    }

    #[test]
    fn checkout_delay_is_normalized_per_checkin_type() {
        let report = DashboardReport::build(&records(), 10.0, 4);

        for series in &report.checkout_delay_histogram.series {
            let total: f64 = series.bins.iter().sum();
            assert!((total - 100.0).abs() < 1e-9, "{} sums to {total}", series.name);
        }
    }

    #[test]
    fn ecdf_uses_complete_rows_per_checkin_type() {
        let report = DashboardReport::build(&records(), 10.0, 4);

        assert_eq!(report.fleet_size, 4);
        assert_eq!(report.ecdf_mobile.curves.len(), 2);
        assert_eq!(
            report.ecdf_mobile.curves[0].points,
            vec![(60.0, 50.0), (300.0, 100.0)]
        );
        assert_eq!(
            report.ecdf_connect.curves[1].points,
            vec![(-20.0, 50.0), (11.0, 100.0)]
        );
        assert_eq!(report.ecdf_connect.x_range, THRESHOLD_RANGE);
    }
}
