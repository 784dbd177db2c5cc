use chrono::{DateTime, Local};

use super::{
    report::DashboardReport,
    svg::{escape, render_ecdf, render_histogram, render_pie},
};
use crate::{dataset::Table, models::delay::DelayRecord};

const STYLE: &str = "body{font-family:sans-serif;max-width:1200px;margin:0 auto;padding:16px;color:#222}\
.columns{display:grid;grid-template-columns:1fr 1fr;gap:24px}\
.raw{max-height:420px;overflow:auto}\
table{border-collapse:collapse;font-size:12px}td,th{border:1px solid #ddd;padding:2px 6px;text-align:right}\
.metric{font-size:32px;font-weight:bold}footer{color:#888;font-size:12px;margin-top:32px}";

const RAW_COLUMNS: [&str; 7] = [
    "rental_id",
    "car_id",
    "checkin_type",
    "state",
    "delay_at_checkout_in_minutes",
    "previous_ended_rental_id",
    "time_delta_with_previous_rental_in_minutes",
];

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn raw_table(records: &Table<DelayRecord>) -> String {
    let mut out = String::from("<table><thead><tr><th></th>");
    for column in RAW_COLUMNS {
        out.push_str(&format!("<th>{column}</th>"));
    }
    out.push_str("</tr></thead><tbody>");

    for (index, record) in &records.rows {
        out.push_str(&format!(
            "<tr><th>{index}</th><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            record.rental_id,
            record.car_id,
            escape(&record.checkin_type),
            escape(&record.state),
            optional(record.delay_at_checkout_in_minutes),
            optional(record.previous_ended_rental_id),
            optional(record.time_delta_with_previous_rental_in_minutes),
        ));
    }
    out.push_str("</tbody></table>");
    out
}

fn section(out: &mut String, heading: &str, svg: &str) {
    out.push_str(&format!("<section><h3>{}</h3>{svg}</section>", escape(heading)));
}

pub fn render_page(
    records: &Table<DelayRecord>,
    report: &DashboardReport,
    generated_at: DateTime<Local>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>GetAround Analysis</title><style>{STYLE}</style></head><body>"
    ));

    out.push_str("<h1>GetAround Dashboard Analysis</h1>");
    out.push_str(
        "<p>Renters go through a checkin flow when a rental starts and a checkout flow when it ends. \
         The flows record the state of the car, the fuel level and the distance driven. \
         A checkin is done either on the owner's phone with the driver present (<b>mobile</b>) \
         or remotely, with the driver unlocking the car from their own phone (<b>connect</b>).</p>\
         <p>Late returns make the next renter wait. This page looks at historical rentals to answer two questions: \
         how long should the minimum delay between two rentals be, and should it apply to every car or only to Connect cars?</p><hr>",
    );

    out.push_str(&format!(
        "<details><summary>Show raw data</summary><div class=\"raw\">{}</div></details>",
        raw_table(records)
    ));

    out.push_str("<h2>Dataset overview and first impressions</h2>");
    out.push_str(&format!(
        "<p>{} rentals, {} of them returned more than {} minutes late. \
         Lateness does not look like the main reason a reservation gets cancelled.</p>",
        report.row_count, report.late_count, report.late_threshold_minutes
    ));

    out.push_str("<div class=\"columns\">");
    section(
        &mut out,
        &report.late_by_state.title,
        &render_pie(&report.late_by_state),
    );
    section(
        &mut out,
        &report.time_delta_histogram.title,
        &render_histogram(&report.time_delta_histogram),
    );
    out.push_str("</div>");

    out.push_str(
        "<p>Owners go for the mobile agreement more often than Connect. \
         Meeting the driver may feel safer, or mobile rentals may simply be more frequent.</p>",
    );
    section(
        &mut out,
        &report.time_delta_share.title,
        &render_pie(&report.time_delta_share),
    );

    out.push_str("<h3>Which agreement weighs more on checkout delay?</h3>");
    out.push_str(
        "<p>The mobile agreement involves both parties meeting, so its checkouts run later than Connect ones.</p>",
    );
    section(
        &mut out,
        &report.checkout_delay_histogram.title,
        &render_histogram(&report.checkout_delay_histogram),
    );

    out.push_str("<h2>How long should the minimum delay be?</h2>");
    out.push_str(&format!(
        "<p>Car fleet</p><p class=\"metric\">{}</p>",
        report.fleet_size
    ));

    out.push_str("<div class=\"columns\">");
    section(
        &mut out,
        &report.ecdf_mobile.title,
        &render_ecdf(&report.ecdf_mobile),
    );
    section(
        &mut out,
        &report.ecdf_connect.title,
        &render_ecdf(&report.ecdf_connect),
    );
    out.push_str("</div>");

    out.push_str(
        "<p>These empirical cumulative distributions show the share of rentals affected by a given minimum delay between two rentals. \
         The checkout delay adds up over the day and pushes back every following pickup. \
         Connect cars are returned late far less often, so their threshold can be lower than the mobile one.</p>",
    );

    out.push_str(&format!(
        "<footer>Generated {}</footer></body></html>",
        generated_at.format("%Y-%m-%d %H:%M:%S %Z")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Table<DelayRecord> {
        Table {
            rows: vec![
                (
                    0,
                    DelayRecord {
                        rental_id: 1,
                        car_id: 10,
                        checkin_type: "mobile".to_string(),
                        state: "ended".to_string(),
                        delay_at_checkout_in_minutes: Some(25.0),
                        previous_ended_rental_id: Some(3.0),
                        time_delta_with_previous_rental_in_minutes: Some(60.0),
                    },
                ),
                (
                    1,
                    DelayRecord {
                        rental_id: 2,
                        car_id: 11,
                        checkin_type: "connect".to_string(),
                        state: "<canceled>".to_string(),
                        delay_at_checkout_in_minutes: None,
                        previous_ended_rental_id: None,
                        time_delta_with_previous_rental_in_minutes: None,
                    },
                ),
            ],
        }
    }

    #[test]
    fn page_contains_every_chart_in_order() {
        let records = records();
        let report = DashboardReport::build(&records, 10.0, 5);
        let html = render_page(&records, &report, Local::now());

        let positions: Vec<usize> = [
            escape(&report.late_by_state.title),
            escape(&report.time_delta_histogram.title),
            escape(&report.time_delta_share.title),
            escape(&report.checkout_delay_histogram.title),
            "Car fleet".to_string(),
            "<h3>Mobile</h3>".to_string(),
            "<h3>Connect</h3>".to_string(),
        ]
        .iter()
        .map(|needle| html.find(needle.as_str()).unwrap())
        .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(html.matches("<svg").count(), 6);
    }

    #[test]
    fn raw_data_sits_behind_a_toggle() {
        let records = records();
        let report = DashboardReport::build(&records, 10.0, 5);
        let html = render_page(&records, &report, Local::now());

        assert!(html.contains("<details><summary>Show raw data</summary>"));
        assert!(html.contains("&lt;canceled&gt;"));
        assert!(!html.contains("<canceled>"));
    }
}
