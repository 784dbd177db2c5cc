use super::charts::{BarMode, EcdfChart, Histogram, PieChart};

pub const PALETTE: [&str; 2] = ["#AA336A", "darkcyan"];

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 44.0;
const TICKS: usize = 5;

pub fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Maps data coordinates onto the plot area.
struct Frame {
    x: (f64, f64),
    y: (f64, f64),
}

impl Frame {
    fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        let widen = |(lo, hi): (f64, f64)| if hi > lo { (lo, hi) } else { (lo, lo + 1.0) };
        Frame {
            x: widen(x),
            y: widen(y),
        }
    }

    fn px(&self, x: f64) -> f64 {
        let x = x.clamp(self.x.0, self.x.1);
        MARGIN_LEFT + (x - self.x.0) / (self.x.1 - self.x.0) * (WIDTH - MARGIN_LEFT - MARGIN_RIGHT)
    }

    fn py(&self, y: f64) -> f64 {
        let y = y.clamp(self.y.0, self.y.1);
        HEIGHT - MARGIN_BOTTOM - (y - self.y.0) / (self.y.1 - self.y.0) * (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM)
    }

    fn axes(&self, out: &mut String, x_label: &str, y_label: &str) {
        let (left, right) = (MARGIN_LEFT, WIDTH - MARGIN_RIGHT);
        let (top, bottom) = (MARGIN_TOP, HEIGHT - MARGIN_BOTTOM);
        out.push_str(&format!(
            r##"<path d="M{left},{top} L{left},{bottom} L{right},{bottom}" fill="none" stroke="#444"/>"##
        ));

        for i in 0..=TICKS {
            let t = i as f64 / TICKS as f64;
            let xv = self.x.0 + t * (self.x.1 - self.x.0);
            let yv = self.y.0 + t * (self.y.1 - self.y.0);
            let (x, y) = (self.px(xv), self.py(yv));
            out.push_str(&format!(
                r##"<text x="{x:.1}" y="{:.1}" font-size="11" text-anchor="middle">{}</text>"##,
                bottom + 16.0,
                tick_label(xv)
            ));
            out.push_str(&format!(
                r##"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end">{}</text>"##,
                left - 6.0,
                y + 4.0,
                tick_label(yv)
            ));
            out.push_str(&format!(
                r##"<line x1="{left}" x2="{right}" y1="{y:.1}" y2="{y:.1}" stroke="#eee"/>"##
            ));
        }

        out.push_str(&format!(
            r##"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">{}</text>"##,
            (left + right) / 2.0,
            HEIGHT - 6.0,
            escape(x_label)
        ));
        out.push_str(&format!(
            r##"<text x="14" y="{:.1}" font-size="12" text-anchor="middle" transform="rotate(-90 14 {:.1})">{}</text>"##,
            (top + bottom) / 2.0,
            (top + bottom) / 2.0,
            escape(y_label)
        ));
    }
}

fn tick_label(value: f64) -> String {
    if value.abs() >= 100.0 || value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn open_svg(out: &mut String) {
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" width="100%" role="img">"#
    ));
}

fn legend(out: &mut String, names: &[&str]) {
    for (i, name) in names.iter().enumerate() {
        let y = MARGIN_TOP + 6.0 + i as f64 * 16.0;
        let x = WIDTH - MARGIN_RIGHT - 150.0;
        out.push_str(&format!(
            r#"<rect x="{x}" y="{:.1}" width="10" height="10" fill="{}"/><text x="{:.1}" y="{:.1}" font-size="11">{}</text>"#,
            y - 9.0,
            color(i),
            x + 14.0,
            y,
            escape(name)
        ));
    }
}

pub fn render_pie(chart: &PieChart) -> String {
    let mut out = String::new();
    open_svg(&mut out);

    let (cx, cy, r) = (WIDTH / 2.0 - 80.0, HEIGHT / 2.0, HEIGHT / 2.0 - 24.0);
    let total = chart.total();
    if total <= 0.0 {
        out.push_str(&format!(
            r#"<text x="{cx}" y="{cy}" text-anchor="middle" font-size="13">No data</text>"#
        ));
    }

    let mut angle = -std::f64::consts::FRAC_PI_2;
    let percentages = chart.percentages();
    for (i, (slice, share)) in chart.slices.iter().zip(&percentages).enumerate() {
        if slice.value <= 0.0 {
            continue;
        }
        let sweep = slice.value / total * std::f64::consts::TAU;
        let fill = color(i);
        if sweep >= std::f64::consts::TAU - 1e-9 {
            out.push_str(&format!(r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}"/>"#));
        } else {
            let (x0, y0) = (cx + r * angle.cos(), cy + r * angle.sin());
            let end = angle + sweep;
            let (x1, y1) = (cx + r * end.cos(), cy + r * end.sin());
            let large = if sweep > std::f64::consts::PI { 1 } else { 0 };
            out.push_str(&format!(
                r#"<path d="M{cx},{cy} L{x0:.2},{y0:.2} A{r},{r} 0 {large} 1 {x1:.2},{y1:.2} Z" fill="{fill}" stroke="white"/>"#
            ));
        }

        let middle = angle + sweep / 2.0;
        let (lx, ly) = (cx + r * 0.65 * middle.cos(), cy + r * 0.65 * middle.sin());
        out.push_str(&format!(
            r#"<text x="{lx:.1}" y="{ly:.1}" font-size="12" fill="white" text-anchor="middle">{share:.1}%</text>"#
        ));
        angle += sweep;
    }

    let names: Vec<&str> = chart.slices.iter().map(|s| s.label.as_str()).collect();
    legend(&mut out, &names);
    out.push_str("</svg>");
    out
}

pub fn render_histogram(chart: &Histogram) -> String {
    let mut out = String::new();
    open_svg(&mut out);

    let bins = chart.edges.len().saturating_sub(1);
    let y_max = match chart.mode {
        BarMode::Stack => (0..bins)
            .map(|b| chart.series.iter().map(|s| s.bins[b]).sum::<f64>())
            .fold(0.0, f64::max),
        BarMode::Overlay => chart
            .series
            .iter()
            .flat_map(|s| s.bins.iter().copied())
            .fold(0.0, f64::max),
    };
    let x_range = (
        chart.edges.first().copied().unwrap_or(0.0),
        chart.edges.last().copied().unwrap_or(1.0),
    );
    let frame = Frame::new(x_range, (0.0, y_max * 1.05));
    frame.axes(&mut out, &chart.x_label, &chart.y_label);

    let mut stacked = vec![0.0; bins];
    for (i, series) in chart.series.iter().enumerate() {
        let opacity = match chart.mode {
            BarMode::Stack => 1.0,
            BarMode::Overlay => 0.6,
        };
        for (b, value) in series.bins.iter().enumerate() {
            if *value <= 0.0 {
                continue;
            }
            let base = match chart.mode {
                BarMode::Stack => stacked[b],
                BarMode::Overlay => 0.0,
            };
            let (x0, x1) = (frame.px(chart.edges[b]), frame.px(chart.edges[b + 1]));
            let (y0, y1) = (frame.py(base), frame.py(base + value));
            out.push_str(&format!(
                r#"<rect x="{x0:.2}" y="{y1:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="{opacity}"><title>{}: {value:.2}</title></rect>"#,
                (x1 - x0).max(0.5),
                (y0 - y1).max(0.0),
                color(i),
                escape(&series.name)
            ));
            stacked[b] += value;
        }
    }

    let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
    legend(&mut out, &names);
    out.push_str("</svg>");
    out
}

pub fn render_ecdf(chart: &EcdfChart) -> String {
    let mut out = String::new();
    open_svg(&mut out);

    let frame = Frame::new(chart.x_range, (0.0, 100.0));
    frame.axes(&mut out, &chart.x_label, "proportion of users (%)");

    for (i, curve) in chart.curves.iter().enumerate() {
        let mut path = String::new();
        let mut previous_y = 0.0;
        let mut started = false;
        for (x, y) in &curve.points {
            if *x < chart.x_range.0 {
                previous_y = *y;
                continue;
            }
            if *x > chart.x_range.1 {
                break;
            }
            if !started {
                path.push_str(&format!("M{:.2},{:.2}", frame.px(chart.x_range.0), frame.py(previous_y)));
                started = true;
            }
            path.push_str(&format!(" H{:.2} V{:.2}", frame.px(*x), frame.py(*y)));
            previous_y = *y;
        }
        if !started {
            path.push_str(&format!("M{:.2},{:.2}", frame.px(chart.x_range.0), frame.py(previous_y)));
        }
        path.push_str(&format!(" H{:.2}", frame.px(chart.x_range.1)));

        out.push_str(&format!(
            r#"<path d="{path}" fill="none" stroke="{}" stroke-width="2"/>"#,
            color(i)
        ));
    }

    let names: Vec<&str> = chart.curves.iter().map(|c| c.name.as_str()).collect();
    legend(&mut out, &names);
    out.push_str("</svg>");
    out
}
