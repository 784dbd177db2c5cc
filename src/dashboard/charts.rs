//! Chart data computed from the delay dataset. Rendering lives in `svg`.

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    /// Largest slice first.
    pub slices: Vec<Slice>,
}

impl PieChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|slice| slice.value).sum()
    }

    /// Share of each slice in percent, zero when the chart is empty.
    pub fn percentages(&self) -> Vec<f64> {
        let total = self.total();
        self.slices
            .iter()
            .map(|slice| {
                if total > 0.0 {
                    slice.value / total * 100.0
                } else {
                    0.0
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMode {
    Stack,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistNorm {
    Count,
    /// Each series as a percentage of its own values, in range or not.
    Percent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub bins: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// `bins + 1` ascending edges; the last bin is closed on the right.
    pub edges: Vec<f64>,
    pub series: Vec<Series>,
    pub mode: BarMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EcdfCurve {
    pub name: String,
    /// `(x, percent of values <= x)`, one point per distinct x.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EcdfChart {
    pub title: String,
    pub x_label: String,
    pub x_range: (f64, f64),
    pub curves: Vec<EcdfCurve>,
}

/// Groups `(key, value)` pairs by key in order of first appearance.
pub fn group_by_first_seen<'a, I>(pairs: I) -> Vec<(String, Vec<f64>)>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for (key, value) in pairs {
        match groups.iter_mut().find(|(name, _)| name.as_str() == key) {
            Some((_, values)) => values.push(value),
            None => groups.push((key.to_string(), vec![value])),
        }
    }
    groups
}

/// Sums values per label. Non-positive values do not form slices.
pub fn pie<'a, I>(title: &str, pairs: I) -> PieChart
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut slices: Vec<Slice> = group_by_first_seen(pairs)
        .into_iter()
        .map(|(label, values)| Slice {
            label,
            value: values.into_iter().filter(|v| *v > 0.0).sum(),
        })
        .collect();
    slices.sort_by(|a, b| b.value.total_cmp(&a.value));

    PieChart {
        title: title.to_string(),
        slices,
    }
}

pub fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let bins = bins.max(1);
    let max = if max > min { max } else { min + 1.0 };
    let width = (max - min) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect()
}

/// Index of the bin holding `value`, `None` outside the edges.
pub fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    let (first, last) = (*edges.first()?, *edges.last()?);
    let bins = edges.len().checked_sub(1).filter(|bins| *bins > 0)?;
    if !(first..=last).contains(&value) {
        return None;
    }
    let position = (value - first) / (last - first) * bins as f64;
    Some((position.floor() as usize).min(bins - 1))
}

pub fn histogram(
    title: &str,
    x_label: &str,
    groups: Vec<(String, Vec<f64>)>,
    edges: Vec<f64>,
    mode: BarMode,
    norm: HistNorm,
) -> Histogram {
    let bins = edges.len().saturating_sub(1);
    let series = groups
        .into_iter()
        .map(|(name, values)| {
            let mut counts = vec![0.0; bins];
            for value in &values {
                if let Some(index) = bin_index(&edges, *value) {
                    counts[index] += 1.0;
                }
            }
            if norm == HistNorm::Percent && !values.is_empty() {
                let total = values.len() as f64;
                counts.iter_mut().for_each(|count| *count = *count / total * 100.0);
            }
            Series { name, bins: counts }
        })
        .collect();

    Histogram {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: match norm {
            HistNorm::Count => "count".to_string(),
            HistNorm::Percent => "percent".to_string(),
        },
        edges,
        series,
        mode,
    }
}

pub fn ecdf(values: &[f64]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let total = sorted.len() as f64;
    let mut points: Vec<(f64, f64)> = Vec::new();
    for (i, value) in sorted.into_iter().enumerate() {
        let percent = (i + 1) as f64 / total * 100.0;
        match points.last_mut() {
            Some(last) if last.0 == value => last.1 = percent,
            _ => points.push((value, percent)),
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pie_sums_and_sorts_slices() {
        let chart = pie(
            "late by state",
            vec![("ended", 1.0), ("canceled", 1.0), ("ended", 1.0), ("canceled", 0.0)],
        );
        assert_eq!(
            chart.slices,
            vec![
                Slice { label: "ended".to_string(), value: 2.0 },
                Slice { label: "canceled".to_string(), value: 1.0 },
            ]
        );
        let shares = chart.percentages();
        assert!((shares[0] - 66.666).abs() < 0.01);
    }

    #[test]
    fn empty_pie_has_zero_shares() {
        let chart = pie("empty", vec![("ended", 0.0)]);
        assert_eq!(chart.total(), 0.0);
        assert_eq!(chart.percentages(), vec![0.0]);
    }

    #[test]
    fn edges_cover_range() {
        assert_eq!(bin_edges(0.0, 100.0, 4), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(bin_edges(5.0, 5.0, 2), vec![5.0, 5.5, 6.0]);
    }

    #[test]
    fn bin_index_closes_last_bin() {
        let edges = bin_edges(0.0, 100.0, 4);
        assert_eq!(bin_index(&edges, 0.0), Some(0));
        assert_eq!(bin_index(&edges, 24.9), Some(0));
        assert_eq!(bin_index(&edges, 25.0), Some(1));
        assert_eq!(bin_index(&edges, 100.0), Some(3));
        assert_eq!(bin_index(&edges, 100.1), None);
        assert_eq!(bin_index(&edges, -1.0), None);
    }

    #[test]
    fn percent_histogram_uses_series_total() {
        let groups = vec![
            ("mobile".to_string(), vec![-10.0, 10.0, 30.0, 900.0]),
            ("connect".to_string(), vec![10.0]),
        ];
        let chart = histogram(
            "delay",
            "minutes",
            groups,
            bin_edges(-400.0, 400.0, 4),
            BarMode::Overlay,
            HistNorm::Percent,
        );

        assert_eq!(chart.series[0].bins, vec![0.0, 25.0, 50.0, 0.0]);
        assert_eq!(chart.series[1].bins, vec![0.0, 0.0, 100.0, 0.0]);
        assert_eq!(chart.y_label, "percent");
    }

    #[test]
    fn ecdf_steps_over_distinct_values() {
        let points = ecdf(&[30.0, 10.0, 10.0, 20.0]);
        assert_eq!(points, vec![(10.0, 50.0), (20.0, 75.0), (30.0, 100.0)]);
        assert!(ecdf(&[]).is_empty());
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let groups = group_by_first_seen(vec![("mobile", 1.0), ("connect", 2.0), ("mobile", 3.0)]);
        assert_eq!(
            groups,
            vec![
                ("mobile".to_string(), vec![1.0, 3.0]),
                ("connect".to_string(), vec![2.0]),
            ]
        );
    }
}
