//! Partitioning of flat log collections into per-code series, and window
//! min/max aggregation.

use crate::types::{AggregateSummary, LogEntry, MetricSeries, WindowStats};

/// Requested codes with duplicates removed, first occurrence wins.
pub fn unique_codes(codes: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(codes.len());
    for code in codes {
        if !unique.contains(code) {
            unique.push(code.clone());
        }
    }
    unique
}

/// One series per requested code, in request order. Entries for codes that
/// were not requested are ignored; relative order within a code is kept.
pub fn partition_by_code(entries: &[LogEntry], codes: &[String]) -> Vec<MetricSeries> {
    unique_codes(codes)
        .into_iter()
        .map(|code| {
            let matching = entries.iter().filter(|e| e.code == code).cloned().collect();
            MetricSeries::new(code, matching)
        })
        .collect()
}

/// Max/min over a series; an empty series is `Absent`.
pub fn summarize(series: &MetricSeries) -> AggregateSummary {
    let stats = series
        .values()
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((max, min)) => Some((max.max(v), min.min(v))),
        })
        .map_or(WindowStats::Absent, |(max, min)| WindowStats::Present {
            max,
            min,
            samples: series.len(),
        });

    AggregateSummary {
        code: series.code().to_string(),
        stats,
    }
}

pub fn summarize_all(series: &[MetricSeries]) -> Vec<AggregateSummary> {
    series.iter().map(summarize).collect()
}
