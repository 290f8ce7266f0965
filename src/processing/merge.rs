//! Timestamp alignment across series.
//!
//! Points are grouped by exact event-time equality. Codes without a sample
//! at a given instant are `None`; nothing is interpolated.

use std::collections::BTreeMap;

use crate::physics_engine::derive_climate;
use crate::types::{CodeValue, DerivedPoint, MergedPoint, MetricSeries};

/// One merged point per distinct event time, ascending.
///
/// If a single code reports the same instant twice, the first sample in
/// series order is kept.
pub fn merge_points(series: &[MetricSeries]) -> Vec<MergedPoint> {
    let mut rows: BTreeMap<i64, Vec<Option<f64>>> = BTreeMap::new();

    for (slot, s) in series.iter().enumerate() {
        for entry in s.entries() {
            let row = rows
                .entry(entry.event_time)
                .or_insert_with(|| vec![None; series.len()]);
            if row[slot].is_none() {
                row[slot] = Some(entry.value);
            }
        }
    }

    rows.into_iter()
        .map(|(time, values)| MergedPoint {
            time,
            values: series
                .iter()
                .zip(values)
                .map(|(s, value)| CodeValue {
                    code: s.code().to_string(),
                    value,
                })
                .collect(),
        })
        .collect()
}

/// VPD and dew point for every merged point.
pub fn derive_points(
    points: &[MergedPoint],
    temperature_code: &str,
    humidity_code: &str,
) -> Vec<DerivedPoint> {
    points
        .iter()
        .map(|p| {
            let temperature = p.get(temperature_code);
            let humidity = p.get(humidity_code);
            let (vpd, dew_point) = derive_climate(temperature, humidity);
            DerivedPoint {
                time: p.time,
                temperature,
                humidity,
                vpd,
                dew_point,
            }
        })
        .collect()
}
