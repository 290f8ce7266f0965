//! Status snapshot assembly: latest reading + derived climate + window stats.

use crate::physics_engine::derive_climate;
use crate::types::{AggregateSummary, StatusReading, StatusSnapshot};

/// Latest temperature and humidity, each possibly unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatestReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl LatestReading {
    /// Picks the two climate codes out of a device-status response.
    pub fn from_status(
        readings: &[StatusReading],
        temperature_code: &str,
        humidity_code: &str,
    ) -> Self {
        let find = |code: &str| readings.iter().find(|r| r.code == code).map(|r| r.value);
        Self {
            temperature: find(temperature_code),
            humidity: find(humidity_code),
        }
    }
}

pub fn assemble_snapshot(
    reading: LatestReading,
    temperature_window: AggregateSummary,
    humidity_window: AggregateSummary,
) -> StatusSnapshot {
    let (vpd, dew_point) = derive_climate(reading.temperature, reading.humidity);
    StatusSnapshot {
        temperature: reading.temperature,
        humidity: reading.humidity,
        vpd,
        dew_point,
        temperature_window,
        humidity_window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComputationUndefined, Derived, WindowStats};

    fn window(code: &str, max: f64, min: f64) -> AggregateSummary {
        AggregateSummary {
            code: code.into(),
            stats: WindowStats::Present {
                max,
                min,
                samples: 10,
            },
        }
    }

    #[test]
    fn test_full_snapshot() {
        let readings = vec![
            StatusReading {
                code: "va_temperature".into(),
                value: 25.0,
            },
            StatusReading {
                code: "va_humidity".into(),
                value: 50.0,
            },
            StatusReading {
                code: "battery_percentage".into(),
                value: 80.0,
            },
        ];
        let reading = LatestReading::from_status(&readings, "va_temperature", "va_humidity");
        let snap = assemble_snapshot(
            reading,
            window("va_temperature", 27.0, 19.5),
            window("va_humidity", 70.0, 45.0),
        );
        assert_eq!(snap.vpd, Derived::Value(1.58));
        assert_eq!(snap.dew_point, Derived::Value(13.84));
        assert_eq!(snap.temperature_window.spread(), Some(7.5));
    }

    #[test]
    fn test_missing_humidity_blocks_all_derived_fields() {
        let snap = assemble_snapshot(
            LatestReading {
                temperature: Some(25.0),
                humidity: None,
            },
            AggregateSummary::absent("va_temperature"),
            AggregateSummary::absent("va_humidity"),
        );
        assert_eq!(snap.temperature, Some(25.0));
        assert_eq!(
            snap.vpd,
            Derived::NotComputable(ComputationUndefined::MissingInput)
        );
        assert_eq!(
            snap.dew_point,
            Derived::NotComputable(ComputationUndefined::MissingInput)
        );
        assert!(snap.humidity_window.is_absent());
    }
}
