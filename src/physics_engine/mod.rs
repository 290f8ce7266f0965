//! Physics Engine Module
//!
//! Deterministic climate calculations for grow-room telemetry.
//! All math here is pure physics - no I/O, no state.
//!
//! - `saturation_vapor_pressure()` - Tetens equation (kPa)
//! - `vpd()` - Vapor-pressure deficit (kPa)
//! - `dew_point()` - Magnus-form dew point (°C)

pub mod psychrometrics;

pub use psychrometrics::{dew_point, round_half_away, saturation_vapor_pressure, vpd};

use crate::types::Derived;

/// VPD and dew point for one temperature/humidity pair.
///
/// Both fields are not computable when either input is missing; a partial
/// result is never produced.
pub fn derive_climate(temperature: Option<f64>, humidity: Option<f64>) -> (Derived, Derived) {
    match (temperature, humidity) {
        (Some(t), Some(h)) => (vpd(t, h).into(), dew_point(t, h).into()),
        _ => {
            let missing = Derived::NotComputable(crate::types::ComputationUndefined::MissingInput);
            (missing, missing)
        }
    }
}
