//! Psychrometric calculations: saturation vapor pressure, VPD, dew point
//!
//! Inputs are degrees Celsius and percent relative humidity. Every function
//! returns `Err(ComputationUndefined)` instead of NaN or infinity.

use crate::types::ComputationUndefined;

/// Tetens coefficient (kPa).
pub const SVP_COEFFICIENT_KPA: f64 = 0.6108;
/// Magnus `a` constant shared by both formulas.
pub const MAGNUS_A: f64 = 17.27;
/// Tetens `b` constant (°C) for saturation vapor pressure.
pub const SVP_B: f64 = 237.3;
/// Magnus `b` constant (°C) for dew point.
pub const DEW_POINT_B: f64 = 237.7;

/// Decimal places of every reported derived value.
pub const REPORTED_DECIMALS: usize = 2;

/// Saturation vapor pressure in kPa: `0.6108 * e^(17.27*T / (T + 237.3))`.
pub fn saturation_vapor_pressure(temp_c: f64) -> Result<f64, ComputationUndefined> {
    ensure_finite(temp_c)?;
    let denominator = temp_c + SVP_B;
    if denominator == 0.0 {
        return Err(ComputationUndefined::SingularTemperature);
    }
    ensure_finite(SVP_COEFFICIENT_KPA * ((MAGNUS_A * temp_c) / denominator).exp())
}

/// Vapor-pressure deficit in kPa, rounded to two decimals.
pub fn vpd(temp_c: f64, humidity_pct: f64) -> Result<f64, ComputationUndefined> {
    ensure_humidity(humidity_pct)?;
    let saturation = saturation_vapor_pressure(temp_c)?;
    let actual = (humidity_pct / 100.0) * saturation;
    ensure_finite(round_half_away(saturation - actual, REPORTED_DECIMALS))
}

/// Dew point in °C (Magnus inversion), rounded to two decimals.
pub fn dew_point(temp_c: f64, humidity_pct: f64) -> Result<f64, ComputationUndefined> {
    ensure_humidity(humidity_pct)?;
    ensure_finite(temp_c)?;
    if temp_c + SVP_B == 0.0 || temp_c + DEW_POINT_B == 0.0 {
        return Err(ComputationUndefined::SingularTemperature);
    }

    let alpha = (MAGNUS_A * temp_c) / (DEW_POINT_B + temp_c) + (humidity_pct / 100.0).ln();
    let denominator = MAGNUS_A - alpha;
    if denominator == 0.0 {
        return Err(ComputationUndefined::SingularTemperature);
    }
    ensure_finite(round_half_away(
        DEW_POINT_B * alpha / denominator,
        REPORTED_DECIMALS,
    ))
}

fn ensure_humidity(humidity_pct: f64) -> Result<(), ComputationUndefined> {
    ensure_finite(humidity_pct)?;
    if humidity_pct <= 0.0 {
        return Err(ComputationUndefined::NonPositiveHumidity);
    }
    Ok(())
}

fn ensure_finite(value: f64) -> Result<f64, ComputationUndefined> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComputationUndefined::NonFinite)
    }
}

/// Magnitudes beyond this have no fractional digits worth rounding.
const ROUNDING_LIMIT: f64 = 1e15;

/// Rounds half away from zero on the shortest decimal representation of
/// `value`, so `1.005` becomes `1.01` even though its binary value is
/// slightly below the midpoint.
pub fn round_half_away(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() || value.abs() >= ROUNDING_LIMIT || decimals > 6 {
        return value;
    }

    let repr = format!("{}", value.abs());
    let Some((int_part, frac_part)) = repr.split_once('.') else {
        return value;
    };
    if frac_part.len() <= decimals {
        return value;
    }

    let Ok(mut scaled) = format!("{int_part}{}", &frac_part[..decimals]).parse::<u64>() else {
        return value;
    };
    if frac_part.as_bytes()[decimals] >= b'5' {
        scaled += 1;
    }

    let divisor = 10_u64.pow(decimals as u32);
    let text = if decimals == 0 {
        scaled.to_string()
    } else {
        format!(
            "{}.{:0width$}",
            scaled / divisor,
            scaled % divisor,
            width = decimals
        )
    };
    text.parse::<f64>()
        .map_or(value, |magnitude| magnitude.copysign(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn has_at_most_two_decimals(v: f64) -> bool {
        format!("{}", v.abs())
            .split_once('.')
            .map_or(true, |(_, frac)| frac.len() <= 2)
    }

    #[test]
    fn test_saturation_vapor_pressure_at_25c() {
        let svp = saturation_vapor_pressure(25.0).unwrap();
        assert!((svp - 3.1678).abs() < 1e-3, "got {svp}");
    }

    #[test]
    fn test_vpd_reference_point() {
        assert_eq!(vpd(25.0, 50.0), Ok(1.58));
        assert_eq!(vpd(20.0, 60.0), Ok(0.94));
        assert_eq!(vpd(30.0, 40.0), Ok(2.55));
    }

    #[test]
    fn test_dew_point_reference_point() {
        let dp = dew_point(25.0, 50.0).unwrap();
        assert_eq!(dp, 13.84);
        assert!((dp - 13.86).abs() < 0.05);
        assert_eq!(dew_point(-10.0, 80.0), Ok(-12.78));
    }

    #[test]
    fn test_saturated_air() {
        assert_eq!(vpd(0.0, 100.0), Ok(0.0));
        assert_eq!(dew_point(0.0, 100.0), Ok(0.0));
    }

    #[test]
    fn test_non_positive_humidity_is_undefined() {
        assert_eq!(vpd(25.0, 0.0), Err(ComputationUndefined::NonPositiveHumidity));
        assert_eq!(
            dew_point(25.0, -3.0),
            Err(ComputationUndefined::NonPositiveHumidity)
        );
    }

    #[test]
    fn test_singular_temperature_is_undefined() {
        assert_eq!(
            saturation_vapor_pressure(-237.3),
            Err(ComputationUndefined::SingularTemperature)
        );
        assert_eq!(vpd(-237.3, 50.0), Err(ComputationUndefined::SingularTemperature));
        assert_eq!(
            dew_point(-237.3, 50.0),
            Err(ComputationUndefined::SingularTemperature)
        );
        assert_eq!(
            dew_point(-237.7, 50.0),
            Err(ComputationUndefined::SingularTemperature)
        );
    }

    #[test]
    fn test_non_finite_inputs() {
        assert_eq!(vpd(f64::NAN, 50.0), Err(ComputationUndefined::NonFinite));
        assert_eq!(dew_point(25.0, f64::INFINITY), Err(ComputationUndefined::NonFinite));
    }

    #[test]
    fn test_round_half_away_uses_decimal_representation() {
        assert_eq!(round_half_away(1.005, 2), 1.01);
        assert_eq!(round_half_away(-1.005, 2), -1.01);
        assert_eq!(round_half_away(2.675, 2), 2.68);
        assert_eq!(round_half_away(1.004, 2), 1.0);
        assert_eq!(round_half_away(13.842_291, 2), 13.84);
        assert_eq!(round_half_away(0.995, 2), 1.0);
        assert_eq!(round_half_away(7.0, 2), 7.0);
    }

    proptest! {
        #[test]
        fn valid_domain_yields_finite_two_decimal_values(
            temp in -237.2_f64..1000.0,
            humidity in 0.01_f64..=100.0,
        ) {
            let v = vpd(temp, humidity).unwrap();
            let d = dew_point(temp, humidity).unwrap();
            prop_assert!(v.is_finite() && d.is_finite());
            prop_assert!(has_at_most_two_decimals(v), "vpd {}", v);
            prop_assert!(has_at_most_two_decimals(d), "dew point {}", d);
        }
    }
}
