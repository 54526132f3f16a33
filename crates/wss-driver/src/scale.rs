//! Conversions between wire integers and physical quantities.
//!
//! Frequency-like registers count grid units of 3.125 GHz. Attenuation,
//! optical power and temperature registers are signed hundredths.

/// Width of one frequency grid unit, in GHz.
pub const GRID_GHZ: f64 = 3.125;

/// Errors converting a physical value to its wire representation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScaleError {
    #[error("value is not a finite number")]
    NotFinite,

    #[error("{value} is outside the representable range {min}..={max}")]
    OutOfRange { value: f64, min: f64, max: f64 },
}

/// Grid units to GHz.
pub fn grid_to_ghz(grid: u16) -> f64 {
    f64::from(grid) * GRID_GHZ
}

/// GHz to the nearest grid unit.
pub fn ghz_to_grid(ghz: f64) -> Result<u16, ScaleError> {
    if !ghz.is_finite() {
        return Err(ScaleError::NotFinite);
    }
    let units = (ghz / GRID_GHZ).round();
    if units < 0.0 || units > f64::from(u16::MAX) {
        return Err(ScaleError::OutOfRange {
            value: ghz,
            min: 0.0,
            max: grid_to_ghz(u16::MAX),
        });
    }
    Ok(units as u16)
}

/// Signed hundredths to a decimal value.
pub fn hundredths_to_f64(raw: i16) -> f64 {
    f64::from(raw) / 100.0
}

/// Decimal value to signed hundredths, rounding to the nearest step.
pub fn f64_to_hundredths(value: f64) -> Result<i16, ScaleError> {
    if !value.is_finite() {
        return Err(ScaleError::NotFinite);
    }
    let steps = (value * 100.0).round();
    if steps < f64::from(i16::MIN) || steps > f64::from(i16::MAX) {
        return Err(ScaleError::OutOfRange {
            value,
            min: hundredths_to_f64(i16::MIN),
            max: hundredths_to_f64(i16::MAX),
        });
    }
    Ok(steps as i16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_frequency_bound_example() {
        assert_eq!(grid_to_ghz(0x0060), 300.0);
    }

    #[test]
    fn every_raw_value_survives_scaling() {
        for raw in 0..=u16::MAX {
            let ghz = grid_to_ghz(raw);
            assert_eq!((ghz / GRID_GHZ).round() as u16, raw);
            assert_eq!(ghz_to_grid(ghz), Ok(raw));
        }
    }

    #[test]
    fn physical_values_return_within_one_grid_unit() {
        let mut ghz = 0.0;
        while ghz < 204_000.0 {
            let back = grid_to_ghz(ghz_to_grid(ghz).unwrap());
            assert!(
                (back - ghz).abs() <= GRID_GHZ / 2.0 + 1e-9,
                "{ghz} came back as {back}"
            );
            ghz += 17.3;
        }
    }

    #[test]
    fn frequency_rejects_unrepresentable_values() {
        assert_eq!(ghz_to_grid(f64::NAN), Err(ScaleError::NotFinite));
        assert!(matches!(
            ghz_to_grid(-10.0),
            Err(ScaleError::OutOfRange { .. })
        ));
        assert!(matches!(
            ghz_to_grid(grid_to_ghz(u16::MAX) + GRID_GHZ),
            Err(ScaleError::OutOfRange { .. })
        ));
        assert_eq!(ghz_to_grid(-1.0), Ok(0));
    }

    #[test]
    fn hundredths_round_trip() {
        assert_eq!(hundredths_to_f64(-1234), -12.34);
        assert_eq!(f64_to_hundredths(-12.34), Ok(-1234));
        assert_eq!(f64_to_hundredths(0.005), Ok(1));
        assert!(f64_to_hundredths(400.0).is_err());
        assert_eq!(f64_to_hundredths(f64::INFINITY), Err(ScaleError::NotFinite));
    }
}
