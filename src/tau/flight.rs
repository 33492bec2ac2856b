//! Flight times from distances and the recoil velocity.
//!
//! The recoil leaves the target at (to good approximation) constant velocity,
//! so the time spent in flight before the stopper is simply `t_i = d_i / v`.
//! Downstream stages treat these times as exact: the velocity uncertainty is
//! quoted in reports but deliberately not folded into the per-pair error
//! bars, which keeps the interval width `dt` a plain number.

use crate::error::TauError;
use crate::math::UncertainValue;

/// Convert target-to-stopper distances into flight times (ps).
///
/// Uses the central velocity value only. Fails if the velocity is not a
/// finite positive number, or if any distance value is non-finite.
pub fn flight_times(
    distances: &[UncertainValue],
    relative_velocity: UncertainValue,
) -> Result<Vec<f64>, TauError> {
    let v = relative_velocity.value;
    if !v.is_finite() || v <= 0.0 {
        return Err(TauError::InvalidVelocity { value: v });
    }

    let mut out = Vec::with_capacity(distances.len());
    for (index, d) in distances.iter().enumerate() {
        if !d.value.is_finite() {
            return Err(TauError::InvalidMeasurement {
                series: "distances",
                index,
            });
        }
        out.push(d.value / v);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn um(values: &[f64]) -> Vec<UncertainValue> {
        values.iter().map(|&v| UncertainValue::new(v, 0.5)).collect()
    }

    #[test]
    fn times_are_distance_over_velocity() {
        let distances = um(&[10.0, 50.0, 250.0]);
        let times = flight_times(&distances, UncertainValue::new(5.0, 0.05)).unwrap();
        assert_eq!(times, vec![2.0, 10.0, 50.0]);
    }

    #[test]
    fn unusable_velocities_are_rejected() {
        let distances = um(&[10.0, 20.0]);
        for v in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = flight_times(&distances, UncertainValue::new(v, 0.0)).unwrap_err();
            assert!(
                matches!(err, TauError::InvalidVelocity { .. }),
                "velocity {v} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn non_finite_distances_are_rejected() {
        let mut distances = um(&[10.0, 20.0, 30.0]);
        distances[2] = UncertainValue::new(f64::INFINITY, 0.5);
        let err = flight_times(&distances, UncertainValue::new(5.0, 0.0)).unwrap_err();
        assert_eq!(
            err,
            TauError::InvalidMeasurement {
                series: "distances",
                index: 2
            }
        );
    }
}
