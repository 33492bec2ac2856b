//! Intensity normalisation.
//!
//! Raw peak intensities are not directly comparable across distances:
//! detector efficiency and beam current drift between runs. Each distance
//! therefore carries a calibration factor, and the comparable intensity is
//! the product `I_i * C_i`, with the product quadrature rule giving
//!
//! ```text
//! sigma_out = sqrt((sigma_I * C)^2 + (sigma_C * I)^2)
//! ```

use crate::error::TauError;
use crate::math::UncertainValue;

/// Scale an intensity series by its per-distance calibration factors.
pub fn normalise(
    intensities: &[UncertainValue],
    calibrations: &[UncertainValue],
) -> Result<Vec<UncertainValue>, TauError> {
    if intensities.len() != calibrations.len() {
        return Err(TauError::ShapeMismatch {
            left: "intensities",
            left_len: intensities.len(),
            right: "calibration factors",
            right_len: calibrations.len(),
        });
    }
    Ok(intensities
        .iter()
        .zip(calibrations.iter())
        .map(|(i, c)| *i * *c)
        .collect())
}
