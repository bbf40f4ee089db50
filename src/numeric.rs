//! Domain-checked scalar helpers shared by the planar and spherical solvers.
//!
//! Every inverse trigonometric call and square root in the gear pipeline goes
//! through these functions so an unrealizable parameter set surfaces as
//! [`GearError::NumericDomain`] instead of a silent `NaN`.

use crate::errors::GearError;
use crate::float_types::{DOMAIN_SLACK, Real};

/// `acos(x)`, accepting `|x| <= 1 + DOMAIN_SLACK`.
#[inline]
pub fn acos(x: Real, quantity: &'static str) -> Result<Real, GearError> {
    unit_argument(x, "acos", quantity).map(Real::acos)
}

/// `asin(x)`, accepting `|x| <= 1 + DOMAIN_SLACK`.
#[inline]
pub fn asin(x: Real, quantity: &'static str) -> Result<Real, GearError> {
    unit_argument(x, "asin", quantity).map(Real::asin)
}

/// `sqrt(x)`, accepting `x >= -DOMAIN_SLACK`.
#[inline]
pub fn sqrt(x: Real, quantity: &'static str) -> Result<Real, GearError> {
    if x >= 0.0 {
        Ok(x.sqrt())
    } else if x >= -DOMAIN_SLACK {
        Ok(0.0)
    } else {
        Err(GearError::NumericDomain {
            operation: "sqrt",
            argument: x,
            quantity,
        })
    }
}

fn unit_argument(x: Real, operation: &'static str, quantity: &'static str) -> Result<Real, GearError> {
    // NaN fails both comparisons and lands in the error branch
    if (-1.0..=1.0).contains(&x) {
        Ok(x)
    } else if x.abs() <= 1.0 + DOMAIN_SLACK {
        Ok(x.clamp(-1.0, 1.0))
    } else {
        Err(GearError::NumericDomain {
            operation,
            argument: x,
            quantity,
        })
    }
}

/// Involute function of the pressure angle at radius `r` on a base circle `rb`:
/// `sqrt(r² - rb²)/rb - acos(rb/r)`.
pub fn involute_at_radius(r: Real, rb: Real) -> Result<Real, GearError> {
    let phi = acos(rb / r, "pressure angle at radius")?;
    Ok(sqrt(r * r - rb * rb, "involute roll length")? / rb - phi)
}

/// Spherical involute function `atan(tan(phi)·sin(gamma_b))/sin(gamma_b) - phi`.
#[inline]
pub fn spherical_involute(phi: Real, gamma_b: Real) -> Real {
    (phi.tan() * gamma_b.sin()).atan() / gamma_b.sin() - phi
}

/// `n` evenly spaced samples from `start` to `end`, both included.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Real;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as Real })
                .collect()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn acos_accepts_round_off_past_one() {
        assert_eq!(acos(1.0 + 1e-14, "test").unwrap(), 0.0);
        assert!(acos(1.0 + 1e-6, "test").is_err());
        assert!(acos(Real::NAN, "test").is_err());
    }

    #[test]
    fn sqrt_reports_negative_argument() {
        let err = sqrt(-0.5, "roll length").unwrap_err();
        assert_eq!(
            err,
            GearError::NumericDomain {
                operation: "sqrt",
                argument: -0.5,
                quantity: "roll length",
            }
        );
        assert_eq!(sqrt(-1e-13, "roll length").unwrap(), 0.0);
    }

    #[test]
    fn involute_matches_tan_minus_angle() {
        let rb = 10.0;
        let phi: Real = 0.35;
        let r = rb / phi.cos();
        assert_abs_diff_eq!(involute_at_radius(r, rb).unwrap(), phi.tan() - phi, epsilon = 1e-12);
        assert_abs_diff_eq!(involute_at_radius(rb, rb).unwrap(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn spherical_involute_tends_to_planar_for_small_cones() {
        let phi: Real = 0.3;
        let gamma_b: Real = 1e-4;
        assert_abs_diff_eq!(spherical_involute(phi, gamma_b), phi.tan() - phi, epsilon = 1e-6);
    }

    #[test]
    fn linspace_hits_both_ends() {
        let v = linspace(3.0, 1.0, 5);
        assert_eq!(v, vec![3.0, 2.5, 2.0, 1.5, 1.0]);
        assert_eq!(linspace(2.0, 4.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
