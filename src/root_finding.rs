//! Bracketed, derivative-free scalar root finding (Brent's method).
//!
//! Used wherever the undercut or fillet boundary has no closed form. The solver
//! combines bisection, the secant step and inverse quadratic interpolation while
//! keeping the root bracketed between `b` and `c`.

use crate::float_types::Real;
use std::convert::Infallible;
use std::fmt::{self, Display};

/// Stopping criteria for [`brent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrentOptions {
    /// Absolute tolerance on the abscissa.
    pub xtol: Real,
    /// Relative tolerance on the abscissa.
    pub rtol: Real,
    pub max_iter: usize,
}

impl Default for BrentOptions {
    fn default() -> Self {
        Self {
            xtol: 1e-8,
            rtol: 1e-12,
            max_iter: 100,
        }
    }
}

/// A located root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub value: Real,
    /// `f(value)`.
    pub residual: Real,
    pub iterations: usize,
    /// `false` when `max_iter` ran out; `value` is then the best estimate so far.
    pub converged: bool,
}

/// Why no root was returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootError<E = Infallible> {
    /// `f(a)` and `f(b)` have the same sign, so `[a, b]` does not bracket a root.
    NoSignChange { a: Real, b: Real, fa: Real, fb: Real },
    /// The function itself failed while being evaluated.
    Evaluation(E),
}

impl<E: Display> Display for RootError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootError::NoSignChange { a, b, fa, fb } => write!(
                f,
                "(NoSignChange) f({}) = {} and f({}) = {} do not bracket a root",
                a, fa, b, fb
            ),
            RootError::Evaluation(err) => write!(f, "(Evaluation) {}", err),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RootError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RootError::NoSignChange { .. } => None,
            RootError::Evaluation(err) => Some(err),
        }
    }
}

/// Find a root of `f` in `[a, b]`.
///
/// # Example
/// ```
/// use invgears::root_finding::{brent, BrentOptions};
/// let root = brent(|x| x * x - 2.0, 0.0, 2.0, &BrentOptions::default()).unwrap();
/// assert!((root.value - 2.0_f64.sqrt()).abs() < 1e-8);
/// ```
pub fn brent<F>(mut f: F, a: Real, b: Real, options: &BrentOptions) -> Result<Root, RootError>
where
    F: FnMut(Real) -> Real,
{
    try_brent(|x| Ok::<Real, Infallible>(f(x)), a, b, options).map_err(|err| match err {
        RootError::NoSignChange { a, b, fa, fb } => RootError::NoSignChange { a, b, fa, fb },
        RootError::Evaluation(never) => match never {},
    })
}

/// [`brent`] for a fallible `f`; the first evaluation error aborts the search.
pub fn try_brent<F, E>(
    mut f: F,
    mut a: Real,
    mut b: Real,
    options: &BrentOptions,
) -> Result<Root, RootError<E>>
where
    F: FnMut(Real) -> Result<Real, E>,
{
    let mut fa = f(a).map_err(RootError::Evaluation)?;
    let mut fb = f(b).map_err(RootError::Evaluation)?;
    if same_sign(fa, fb) {
        return Err(RootError::NoSignChange { a, b, fa, fb });
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for iteration in 0..options.max_iter {
        if same_sign(fb, fc) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * options.rtol * b.abs() + 0.5 * options.xtol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Ok(Root {
                value: b,
                residual: fb,
                iterations: iteration,
                converged: true,
            });
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // secant
                (2.0 * xm * s, 1.0 - s)
            } else {
                // inverse quadratic interpolation
                let qa = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0)),
                    (qa - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            if 2.0 * p < (3.0 * xm * q - (tol1 * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        if d.abs() > tol1 {
            b += d;
        } else {
            b += tol1.copysign(xm);
        }
        fb = f(b).map_err(RootError::Evaluation)?;
    }

    Ok(Root {
        value: b,
        residual: fb,
        iterations: options.max_iter,
        converged: false,
    })
}

#[inline]
fn same_sign(x: Real, y: Real) -> bool {
    (x > 0.0 && y > 0.0) || (x < 0.0 && y < 0.0)
}
