//! Tooth boundary of one solved planar gear.
//!
//! The involute flank is sampled from the tip circle down to the boundary radius
//! `Rc`; the fillet is the trochoid traced by the mate's cutter corner from the
//! boundary down to the root circle. Both carry analytic unit normals, which the
//! manufacturing offset moves the points along.

use super::{CommonData, GearData, GearKind};
use crate::errors::GearError;
use crate::float_types::{FRAC_PI_2, OFFSET_THRESHOLD, Real, TAU, tolerance};
use crate::numeric::{acos, involute_at_radius, linspace, sqrt};
use crate::pair::{Advisory, PairMember};
use crate::profile::{GearProfile, ProfilePoint, ToothProfile, fuse};
use crate::root_finding::{BrentOptions, brent};
use nalgebra::{Point2, Vector2};
use tracing::{debug, instrument, trace};

/// Sampled curve with one outward unit normal per point.
#[derive(Debug, Clone)]
struct Curve {
    points: Vec<Point2<Real>>,
    normals: Vec<Vector2<Real>>,
}

/// The profile of one planar gear.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarProfile {
    pub tooth: ToothProfile<Point2<Real>>,
    pub profile: GearProfile<Point2<Real>>,
    /// Radius of the tip arc after the offset.
    pub tip_radius: Real,
    /// Radius of the root arc after the offset.
    pub root_radius: Real,
    pub advisories: Vec<Advisory>,
}

/// Build the tooth and gear profile of `gear`, cut by the rack of `mate`.
#[instrument(level = "debug", skip_all, fields(member = ?member, teeth = gear.teeth))]
pub fn build(
    gear: &GearData,
    mate: &GearData,
    common: &CommonData,
    member: PairMember,
) -> Result<PlanarProfile, GearError> {
    let mut tip_radius = match gear.kind {
        GearKind::External => gear.tip_radius,
        GearKind::Internal => gear.cutter.tip_radius,
    };
    let mut root_radius = gear.root_radius;

    let Curve {
        points: mut flank,
        normals: flank_normals,
    } = involute(gear, tip_radius, common.samples)?;
    let (
        Curve {
            points: mut trochoid,
            normals: trochoid_normals,
        },
        tita_root,
    ) = fillet(gear, mate, common)?;
    fuse(&mut flank, &mut trochoid);

    let mut advisories = Vec::new();
    let offset = gear.offset;
    if offset.abs() > OFFSET_THRESHOLD {
        shift(&mut flank, &flank_normals, offset);
        shift(&mut trochoid, &trochoid_normals, offset);
        tip_radius -= offset;
        root_radius -= offset;

        match first_crossing(&flank, &trochoid) {
            Some((i, j, point)) => {
                trace!(i, j, ?point, "offset flank and fillet re-intersected");
                flank.truncate(i + 1);
                flank.push(point);
                trochoid = std::iter::once(point)
                    .chain(trochoid[j + 1..].iter().copied())
                    .collect();
            },
            None => {
                // tangent curves stay joined end to end after the shift
                let gap = match (flank.last(), trochoid.first()) {
                    (Some(end), Some(start)) => end.distance(start),
                    _ => 0.0,
                };
                fuse(&mut flank, &mut trochoid);
                if gap > tolerance() {
                    debug!(offset, gap, "offset flank and fillet do not cross, fusing their ends");
                    advisories.push(Advisory::NoOffsetIntersection { member });
                }
            },
        }

        if let Some((i, point)) = tip_crossing(&flank, tip_radius) {
            flank = std::iter::once(point)
                .chain(flank[i + 1..].iter().copied())
                .collect();
        }
    }

    let start = flank
        .first()
        .copied()
        .ok_or_else(|| GearError::DegenerateProfile("empty involute flank".into()))?;
    let tip_arc = [start.mirrored(), Point2::new(tip_radius, 0.0), start];

    let root_end = TAU / gear.teeth as Real - tita_root;
    let root_arc = [tita_root, 0.5 * (tita_root + root_end), root_end]
        .map(|a| Point2::new(root_radius * a.cos(), root_radius * a.sin()));

    let tooth = ToothProfile::assemble(flank, trochoid, tip_arc, root_arc);
    let profile = tooth.replicate(gear.teeth);
    Ok(PlanarProfile {
        tooth,
        profile,
        tip_radius,
        root_radius,
        advisories,
    })
}

fn involute(gear: &GearData, tip_radius: Real, samples: usize) -> Result<Curve, GearError> {
    let rb = gear.base_radius;
    let half_base = gear.base_thickness / (2.0 * rb);
    let mut points = Vec::with_capacity(samples);
    let mut normals = Vec::with_capacity(samples);

    for r in linspace(tip_radius, gear.boundary_radius, samples) {
        let tita = half_base - involute_at_radius(r, rb)?;
        let roll = sqrt(r * r - rb * rb, "involute roll length")?;
        let dtita = -roll / (r * rb);
        let (sin, cos) = tita.sin_cos();
        let tangent = Vector2::new(cos - r * sin * dtita, sin + r * cos * dtita);
        points.push(Point2::new(r * cos, r * sin));
        normals.push(unit_normal(tangent, "involute")?);
    }
    Ok(Curve { points, normals })
}

/// Position of the mate's cutter corner relative to `gear` when the cutter has
/// rolled by `alpha`.
#[derive(Debug, Clone, Copy)]
struct Trace {
    xi_a: Real,
    eta_a: Real,
    s_a: Real,
    s: Real,
    xi: Real,
    eta: Real,
}

impl Trace {
    fn at(alpha: Real, mate: &GearData, corner_radius: Real) -> Self {
        let rc_a = mate.cutter.corner_center_radius;
        let xi_a = mate.pitch_radius - rc_a * alpha.cos();
        let eta_a = -rc_a * alpha.sin();
        let s_a = -xi_a.hypot(eta_a);
        let s = s_a - corner_radius;
        Self {
            xi_a,
            eta_a,
            s_a,
            s,
            xi: (s / s_a) * xi_a,
            eta: (s / s_a) * eta_a,
        }
    }

    fn radius(&self, pitch_radius: Real) -> Real {
        (pitch_radius + self.xi).hypot(self.eta)
    }
}

fn fillet(gear: &GearData, mate: &GearData, common: &CommonData) -> Result<(Curve, Real), GearError> {
    let rp = gear.pitch_radius;
    let rcorner = common.cutter_corner_radius;
    let alpha0 = fillet_start(gear, mate, common)?;

    let mut points = Vec::with_capacity(common.samples);
    let mut normals = Vec::with_capacity(common.samples);
    let mut tita_root = 0.0;
    let rc_a = mate.cutter.corner_center_radius;
    let dbetag = -mate.standard_radius / gear.standard_radius;

    for alpha in linspace(alpha0, 0.0, common.samples) {
        let t = Trace::at(alpha, mate, rcorner);
        let betac = alpha - mate.cutter.corner_center_angle;
        let betag = -(mate.standard_radius * betac + common.standard_circular_pitch / 2.0)
            / gear.standard_radius;
        let x = rp + t.xi;
        let r = x.hypot(t.eta);
        let tita = t.eta.atan2(x) - betag;

        let dxi_a = rc_a * alpha.sin();
        let deta_a = -rc_a * alpha.cos();
        let ds_a = -(t.xi_a * dxi_a + t.eta_a * deta_a) / (t.xi_a.hypot(t.eta_a));
        let ds = ds_a;
        let dk = (ds * t.s_a - t.s * ds_a) / (t.s_a * t.s_a);
        let dxi = dk * t.xi_a + (t.s / t.s_a) * dxi_a;
        let deta = dk * t.eta_a + (t.s / t.s_a) * deta_a;
        let dr = (x * dxi + t.eta * deta) / r;
        let dtita = (deta * x - t.eta * dxi) / (r * r) - dbetag;

        let (sin, cos) = tita.sin_cos();
        let tangent = Vector2::new(dr * cos - r * sin * dtita, dr * sin + r * cos * dtita);
        points.push(Point2::new(r * cos, r * sin));
        normals.push(unit_normal(tangent, "fillet")?);
        tita_root = tita;
    }
    Ok((Curve { points, normals }, tita_root))
}

/// Cutter roll angle at which the fillet meets the involute.
fn fillet_start(gear: &GearData, mate: &GearData, common: &CommonData) -> Result<Real, GearError> {
    let analytic = || {
        Ok::<Real, GearError>(
            acos(
                mate.base_radius / mate.cutter.corner_center_radius,
                "fillet start angle",
            )? - common.pressure_angle,
        )
    };
    if gear.undercut_radius.is_none() {
        return analytic();
    }

    let rp = gear.pitch_radius;
    let target = gear.boundary_radius;
    let residual =
        |alpha: Real| Trace::at(alpha, mate, common.cutter_corner_radius).radius(rp) - target;
    match brent(residual, 0.0, FRAC_PI_2, &BrentOptions::default()) {
        Ok(root) => Ok(root.value),
        Err(err) => {
            debug!(%err, "fillet start not bracketed, using the analytic angle");
            analytic()
        },
    }
}

fn unit_normal(tangent: Vector2<Real>, curve: &str) -> Result<Vector2<Real>, GearError> {
    Vector2::new(-tangent.y, tangent.x)
        .try_normalize(Real::EPSILON)
        .ok_or_else(|| GearError::DegenerateProfile(format!("zero-length tangent on the {}", curve)))
}

fn shift(points: &mut [Point2<Real>], normals: &[Vector2<Real>], offset: Real) {
    for (p, n) in points.iter_mut().zip(normals) {
        *p -= n * offset;
    }
}

/// First crossing of two polylines in increasing `(i, j)` order, as the indices of
/// the segments that cross and the crossing point.
fn first_crossing(a: &[Point2<Real>], b: &[Point2<Real>]) -> Option<(usize, usize, Point2<Real>)> {
    for (i, sa) in a.windows(2).enumerate() {
        let da = sa[1] - sa[0];
        for (j, sb) in b.windows(2).enumerate() {
            let db = sb[1] - sb[0];
            let denom = db.x * da.y - da.x * db.y;
            if denom == 0.0 {
                continue;
            }
            let d0 = sa[0] - sb[0];
            let ka = (d0.x * db.y - d0.y * db.x) / denom;
            let kb = (d0.x * da.y - d0.y * da.x) / denom;
            if 0.0 < ka && ka < 1.0 && 0.0 < kb && kb < 1.0 {
                return Some((i, j, sa[0] + da * ka));
            }
        }
    }
    None
}

/// Where the flank enters the tip circle: the index of the first point inside
/// the circle and the point on the circle along the segment leading to it.
fn tip_crossing(flank: &[Point2<Real>], radius: Real) -> Option<(usize, Point2<Real>)> {
    let i = flank.windows(2).position(|s| s[1].coords.norm() < radius)?;
    let (p, q) = (flank[i], flank[i + 1]);
    let d = q - p;
    // |p + t·d|² = radius², smaller root
    let a = d.norm_squared();
    let b = 2.0 * p.coords.dot(&d);
    let c = p.coords.norm_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if a == 0.0 || disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / (2.0 * a);
    Some((i, p + d * t))
}
