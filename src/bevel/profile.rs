//! Tooth boundary of one solved bevel gear, on the sphere and projected.

use super::{BevelCommon, BevelGearData};
use crate::errors::GearError;
use crate::float_types::{FRAC_PI_2, Real, TAU};
use crate::numeric::{acos, linspace, spherical_involute};
use crate::pair::PairMember;
use crate::profile::{GearProfile, ToothProfile, fuse};
use crate::root_finding::{BrentOptions, RootError, try_brent};
use nalgebra::Point3;
use tracing::{debug, instrument};

/// The profiles of one bevel gear.
#[derive(Debug, Clone, PartialEq)]
pub struct BevelProfile {
    /// One tooth on the sphere of radius `lambda`.
    pub tooth: ToothProfile<Point3<Real>>,
    /// All teeth on the sphere.
    pub profile: GearProfile<Point3<Real>>,
    /// [`BevelProfile::profile`] projected from the apex onto the plane
    /// `z = lambda + thickness`.
    pub projected: GearProfile<Point3<Real>>,
    /// [`BevelProfile::profile`] scaled about the apex by `(lambda + thickness)/lambda`:
    /// the outer section of the tooth loft.
    pub scaled: GearProfile<Point3<Real>>,
    /// Height of the tip arc above the apex.
    pub tip_height: Real,
    /// Height of the root arc above the apex.
    pub root_height: Real,
}

#[instrument(level = "debug", skip_all, fields(member = ?member, teeth = gear.teeth))]
pub fn build(
    gear: &BevelGearData,
    mate: &BevelGearData,
    common: &BevelCommon,
    member: PairMember,
) -> Result<BevelProfile, GearError> {
    let lambda = common.cone_distance;
    let on_sphere = |gamma: Real, tita: Real| {
        let (sin_g, cos_g) = gamma.sin_cos();
        Point3::new(lambda * sin_g * tita.cos(), lambda * sin_g * tita.sin(), lambda * cos_g)
    };

    let mut flank = Vec::with_capacity(common.samples);
    for gamma in linspace(gear.tip_cone_angle, gear.boundary_cone_angle, common.samples) {
        let phi = acos(
            gear.pressure_angle.cos() * gear.pitch_cone_angle.tan() / gamma.tan(),
            "spherical pressure angle",
        )?;
        let psi = spherical_involute(phi, gear.base_cone_angle);
        let tita = gear.pitch_thickness / (2.0 * gear.pitch_radius) + gear.involute_pitch - psi;
        flank.push(on_sphere(gamma, tita));
    }

    let alpha0 = fillet_start(gear, mate, common)?;
    let (sin_tc, cos_tc) = mate.cutter.tip_cone_angle.sin_cos();
    let (sin_s, cos_s) = common.shaft_angle.sin_cos();
    let mut trochoid = Vec::with_capacity(common.samples);
    let mut tita_root = 0.0;
    for alpha in linspace(alpha0, 0.0, common.samples) {
        let betac = alpha - mate.cutter.tip_half_angle;
        let betag = -(mate.pitch_radius * betac + common.circular_pitch / 2.0) / gear.pitch_radius;
        let gamma = trochoid_cone(alpha, mate, common)?;
        let tita = -(sin_tc * sin_s * alpha.sin() / (cos_tc - cos_s * gamma.cos())).atan() - betag;
        trochoid.push(on_sphere(gamma, tita));
        tita_root = tita;
    }

    let degenerate = || GearError::DegenerateProfile("empty bevel flank".into());
    let tip_start = *flank.first().ok_or_else(degenerate)?;
    let root_start = *trochoid.last().ok_or_else(degenerate)?;
    fuse(&mut flank, &mut trochoid);

    let tita_tip = tip_start.y.atan2(tip_start.x);
    let tip_height = tip_start.z;
    let root_height = root_start.z;
    let arc = |radius: Real, z: Real, from: Real, to: Real| {
        [from, 0.5 * (from + to), to].map(|a| Point3::new(radius * a.cos(), radius * a.sin(), z))
    };
    let tip_arc = arc(gear.tip_radius, tip_height, -tita_tip, tita_tip);
    let root_arc = arc(
        gear.root_radius,
        root_height,
        tita_root,
        TAU / gear.teeth as Real - tita_root,
    );

    let tooth = ToothProfile::assemble(flank, trochoid, tip_arc, root_arc);
    let profile = tooth.replicate(gear.teeth);

    let plane = lambda + common.thickness;
    let projected = profile.try_map_points(|p| {
        if p.z <= 0.0 {
            return Err(GearError::DegenerateProfile(format!(
                "point at z = {} cannot be projected from the apex",
                p.z
            )));
        }
        let k = plane / p.z;
        Ok(Point3::new(k * p.x, k * p.y, plane))
    })?;
    let scale = plane / lambda;
    let scaled = profile.map_points(|p| Point3::from(p.coords * scale));

    Ok(BevelProfile {
        tooth,
        profile,
        projected,
        scaled,
        tip_height,
        root_height,
    })
}

/// Cone angle reached by the mate's crown cutter tip after rolling by `alpha`.
fn trochoid_cone(alpha: Real, mate: &BevelGearData, common: &BevelCommon) -> Result<Real, GearError> {
    let (sin_tc, cos_tc) = mate.cutter.tip_cone_angle.sin_cos();
    let (sin_s, cos_s) = common.shaft_angle.sin_cos();
    acos(cos_tc * cos_s + sin_tc * sin_s * alpha.cos(), "trochoid cone angle")
}

fn fillet_start(gear: &BevelGearData, mate: &BevelGearData, common: &BevelCommon) -> Result<Real, GearError> {
    let analytic = mate.cutter.tip_pressure_angle - mate.pressure_angle;
    if gear.undercut_cone_angle.is_none() {
        return Ok(analytic);
    }
    let target = gear.boundary_cone_angle;
    let search = try_brent(
        |alpha| Ok::<Real, GearError>(trochoid_cone(alpha, mate, common)? - target),
        0.0,
        FRAC_PI_2,
        &BrentOptions::default(),
    );
    match search {
        Ok(root) => Ok(root.value),
        Err(RootError::Evaluation(err)) => Err(err),
        Err(err) => {
            debug!(%err, "bevel fillet start not bracketed, using the analytic angle");
            Ok(analytic)
        },
    }
}
