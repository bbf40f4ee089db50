//! Derived dimensions of a bevel pair, in the same nine stages as the planar
//! solver with every radius replaced by a cone angle on the sphere.

use super::{BevelCommon, BevelCutter, BevelGearData, BevelPair};
use crate::errors::GearError;
use crate::float_types::{PI, Real};
use crate::numeric::{acos, asin, spherical_involute};
use crate::pair::{Advisory, PairMember};
use crate::params::BevelParameters;
use crate::planar::solver::gear_advisories;
use crate::root_finding::{BrentOptions, RootError, try_brent};
use tracing::{debug, instrument, trace};

#[derive(Debug, Clone, Copy)]
struct Pitch {
    module: Real,
    rho: Real,
    pp: Real,
    pb: Real,
    pd: Real,
}

#[derive(Debug, Clone, Copy)]
struct Standard {
    teeth: usize,
    deltatp: Real,
    rp: Real,
    rb: Real,
}

#[derive(Debug, Clone, Copy)]
struct Sphere {
    lambda: Real,
    sigma: Real,
    delta_c: Real,
    delta_add: Real,
    b: Real,
}

#[derive(Debug, Clone, Copy)]
struct Cone {
    gamma_p: Real,
    phi_p: Real,
    gamma_b: Real,
    psi_p: Real,
    tp: Real,
    tb: Real,
}

#[derive(Debug, Clone, Copy)]
struct Tip {
    delta_a: Real,
    delta_d: Real,
    gamma_t: Real,
    gamma_root: Real,
}

#[derive(Debug, Clone, Copy)]
struct Cutter {
    tpc: Real,
    tbc: Real,
    gamma_tc: Real,
    phi_tc: Real,
    psi_tc: Real,
    tita_tc: Real,
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    no_undercut: bool,
    gamma_l: Real,
    gamma_f: Real,
    no_interference: bool,
}

#[derive(Debug, Clone, Copy)]
struct Boundary {
    gamma_u: Option<Real>,
    gamma_c: Real,
    unresolved: bool,
}

fn pitch(params: &BevelParameters) -> Pitch {
    let rho = params.pressure_angle.to_radians();
    let pp = PI * params.module;
    Pitch {
        module: params.module,
        rho,
        pp,
        pb: pp / (1.0 + rho.tan().powi(2)).sqrt(),
        pd: 1.0 / params.module,
    }
}

fn standard(pitch: &Pitch, teeth: usize, deltatp: Real) -> Standard {
    let rp = teeth as Real * pitch.module / 2.0;
    Standard {
        teeth,
        deltatp,
        rp,
        rb: rp / (1.0 + pitch.rho.tan().powi(2)).sqrt(),
    }
}

fn sphere(params: &BevelParameters, pitch: &Pitch, g1: &Standard, g2: &Standard) -> Sphere {
    let sigma = params.shaft_angle.to_radians();
    let (n1, n2) = (g1.teeth as Real, g2.teeth as Real);
    let lambda =
        pitch.module * (n1 * n1 + n2 * n2 + 2.0 * n1 * n2 * sigma.cos()).sqrt() / (2.0 * sigma.sin());
    let extra = params.addendum - 1.0;
    Sphere {
        lambda,
        sigma,
        delta_c: (params.clearance - extra) * pitch.module / lambda,
        delta_add: extra * pitch.module / lambda,
        b: params.backlash * (1.0 + pitch.rho.tan().powi(2)).sqrt(),
    }
}

fn cone(pitch: &Pitch, sphere: &Sphere, gear: &Standard, mate: &Standard) -> Cone {
    let ratio = mate.teeth as Real / gear.teeth as Real;
    let gamma_p = sphere.sigma.sin().atan2(ratio + sphere.sigma.cos());
    let phi_p = (pitch.rho.tan() / gamma_p.cos()).atan();
    let gamma_b = (phi_p.cos() * gamma_p.tan()).atan();
    let psi_p = spherical_involute(phi_p, gamma_b);
    let tp = (pitch.pp - sphere.b) / 2.0 + gear.deltatp;
    Cone {
        gamma_p,
        phi_p,
        gamma_b,
        psi_p,
        tp,
        tb: gear.rb * (tp / gear.rp + 2.0 * psi_p),
    }
}

fn tip(pitch: &Pitch, sphere: &Sphere, cone: &Cone) -> Tip {
    let delta_a = pitch.module / sphere.lambda + sphere.delta_add;
    let delta_d = delta_a + sphere.delta_c;
    Tip {
        delta_a,
        delta_d,
        gamma_t: cone.gamma_p + delta_a,
        gamma_root: cone.gamma_p - delta_d,
    }
}

/// Pressure angle on the sphere where the tooth meets the cone `gamma`.
fn pressure_angle_at(cone: &Cone, gamma: Real) -> Result<Real, GearError> {
    acos(
        cone.phi_p.cos() * cone.gamma_p.tan() / gamma.tan(),
        "spherical pressure angle",
    )
}

fn cutter(
    pitch: &Pitch,
    sphere: &Sphere,
    (gear, gear_cone, gear_tip): (&Standard, &Cone, &Tip),
    mate_cone: &Cone,
) -> Result<Cutter, GearError> {
    let tpc = pitch.pp - mate_cone.tp;
    let gamma_tc = gear_tip.gamma_t + sphere.delta_c;
    let phi_tc = pressure_angle_at(gear_cone, gamma_tc)?;
    let psi_tc = spherical_involute(phi_tc, gear_cone.gamma_b);
    Ok(Cutter {
        tpc,
        tbc: gear.rb * (tpc / gear.rp + 2.0 * gear_cone.psi_p),
        gamma_tc,
        phi_tc,
        psi_tc,
        tita_tc: tpc / (2.0 * gear.rp) + gear_cone.psi_p - psi_tc,
    })
}

/// Arc from the base-cone tangency to the pitch point along the line of action.
fn pitch_roll(cone: &Cone) -> Real {
    (cone.gamma_b.sin() * cone.phi_p.tan()).atan()
}

/// Arc from the base-cone tangency to the cone `gamma` along the line of action.
fn roll_to(cone: &Cone, gamma: Real) -> Result<Real, GearError> {
    acos(gamma.cos() / cone.gamma_b.cos(), "spherical roll angle")
}

fn limits(
    params: &BevelParameters,
    sphere: &Sphere,
    gear_cone: &Cone,
    (mate_cone, mate_tip, mate_cutter): (&Cone, &Tip, &Cutter),
) -> Result<Limits, GearError> {
    let rolls = pitch_roll(gear_cone) + pitch_roll(mate_cone);
    let a = rolls - roll_to(mate_cone, mate_tip.gamma_t)?;
    let gamma_l = acos(a.cos() * gear_cone.gamma_b.cos(), "limit cone angle")?;
    let a_f = rolls - roll_to(mate_cone, mate_cutter.gamma_tc)?;
    let gamma_f = acos(a_f.cos() * gear_cone.gamma_b.cos(), "fillet cone angle")?;
    Ok(Limits {
        no_undercut: a > 0.0,
        gamma_l,
        gamma_f,
        no_interference: gamma_f * sphere.lambda
            < gamma_l * sphere.lambda - params.interference_limit * params.module,
    })
}

fn undercut_residual(
    pitch: &Pitch,
    sphere: &Sphere,
    (gear, gear_cone): (&Standard, &Cone),
    (mate, mate_cutter): (&Standard, &Cutter),
    gamma: Real,
) -> Result<Real, GearError> {
    let phi = pressure_angle_at(gear_cone, gamma)?;
    let psi = spherical_involute(phi, gear_cone.gamma_b);
    let tita = gear_cone.tp / (2.0 * gear.rp) + gear_cone.psi_p - psi;

    let (sin_tc, cos_tc) = mate_cutter.gamma_tc.sin_cos();
    let betac = acos(
        (gamma.cos() - cos_tc * sphere.sigma.cos()) / (sin_tc * sphere.sigma.sin()),
        "crown cutter rotation at the undercut",
    )? - mate_cutter.tita_tc;
    let betag = -(mate.rp * betac + pitch.pp / 2.0) / gear.rp;
    let tita_a = -asin(
        (mate_cutter.tita_tc + betac).sin() * sin_tc / gamma.sin(),
        "trochoid angle at the undercut",
    )? - betag;
    Ok(tita_a - tita)
}

fn boundary(
    pitch: &Pitch,
    sphere: &Sphere,
    (gear, gear_cone): (&Standard, &Cone),
    limits: &Limits,
    (mate, mate_cutter): (&Standard, &Cutter),
    options: &BrentOptions,
) -> Result<Boundary, GearError> {
    if limits.no_undercut {
        return Ok(Boundary {
            gamma_u: None,
            gamma_c: limits.gamma_f,
            unresolved: false,
        });
    }
    let lower = gear_cone.gamma_b.max(sphere.sigma - mate_cutter.gamma_tc);
    let search = try_brent(
        |gamma| undercut_residual(pitch, sphere, (gear, gear_cone), (mate, mate_cutter), gamma),
        lower,
        gear_cone.gamma_p,
        options,
    );
    match search {
        Ok(root) => Ok(Boundary {
            gamma_u: Some(root.value),
            gamma_c: root.value,
            unresolved: false,
        }),
        Err(RootError::NoSignChange { a, b, fa, fb }) => {
            debug!(a, b, fa, fb, "undercut cone not bracketed, using the fillet cone");
            Ok(Boundary {
                gamma_u: None,
                gamma_c: limits.gamma_f,
                unresolved: true,
            })
        },
        Err(RootError::Evaluation(err)) => Err(err),
    }
}

fn contact_ratio(
    pitch: &Pitch,
    sphere: &Sphere,
    g1: (&Cone, &Tip, &Limits, &Boundary),
    g2: (&Cone, &Tip, &Limits, &Boundary),
) -> Result<Real, GearError> {
    let span = |(cone, tip, _, boundary): (&Cone, &Tip, &Limits, &Boundary)| {
        Ok::<Real, GearError>(
            sphere.lambda * (roll_to(cone, tip.gamma_t)? - roll_to(cone, boundary.gamma_c)?)
                / pitch.pb,
        )
    };
    let approach = |(cone, tip, _, _): (&Cone, &Tip, &Limits, &Boundary)| {
        Ok::<Real, GearError>(roll_to(cone, tip.gamma_t)? - pitch_roll(cone))
    };

    Ok(match (g1.2.no_undercut, g2.2.no_undercut) {
        (true, true) => sphere.lambda * (approach(g1)? + approach(g2)?) / pitch.pb,
        (false, true) => span(g1)?,
        (true, false) => span(g2)?,
        (false, false) => span(g1)?.min(span(g2)?),
    })
}

/// Solve a bevel pair.
#[instrument(level = "debug", skip_all, fields(gear1_teeth = params.gear1_teeth, gear2_teeth = params.gear2_teeth))]
pub fn solve(params: &BevelParameters) -> Result<BevelPair, GearError> {
    params.validate()?;
    let options = BrentOptions::default();

    let p = pitch(params);
    let s1 = standard(&p, params.gear1_teeth, params.thickness_offset);
    let s2 = standard(&p, params.gear2_teeth, -params.thickness_offset);
    let sp = sphere(params, &p, &s1, &s2);
    trace!(?p, ?sp, "pitch and sphere data");

    let k1 = cone(&p, &sp, &s1, &s2);
    let k2 = cone(&p, &sp, &s2, &s1);

    let tip1 = tip(&p, &sp, &k1);
    let tip2 = tip(&p, &sp, &k2);

    let c1 = cutter(&p, &sp, (&s1, &k1, &tip1), &k2)?;
    let c2 = cutter(&p, &sp, (&s2, &k2, &tip2), &k1)?;

    let l1 = limits(params, &sp, &k1, (&k2, &tip2, &c2))?;
    let l2 = limits(params, &sp, &k2, (&k1, &tip1, &c1))?;

    let b1 = boundary(&p, &sp, (&s1, &k1), &l1, (&s2, &c2), &options)?;
    let b2 = boundary(&p, &sp, (&s2, &k2), &l2, (&s1, &c1), &options)?;
    trace!(?l1, ?l2, ?b1, ?b2, "limit and boundary cones");

    let mc = contact_ratio(&p, &sp, (&k1, &tip1, &l1, &b1), (&k2, &tip2, &l2, &b2))?;
    if mc.is_nan() || mc <= 0.0 {
        return Err(GearError::invalid(
            "contact_ratio",
            format!("the gears do not mesh (contact ratio {})", mc),
        ));
    }
    let contact_ok = mc > params.contact_ratio_threshold;
    debug!(contact_ratio = mc, cone_distance = sp.lambda, "bevel pair solved");

    let initial2 = PI - ((k1.tp + k2.tp) / 2.0) / s2.rp;
    let gear1 = gear_data(&sp, 0.0, (&s1, &k1, &tip1, &c1, &l1, &b1));
    let gear2 = gear_data(&sp, initial2, (&s2, &k2, &tip2, &c2, &l2, &b2));

    let common = BevelCommon {
        module: p.module,
        pressure_angle: p.rho,
        shaft_angle: sp.sigma,
        cone_distance: sp.lambda,
        clearance_angle: sp.delta_c,
        extra_addendum_angle: sp.delta_add,
        circular_pitch: p.pp,
        base_pitch: p.pb,
        diametral_pitch: p.pd,
        backlash: sp.b,
        normal_backlash: params.backlash,
        thickness: params.thickness,
        interference_limit: params.interference_limit,
        contact_ratio: mc,
        contact_ratio_threshold: params.contact_ratio_threshold,
        contact_ratio_ok: contact_ok,
        samples: params.samples,
    };

    let mut advisories = Vec::new();
    for (member, gear, boundary) in [(PairMember::Gear1, &gear1, &b1), (PairMember::Gear2, &gear2, &b2)] {
        advisories.extend(gear_advisories(member, gear.no_undercut, gear.no_interference, gear.fillet_consistent));
        if boundary.unresolved {
            advisories.push(Advisory::UnresolvedUndercut { member });
        }
    }
    if !contact_ok {
        advisories.push(Advisory::LowContactRatio {
            contact_ratio: mc,
            threshold: params.contact_ratio_threshold,
        });
    }

    Ok(BevelPair {
        common,
        gear1,
        gear2,
        advisories,
    })
}

fn gear_data(
    sphere: &Sphere,
    initial_angle: Real,
    (s, k, tip, cutter, limits, boundary): (&Standard, &Cone, &Tip, &Cutter, &Limits, &Boundary),
) -> BevelGearData {
    let radius = |gamma: Real| sphere.lambda * gamma.sin();
    BevelGearData {
        teeth: s.teeth,
        thickness_offset: s.deltatp,
        pitch_radius: s.rp,
        base_radius: s.rb,
        pitch_cone_angle: k.gamma_p,
        pressure_angle: k.phi_p,
        base_cone_angle: k.gamma_b,
        involute_pitch: k.psi_p,
        pitch_thickness: k.tp,
        base_thickness: k.tb,
        addendum_angle: tip.delta_a,
        dedendum_angle: tip.delta_d,
        tip_cone_angle: tip.gamma_t,
        root_cone_angle: tip.gamma_root,
        tip_radius: radius(tip.gamma_t),
        root_radius: radius(tip.gamma_root),
        cutter: BevelCutter {
            tip_cone_angle: cutter.gamma_tc,
            tip_radius: radius(cutter.gamma_tc),
            addendum_angle: cutter.gamma_tc - k.gamma_p,
            pitch_thickness: cutter.tpc,
            base_thickness: cutter.tbc,
            tip_pressure_angle: cutter.phi_tc,
            tip_involute: cutter.psi_tc,
            tip_half_angle: cutter.tita_tc,
        },
        limit_cone_angle: limits.gamma_l,
        limit_radius: radius(limits.gamma_l),
        fillet_cone_angle: limits.gamma_f,
        fillet_radius: radius(limits.gamma_f),
        undercut_cone_angle: boundary.gamma_u,
        undercut_radius: boundary.gamma_u.map(radius),
        boundary_cone_angle: boundary.gamma_c,
        boundary_radius: radius(boundary.gamma_c),
        initial_angle,
        no_undercut: limits.no_undercut,
        no_interference: limits.no_interference,
        fillet_consistent: cutter.tita_tc > 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pitch_cones_add_up_to_the_shaft_angle() {
        let pair = solve(&BevelParameters::default()).unwrap();
        let sum = pair.gear1.pitch_cone_angle + pair.gear2.pitch_cone_angle;
        assert_relative_eq!(sum, pair.common.shaft_angle, epsilon = 1e-12);
        assert_relative_eq!(pair.common.cone_distance, 832f64.sqrt() / 2.0, epsilon = 1e-12);
        // the pitch circles lie on the sphere
        for gear in [&pair.gear1, &pair.gear2] {
            assert_relative_eq!(
                pair.common.cone_distance * gear.pitch_cone_angle.sin(),
                gear.pitch_radius,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn default_bevel_pair_meshes() {
        let pair = solve(&BevelParameters::default()).unwrap();
        assert!(pair.common.contact_ratio > 1.0);
        for gear in [&pair.gear1, &pair.gear2] {
            assert!(gear.root_radius < gear.pitch_radius);
            assert!(gear.pitch_radius < gear.tip_radius);
            assert!(gear.tip_radius < gear.cutter.tip_radius);
        }
    }

    #[test]
    fn right_angle_is_not_required() {
        let params = BevelParameters {
            shaft_angle: 60.0,
            gear1_teeth: 30,
            gear2_teeth: 20,
            ..BevelParameters::default()
        };
        let pair = solve(&params).unwrap();
        assert_relative_eq!(
            pair.gear1.pitch_cone_angle + pair.gear2.pitch_cone_angle,
            60f64.to_radians(),
            epsilon = 1e-12
        );
    }
}
