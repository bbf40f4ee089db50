//! Derived dimensions of a planar pair.
//!
//! The computation runs in nine stages. Each stage produces its own record and
//! later stages only read earlier records, so the order below is the only order
//! in which the pair can be solved:
//!
//! 1. [`Pitch`]: module-derived pitches and the cutter corner radius
//! 2. [`Standard`]: standard and base radii of each gear
//! 3. [`Mesh`]: operating center distance and pressure angle
//! 4. [`Thickness`]: pitch radius, tooth thicknesses and profile shift
//! 5. [`Tip`]: addendum and tip radius
//! 6. [`Cutter`]: the cutter tip each gear's generating rack would have
//! 7. [`Limits`]: undercut and interference checks
//! 8. [`Boundary`]: the involute/fillet boundary radius
//! 9. [`Contact`]: contact ratio

use super::{CommonData, CutterData, GearData, GearKind, PlanarPair};
use crate::errors::GearError;
use crate::float_types::{PI, Real};
use crate::numeric::{acos, asin, involute_at_radius, sqrt};
use crate::pair::{Advisory, PairMember};
use crate::params::SpurParameters;
use crate::root_finding::{BrentOptions, RootError, try_brent};
use nalgebra::Point2;
use tracing::{debug, instrument, trace};

#[derive(Debug, Clone, Copy)]
struct Pitch {
    module: Real,
    phi_s: Real,
    ps: Real,
    pb: Real,
    pd: Real,
    rct: Real,
}

#[derive(Debug, Clone, Copy)]
struct Standard {
    teeth: usize,
    deltatp: Real,
    rs: Real,
    rb: Real,
}

#[derive(Debug, Clone, Copy)]
struct Mesh {
    c: Real,
    cs: Real,
    phi_p: Real,
    inv_p: Real,
    inv_s: Real,
    pp: Real,
    b: Real,
}

#[derive(Debug, Clone, Copy)]
struct Thickness {
    rp: Real,
    tp: Real,
    tb: Real,
    ts: Real,
    e: Real,
}

#[derive(Debug, Clone, Copy)]
struct Tip {
    ap: Real,
    rt: Real,
}

#[derive(Debug, Clone, Copy)]
struct Cutter {
    rtc: Real,
    apc: Real,
    tpc: Real,
    tbc: Real,
    tsc: Real,
    rc_a: Real,
    rhc: Real,
    phi_hc: Real,
    inv_hc: Real,
    tita_hc: Real,
    gamma_hc: Real,
    corner: Point2<Real>,
    tita_c_a: Real,
    /// Root radius this cutter leaves in the *mate*.
    mate_root: Real,
    consistent: bool,
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    no_undercut: bool,
    rl: Real,
    rf: Real,
    no_interference: bool,
}

#[derive(Debug, Clone, Copy)]
struct Boundary {
    ru: Option<Real>,
    rc: Real,
    unresolved: bool,
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    mc: Real,
    ok: bool,
}

fn pitch(params: &SpurParameters) -> Pitch {
    let module = params.module;
    let phi_s = params.pressure_angle.to_radians();
    let ps = PI * module;
    Pitch {
        module,
        phi_s,
        ps,
        pb: ps * phi_s.cos(),
        pd: 1.0 / module,
        rct: params.cutter_tip_radius * module,
    }
}

fn standard(pitch: &Pitch, teeth: usize, deltatp: Real) -> Standard {
    let rs = teeth as Real * pitch.module / 2.0;
    Standard {
        teeth,
        deltatp,
        rs,
        rb: rs * pitch.phi_s.cos(),
    }
}

fn mesh(
    params: &SpurParameters,
    pitch: &Pitch,
    g1: &Standard,
    g2: &Standard,
) -> Result<Mesh, GearError> {
    let teeth = (g1.teeth + g2.teeth) as Real;
    let c = teeth * pitch.module / 2.0 + params.center_distance_offset;
    let cs = g1.rs + g2.rs;
    let rb_sum = g1.rb + g2.rb;
    let phi_p = acos(rb_sum / c, "operating pressure angle")?;
    let inv_p = sqrt((c / rb_sum).powi(2) - 1.0, "operating involute function")? - phi_p;
    let inv_s = sqrt((cs / rb_sum).powi(2) - 1.0, "standard involute function")? - pitch.phi_s;
    Ok(Mesh {
        c,
        cs,
        phi_p,
        inv_p,
        inv_s,
        pp: 2.0 * PI * c / teeth,
        b: params.backlash / phi_p.cos(),
    })
}

fn thickness(pitch: &Pitch, mesh: &Mesh, gear: &Standard, mate: &Standard) -> Thickness {
    let rp = gear.teeth as Real * mesh.c / (gear.teeth + mate.teeth) as Real;
    let tp = (mesh.pp - mesh.b) / 2.0 + gear.deltatp;
    let tb = gear.rb * (tp / rp + 2.0 * mesh.inv_p);
    let ts = gear.rs * (tb / gear.rb - 2.0 * mesh.inv_s);
    Thickness {
        rp,
        tp,
        tb,
        ts,
        e: (ts - pitch.ps / 2.0) / (2.0 * pitch.phi_s.tan()),
    }
}

fn tip(
    addendum_factor: Real,
    pitch: &Pitch,
    (gear, gear_th): (&Standard, &Thickness),
    (mate, mate_th): (&Standard, &Thickness),
) -> Tip {
    let ap = pitch.module * addendum_factor
        - (gear_th.rp - mate_th.rp - gear.rs + mate.rs - gear_th.e + mate_th.e) / 2.0;
    Tip {
        ap,
        rt: gear_th.rp + ap,
    }
}

fn cutter(
    params: &SpurParameters,
    pitch: &Pitch,
    mesh: &Mesh,
    (gear, gear_th, gear_tip): (&Standard, &Thickness, &Tip),
    mate_th: &Thickness,
    without_clearance: bool,
) -> Result<Cutter, GearError> {
    let tpc = mesh.pp - mate_th.tp;
    let tbc = gear.rb * (tpc / gear_th.rp + 2.0 * mesh.inv_p);
    let tsc = gear.rs * (tbc / gear.rb - 2.0 * mesh.inv_s);

    let rtc = if without_clearance {
        gear_tip.rt
    } else {
        gear_tip.rt + params.clearance * pitch.module
    };
    let rc_a = rtc - pitch.rct;
    let roll = sqrt(rc_a * rc_a - gear.rb * gear.rb, "cutter corner roll length")?;
    let rhc = gear.rb.hypot(roll + pitch.rct);

    let phi_hc = acos(gear.rb / rhc, "pressure angle at the cutter corner")?;
    let inv_hc = involute_at_radius(rhc, gear.rb)?;
    let tita_hc = tsc / (2.0 * gear.rs) + mesh.inv_s - inv_hc;
    let gamma_hc = phi_hc - tita_hc;

    let xc_a = rhc * tita_hc.cos() - pitch.rct * gamma_hc.sin();
    let yc_a = rhc * tita_hc.sin() - pitch.rct * gamma_hc.cos();

    Ok(Cutter {
        rtc,
        apc: rtc - gear_th.rp,
        tpc,
        tbc,
        tsc,
        rc_a,
        rhc,
        phi_hc,
        inv_hc,
        tita_hc,
        gamma_hc,
        corner: Point2::new(xc_a, yc_a),
        tita_c_a: (yc_a / xc_a).atan(),
        mate_root: mesh.c - rtc,
        consistent: yc_a > 0.0,
    })
}

fn limits(
    params: &SpurParameters,
    mesh: &Mesh,
    gear: &Standard,
    (mate, mate_tip, mate_cutter): (&Standard, &Tip, &Cutter),
) -> Result<Limits, GearError> {
    let c2 = mesh.c * mesh.c;
    let no_undercut = c2 - gear.rb.powi(2) - 2.0 * gear.rb * mate.rb - mate_tip.rt.powi(2) > 0.0;

    let action = sqrt(c2 - (gear.rb + mate.rb).powi(2), "length of the line of action")?;
    let mate_tip_roll = sqrt(mate_tip.rt.powi(2) - mate.rb.powi(2), "mate tip roll length")?;
    let mate_corner_roll = sqrt(
        mate_cutter.rhc.powi(2) - mate.rb.powi(2),
        "mate cutter corner roll length",
    )?;
    let rl = gear.rb.hypot(action - mate_tip_roll);
    let rf = gear.rb.hypot(action - mate_corner_roll);

    Ok(Limits {
        no_undercut,
        rl,
        rf,
        no_interference: rf < rl - params.interference_limit * params.module,
    })
}

/// Angular mismatch at radius `r` between the involute flank and the trochoid
/// traced by the mate's cutter corner. Negative below the undercut point.
fn undercut_residual(
    pitch: &Pitch,
    mesh: &Mesh,
    (gear, gear_th): (&Standard, &Thickness),
    (mate, mate_cutter): (&Standard, &Cutter),
    r: Real,
) -> Result<Real, GearError> {
    let tita_r = gear_th.tb / (2.0 * gear.rb) - involute_at_radius(r, gear.rb)?;
    let rhc = mate_cutter.rhc;
    let betac = acos(
        (mesh.c * mesh.c + rhc * rhc - r * r) / (2.0 * mesh.c * rhc),
        "cutter rotation at the undercut",
    )? - mate_cutter.tita_hc;
    let betag = -(mate.rs * betac + pitch.ps / 2.0) / gear.rs;
    let tita_r_d = -asin(
        (rhc / r) * (betac + mate_cutter.tita_hc).sin(),
        "trochoid angle at the undercut",
    )? - betag;
    Ok(tita_r_d - tita_r)
}

fn boundary(
    pitch: &Pitch,
    mesh: &Mesh,
    (gear, gear_th): (&Standard, &Thickness),
    limits: &Limits,
    (mate, mate_cutter): (&Standard, &Cutter),
    options: &BrentOptions,
) -> Result<Boundary, GearError> {
    if limits.no_undercut {
        return Ok(Boundary {
            ru: None,
            rc: limits.rf,
            unresolved: false,
        });
    }

    let lower = gear.rb.max(mesh.c - mate_cutter.rhc);
    let search = try_brent(
        |r| undercut_residual(pitch, mesh, (gear, gear_th), (mate, mate_cutter), r),
        lower,
        gear_th.rp,
        options,
    );
    match search {
        Ok(root) => {
            if !root.converged {
                debug!(radius = root.value, residual = root.residual, "undercut search hit the iteration cap");
            }
            Ok(Boundary {
                ru: Some(root.value),
                rc: root.value,
                unresolved: false,
            })
        },
        Err(RootError::NoSignChange { a, b, fa, fb }) => {
            debug!(a, b, fa, fb, "undercut radius not bracketed, using the fillet radius");
            Ok(Boundary {
                ru: None,
                rc: limits.rf,
                unresolved: true,
            })
        },
        Err(RootError::Evaluation(err)) => Err(err),
    }
}

fn contact(
    params: &SpurParameters,
    pitch: &Pitch,
    mesh: &Mesh,
    g1: (&Standard, &Tip, &Limits, &Boundary),
    g2: (&Standard, &Tip, &Limits, &Boundary),
) -> Result<Contact, GearError> {
    let roll = |rb: Real, r: Real| sqrt(r * r - rb * rb, "contact roll length");
    let undercut_span = |(gear, tip, _, boundary): (&Standard, &Tip, &Limits, &Boundary)| {
        Ok::<Real, GearError>((roll(gear.rb, tip.rt)? - roll(gear.rb, boundary.rc)?) / pitch.pb)
    };

    let mc = match (g1.2.no_undercut, g2.2.no_undercut) {
        (true, true) => {
            let action = roll(g1.0.rb + g2.0.rb, mesh.c)?;
            (roll(g1.0.rb, g1.1.rt)? + roll(g2.0.rb, g2.1.rt)? - action) / pitch.pb
        },
        (false, true) => undercut_span(g1)?,
        (true, false) => undercut_span(g2)?,
        (false, false) => undercut_span(g1)?.min(undercut_span(g2)?),
    };

    if mc.is_nan() || mc <= 0.0 {
        return Err(GearError::invalid(
            "contact_ratio",
            format!("the gears do not mesh (contact ratio {})", mc),
        ));
    }
    Ok(Contact {
        mc,
        ok: mc > params.contact_ratio_threshold,
    })
}

/// Solve a planar pair. With `internal` set, `gear1` is a ring gear meshing with
/// the external pinion `gear2`.
///
/// False validity flags are reported as [`Advisory`] values, never as errors; an
/// error means the parameters describe no realizable pair.
#[instrument(level = "debug", skip_all, fields(gear1_teeth = params.gear1_teeth, gear2_teeth = params.gear2_teeth, internal = internal))]
pub fn solve(params: &SpurParameters, internal: bool) -> Result<PlanarPair, GearError> {
    params.validate(internal)?;
    let options = BrentOptions::default();

    let p = pitch(params);
    trace!(?p, "pitch data");

    let s1 = standard(&p, params.gear1_teeth, params.thickness_offset);
    let s2 = standard(&p, params.gear2_teeth, -params.thickness_offset);

    let m = mesh(params, &p, &s1, &s2)?;
    trace!(?m, "mesh data");

    let t1 = thickness(&p, &m, &s1, &s2);
    let t2 = thickness(&p, &m, &s2, &s1);

    let tip1 = tip(params.addendum, &p, (&s1, &t1), (&s2, &t2));
    let tip2 = tip(params.addendum, &p, (&s2, &t2), (&s1, &t1));

    let c1 = cutter(params, &p, &m, (&s1, &t1, &tip1), &t2, false)?;
    let c2 = cutter(params, &p, &m, (&s2, &t2, &tip2), &t1, internal)?;
    trace!(?c1, ?c2, "cutter data");

    let l1 = limits(params, &m, &s1, (&s2, &tip2, &c2))?;
    let l2 = limits(params, &m, &s2, (&s1, &tip1, &c1))?;

    let b1 = boundary(&p, &m, (&s1, &t1), &l1, (&s2, &c2), &options)?;
    let b2 = boundary(&p, &m, (&s2, &t2), &l2, (&s1, &c1), &options)?;
    trace!(?l1, ?l2, ?b1, ?b2, "limit and boundary radii");

    let contact = contact(params, &p, &m, (&s1, &tip1, &l1, &b1), (&s2, &tip2, &l2, &b2))?;
    debug!(contact_ratio = contact.mc, "pair solved");

    let initial2 = PI - ((t1.tp + t2.tp) / 2.0) / t2.rp;
    let kind1 = if internal { GearKind::Internal } else { GearKind::External };
    let offset1 = if internal { -params.gear1_offset } else { params.gear1_offset };

    let gear1 = gear_data(
        (kind1, offset1, 0.0),
        (&s1, &t1, &tip1, &c1, &l1, &b1),
        c2.mate_root,
    )?;
    let gear2 = gear_data(
        (GearKind::External, params.gear2_offset, initial2),
        (&s2, &t2, &tip2, &c2, &l2, &b2),
        c1.mate_root,
    )?;

    let common = CommonData {
        module: p.module,
        standard_pressure_angle: p.phi_s,
        pressure_angle: m.phi_p,
        involute_operating: m.inv_p,
        involute_standard: m.inv_s,
        center_distance: m.c,
        standard_center_distance: m.cs,
        center_distance_offset: params.center_distance_offset,
        circular_pitch: m.pp,
        standard_circular_pitch: p.ps,
        base_pitch: p.pb,
        diametral_pitch: p.pd,
        clearance: params.clearance,
        cutter_corner_radius: p.rct,
        backlash: m.b,
        normal_backlash: params.backlash,
        interference_limit: params.interference_limit,
        contact_ratio: contact.mc,
        contact_ratio_threshold: params.contact_ratio_threshold,
        contact_ratio_ok: contact.ok,
        samples: params.samples,
    };

    let mut advisories = Vec::new();
    for (member, gear, boundary) in [(PairMember::Gear1, &gear1, &b1), (PairMember::Gear2, &gear2, &b2)] {
        advisories.extend(gear_advisories(member, gear.no_undercut, gear.no_interference, gear.fillet_consistent));
        if boundary.unresolved {
            advisories.push(Advisory::UnresolvedUndercut { member });
        }
    }
    if !contact.ok {
        advisories.push(Advisory::LowContactRatio {
            contact_ratio: contact.mc,
            threshold: params.contact_ratio_threshold,
        });
    }

    Ok(PlanarPair {
        common,
        gear1,
        gear2,
        advisories,
    })
}

/// Advisories implied by a gear's three validity flags.
pub(crate) fn gear_advisories(
    member: PairMember,
    no_undercut: bool,
    no_interference: bool,
    fillet_consistent: bool,
) -> impl Iterator<Item = Advisory> {
    [
        (!no_undercut).then_some(Advisory::Undercut { member }),
        (!no_interference).then_some(Advisory::Interference { member }),
        (!fillet_consistent).then_some(Advisory::FilletInconsistent { member }),
    ]
    .into_iter()
    .flatten()
}

fn gear_data(
    (kind, offset, initial_angle): (GearKind, Real, Real),
    (s, t, tip, cutter, limits, boundary): (&Standard, &Thickness, &Tip, &Cutter, &Limits, &Boundary),
    root_radius: Real,
) -> Result<GearData, GearError> {
    let tip_involute = involute_at_radius(tip.rt, s.rb)?;
    let tip_thickness = tip.rt * (t.tb / s.rb - 2.0 * tip_involute);
    let (effective_tip_radius, effective_root_radius) = match kind {
        GearKind::External => (tip.rt, root_radius),
        GearKind::Internal => (root_radius, cutter.rtc),
    };

    Ok(GearData {
        kind,
        teeth: s.teeth,
        offset,
        thickness_offset: s.deltatp,
        standard_radius: s.rs,
        pitch_radius: t.rp,
        base_radius: s.rb,
        tip_radius: tip.rt,
        root_radius,
        limit_radius: limits.rl,
        fillet_radius: limits.rf,
        undercut_radius: boundary.ru,
        boundary_radius: boundary.rc,
        pitch_thickness: t.tp,
        standard_thickness: t.ts,
        base_thickness: t.tb,
        tip_thickness,
        profile_shift: t.e,
        addendum: tip.ap,
        standard_addendum: tip.rt - s.rs,
        dedendum: t.rp - root_radius,
        standard_dedendum: s.rs - root_radius,
        initial_angle,
        cutter: CutterData {
            tip_radius: cutter.rtc,
            addendum: cutter.apc,
            pitch_thickness: cutter.tpc,
            base_thickness: cutter.tbc,
            standard_thickness: cutter.tsc,
            corner_center_radius: cutter.rc_a,
            corner_tangent_radius: cutter.rhc,
            corner_pressure_angle: cutter.phi_hc,
            corner_involute: cutter.inv_hc,
            corner_tangent_angle: cutter.tita_hc,
            corner_gamma: cutter.gamma_hc,
            corner_center: cutter.corner,
            corner_center_angle: cutter.tita_c_a,
        },
        effective_tip_radius,
        effective_root_radius,
        no_undercut: limits.no_undercut,
        no_interference: limits.no_interference,
        fillet_consistent: cutter.consistent,
    })
}
