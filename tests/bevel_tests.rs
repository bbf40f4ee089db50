mod support;

use invgears::{
    Advisory, GearError,
    float_types::{Real, TAU},
    pair::{MeshKind, PairGeometry, PairMember, PairRequest},
    params::BevelParameters,
    profile::{ProfilePoint, SegmentKind},
};

#[test]
fn default_bevel_pair() {
    let solution = support::solve_bevel(BevelParameters::default());
    assert_eq!(solution.mesh, MeshKind::Bevel);
    assert_eq!(solution.placement.center_distance, 0.0);
    assert!(solution.planar_profile(PairMember::Gear1).is_none());

    let PairGeometry::Bevel { common, gear1, gear2, .. } = &solution.geometry else {
        panic!("bevel request should give bevel geometry");
    };
    assert!(support::approx_eq(
        gear1.pitch_cone_angle + gear2.pitch_cone_angle,
        common.shaft_angle,
        1e-12
    ));
    for gear in [gear1, gear2] {
        assert!(gear.root_cone_angle < gear.pitch_cone_angle);
        assert!(gear.pitch_cone_angle < gear.tip_cone_angle);
        assert!(gear.base_cone_angle <= gear.boundary_cone_angle);
        assert!(gear.boundary_cone_angle <= gear.tip_cone_angle);
    }
    assert!(common.contact_ratio > 1.0);
}

#[test]
fn tip_arc_lies_on_the_sphere() {
    let solution = support::solve_bevel(BevelParameters::default());
    let PairGeometry::Bevel { common, .. } = &solution.geometry else {
        panic!("bevel request should give bevel geometry");
    };
    for member in [PairMember::Gear1, PairMember::Gear2] {
        let out = solution.bevel_profile(member).unwrap();
        for p in &out.tooth.tip_arc().points {
            assert!(support::approx_eq(p.coords.norm(), common.cone_distance, 1e-9));
            assert_eq!(p.z, out.tip_height);
        }
        assert!(out.tip_height < out.root_height, "tip cone is wider than root cone");
    }
}

#[test]
fn bevel_teeth_repeat_around_the_axis() {
    let solution = support::solve_bevel(BevelParameters::default());
    let out = solution.bevel_profile(PairMember::Gear2).unwrap();
    assert_eq!(out.profile.teeth, 16);
    let kinds: Vec<_> = out.tooth.segments.iter().map(|s| s.kind).collect();
    assert_eq!(kinds[2], SegmentKind::Arc);
    assert_eq!(kinds[5], SegmentKind::Arc);

    let turned = out.profile.rotated(TAU / 16.0);
    let teeth: Vec<_> = out.profile.teeth().collect();
    for (k, tooth) in turned.teeth().enumerate() {
        for (s, t) in tooth.iter().zip(teeth[(k + 1) % 16]) {
            for (p, q) in s.points.iter().zip(&t.points) {
                assert!(p.distance(q) < 1e-6);
            }
        }
    }
}

#[test]
fn projected_profile_is_flat_and_wider() {
    let params = BevelParameters::default();
    let thickness = params.thickness;
    let solution = support::solve_bevel(params);
    let PairGeometry::Bevel { common, .. } = &solution.geometry else {
        panic!("bevel request should give bevel geometry");
    };
    let out = solution.bevel_profile(PairMember::Gear1).unwrap();
    let plane: Real = common.cone_distance + thickness;
    for (flat, curved) in out.projected.segments.iter().zip(&out.profile.segments) {
        for (p, q) in flat.points.iter().zip(&curved.points) {
            assert_eq!(p.z, plane);
            // the apex, the sphere point and its projection are collinear
            assert!(p.coords.cross(&q.coords).norm() < 1e-9 * plane * plane);
        }
    }
}

#[test]
fn other_shaft_angles_solve() {
    for shaft_angle in [60.0, 75.0] {
        let solution = support::solve_bevel(BevelParameters {
            shaft_angle,
            ..BevelParameters::default()
        });
        let PairGeometry::Bevel { gear1, gear2, .. } = &solution.geometry else {
            panic!("bevel request should give bevel geometry");
        };
        assert!(support::approx_eq(
            (gear1.pitch_cone_angle + gear2.pitch_cone_angle).to_degrees(),
            shaft_angle,
            1e-9
        ));
    }
}

#[test]
fn shaft_angle_out_of_range_is_rejected() {
    let err = PairRequest::Bevel(BevelParameters {
        shaft_angle: 180.0,
        ..BevelParameters::default()
    })
    .solve()
    .unwrap_err();
    assert!(matches!(err, GearError::InvalidParameter { name: "shaft_angle", .. }));
}

#[test]
fn small_bevel_pinion_is_undercut() {
    let solution = support::solve_bevel(BevelParameters {
        gear1_teeth: 40,
        gear2_teeth: 9,
        ..BevelParameters::default()
    });
    let PairGeometry::Bevel { gear2, .. } = &solution.geometry else {
        panic!("bevel request should give bevel geometry");
    };
    assert!(!gear2.no_undercut);
    assert!(!solution.advisories.contains(&Advisory::UnresolvedUndercut {
        member: PairMember::Gear2
    }));

    let gu = gear2.undercut_cone_angle.expect("undercut cone is bracketed for 40/9");
    assert!(gu > gear2.base_cone_angle && gu < gear2.pitch_cone_angle);
    assert_eq!(gear2.boundary_cone_angle, gu);

    // the fillet search starts the trochoid on the undercut cone
    let tooth = &solution.bevel_profile(PairMember::Gear2).unwrap().tooth;
    assert_eq!(tooth.involute().last(), tooth.fillet().first());
    let junction = tooth.fillet().first().unwrap();
    let cone_angle: Real = (junction.z / junction.coords.norm()).acos();
    assert!(support::approx_eq(cone_angle, gu, 1e-3));
}
