mod support;

use geo::Area;
use invgears::{
    float_types::{PI, Real, TAU},
    pair::{Advisory, PairGeometry, PairMember},
    profile::{ProfilePoint, SegmentKind, ToothProfile, fuse},
};
use nalgebra::Point2;

#[test]
fn default_pair_radius_ordering() {
    let solution = support::solve_external(support::spur(24, 16));
    let PairGeometry::Planar { gear1, gear2, .. } = &solution.geometry else {
        panic!("external pair should be planar");
    };
    for gear in [gear1, gear2] {
        assert!(gear.root_radius < gear.base_radius, "root inside base circle");
        assert!(gear.base_radius <= gear.pitch_radius);
        assert!(gear.pitch_radius < gear.tip_radius);
        assert!(gear.base_radius <= gear.boundary_radius);
        assert!(gear.boundary_radius <= gear.tip_radius);
    }
}

#[test]
fn pitch_radii_follow_the_tooth_ratio() {
    let solution = support::solve_external(support::spur(24, 16));
    let PairGeometry::Planar { common, gear1, gear2, .. } = &solution.geometry else {
        panic!("external pair should be planar");
    };
    assert!(support::approx_eq(gear1.pitch_radius / gear2.pitch_radius, 24.0 / 16.0, 1e-9));
    assert!(support::approx_eq(
        gear1.pitch_radius + gear2.pitch_radius,
        common.center_distance,
        1e-9
    ));
    assert!(common.contact_ratio > 1.0);
    assert!(common.contact_ratio_ok);
}

#[test]
fn tooth_segments_are_tagged_and_chained() {
    let solution = support::solve_external(support::spur(24, 16));
    for member in [PairMember::Gear1, PairMember::Gear2] {
        let tooth = &support::planar(&solution, member).tooth;
        let kinds: Vec<_> = tooth.segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [
                SegmentKind::Spline,
                SegmentKind::Spline,
                SegmentKind::Arc,
                SegmentKind::Spline,
                SegmentKind::Spline,
                SegmentKind::Arc,
            ]
        );
        assert_eq!(tooth.tip_arc().points.len(), 3);
        assert_eq!(tooth.root_arc().points.len(), 3);

        // involute and fillet share their junction exactly
        assert_eq!(tooth.involute().last(), tooth.fillet().first());
        for pair in tooth.segments.windows(2) {
            let gap = pair[0].last().unwrap().distance(pair[1].first().unwrap());
            assert!(gap < 1e-9, "segments should chain, gap {gap}");
        }
    }
}

#[test]
fn fusing_twice_changes_nothing() {
    let mut a = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
    let mut b = vec![Point2::new(1.0, 0.2), Point2::new(2.0, 0.0)];
    fuse(&mut a, &mut b);
    let (a1, b1) = (a.clone(), b.clone());
    fuse(&mut a, &mut b);
    assert_eq!(a, a1);
    assert_eq!(b, b1);
    assert_eq!(a.last(), b.first());
}

#[test]
fn replicated_profile_closes_on_itself() {
    let solution = support::solve_external(support::spur(24, 16));
    for member in [PairMember::Gear1, PairMember::Gear2] {
        let profile = &support::planar(&solution, member).profile;
        let n = profile.teeth;
        assert_eq!(profile.segments.len(), n * ToothProfile::<Point2<Real>>::SEGMENTS);

        // rotating by one pitch maps each tooth onto the next
        let turned = profile.rotated(TAU / n as Real);
        let teeth: Vec<_> = profile.teeth().collect();
        for (k, tooth) in turned.teeth().enumerate() {
            let next = teeth[(k + 1) % n];
            for (s, t) in tooth.iter().zip(next) {
                for (p, q) in s.points.iter().zip(&t.points) {
                    assert!(p.distance(q) < 1e-6);
                }
            }
        }
        assert!(support::largest_gap(profile) < 1e-6);
    }
}

#[test]
fn profile_stays_between_root_and_tip() {
    let solution = support::solve_external(support::spur(24, 16));
    for member in [PairMember::Gear1, PairMember::Gear2] {
        let out = support::planar(&solution, member);
        let (min, max) = support::radial_extent(&out.profile);
        assert!(min >= out.root_radius - 1e-9);
        assert!(max <= out.tip_radius + 1e-9);
    }
}

#[test]
fn flattened_ring_is_counter_clockwise() {
    let solution = support::solve_external(support::spur(24, 16));
    let out = support::planar(&solution, PairMember::Gear1);
    let polygon = out.profile.to_polygon(8);
    let area = polygon.signed_area();
    assert!(area > 0.0, "exterior should wind counter-clockwise");
    assert!(area > PI * out.root_radius * out.root_radius);
    assert!(area < PI * out.tip_radius * out.tip_radius);

    let ring = out.profile.to_line_string(8);
    assert!(ring.is_closed());
}

#[test]
fn tiny_offset_is_ignored() {
    let base = support::solve_external(support::spur(24, 16));
    let nudged = support::solve_external(invgears::SpurParameters {
        gear1_offset: 1e-6,
        ..support::spur(24, 16)
    });
    assert_eq!(
        support::planar(&base, PairMember::Gear1),
        support::planar(&nudged, PairMember::Gear1)
    );
}

#[test]
fn offset_trims_the_tooth_to_the_reduced_tip() {
    let offset = 0.1;
    let solution = support::solve_external(invgears::SpurParameters {
        gear1_offset: offset,
        ..support::spur(24, 16)
    });
    let PairGeometry::Planar { gear1, .. } = &solution.geometry else {
        panic!("external pair should be planar");
    };
    let out = support::planar(&solution, PairMember::Gear1);
    assert_eq!(out.tip_radius, gear1.tip_radius - offset);
    assert_eq!(out.root_radius, gear1.root_radius - offset);

    let tip_start = out.tooth.involute().first().unwrap();
    assert!(support::approx_eq(tip_start.coords.norm(), out.tip_radius, 1e-9));
    assert_eq!(out.tooth.tip_arc().last(), Some(tip_start));
    assert_eq!(out.tooth.involute().last(), out.tooth.fillet().first());

    // a shaved tooth is thinner at the tip
    let plain = support::solve_external(support::spur(24, 16));
    let plain_tip = support::planar(&plain, PairMember::Gear1).tooth.involute().points[0];
    assert!(tip_start.y.atan2(tip_start.x) < plain_tip.y.atan2(plain_tip.x));
}

#[test]
fn small_pinion_is_undercut() {
    let solution = support::solve_external(support::spur(40, 9));
    let PairGeometry::Planar { gear2, .. } = &solution.geometry else {
        panic!("external pair should be planar");
    };
    assert!(!gear2.no_undercut);
    assert!(solution.advisories.contains(&Advisory::Undercut {
        member: PairMember::Gear2
    }));
    assert!(!solution.advisories.contains(&Advisory::UnresolvedUndercut {
        member: PairMember::Gear2
    }));

    let ru = gear2.undercut_radius.expect("undercut radius is bracketed for 40/9");
    assert!(ru > gear2.base_radius && ru < gear2.pitch_radius);
    assert_eq!(gear2.boundary_radius, ru);

    // the fillet starts where the involute stops
    let tooth = &support::planar(&solution, PairMember::Gear2).tooth;
    assert_eq!(tooth.involute().last(), tooth.fillet().first());
    let junction = tooth.fillet().first().unwrap();
    assert!(support::approx_eq(junction.coords.norm(), ru, 1e-3));
}

#[test]
fn offset_on_tangent_flanks_needs_no_advisory() {
    let solution = support::solve_external(invgears::SpurParameters {
        gear1_offset: 0.1,
        gear2_offset: 0.1,
        ..support::spur(24, 16)
    });
    assert!(
        !solution
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::NoOffsetIntersection { .. })),
        "{:?}",
        solution.advisories
    );
    for member in [PairMember::Gear1, PairMember::Gear2] {
        let tooth = &support::planar(&solution, member).tooth;
        assert_eq!(tooth.involute().last(), tooth.fillet().first());
    }
}

#[test]
fn offset_undercut_flank_is_spliced_at_the_crossing() {
    let offset = 0.1;
    let solution = support::solve_external(invgears::SpurParameters {
        gear2_offset: offset,
        ..support::spur(40, 9)
    });
    let PairGeometry::Planar { gear2, .. } = &solution.geometry else {
        panic!("external pair should be planar");
    };
    // the undercut cusp leaves the shifted ends apart, so only a crossing joins them
    assert!(!solution.advisories.contains(&Advisory::NoOffsetIntersection {
        member: PairMember::Gear2
    }));

    let out = support::planar(&solution, PairMember::Gear2);
    let tooth = &out.tooth;
    assert_eq!(tooth.involute().last(), tooth.fillet().first());
    let tip_start = tooth.involute().first().unwrap();
    assert!(support::approx_eq(tip_start.coords.norm(), gear2.tip_radius - offset, 1e-9));
    assert!(support::largest_gap(&out.profile) < 1e-6);
}

#[test]
fn mirrored_half_matches_the_flank() {
    let solution = support::solve_external(support::spur(24, 16));
    let tooth = &support::planar(&solution, PairMember::Gear2).tooth;
    let flank = &tooth.involute().points;
    let mirrored = &tooth.segments[1].points;
    for (p, q) in flank.iter().rev().zip(mirrored) {
        assert_eq!(p.mirrored(), *q);
    }
}
