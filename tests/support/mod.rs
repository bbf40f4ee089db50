//! Test support library
//! Provides helpers shared by the integration tests.
#![allow(dead_code)]

use invgears::{
    float_types::Real,
    pair::{PairMember, PairRequest, PairSolution},
    params::{BevelParameters, SpurParameters},
    planar::PlanarProfile,
    profile::{GearProfile, ProfilePoint},
};
use nalgebra::Point2;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Spur parameters with the given tooth counts, everything else default.
pub fn spur(gear1_teeth: usize, gear2_teeth: usize) -> SpurParameters {
    SpurParameters {
        gear1_teeth,
        gear2_teeth,
        ..SpurParameters::default()
    }
}

pub fn solve_external(params: SpurParameters) -> PairSolution {
    PairRequest::External(params)
        .solve()
        .expect("external pair should solve")
}

pub fn solve_internal(params: SpurParameters) -> PairSolution {
    PairRequest::Internal(params)
        .solve()
        .expect("internal pair should solve")
}

pub fn solve_bevel(params: BevelParameters) -> PairSolution {
    PairRequest::Bevel(params)
        .solve()
        .expect("bevel pair should solve")
}

pub fn planar(solution: &PairSolution, member: PairMember) -> &PlanarProfile {
    solution
        .planar_profile(member)
        .expect("planar pair should carry planar profiles")
}

/// Smallest and largest distance from the gear axis over every profile point.
pub fn radial_extent(profile: &GearProfile<Point2<Real>>) -> (Real, Real) {
    let mut min = Real::MAX;
    let mut max = Real::MIN;
    for segment in &profile.segments {
        for p in &segment.points {
            let r = p.coords.norm();
            min = min.min(r);
            max = max.max(r);
        }
    }
    (min, max)
}

/// Largest gap between the end of one segment and the start of the next, the
/// last segment wrapping around to the first.
pub fn largest_gap<P: ProfilePoint>(profile: &GearProfile<P>) -> Real {
    let n = profile.segments.len();
    let mut worst: Real = 0.0;
    for i in 0..n {
        let end = profile.segments[i].last().expect("segment has points");
        let start = profile.segments[(i + 1) % n].first().expect("segment has points");
        worst = worst.max(end.distance(start));
    }
    worst
}
