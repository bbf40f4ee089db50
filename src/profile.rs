//! Tooth and gear boundaries made of tagged arc and spline segments.
//!
//! A tooth is six segments wound counter-clockwise:
//! `[fillet_mirrored, involute_mirrored, tip_arc, involute, fillet, root_arc]`.
//! The tip and root arcs hold exactly three points (start, middle, end); the four
//! flank segments hold sampled curve points. A gear profile is the tooth repeated
//! `N` times at `2π/N` intervals.

use crate::float_types::{Real, TAU, tolerance};
use geo::{Coord, LineString, Polygon, Winding};
use nalgebra::{Point2, Point3, Rotation2, Rotation3, Vector3};

/// How a downstream consumer should interpolate a segment's points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    /// Circular arc through its three points.
    Arc,
    /// Interpolating spline through its sample points.
    Spline,
}

/// Operations a boundary point needs to be mirrored, rotated and fused.
pub trait ProfilePoint: Copy + Send + Sync {
    /// Reflection across the tooth centre line (`y -> -y`).
    fn mirrored(&self) -> Self;
    /// Rotation by `angle` radians about the gear axis.
    fn rotated(&self, angle: Real) -> Self;
    fn midpoint(&self, other: &Self) -> Self;
    fn distance(&self, other: &Self) -> Real;
}

impl ProfilePoint for Point2<Real> {
    #[inline]
    fn mirrored(&self) -> Self {
        Point2::new(self.x, -self.y)
    }

    #[inline]
    fn rotated(&self, angle: Real) -> Self {
        Rotation2::new(angle) * *self
    }

    #[inline]
    fn midpoint(&self, other: &Self) -> Self {
        nalgebra::center(self, other)
    }

    #[inline]
    fn distance(&self, other: &Self) -> Real {
        nalgebra::distance(self, other)
    }
}

impl ProfilePoint for Point3<Real> {
    #[inline]
    fn mirrored(&self) -> Self {
        Point3::new(self.x, -self.y, self.z)
    }

    #[inline]
    fn rotated(&self, angle: Real) -> Self {
        Rotation3::from_axis_angle(&Vector3::z_axis(), angle) * *self
    }

    #[inline]
    fn midpoint(&self, other: &Self) -> Self {
        nalgebra::center(self, other)
    }

    #[inline]
    fn distance(&self, other: &Self) -> Real {
        nalgebra::distance(self, other)
    }
}

/// One tagged run of boundary points.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSegment<P> {
    pub kind: SegmentKind,
    pub points: Vec<P>,
}

impl<P: ProfilePoint> ProfileSegment<P> {
    pub fn arc(points: Vec<P>) -> Self {
        Self {
            kind: SegmentKind::Arc,
            points,
        }
    }

    pub fn spline(points: Vec<P>) -> Self {
        Self {
            kind: SegmentKind::Spline,
            points,
        }
    }

    pub fn first(&self) -> Option<&P> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&P> {
        self.points.last()
    }

    fn rotated(&self, angle: Real) -> Self {
        Self {
            kind: self.kind,
            points: self.points.iter().map(|p| p.rotated(angle)).collect(),
        }
    }

    /// Mirror image, traversed in the opposite direction.
    fn mirrored_reversed(&self) -> Self {
        Self {
            kind: self.kind,
            points: self.points.iter().rev().map(|p| p.mirrored()).collect(),
        }
    }
}

/// Join two sampled curves by moving the last point of `first` and the first point
/// of `second` onto their midpoint. Applying it twice changes nothing.
pub fn fuse<P: ProfilePoint>(first: &mut [P], second: &mut [P]) {
    if let (Some(end), Some(start)) = (first.last_mut(), second.first_mut()) {
        let mid = end.midpoint(start);
        *end = mid;
        *start = mid;
    }
}

/// Boundary of a single tooth centred on the +x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ToothProfile<P> {
    pub segments: Vec<ProfileSegment<P>>,
}

impl<P: ProfilePoint> ToothProfile<P> {
    /// Position of the tip arc in [`ToothProfile::segments`].
    pub const TIP_ARC: usize = 2;
    /// Position of the root arc in [`ToothProfile::segments`].
    pub const ROOT_ARC: usize = 5;
    pub const SEGMENTS: usize = 6;

    /// Build the tooth from its upper half.
    ///
    /// # Parameters
    /// - `involute`: flank points from the tip down to the fillet junction
    /// - `fillet`: fillet points from the junction down to the root circle
    /// - `tip_arc`: three points from the mirrored involute start to the involute start
    /// - `root_arc`: three points from the fillet end to the next tooth's mirrored fillet
    pub fn assemble(involute: Vec<P>, fillet: Vec<P>, tip_arc: [P; 3], root_arc: [P; 3]) -> Self {
        let involute = ProfileSegment::spline(involute);
        let fillet = ProfileSegment::spline(fillet);
        Self {
            segments: vec![
                fillet.mirrored_reversed(),
                involute.mirrored_reversed(),
                ProfileSegment::arc(tip_arc.to_vec()),
                involute,
                fillet,
                ProfileSegment::arc(root_arc.to_vec()),
            ],
        }
    }

    pub fn involute(&self) -> &ProfileSegment<P> {
        &self.segments[3]
    }

    pub fn fillet(&self) -> &ProfileSegment<P> {
        &self.segments[4]
    }

    pub fn tip_arc(&self) -> &ProfileSegment<P> {
        &self.segments[Self::TIP_ARC]
    }

    pub fn root_arc(&self) -> &ProfileSegment<P> {
        &self.segments[Self::ROOT_ARC]
    }

    pub fn rotated(&self, angle: Real) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.rotated(angle)).collect(),
        }
    }

    /// Repeat the tooth `teeth` times, each copy rotated a further `2π/teeth`.
    pub fn replicate(&self, teeth: usize) -> GearProfile<P> {
        let pitch_angle = TAU / teeth as Real;
        let segments = (0..teeth)
            .flat_map(|i| {
                let angle = pitch_angle * i as Real;
                self.segments.iter().map(move |s| s.rotated(angle))
            })
            .collect();
        GearProfile { teeth, segments }
    }
}

/// Closed boundary of a whole gear: `teeth` consecutive tooth profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct GearProfile<P> {
    pub teeth: usize,
    pub segments: Vec<ProfileSegment<P>>,
}

impl<P: ProfilePoint> GearProfile<P> {
    /// The six segments of each tooth in turn.
    pub fn teeth(&self) -> impl Iterator<Item = &[ProfileSegment<P>]> {
        self.segments.chunks(ToothProfile::<P>::SEGMENTS)
    }

    pub fn rotated(&self, angle: Real) -> Self {
        Self {
            teeth: self.teeth,
            segments: self.segments.iter().map(|s| s.rotated(angle)).collect(),
        }
    }

    pub fn map_points<Q, F>(&self, mut f: F) -> GearProfile<Q>
    where
        F: FnMut(&P) -> Q,
    {
        GearProfile {
            teeth: self.teeth,
            segments: self
                .segments
                .iter()
                .map(|s| ProfileSegment {
                    kind: s.kind,
                    points: s.points.iter().map(&mut f).collect(),
                })
                .collect(),
        }
    }

    /// [`GearProfile::map_points`] for a fallible mapping; stops at the first error.
    pub fn try_map_points<Q, E, F>(&self, mut f: F) -> Result<GearProfile<Q>, E>
    where
        F: FnMut(&P) -> Result<Q, E>,
    {
        let mut segments = Vec::with_capacity(self.segments.len());
        for s in &self.segments {
            segments.push(ProfileSegment {
                kind: s.kind,
                points: s.points.iter().map(&mut f).collect::<Result<_, E>>()?,
            });
        }
        Ok(GearProfile {
            teeth: self.teeth,
            segments,
        })
    }

    /// Largest point-wise distance between two profiles with the same layout, or
    /// `None` when their segment structure differs.
    pub fn max_deviation(&self, other: &Self) -> Option<Real> {
        if self.segments.len() != other.segments.len() {
            return None;
        }
        let mut worst: Real = 0.0;
        for (a, b) in self.segments.iter().zip(&other.segments) {
            if a.kind != b.kind || a.points.len() != b.points.len() {
                return None;
            }
            for (p, q) in a.points.iter().zip(&b.points) {
                worst = worst.max(p.distance(q));
            }
        }
        Some(worst)
    }
}

impl GearProfile<Point2<Real>> {
    /// Flatten into a closed, counter-clockwise ring.
    ///
    /// Arcs are tessellated through their three points into `arc_steps` chords;
    /// splines contribute their sample points. Consecutive points closer than
    /// [`tolerance`] are merged.
    pub fn to_line_string(&self, arc_steps: usize) -> LineString<Real> {
        let eps = tolerance();
        let mut coords: Vec<Coord<Real>> = Vec::new();
        let mut push = |p: Point2<Real>| {
            let c = Coord { x: p.x, y: p.y };
            let duplicate = coords
                .last()
                .is_some_and(|last| (last.x - c.x).hypot(last.y - c.y) <= eps);
            if !duplicate {
                coords.push(c);
            }
        };

        for segment in &self.segments {
            match (segment.kind, segment.points.as_slice()) {
                (SegmentKind::Arc, [start, middle, end]) => {
                    tessellate_arc(start, middle, end, arc_steps.max(1))
                        .into_iter()
                        .for_each(&mut push);
                },
                _ => segment.points.iter().copied().for_each(&mut push),
            }
        }

        if coords.len() > 1 {
            let (first, last) = (coords[0], coords[coords.len() - 1]);
            if (first.x - last.x).hypot(first.y - last.y) <= eps {
                coords.pop();
            }
        }

        let mut ring = LineString::new(coords);
        ring.close();
        ring.make_ccw_winding();
        ring
    }

    /// [`GearProfile::to_line_string`] as a polygon without holes.
    pub fn to_polygon(&self, arc_steps: usize) -> Polygon<Real> {
        Polygon::new(self.to_line_string(arc_steps), vec![])
    }
}

/// Points along the circle through `start`, `middle` and `end`, from `start` to
/// `end` by way of `middle`. Collinear input yields the three points unchanged.
pub fn tessellate_arc(
    start: &Point2<Real>,
    middle: &Point2<Real>,
    end: &Point2<Real>,
    steps: usize,
) -> Vec<Point2<Real>> {
    let Some(center) = circumcenter(start, middle, end) else {
        return vec![*start, *middle, *end];
    };
    let radius = nalgebra::distance(&center, start);
    let angle_of = |p: &Point2<Real>| (p.y - center.y).atan2(p.x - center.x);
    let a0 = angle_of(start);
    let ccw_to_end = (angle_of(end) - a0).rem_euclid(TAU);
    let ccw_to_middle = (angle_of(middle) - a0).rem_euclid(TAU);
    let sweep = if ccw_to_middle <= ccw_to_end {
        ccw_to_end
    } else {
        ccw_to_end - TAU
    };

    (0..=steps)
        .map(|i| {
            if i == 0 {
                *start
            } else if i == steps {
                *end
            } else {
                let a = a0 + sweep * i as Real / steps as Real;
                Point2::new(center.x + radius * a.cos(), center.y + radius * a.sin())
            }
        })
        .collect()
}

fn circumcenter(a: &Point2<Real>, b: &Point2<Real>, c: &Point2<Real>) -> Option<Point2<Real>> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    let scale = (b - a).norm().max((c - a).norm());
    if d.abs() <= Real::EPSILON * scale * scale {
        return None;
    }
    let a2 = a.coords.norm_squared();
    let b2 = b.coords.norm_squared();
    let c2 = c.coords.norm_squared();
    Some(Point2::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::Area;

    fn unit_tooth() -> ToothProfile<Point2<Real>> {
        // A crude tooth on a 4-tooth gear: flank at ~10°, root at ~35°.
        let polar = |r: Real, deg: Real| {
            let a = deg.to_radians();
            Point2::new(r * a.cos(), r * a.sin())
        };
        let involute = vec![polar(10.0, 8.0), polar(9.0, 10.0), polar(8.0, 12.0)];
        let fillet = vec![polar(8.0, 12.0), polar(7.5, 20.0), polar(7.0, 30.0)];
        let tip = [polar(10.0, 8.0).mirrored(), polar(10.0, 0.0), polar(10.0, 8.0)];
        let root = [polar(7.0, 30.0), polar(7.0, 45.0), polar(7.0, 60.0)];
        ToothProfile::assemble(involute, fillet, tip, root)
    }

    #[test]
    fn fuse_is_idempotent() {
        let mut a = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        let mut b = vec![Point2::new(1.0, 3.0), Point2::new(2.0, 2.0)];
        fuse(&mut a, &mut b);
        assert_eq!(a[1], Point2::new(1.0, 2.0));
        assert_eq!(b[0], a[1]);
        let (a1, b1) = (a.clone(), b.clone());
        fuse(&mut a, &mut b);
        assert_eq!(a, a1);
        assert_eq!(b, b1);
    }

    #[test]
    fn arcs_sit_at_third_and_sixth_position() {
        let tooth = unit_tooth();
        let kinds: Vec<_> = tooth.segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
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
    }

    #[test]
    fn mirrored_half_runs_into_the_tip() {
        let tooth = unit_tooth();
        let mirrored_involute = &tooth.segments[1];
        assert_eq!(
            mirrored_involute.last(),
            tooth.tip_arc().first(),
            "mirrored involute must end where the tip arc starts"
        );
        assert_eq!(tooth.segments[0].last(), mirrored_involute.first());
        assert!(tooth.segments[0].points.iter().all(|p| p.y <= 0.0));
    }

    #[test]
    fn replication_is_closed_under_pitch_rotation() {
        let gear = unit_tooth().replicate(4);
        assert_eq!(gear.teeth().count(), 4);
        assert_eq!(gear.segments.len(), 24);

        // rotating by one pitch maps tooth k onto tooth k + 1
        let rotated = gear.rotated(TAU / 4.0);
        for (k, tooth) in rotated.teeth().enumerate().take(3) {
            let next = gear.teeth().nth(k + 1).unwrap();
            for (s, t) in tooth.iter().zip(next) {
                for (p, q) in s.points.iter().zip(&t.points) {
                    assert_abs_diff_eq!(p.x, q.x, epsilon = 1e-9);
                    assert_abs_diff_eq!(p.y, q.y, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn arc_tessellation_follows_the_middle_point() {
        let start = Point2::new(1.0, 0.0);
        let end = Point2::new(0.0, 1.0);
        let short = tessellate_arc(&start, &Point2::new(0.5_f64.sqrt(), 0.5_f64.sqrt()), &end, 8);
        let long = tessellate_arc(&start, &Point2::new(-1.0, 0.0), &end, 8);
        assert_eq!(short.len(), 9);
        assert!(short.iter().all(|p| p.x >= -1e-12 && p.y >= -1e-12));
        assert!(long.iter().any(|p| p.x < -0.9));
        for p in short.iter().chain(&long) {
            assert_abs_diff_eq!(p.coords.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn collinear_arc_is_left_alone() {
        let pts = tessellate_arc(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(2.0, 0.0),
            16,
        );
        assert_eq!(pts.len(), 3);
    }

    #[test]
    fn flattened_gear_winds_counter_clockwise() {
        let ring = unit_tooth().replicate(4).to_line_string(6);
        assert!(ring.is_closed());
        assert!(ring.is_ccw());
        let polygon = unit_tooth().replicate(4).to_polygon(6);
        assert!(polygon.signed_area() > 0.0);
    }
}
