//! The boundary between CAD gear roles and the paired solvers.
//!
//! A CAD document knows gears by role (a master gear, a slave driven by it, a
//! slave that in turn drives another gear, an internal ring, a bevel pair...).
//! The solvers only know `gear1` (driving) and `gear2` (driven). This module maps
//! one onto the other, runs the solver and both profile builders, and collects
//! the advisories.

use crate::bevel::{self, BevelCommon, BevelGearData, BevelProfile};
use crate::errors::GearError;
use crate::float_types::{PI, Real};
use crate::params::{BevelParameters, SpurParameters};
use crate::planar::{self, CommonData, GearData, PlanarProfile};
use std::fmt;
use tracing::instrument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which side of a pair a gear sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairMember {
    /// The driving gear.
    Gear1,
    /// The driven gear.
    Gear2,
}

impl fmt::Display for PairMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairMember::Gear1 => write!(f, "gear 1"),
            PairMember::Gear2 => write!(f, "gear 2"),
        }
    }
}

/// The kind of mesh a pair forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeshKind {
    External,
    Internal,
    Bevel,
}

/// Every role a gear can play in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GearRole {
    /// Spur, helical or double helical gear that drives a slave.
    Master,
    /// External gear driven by a master.
    Slave,
    /// Gear driven by one pair that drives the next; it is `gear1` of the pair it
    /// drives.
    SlaveMaster,
    /// Ring gear of an internal pair.
    Internal,
    /// External pinion inside a ring gear.
    InternalSlave,
    BevelMaster,
    BevelSlave,
}

impl GearRole {
    pub const fn member(self) -> PairMember {
        match self {
            GearRole::Master | GearRole::SlaveMaster | GearRole::Internal | GearRole::BevelMaster => {
                PairMember::Gear1
            },
            GearRole::Slave | GearRole::InternalSlave | GearRole::BevelSlave => PairMember::Gear2,
        }
    }

    pub const fn mesh(self) -> MeshKind {
        match self {
            GearRole::Master | GearRole::Slave | GearRole::SlaveMaster => MeshKind::External,
            GearRole::Internal | GearRole::InternalSlave => MeshKind::Internal,
            GearRole::BevelMaster | GearRole::BevelSlave => MeshKind::Bevel,
        }
    }
}

/// A caller-facing warning. The pair is still solved and profiled; the design
/// may just not be a good one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Advisory {
    /// The mate's cutter undercuts the involute of this gear.
    Undercut { member: PairMember },
    /// The mate's tip reaches below where this gear's involute starts.
    Interference { member: PairMember },
    /// The mate's cutter corner crosses the tooth centre line.
    FilletInconsistent { member: PairMember },
    LowContactRatio { contact_ratio: Real, threshold: Real },
    /// Undercut was detected but its radius could not be bracketed; the fillet
    /// radius was used as the boundary.
    UnresolvedUndercut { member: PairMember },
    /// The offset involute and fillet no longer cross; their ends were fused.
    NoOffsetIntersection { member: PairMember },
}

impl Advisory {
    pub const fn member(&self) -> Option<PairMember> {
        match self {
            Advisory::Undercut { member }
            | Advisory::Interference { member }
            | Advisory::FilletInconsistent { member }
            | Advisory::UnresolvedUndercut { member }
            | Advisory::NoOffsetIntersection { member } => Some(*member),
            Advisory::LowContactRatio { .. } => None,
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::Undercut { member } => write!(f, "{} is undercut", member),
            Advisory::Interference { member } => {
                write!(f, "{} has second interference with its mate", member)
            },
            Advisory::FilletInconsistent { member } => {
                write!(f, "the cutter that generates {} overlaps the tooth centre line", member)
            },
            Advisory::LowContactRatio {
                contact_ratio,
                threshold,
            } => write!(
                f,
                "contact ratio {:.3} is below the recommended {:.3}",
                contact_ratio, threshold
            ),
            Advisory::UnresolvedUndercut { member } => write!(
                f,
                "undercut radius of {} not found, fillet radius used instead",
                member
            ),
            Advisory::NoOffsetIntersection { member } => write!(
                f,
                "offset flank and fillet of {} do not intersect, their ends were joined",
                member
            ),
        }
    }
}

/// Where gear2 sits relative to gear1, which is centred at the origin with its
/// first tooth on the +x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    /// Distance between the two gear axes along +x. Zero for bevel pairs, whose
    /// axes meet at the apex.
    pub center_distance: Real,
    /// Rotation of gear2 about its own axis that puts its teeth into mesh.
    pub gear2_rotation: Real,
    /// Outer radius of a ring gear's blank.
    pub blank_radius: Option<Real>,
}

/// A pair to solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairRequest {
    External(SpurParameters),
    /// `gear1` is the ring.
    Internal(SpurParameters),
    Bevel(BevelParameters),
}

impl PairRequest {
    pub const fn mesh(&self) -> MeshKind {
        match self {
            PairRequest::External(_) => MeshKind::External,
            PairRequest::Internal(_) => MeshKind::Internal,
            PairRequest::Bevel(_) => MeshKind::Bevel,
        }
    }

    /// Solve the pair and profile both gears.
    #[instrument(level = "debug", skip_all, fields(mesh = ?self.mesh()))]
    pub fn solve(&self) -> Result<PairSolution, GearError> {
        match self {
            PairRequest::External(params) => solve_planar(params, false),
            PairRequest::Internal(params) => solve_planar(params, true),
            PairRequest::Bevel(params) => solve_bevel(params),
        }
    }
}

/// The data and profiles of one solved pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PairGeometry {
    Planar {
        common: CommonData,
        gear1: GearData,
        gear2: GearData,
        profile1: PlanarProfile,
        profile2: PlanarProfile,
    },
    Bevel {
        common: BevelCommon,
        gear1: BevelGearData,
        gear2: BevelGearData,
        profile1: BevelProfile,
        profile2: BevelProfile,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairSolution {
    pub mesh: MeshKind,
    pub geometry: PairGeometry,
    pub placement: Placement,
    /// Solver and profile advisories, in that order.
    pub advisories: Vec<Advisory>,
}

impl PairSolution {
    pub fn contact_ratio(&self) -> Real {
        match &self.geometry {
            PairGeometry::Planar { common, .. } => common.contact_ratio,
            PairGeometry::Bevel { common, .. } => common.contact_ratio,
        }
    }

    /// Planar profile of `member`, or `None` for a bevel pair.
    pub fn planar_profile(&self, member: PairMember) -> Option<&PlanarProfile> {
        match (&self.geometry, member) {
            (PairGeometry::Planar { profile1, .. }, PairMember::Gear1) => Some(profile1),
            (PairGeometry::Planar { profile2, .. }, PairMember::Gear2) => Some(profile2),
            (PairGeometry::Bevel { .. }, _) => None,
        }
    }

    /// Bevel profile of `member`, or `None` for a planar pair.
    pub fn bevel_profile(&self, member: PairMember) -> Option<&BevelProfile> {
        match (&self.geometry, member) {
            (PairGeometry::Bevel { profile1, .. }, PairMember::Gear1) => Some(profile1),
            (PairGeometry::Bevel { profile2, .. }, PairMember::Gear2) => Some(profile2),
            (PairGeometry::Planar { .. }, _) => None,
        }
    }

    /// Planar profile of the gear playing `role`.
    pub fn planar_profile_for(&self, role: GearRole) -> Option<&PlanarProfile> {
        (role.mesh() == self.mesh)
            .then(|| self.planar_profile(role.member()))
            .flatten()
    }
}

fn solve_planar(params: &SpurParameters, internal: bool) -> Result<PairSolution, GearError> {
    let pair = planar::solve(params, internal)?;
    let profile1 = planar::build(&pair.gear1, &pair.gear2, &pair.common, PairMember::Gear1)?;
    let profile2 = planar::build(&pair.gear2, &pair.gear1, &pair.common, PairMember::Gear2)?;

    let placement = if internal {
        Placement {
            center_distance: (pair.gear1.pitch_radius - pair.gear2.pitch_radius).abs(),
            gear2_rotation: pair.gear2.initial_angle - PI + PI / pair.gear2.teeth as Real,
            blank_radius: Some(pair.gear1.cutter.tip_radius + params.rim_thickness),
        }
    } else {
        Placement {
            center_distance: pair.common.center_distance,
            gear2_rotation: pair.gear2.initial_angle,
            blank_radius: None,
        }
    };

    let mut advisories = pair.advisories;
    advisories.extend(profile1.advisories.iter().cloned());
    advisories.extend(profile2.advisories.iter().cloned());

    Ok(PairSolution {
        mesh: if internal { MeshKind::Internal } else { MeshKind::External },
        geometry: PairGeometry::Planar {
            common: pair.common,
            gear1: pair.gear1,
            gear2: pair.gear2,
            profile1,
            profile2,
        },
        placement,
        advisories,
    })
}

fn solve_bevel(params: &BevelParameters) -> Result<PairSolution, GearError> {
    let pair = bevel::solve(params)?;
    let profile1 = bevel::build(&pair.gear1, &pair.gear2, &pair.common, PairMember::Gear1)?;
    let profile2 = bevel::build(&pair.gear2, &pair.gear1, &pair.common, PairMember::Gear2)?;
    let placement = Placement {
        center_distance: 0.0,
        gear2_rotation: pair.gear2.initial_angle,
        blank_radius: None,
    };
    Ok(PairSolution {
        mesh: MeshKind::Bevel,
        geometry: PairGeometry::Bevel {
            common: pair.common,
            gear1: pair.gear1,
            gear2: pair.gear2,
            profile1,
            profile2,
        },
        placement,
        advisories: pair.advisories,
    })
}

/// Solve independent pairs, in parallel with the `parallel` feature. Results are
/// in request order.
pub fn solve_all(requests: &[PairRequest]) -> Vec<Result<PairSolution, GearError>> {
    #[cfg(feature = "parallel")]
    {
        requests.par_iter().map(PairRequest::solve).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        requests.iter().map(PairRequest::solve).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_map_onto_pair_members() {
        assert_eq!(GearRole::SlaveMaster.member(), PairMember::Gear1);
        assert_eq!(GearRole::SlaveMaster.mesh(), MeshKind::External);
        assert_eq!(GearRole::Internal.member(), PairMember::Gear1);
        assert_eq!(GearRole::InternalSlave.mesh(), MeshKind::Internal);
        assert_eq!(GearRole::BevelSlave.member(), PairMember::Gear2);
    }

    #[test]
    fn advisory_messages_name_the_gear() {
        let undercut = Advisory::Undercut {
            member: PairMember::Gear2,
        };
        assert_eq!(undercut.to_string(), "gear 2 is undercut");
        assert_eq!(undercut.member(), Some(PairMember::Gear2));

        let low = Advisory::LowContactRatio {
            contact_ratio: 1.2,
            threshold: 1.4,
        };
        assert_eq!(low.to_string(), "contact ratio 1.200 is below the recommended 1.400");
        assert_eq!(low.member(), None);
    }
}
