//! Planar gear pairs: external spur (and the transverse section of helical and
//! double helical gears) and internal ring/pinion pairs.
//!
//! [`solver::solve`] derives every dimension of both gears from a
//! [`crate::params::SpurParameters`] record; [`profile::build`] turns one solved
//! gear into its tooth boundary and the replicated gear profile.
//!
//! Lengths are millimetres and angles radians throughout the derived records.

pub mod profile;
pub mod solver;

use crate::float_types::Real;
use crate::pair::Advisory;
use nalgebra::Point2;

pub use profile::{PlanarProfile, build};
pub use solver::solve;

/// Whether a gear has teeth on its outside or on the inside of a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GearKind {
    External,
    /// Ring gear. Its profile outlines the tooth spaces that are cut out of the
    /// blank, so tip and root radii swap roles with respect to the actual teeth.
    Internal,
}

/// Values shared by both gears of a pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommonData {
    /// `m`
    pub module: Real,
    /// `phi_s`
    pub standard_pressure_angle: Real,
    /// Operating pressure angle `phi_p`.
    pub pressure_angle: Real,
    /// `inv(phi_p)`
    pub involute_operating: Real,
    /// `inv(phi_s)`
    pub involute_standard: Real,
    /// Operating center distance `C`.
    pub center_distance: Real,
    /// `Cs = Rs1 + Rs2`
    pub standard_center_distance: Real,
    pub center_distance_offset: Real,
    /// Operating circular pitch `pp`.
    pub circular_pitch: Real,
    /// `ps = π·m`
    pub standard_circular_pitch: Real,
    /// `pb`
    pub base_pitch: Real,
    /// `pd = 1/m`
    pub diametral_pitch: Real,
    /// Clearance constant `c`.
    pub clearance: Real,
    /// Cutter tip corner radius `rcT = rk·m`.
    pub cutter_corner_radius: Real,
    /// Circular backlash `B` at the operating pitch circle.
    pub backlash: Real,
    /// Backlash along the common normal `Bn`.
    pub normal_backlash: Real,
    pub interference_limit: Real,
    /// Contact ratio `mc`.
    pub contact_ratio: Real,
    pub contact_ratio_threshold: Real,
    /// `mc` exceeds [`CommonData::contact_ratio_threshold`].
    pub contact_ratio_ok: bool,
    /// Samples per involute and fillet curve.
    pub samples: usize,
}

/// The rack-cutter tip a gear's flanks would cut into its mate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CutterData {
    /// `RTc`: the tip circle extended by the clearance.
    pub tip_radius: Real,
    /// `apc = RTc - Rp`
    pub addendum: Real,
    /// `tpc`
    pub pitch_thickness: Real,
    /// `tbc`
    pub base_thickness: Real,
    /// `tsc`
    pub standard_thickness: Real,
    /// `Rc_a`: radius of the tip corner's centre.
    pub corner_center_radius: Real,
    /// `Rhc`: radius where the corner rounding meets the involute.
    pub corner_tangent_radius: Real,
    /// `phi_hc`
    pub corner_pressure_angle: Real,
    /// `inv(phi_hc)`
    pub corner_involute: Real,
    /// `tita_hc`
    pub corner_tangent_angle: Real,
    /// `gamma_hc`
    pub corner_gamma: Real,
    /// `(xc_a, yc_a)`: the corner's centre.
    pub corner_center: Point2<Real>,
    /// `tita_c_a`: polar angle of [`CutterData::corner_center`].
    pub corner_center_angle: Real,
}

/// Everything derived for one gear of the pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GearData {
    pub kind: GearKind,
    pub teeth: usize,
    /// Manufacturing offset applied to the profile. Negated for a ring gear so a
    /// positive input always shrinks the material.
    pub offset: Real,
    /// `deltatp`
    pub thickness_offset: Real,

    /// `Rs`
    pub standard_radius: Real,
    /// `Rp`
    pub pitch_radius: Real,
    /// `Rb`
    pub base_radius: Real,
    /// `RT`
    pub tip_radius: Real,
    /// `Rroot`
    pub root_radius: Real,
    /// `RL`: deepest point the mate's tip reaches along the line of action.
    pub limit_radius: Real,
    /// `Rf`: deepest point the mate's cutter tip reaches along the line of action.
    pub fillet_radius: Real,
    /// `Ru`: where the trochoid undercuts the involute, when it does.
    pub undercut_radius: Option<Real>,
    /// `Rc`: the involute/fillet boundary actually used for the profile.
    pub boundary_radius: Real,

    /// `tp`
    pub pitch_thickness: Real,
    /// `ts`
    pub standard_thickness: Real,
    /// `tb`
    pub base_thickness: Real,
    /// `tT`
    pub tip_thickness: Real,
    /// `e`
    pub profile_shift: Real,
    /// `ap`
    pub addendum: Real,
    /// `as`
    pub standard_addendum: Real,
    /// `bp`
    pub dedendum: Real,
    /// `bs`
    pub standard_dedendum: Real,
    /// `beta0`: initial angular position of the tooth centre line.
    pub initial_angle: Real,

    pub cutter: CutterData,

    /// Radius of the innermost point of the actual teeth. Equals `root_radius`
    /// for a ring gear and `tip_radius` otherwise.
    pub effective_tip_radius: Real,
    /// Radius of the bottom of the actual tooth spaces.
    pub effective_root_radius: Real,

    /// No undercut (`FirstCond`).
    pub no_undercut: bool,
    /// No second interference (`SecondCond`).
    pub no_interference: bool,
    /// The cutter corner lies above the tooth centre line (`ThirdCond`).
    pub fillet_consistent: bool,
}

/// A solved planar pair. `gear1` drives `gear2`; for an internal pair `gear1` is
/// the ring.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarPair {
    pub common: CommonData,
    pub gear1: GearData,
    pub gear2: GearData,
    pub advisories: Vec<Advisory>,
}

impl PlanarPair {
    pub fn is_internal(&self) -> bool {
        self.gear1.kind == GearKind::Internal
    }
}
