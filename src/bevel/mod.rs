//! Bevel gear pairs.
//!
//! The pair is solved on the sphere of radius `lambda` (the cone distance)
//! centred on the common apex of both pitch cones. Radii are related to cone
//! angles by `R = lambda·sin(gamma)`, and tooth profiles are spherical involutes
//! and the trochoids the mate's crown cutter leaves.

pub mod profile;
pub mod solver;

use crate::float_types::Real;
use crate::pair::Advisory;

pub use profile::{BevelProfile, build};
pub use solver::solve;

/// Values shared by both gears of a bevel pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BevelCommon {
    pub module: Real,
    /// `rho`
    pub pressure_angle: Real,
    /// `Sigma`
    pub shaft_angle: Real,
    /// Cone distance `lambda`: the sphere radius.
    pub cone_distance: Real,
    /// Clearance as an angle on the sphere, `delta_c`.
    pub clearance_angle: Real,
    /// Addendum beyond one module as an angle on the sphere.
    pub extra_addendum_angle: Real,
    /// `pp = π·m`
    pub circular_pitch: Real,
    pub base_pitch: Real,
    pub diametral_pitch: Real,
    /// `B`
    pub backlash: Real,
    /// `Bl`
    pub normal_backlash: Real,
    /// Face width outward from the reference sphere.
    pub thickness: Real,
    pub interference_limit: Real,
    pub contact_ratio: Real,
    pub contact_ratio_threshold: Real,
    pub contact_ratio_ok: bool,
    pub samples: usize,
}

/// Everything derived for one gear of a bevel pair. Angles are cone half-angles
/// measured from the gear axis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BevelGearData {
    pub teeth: usize,
    pub thickness_offset: Real,

    /// `Rp`
    pub pitch_radius: Real,
    /// `Rb`
    pub base_radius: Real,
    /// `gamma_p`
    pub pitch_cone_angle: Real,
    /// `phi_p`
    pub pressure_angle: Real,
    /// `gamma_b`
    pub base_cone_angle: Real,
    /// `psi_p`: spherical involute function at the pitch cone.
    pub involute_pitch: Real,
    pub pitch_thickness: Real,
    pub base_thickness: Real,

    /// `delta_a`
    pub addendum_angle: Real,
    /// `delta_d`
    pub dedendum_angle: Real,
    /// `gamma_T`
    pub tip_cone_angle: Real,
    /// `gamma_root`
    pub root_cone_angle: Real,
    pub tip_radius: Real,
    pub root_radius: Real,

    pub cutter: BevelCutter,

    /// `gamma_L`
    pub limit_cone_angle: Real,
    pub limit_radius: Real,
    /// `gamma_f`
    pub fillet_cone_angle: Real,
    pub fillet_radius: Real,
    /// `gamma_u`
    pub undercut_cone_angle: Option<Real>,
    pub undercut_radius: Option<Real>,
    /// `gamma_c`: the involute/fillet boundary actually used.
    pub boundary_cone_angle: Real,
    pub boundary_radius: Real,

    pub initial_angle: Real,

    pub no_undercut: bool,
    pub no_interference: bool,
    pub fillet_consistent: bool,
}

/// The crown cutter tip of one gear.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BevelCutter {
    /// `gamma_Tc`
    pub tip_cone_angle: Real,
    /// `RTc`
    pub tip_radius: Real,
    /// `delta_ac`
    pub addendum_angle: Real,
    pub pitch_thickness: Real,
    pub base_thickness: Real,
    /// `phi_Tc`
    pub tip_pressure_angle: Real,
    /// `psi_Tc`
    pub tip_involute: Real,
    /// `tita_Tc`: half angular thickness of the cutter tip.
    pub tip_half_angle: Real,
}

/// A solved bevel pair; `gear1` drives `gear2`.
#[derive(Debug, Clone, PartialEq)]
pub struct BevelPair {
    pub common: BevelCommon,
    pub gear1: BevelGearData,
    pub gear2: BevelGearData,
    pub advisories: Vec<Advisory>,
}
