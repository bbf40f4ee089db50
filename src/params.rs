//! Input parameter records for a meshing gear pair.
//!
//! Lengths are millimetres, angles are degrees; the solvers convert to radians.
//! Each record feeds exactly one paired computation and is never mutated by it.

use crate::errors::GearError;
use crate::float_types::Real;

/// Parameters of a planar pair: spur, helical, double helical or internal.
///
/// `gear1` is the driving (master) gear, `gear2` the driven (slave) one. For an
/// internal pair `gear1` is the ring.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpurParameters {
    /// Module `m` (mm).
    pub module: Real,
    /// Standard pressure angle `phi_s` (degrees).
    pub pressure_angle: Real,
    pub gear1_teeth: usize,
    pub gear2_teeth: usize,
    /// Backlash along the common normal `Bn` (mm).
    pub backlash: Real,
    /// Clearance constant `c`; the cutter tip reaches `c·m` past the mating tip.
    pub clearance: Real,
    /// Cutter tip corner radius constant `rk`; the corner radius is `rk·m`.
    pub cutter_tip_radius: Real,
    /// Center distance offset `deltaCs` (mm).
    pub center_distance_offset: Real,
    /// Tooth thickness offset `deltatp` (mm), added to gear1 and taken from gear2.
    pub thickness_offset: Real,
    /// 3D printer offset of gear1 (mm). Positive values shrink the tooth.
    pub gear1_offset: Real,
    /// 3D printer offset of gear2 (mm).
    pub gear2_offset: Real,
    /// Number of samples `n` on each involute and fillet curve.
    pub samples: usize,
    /// Limit of second interference `iL`, as a fraction of the module.
    pub interference_limit: Real,
    /// Addendum factor; `1.0` is a standard full-depth tooth.
    pub addendum: Real,
    /// Contact ratio below which [`crate::pair::Advisory::LowContactRatio`] is raised.
    pub contact_ratio_threshold: Real,
    /// Radial thickness of an internal gear's rim beyond its tooth spaces (mm).
    pub rim_thickness: Real,
}

impl Default for SpurParameters {
    fn default() -> Self {
        Self {
            module: 1.0,
            pressure_angle: 20.0,
            gear1_teeth: 24,
            gear2_teeth: 16,
            backlash: 0.0,
            clearance: 0.25,
            cutter_tip_radius: 0.1,
            center_distance_offset: 0.0,
            thickness_offset: 0.0,
            gear1_offset: 0.0,
            gear2_offset: 0.0,
            samples: 20,
            interference_limit: 0.025,
            addendum: 1.0,
            contact_ratio_threshold: 1.4,
            rim_thickness: 2.0,
        }
    }
}

impl SpurParameters {
    /// Reject parameter sets no gear pair can be built from.
    pub fn validate(&self, internal: bool) -> Result<(), GearError> {
        check_module(self.module)?;
        check_teeth(self.gear1_teeth, self.gear2_teeth)?;
        check_samples(self.samples)?;
        check_angle("pressure_angle", self.pressure_angle, 90.0)?;
        check_finite("backlash", self.backlash)?;
        check_finite("clearance", self.clearance)?;
        check_finite("cutter_tip_radius", self.cutter_tip_radius)?;
        check_finite("center_distance_offset", self.center_distance_offset)?;
        check_finite("thickness_offset", self.thickness_offset)?;
        check_finite("gear1_offset", self.gear1_offset)?;
        check_finite("gear2_offset", self.gear2_offset)?;
        check_finite("interference_limit", self.interference_limit)?;
        check_finite("addendum", self.addendum)?;
        check_finite("contact_ratio_threshold", self.contact_ratio_threshold)?;
        if internal {
            check_finite("rim_thickness", self.rim_thickness)?;
            if self.gear1_teeth <= self.gear2_teeth {
                return Err(GearError::invalid(
                    "gear1_teeth",
                    format!(
                        "an internal gear needs more teeth than its pinion ({} <= {})",
                        self.gear1_teeth, self.gear2_teeth
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Parameters of a bevel pair, solved on a sphere centred on the cone apex.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BevelParameters {
    /// Module `m` at the back cone (mm).
    pub module: Real,
    /// Pressure angle `rho` (degrees).
    pub pressure_angle: Real,
    /// Angle `Sigma` between the two gear axes (degrees).
    pub shaft_angle: Real,
    pub gear1_teeth: usize,
    pub gear2_teeth: usize,
    /// Backlash `Bl` (mm).
    pub backlash: Real,
    pub clearance: Real,
    pub thickness_offset: Real,
    /// Face width measured outward from the reference sphere (mm).
    pub thickness: Real,
    pub samples: usize,
    pub interference_limit: Real,
    pub addendum: Real,
    pub contact_ratio_threshold: Real,
}

impl Default for BevelParameters {
    fn default() -> Self {
        Self {
            module: 1.0,
            pressure_angle: 20.0,
            shaft_angle: 90.0,
            gear1_teeth: 24,
            gear2_teeth: 16,
            backlash: 0.0,
            clearance: 0.25,
            thickness_offset: 0.0,
            thickness: 2.0,
            samples: 20,
            interference_limit: 0.025,
            addendum: 1.0,
            contact_ratio_threshold: 1.4,
        }
    }
}

impl BevelParameters {
    pub fn validate(&self) -> Result<(), GearError> {
        check_module(self.module)?;
        check_teeth(self.gear1_teeth, self.gear2_teeth)?;
        check_samples(self.samples)?;
        check_angle("pressure_angle", self.pressure_angle, 90.0)?;
        check_angle("shaft_angle", self.shaft_angle, 180.0)?;
        check_finite("backlash", self.backlash)?;
        check_finite("clearance", self.clearance)?;
        check_finite("thickness_offset", self.thickness_offset)?;
        check_finite("thickness", self.thickness)?;
        check_finite("interference_limit", self.interference_limit)?;
        check_finite("addendum", self.addendum)?;
        check_finite("contact_ratio_threshold", self.contact_ratio_threshold)?;
        Ok(())
    }
}

fn check_module(module: Real) -> Result<(), GearError> {
    if module.is_finite() && module > 0.0 {
        Ok(())
    } else {
        Err(GearError::invalid("module", format!("must be positive, got {}", module)))
    }
}

fn check_teeth(gear1: usize, gear2: usize) -> Result<(), GearError> {
    if gear1 == 0 {
        return Err(GearError::invalid("gear1_teeth", "must be at least 1"));
    }
    if gear2 == 0 {
        return Err(GearError::invalid("gear2_teeth", "must be at least 1"));
    }
    Ok(())
}

fn check_samples(samples: usize) -> Result<(), GearError> {
    if samples < 2 {
        return Err(GearError::invalid(
            "samples",
            format!("curves need at least 2 points, got {}", samples),
        ));
    }
    Ok(())
}

fn check_angle(name: &'static str, degrees: Real, upper: Real) -> Result<(), GearError> {
    if degrees.is_finite() && degrees > 0.0 && degrees < upper {
        Ok(())
    } else {
        Err(GearError::invalid(
            name,
            format!("must lie strictly between 0 and {} degrees, got {}", upper, degrees),
        ))
    }
}

fn check_finite(name: &'static str, value: Real) -> Result<(), GearError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GearError::invalid(name, format!("must be finite, got {}", value)))
    }
}
