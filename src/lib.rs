//! Tooth profiles for meshing **involute gear pairs**: external spur, helical and
//! double helical gears, internal ring/pinion pairs and bevel gears.
//!
//! Given a handful of standard parameters (module, pressure angle, tooth counts,
//! backlash, clearance, profile offsets) the crate derives every radius and tooth
//! thickness of both gears, checks the pair for undercut, interference and
//! contact ratio, and builds each gear's boundary as a closed chain of arc and
//! spline segments ready to extrude, sweep or loft.
//!
//! ```
//! use invgears::pair::{PairMember, PairRequest};
//! use invgears::params::SpurParameters;
//!
//! let solution = PairRequest::External(SpurParameters::default()).solve().unwrap();
//! let pinion = solution.planar_profile(PairMember::Gear2).unwrap();
//! assert_eq!(pinion.profile.teeth, 16);
//! assert!(solution.contact_ratio() > 1.0);
//! ```
//!
//! # Features
//! #### Optional
//! - **parallel**: solve independent pairs on the rayon thread pool in [`pair::solve_all`]
//! - **serde**: `Serialize`/`Deserialize` for parameters, derived data and advisories
//!
//! Nothing is printed. Solver stages and fallbacks are reported through
//! [`tracing`] spans and events for callers that install a subscriber.

#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod numeric;
pub mod root_finding;
pub mod params;
pub mod profile;
pub mod planar;
pub mod bevel;
pub mod pair;

pub use errors::GearError;
pub use pair::{Advisory, GearRole, PairRequest, PairSolution};
pub use params::{BevelParameters, SpurParameters};
