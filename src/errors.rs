//! Gear computation errors

use crate::float_types::Real;

/// Everything that can stop a gear pair from being solved or profiled.
///
/// Advisory conditions (undercut, interference, low contact ratio...) are *not*
/// errors; see [`crate::pair::Advisory`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GearError {
    /// (NumericDomain) An inverse trigonometric function or square root received an
    /// argument outside its domain; the parameter set is not geometrically realizable.
    #[error("(NumericDomain) {operation} received {argument} outside its domain while computing {quantity}")]
    NumericDomain {
        operation: &'static str,
        argument: Real,
        quantity: &'static str,
    },
    /// (InvalidParameter) An input parameter is out of its accepted range
    #[error("(InvalidParameter) {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// (DegenerateProfile) A curve could not be built from otherwise valid data
    #[error("(DegenerateProfile) {0}")]
    DegenerateProfile(String),
}

impl GearError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        GearError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
