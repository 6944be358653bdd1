//! Option exercise style.

use std::fmt;
use std::str::FromStr;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    #[default]
    European,
    /// Can be exercised at any time up to expiry.
    American,
}

impl ExerciseType {
    /// `true` for early-exercisable contracts.
    pub fn is_american(self) -> bool {
        matches!(self, ExerciseType::American)
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseType::European => write!(f, "European"),
            ExerciseType::American => write!(f, "American"),
        }
    }
}

impl FromStr for ExerciseType {
    type Err = qq_core::Error;

    fn from_str(s: &str) -> qq_core::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "european" | "eu" => Ok(ExerciseType::European),
            "american" | "am" => Ok(ExerciseType::American),
            other => Err(qq_core::Error::InvalidParameter(format!(
                "unknown exercise style '{other}'"
            ))),
        }
    }
}
