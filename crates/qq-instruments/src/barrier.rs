//! Single continuously-monitored barrier without rebate.

use qq_core::Real;
use std::fmt;
use std::str::FromStr;

/// Barrier type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BarrierType {
    /// Down-and-in: becomes active when price drops to the barrier.
    DownIn,
    /// Up-and-in: becomes active when price rises to the barrier.
    UpIn,
    /// Down-and-out: expires when price drops to the barrier.
    DownOut,
    /// Up-and-out: expires when price rises to the barrier.
    UpOut,
}

impl BarrierType {
    /// `true` if the barrier sits below the spot.
    pub fn is_down(self) -> bool {
        matches!(self, BarrierType::DownIn | BarrierType::DownOut)
    }

    /// `true` for knock-out barriers.
    pub fn is_knock_out(self) -> bool {
        matches!(self, BarrierType::DownOut | BarrierType::UpOut)
    }

    /// The knock-out barrier on the same side (identity for knock-outs).
    ///
    /// A knock-in option is worth the vanilla minus this knock-out.
    pub fn knock_out_counterpart(self) -> BarrierType {
        match self {
            BarrierType::DownIn | BarrierType::DownOut => BarrierType::DownOut,
            BarrierType::UpIn | BarrierType::UpOut => BarrierType::UpOut,
        }
    }
}

impl fmt::Display for BarrierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BarrierType::DownIn => "down-and-in",
            BarrierType::UpIn => "up-and-in",
            BarrierType::DownOut => "down-and-out",
            BarrierType::UpOut => "up-and-out",
        };
        f.write_str(s)
    }
}

impl FromStr for BarrierType {
    type Err = qq_core::Error;

    fn from_str(s: &str) -> qq_core::Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "down-in" | "down-and-in" => Ok(BarrierType::DownIn),
            "up-in" | "up-and-in" => Ok(BarrierType::UpIn),
            "down-out" | "down-and-out" => Ok(BarrierType::DownOut),
            "up-out" | "up-and-out" => Ok(BarrierType::UpOut),
            other => Err(qq_core::Error::InvalidParameter(format!(
                "unknown barrier type '{other}'"
            ))),
        }
    }
}

/// A barrier feature attached to an option.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Barrier {
    /// Barrier type.
    pub barrier_type: BarrierType,
    /// Barrier level.
    pub level: Real,
}

impl Barrier {
    /// Create a barrier. Validation happens when it is attached to an
    /// [`Instrument`](crate::Instrument).
    pub fn new(barrier_type: BarrierType, level: Real) -> Self {
        Self {
            barrier_type,
            level,
        }
    }

    /// `true` if an underlying price `s` is at or beyond the barrier.
    #[inline]
    pub fn is_breached(&self, s: Real) -> bool {
        if self.barrier_type.is_down() {
            s <= self.level
        } else {
            s >= self.level
        }
    }

    /// Same level, knock-out type on the same side.
    pub fn knock_out_counterpart(&self) -> Barrier {
        Barrier::new(self.barrier_type.knock_out_counterpart(), self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breach_detection() {
        let down = Barrier::new(BarrierType::DownOut, 90.0);
        assert!(down.is_breached(90.0));
        assert!(down.is_breached(80.0));
        assert!(!down.is_breached(95.0));

        let up = Barrier::new(BarrierType::UpIn, 110.0);
        assert!(up.is_breached(110.0));
        assert!(!up.is_breached(100.0));
    }

    #[test]
    fn counterparts() {
        assert_eq!(
            BarrierType::DownIn.knock_out_counterpart(),
            BarrierType::DownOut
        );
        assert_eq!(BarrierType::UpIn.knock_out_counterpart(), BarrierType::UpOut);
        assert_eq!(BarrierType::UpOut.knock_out_counterpart(), BarrierType::UpOut);
        assert!(BarrierType::DownOut.is_knock_out());
        assert!(!BarrierType::UpIn.is_knock_out());
    }

    #[test]
    fn parse_barrier_type() {
        assert_eq!(
            "down_and_out".parse::<BarrierType>().unwrap(),
            BarrierType::DownOut
        );
        assert_eq!("up-in".parse::<BarrierType>().unwrap(), BarrierType::UpIn);
        assert!("sideways".parse::<BarrierType>().is_err());
    }
}
