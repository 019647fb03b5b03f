//! Integer-first percentages and merit scores.
//!
//! Values are stored in hundredths (`87.25` → `8725`) so sorting and equality
//! never depend on float rounding. JSON carries them as plain numbers.

use core::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CoreError;

/// Hundredths per whole percentage point.
pub const SCALE: u32 = 100;

/// A percentage in [0, 100] with two decimal places.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(u32);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const MAX: Percentage = Percentage(100 * SCALE);

    pub fn from_hundredths(h: u32) -> Result<Self, CoreError> {
        if h <= Self::MAX.0 {
            Ok(Self(h))
        } else {
            Err(CoreError::DomainOutOfRange("percentage"))
        }
    }

    /// Whole points, e.g. `from_points(5)` == 5.00.
    pub fn from_points(p: u32) -> Result<Self, CoreError> {
        p.checked_mul(SCALE)
            .ok_or(CoreError::DomainOutOfRange("percentage"))
            .and_then(Self::from_hundredths)
    }

    /// Rounds to the nearest hundredth.
    pub fn from_f64(v: f64) -> Result<Self, CoreError> {
        if !v.is_finite() || !(0.0..=100.0).contains(&v) {
            return Err(CoreError::DomainOutOfRange("percentage"));
        }
        Self::from_hundredths((v * SCALE as f64).round() as u32)
    }

    #[inline]
    pub fn hundredths(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / SCALE, self.0 % SCALE)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = f64::deserialize(d)?;
        Percentage::from_f64(v).map_err(|e| D::Error::custom(format!("{e} ({v})")))
    }
}

/// Base percentage plus category bonus. May exceed 100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeritScore(u32);

impl MeritScore {
    #[inline]
    pub fn new(base: Percentage, bonus: Percentage) -> Self {
        // Both operands are bounded by 100.00, so the sum cannot overflow.
        MeritScore(base.hundredths() + bonus.hundredths())
    }

    #[inline]
    pub fn hundredths(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

impl fmt::Display for MeritScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / SCALE, self.0 % SCALE)
    }
}

impl Serialize for MeritScore {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(self.as_f64())
    }
}
