use anyhow::{ensure, Error};
use derive_more::{Add, AddAssign, Sub, SubAssign};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// Finite floating point value, the payload of all analog signals.
#[derive(
    Clone, Copy, PartialEq, PartialOrd, Add, AddAssign, Sub, SubAssign, Debug, Serialize, Deserialize,
)]
#[serde(try_from = "RealSerde")]
#[serde(into = "RealSerde")]
pub struct Real(f64);
impl Real {
    pub const fn zero() -> Self {
        Self(0.0)
    }

    pub fn from_f64(value: f64) -> Result<Self, Error> {
        ensure!(value.is_finite(), "value must be finite, got {value}");
        Ok(Self(value))
    }
    pub fn to_f64(&self) -> f64 {
        self.0
    }
}
impl From<u32> for Real {
    fn from(value: u32) -> Self {
        Self(value as f64)
    }
}
impl Eq for Real {}
#[allow(clippy::derive_ord_xor_partial_ord)]
impl Ord for Real {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}
impl fmt::Display for Real {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
struct RealSerde(f64);
impl TryFrom<RealSerde> for Real {
    type Error = Error;

    fn try_from(value: RealSerde) -> Result<Self, Self::Error> {
        Self::from_f64(value.0)
    }
}
impl From<Real> for RealSerde {
    fn from(value: Real) -> Self {
        Self(value.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::Real;

    #[test]
    fn from_f64_rejects_non_finite() {
        assert!(Real::from_f64(f64::NAN).is_err());
        assert!(Real::from_f64(f64::INFINITY).is_err());
        assert!(Real::from_f64(12.5).is_ok());
    }

    #[test]
    fn deserialize() {
        let value: Real = serde_json::from_str("230.0").unwrap();
        assert_eq!(value, Real::from_f64(230.0).unwrap());

        assert!(serde_json::from_str::<Real>("null").is_err());
    }
}
