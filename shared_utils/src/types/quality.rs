//! JPG Quality Type-Safe Wrapper
//!
//! 创建时验证 1..=100，之后无需重复检查。

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// QualityError
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityError {
    pub value: i64,
}

impl fmt::Display for QualityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "quality {} out of range [{}, {}]",
            self.value,
            Quality::MIN,
            Quality::MAX
        )
    }
}

impl std::error::Error for QualityError {}

// ============================================================================
// Quality Newtype
// ============================================================================

/// Lossy encoder quality, always within `[Quality::MIN, Quality::MAX]`.
///
/// # Examples
/// ```
/// use shared_utils::types::Quality;
///
/// assert_eq!(Quality::new(90).unwrap().value(), 90);
/// assert_eq!(Quality::default().value(), 95);
/// assert!(Quality::new(0).is_err());
/// assert!(Quality::new(101).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;
    pub const DEFAULT: u8 = 95;

    pub fn new(value: impl Into<i64>) -> Result<Self, QualityError> {
        let value = value.into();
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(QualityError { value });
        }
        Ok(Self(value as u8))
    }

    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<i64> for Quality {
    type Error = QualityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

impl fmt::Debug for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quality({})", self.0)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(Quality::new(1).unwrap().value(), 1);
        assert_eq!(Quality::new(100).unwrap().value(), 100);
        assert_eq!(Quality::new(0).unwrap_err(), QualityError { value: 0 });
        assert!(Quality::new(101).is_err());
        assert!(Quality::new(-5).is_err());
    }

    #[test]
    fn test_error_message() {
        let err = Quality::new(150).unwrap_err();
        assert_eq!(err.to_string(), "quality 150 out of range [1, 100]");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_accepts_exactly_the_valid_range(value in -1000i64..1000) {
            let result = Quality::new(value);
            prop_assert_eq!(result.is_ok(), (1..=100).contains(&value));
            if let Ok(q) = result {
                prop_assert_eq!(i64::from(q.value()), value);
            }
        }
    }
}
