use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;

/// Progressive-disclosure tier selected by the user.
///
/// Higher levels reveal more tabs. The gallery ships three tiers, but any
/// `u8` is representable so that persisted values from newer builds still
/// decode.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiLevel(pub u8);

impl UiLevel {
    /// Entry tier shown on first launch.
    pub const BASIC: Self = Self(1);
    /// Middle tier.
    pub const INTERMEDIATE: Self = Self(2);
    /// Everything unlocked.
    pub const ADVANCED: Self = Self(3);

    /// Tiers accepted from user input.
    pub const SELECTABLE: [Self; 3] = [Self::BASIC, Self::INTERMEDIATE, Self::ADVANCED];

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns true when the level is one of [`Self::SELECTABLE`].
    #[must_use]
    pub const fn is_selectable(self) -> bool {
        self.0 >= Self::BASIC.0 && self.0 <= Self::ADVANCED.0
    }
}

impl Default for UiLevel {
    fn default() -> Self {
        Self::BASIC
    }
}

impl fmt::Display for UiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error returned when parsing a user-facing level string.
#[derive(Debug, Error)]
pub enum ParseLevelError {
    /// Input was not an integer.
    #[error("invalid ui level: {0}")]
    NotANumber(#[from] ParseIntError),
    /// Input was an integer outside the selectable range.
    #[error("ui level {0} is out of range (expected 1..=3)")]
    OutOfRange(u8),
}

impl FromStr for UiLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = Self(s.trim().parse()?);
        if level.is_selectable() {
            Ok(level)
        } else {
            Err(ParseLevelError::OutOfRange(level.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selectable_levels() -> anyhow::Result<()> {
        assert_eq!("1".parse::<UiLevel>()?, UiLevel::BASIC);
        assert_eq!(" 3 ".parse::<UiLevel>()?, UiLevel::ADVANCED);
        Ok(())
    }

    #[test]
    fn rejects_levels_outside_range() {
        let Err(err) = "4".parse::<UiLevel>() else {
            panic!("level 4 should be rejected");
        };
        assert!(matches!(err, ParseLevelError::OutOfRange(4)));
        assert!("zero".parse::<UiLevel>().is_err());
        assert!("0".parse::<UiLevel>().is_err());
    }

    #[test]
    fn serializes_as_plain_integer() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&UiLevel::INTERMEDIATE)?, "2");
        let level: UiLevel = serde_json::from_str("7")?;
        assert_eq!(level.get(), 7);
        assert!(!level.is_selectable());
        Ok(())
    }
}
