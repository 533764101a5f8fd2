//! Verbosity to log level mapping.
//!
//! The higher the verbosity, the more gets logged. Anything past the last
//! known level stays at the most verbose one.

use serde::{Deserialize, Serialize};
use tracing::Level;

/// Levels indexed by verbosity ordinal.
pub const VERBOSE_LEVELS: [Level; 3] = [Level::WARN, Level::INFO, Level::DEBUG];

/// Verbosity level for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Verbosity {
    #[default]
    Warning = 0,
    Info = 1,
    Debug = 2,
    Max = 3,
}

impl Verbosity {
    /// Map an ordinal to a verbosity. Values >= 3 are `Max`, negative values
    /// clamp to `Warning`.
    pub fn from_ordinal(ordinal: i64) -> Self {
        match ordinal {
            i64::MIN..=0 => Verbosity::Warning,
            1 => Verbosity::Info,
            2 => Verbosity::Debug,
            _ => Verbosity::Max,
        }
    }

    pub fn ordinal(self) -> i64 {
        self as i64
    }

    /// The tracing level for this verbosity.
    pub fn level(self) -> Level {
        let index = self as usize;
        match VERBOSE_LEVELS.get(index) {
            Some(level) => *level,
            None => VERBOSE_LEVELS[VERBOSE_LEVELS.len() - 1],
        }
    }
}

impl From<i64> for Verbosity {
    fn from(ordinal: i64) -> Self {
        Self::from_ordinal(ordinal)
    }
}

impl From<u8> for Verbosity {
    fn from(count: u8) -> Self {
        Self::from_ordinal(i64::from(count))
    }
}

impl From<Verbosity> for i64 {
    fn from(verbosity: Verbosity) -> Self {
        verbosity.ordinal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_levels() {
        assert_eq!(Verbosity::Warning.level(), Level::WARN);
        assert_eq!(Verbosity::Info.level(), Level::INFO);
        assert_eq!(Verbosity::Debug.level(), Level::DEBUG);
        assert_eq!(Verbosity::Max.level(), Level::DEBUG);
    }

    #[test]
    fn test_high_ordinals_clamp_to_max() {
        for ordinal in [3, 4, 10, i64::MAX] {
            let verbosity = Verbosity::from_ordinal(ordinal);
            assert_eq!(verbosity, Verbosity::Max);
            assert_eq!(verbosity.level(), Verbosity::Max.level());
        }
    }

    #[test]
    fn test_negative_ordinals_clamp_to_warning() {
        assert_eq!(Verbosity::from_ordinal(-1), Verbosity::Warning);
        assert_eq!(Verbosity::from_ordinal(i64::MIN).level(), Level::WARN);
    }

    #[test]
    fn test_ordering() {
        assert!(Verbosity::Debug < Verbosity::Max);
        assert!(Verbosity::Warning < Verbosity::Info);
    }

    #[test]
    fn test_deserialize_from_integer() {
        let verbosity: Verbosity = serde_json::from_str("7").unwrap();
        assert_eq!(verbosity, Verbosity::Max);
    }
}
