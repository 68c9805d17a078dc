//! Percentages such as error rates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A percentage between `0%` and `100%`, inclusive.
///
/// The text form is a decimal number followed by `%`, e.g. `0.5%`. The stored value is the number
/// in front of the `%` sign, so `"50%"` has a [`value`](Self::value) of `50.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Percentage {
    /// `0%`.
    pub const ZERO: Self = Self(0.0);

    /// Creates a percentage, checking that it lies in `[0, 100]`.
    pub fn new(value: f64) -> Result<Self, ParsePercentageError> {
        if !(0.0..=100.0).contains(&value) {
            return Err(ParsePercentageError::OutOfRange(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Returns the percentage in the range `[0, 100]`.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns the percentage as a probability in the range `[0, 1]`.
    pub fn as_fraction(self) -> f64 {
        self.0 / 100.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Error returned when a [`Percentage`] literal cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ParsePercentageError {
    /// The literal does not end in `%`.
    #[error("percentage {0:?} must end with '%'")]
    MissingSuffix(String),
    /// The part before `%` is not a number.
    #[error("percentage {0:?} is not a number")]
    NotANumber(String),
    /// The number lies outside of `[0, 100]`.
    #[error("percentage {0:?} is outside of 0% to 100%")]
    OutOfRange(String),
}

impl FromStr for Percentage {
    type Err = ParsePercentageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(number) = s.trim().strip_suffix('%') else {
            return Err(ParsePercentageError::MissingSuffix(s.to_owned()));
        };

        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| ParsePercentageError::NotANumber(s.to_owned()))?;

        // NaN fails the range check as well.
        if !(0.0..=100.0).contains(&value) {
            return Err(ParsePercentageError::OutOfRange(s.to_owned()));
        }

        Ok(Self(value))
    }
}

impl Serialize for Percentage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_percent_literals() {
        assert_eq!("0%".parse::<Percentage>().unwrap(), Percentage::ZERO);
        assert_eq!("12.5%".parse::<Percentage>().unwrap().value(), 12.5);
        assert_eq!("100%".parse::<Percentage>().unwrap().as_fraction(), 1.0);
        assert_eq!(" 1 %".parse::<Percentage>().unwrap().value(), 1.0);
    }

    #[test]
    fn rejects_malformed_literals() {
        assert!(matches!(
            "5".parse::<Percentage>(),
            Err(ParsePercentageError::MissingSuffix(_))
        ));
        assert!(matches!(
            "five%".parse::<Percentage>(),
            Err(ParsePercentageError::NotANumber(_))
        ));
        assert!(matches!(
            "100.1%".parse::<Percentage>(),
            Err(ParsePercentageError::OutOfRange(_))
        ));
        assert!(matches!(
            "-1%".parse::<Percentage>(),
            Err(ParsePercentageError::OutOfRange(_))
        ));
        assert!(matches!(
            "NaN%".parse::<Percentage>(),
            Err(ParsePercentageError::OutOfRange(_))
        ));
    }

    #[test]
    fn display_round_trips() {
        for value in [0.0, 0.01, 1.0, 33.3, 100.0] {
            let pct = Percentage::new(value).unwrap();
            assert_eq!(pct.to_string().parse::<Percentage>().unwrap(), pct);
        }
        assert_eq!(Percentage::new(1.5).unwrap().to_string(), "1.5%");
    }

    #[test]
    fn serializes_as_string() {
        let pct: Percentage = serde_json::from_str(r#""2%""#).unwrap();
        assert_eq!(pct.value(), 2.0);
        assert_eq!(serde_json::to_string(&pct).unwrap(), r#""2%""#);
        assert!(serde_json::from_str::<Percentage>("2").is_err());
    }
}
