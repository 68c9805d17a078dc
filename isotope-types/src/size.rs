//! Byte counts with a lossless human-readable text form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Units used when formatting a [`ByteSize`], largest first.
///
/// Formatting picks the first unit that divides the value exactly, so parsing the output yields
/// the same number of bytes.
const UNITS: &[(&str, u64)] = &[
    ("TiB", 1 << 40),
    ("TB", 1_000_000_000_000),
    ("GiB", 1 << 30),
    ("GB", 1_000_000_000),
    ("MiB", 1 << 20),
    ("MB", 1_000_000),
    ("KiB", 1 << 10),
    ("KB", 1_000),
];

/// A number of bytes, such as the payload of a request or response.
///
/// The text form is an integer followed by a unit, e.g. `10KB` (10,000 bytes) or `4KiB` (4,096
/// bytes). Values that do not divide into a unit evenly are written in bytes, e.g. `1536B`.
///
/// Parsing also accepts fractional numbers as long as they amount to a whole number of bytes, so
/// `1.5KB` is 1,500 bytes but `0.5B` is rejected.
///
/// # Examples
///
/// ```
/// use isotope_types::ByteSize;
///
/// let size: ByteSize = "10KB".parse().unwrap();
/// assert_eq!(size.as_u64(), 10_000);
/// assert_eq!(size.to_string(), "10KB");
///
/// assert!("-1KB".parse::<ByteSize>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(u64);

impl ByteSize {
    /// A size of zero bytes.
    pub const ZERO: Self = Self(0);

    /// Creates a size from a raw number of bytes.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Returns the number of bytes.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 != 0 {
            for (unit, multiple) in UNITS {
                if self.0 % multiple == 0 {
                    return write!(f, "{}{unit}", self.0 / multiple);
                }
            }
        }

        write!(f, "{}B", self.0)
    }
}

/// Error returned when a [`ByteSize`] literal cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid size literal {input:?}: {reason}")]
pub struct ParseSizeError {
    input: String,
    reason: String,
}

impl ParseSizeError {
    fn new(input: &str, reason: impl fmt::Display) -> Self {
        Self {
            input: input.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// The literal that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl FromStr for ByteSize {
    type Err = ParseSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseSizeError::new(s, "empty literal"));
        }
        if trimmed.starts_with('-') {
            return Err(ParseSizeError::new(s, "size must not be negative"));
        }
        if !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(ParseSizeError::new(s, "expected a leading number"));
        }

        let number_len = trimmed
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(trimmed.len());
        let (number, suffix) = trimmed.split_at(number_len);

        // Only the unit grammar is delegated, the number is scaled exactly.
        let unit = format!("1{}", suffix.trim_start())
            .parse::<bytesize::ByteSize>()
            .map_err(|reason| ParseSizeError::new(s, reason))?;

        exact_bytes(number, unit.as_u64())
            .map(Self)
            .map_err(|reason| ParseSizeError::new(s, reason))
    }
}

/// Multiplies the decimal `number` by `unit`, requiring a whole number of bytes that fits `u64`.
fn exact_bytes(number: &str, unit: u64) -> Result<u64, &'static str> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if fraction.contains('.') {
        return Err("malformed number");
    }

    let too_large = "size does not fit into 64 bits";
    let scale = u32::try_from(fraction.len())
        .ok()
        .and_then(|digits| 10u128.checked_pow(digits))
        .ok_or(too_large)?;
    let mantissa: u128 = format!("{whole}{fraction}")
        .parse()
        .map_err(|_| too_large)?;
    let scaled = mantissa.checked_mul(u128::from(unit)).ok_or(too_large)?;

    if scaled % scale != 0 {
        return Err("size is not a whole number of bytes");
    }
    u64::try_from(scaled / scale).map_err(|_| too_large)
}

impl Serialize for ByteSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

struct ByteSizeVisitor;

impl<'de> de::Visitor<'de> for ByteSizeVisitor {
    type Value = ByteSize;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a byte count or a size literal such as `10KB`")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ByteSize(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u64::try_from(v)
            .map(ByteSize)
            .map_err(|_| E::custom(format_args!("size must not be negative, got {v}")))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ByteSizeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_binary_units() {
        assert_eq!("10KB".parse::<ByteSize>().unwrap().as_u64(), 10_000);
        assert_eq!("1KiB".parse::<ByteSize>().unwrap().as_u64(), 1024);
        assert_eq!("2 MB".parse::<ByteSize>().unwrap().as_u64(), 2_000_000);
        assert_eq!("1536".parse::<ByteSize>().unwrap().as_u64(), 1536);
        assert_eq!("0B".parse::<ByteSize>().unwrap(), ByteSize::ZERO);
        assert_eq!("1.5KB".parse::<ByteSize>().unwrap().as_u64(), 1500);
        assert_eq!("0.5KiB".parse::<ByteSize>().unwrap().as_u64(), 512);
        assert_eq!(
            "18446744073709551615".parse::<ByteSize>().unwrap().as_u64(),
            u64::MAX
        );
    }

    #[test]
    fn formats_with_exact_unit() {
        assert_eq!(ByteSize::from_bytes(0).to_string(), "0B");
        assert_eq!(ByteSize::from_bytes(10_000).to_string(), "10KB");
        assert_eq!(ByteSize::from_bytes(100_000).to_string(), "100KB");
        assert_eq!(ByteSize::from_bytes(4096).to_string(), "4KiB");
        assert_eq!(ByteSize::from_bytes(1536).to_string(), "1536B");
        assert_eq!(ByteSize::from_bytes(3 << 30).to_string(), "3GiB");
    }

    #[test]
    fn text_form_is_lossless() {
        for bytes in [0, 1, 999, 1000, 1024, 1536, 10_000, 1_048_576, 123_456_789] {
            let size = ByteSize::from_bytes(bytes);
            let parsed: ByteSize = size.to_string().parse().unwrap();
            assert_eq!(parsed, size, "{size}");
        }
    }

    #[test]
    fn rejects_malformed_literals() {
        for literal in [
            "",
            "  ",
            "-1KB",
            "ten",
            "KB",
            "10XB",
            "0.5B",
            "1.0005KB",
            "1.2.3KB",
            "18446744073709551616B",
            "20000000TB",
        ] {
            let err = literal.parse::<ByteSize>().unwrap_err();
            assert_eq!(err.input(), literal);
        }
    }

    #[test]
    fn deserializes_strings_and_integers() {
        let sizes: Vec<ByteSize> = serde_json::from_str(r#"["10KB", 42]"#).unwrap();
        assert_eq!(sizes, [ByteSize::from_bytes(10_000), ByteSize::from_bytes(42)]);

        assert!(serde_json::from_str::<ByteSize>("-5").is_err());
        assert!(serde_json::from_str::<ByteSize>(r#""abc""#).is_err());
        assert_eq!(
            serde_json::to_string(&ByteSize::from_bytes(10_000)).unwrap(),
            r#""10KB""#
        );
    }
}
