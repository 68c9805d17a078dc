//! Protocols a mock service can speak.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// The protocol of a mock service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ServiceType {
    /// Plain HTTP/1.1 (`"HTTP"`).
    #[default]
    Http,
    /// gRPC over HTTP/2 (`"gRPC"`).
    Grpc,
}

impl ServiceType {
    /// All known protocol tags, in a stable order.
    pub const ALL: [ServiceType; 2] = [ServiceType::Http, ServiceType::Grpc];

    /// Returns the canonical tag used in service graph documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::Http => "HTTP",
            ServiceType::Grpc => "gRPC",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unknown protocol tag.
#[derive(Debug, thiserror::Error)]
#[error(r#"unknown service type {0:?}: expected one of "HTTP", "gRPC""#)]
pub struct ParseServiceTypeError(String);

impl FromStr for ServiceType {
    type Err = ParseServiceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            s if s.eq_ignore_ascii_case("http") => Ok(ServiceType::Http),
            s if s.eq_ignore_ascii_case("grpc") => Ok(ServiceType::Grpc),
            s => Err(ParseServiceTypeError(s.to_owned())),
        }
    }
}

impl Serialize for ServiceType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceType {
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
    fn parses_tags_case_insensitively() {
        assert_eq!("HTTP".parse::<ServiceType>().unwrap(), ServiceType::Http);
        assert_eq!("http".parse::<ServiceType>().unwrap(), ServiceType::Http);
        assert_eq!("gRPC".parse::<ServiceType>().unwrap(), ServiceType::Grpc);
        assert!("tcp".parse::<ServiceType>().is_err());
    }

    #[test]
    fn serializes_canonical_tag() {
        assert_eq!(serde_json::to_string(&ServiceType::Grpc).unwrap(), r#""gRPC""#);
        let ty: ServiceType = serde_json::from_str(r#""GRPC""#).unwrap();
        assert_eq!(ty, ServiceType::Grpc);
    }
}
