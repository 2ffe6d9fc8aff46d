//! Integer identifiers for stored records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Error returned when parsing an invalid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid id {input:?}: must be a non-negative integer")]
pub struct InvalidId {
    input: String,
}

/// Wire form of an id. Older clients send ids as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

fn parse_id(s: &str) -> Result<u64, InvalidId> {
    s.trim().parse().map_err(|_| InvalidId {
        input: s.to_string(),
    })
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw id.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw integer value.
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Parse an id from its decimal representation.
            pub fn parse(s: &str) -> Result<Self, InvalidId> {
                parse_id(s).map(Self)
            }
        }

        impl FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match RawId::deserialize(deserializer)? {
                    RawId::Number(n) => Ok(Self(n)),
                    RawId::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
                }
            }
        }
    };
}

record_id!(
    /// Identifier of a stored location.
    LocationId
);

record_id!(
    /// Identifier of a stored trip.
    TripId
);

record_id!(
    /// Identifier of a progress snapshot returned by a ride request.
    ProgressId
);
