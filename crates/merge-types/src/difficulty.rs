//! Proof-of-work difficulty and total difficulty.
//!
//! Total difficulty grows without bound along a chain, so values are kept as
//! arbitrary-precision unsigned integers. Addition never overflows.

use num_bigint::BigUint;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;

/// Errors returned when parsing a [`Difficulty`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDifficultyError {
    /// The input was empty.
    #[error("empty difficulty string")]
    Empty,

    /// The input was not a decimal or `0x`-prefixed hex integer.
    #[error("invalid difficulty: {0}")]
    Invalid(String),
}

/// A non-negative, arbitrary-precision difficulty value.
///
/// Used both for the per-block proof-of-work difficulty and for the
/// cumulative total difficulty of a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(BigUint);

impl Difficulty {
    /// Returns a zero difficulty.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns true if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    /// Returns the underlying integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Returns the `0x`-prefixed lowercase hex representation.
    pub fn to_hex_string(&self) -> String {
        format!("{:#x}", self.0)
    }
}

impl From<u64> for Difficulty {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Difficulty {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Difficulty {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl Add for Difficulty {
    type Output = Difficulty;

    fn add(self, rhs: Difficulty) -> Difficulty {
        Difficulty(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Difficulty> for &'a Difficulty {
    type Output = Difficulty;

    fn add(self, rhs: &'a Difficulty) -> Difficulty {
        Difficulty(&self.0 + &rhs.0)
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    /// Parses a decimal string, or a hex string with a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseDifficultyError::Empty);
        }

        let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => (hex, 16),
            None => (s, 10),
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(ParseDifficultyError::Invalid(s.to_string()));
        }

        BigUint::parse_bytes(digits.as_bytes(), radix)
            .map(Self)
            .ok_or_else(|| ParseDifficultyError::Invalid(s.to_string()))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DifficultyVisitor)
    }
}

struct DifficultyVisitor;

impl Visitor<'_> for DifficultyVisitor {
    type Value = Difficulty;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal/0x-hex string")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Difficulty, E> {
        Ok(Difficulty::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Difficulty, E> {
        u64::try_from(value)
            .map(Difficulty::from)
            .map_err(|_| E::custom(format!("negative difficulty: {value}")))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<Difficulty, E> {
        Ok(Difficulty::from(value))
    }

    fn visit_i128<E: de::Error>(self, value: i128) -> Result<Difficulty, E> {
        u128::try_from(value)
            .map(Difficulty::from)
            .map_err(|_| E::custom(format!("negative difficulty: {value}")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Difficulty, E> {
        value.parse().map_err(E::custom)
    }
}
