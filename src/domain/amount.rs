//! Integer amount type backed by a 256-bit unsigned integer.
//!
//! All engine arithmetic is floor division over non-negative integers;
//! amounts serialize as decimal strings.

use ethnum::U256;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Basis-point denominator used for every fee split.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Unsigned 256-bit amount for balances, rates, and accumulated ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(U256);

impl Amount {
    /// The additive identity (0).
    pub const ZERO: Amount = Amount(U256::ZERO);

    /// Create an Amount from a raw U256.
    pub fn new(value: U256) -> Self {
        Amount(value)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0 == U256::ZERO
    }

    /// Subtraction returning None on underflow.
    pub fn checked_sub(&self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Multiply by a swap count.
    pub fn times(&self, n: u64) -> Amount {
        Amount(self.0 * U256::new(n as u128))
    }

    /// `10^exp`, the per-token price scaling factor.
    pub fn pow10(exp: u32) -> Amount {
        Amount(U256::new(10).pow(exp))
    }

    /// Split off `bps` basis points: returns `(self - cut, cut)` where
    /// `cut = self * bps / 10_000`, floor division.
    pub fn split_bps(&self, bps: u16) -> (Amount, Amount) {
        let cut = self.0 * U256::new(bps as u128) / U256::new(BPS_DENOMINATOR as u128);
        (Amount(self.0 - cut), Amount(cut))
    }

    /// Get the underlying U256.
    pub fn inner(&self) -> U256 {
        self.0
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(U256::new(value as u128))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount(U256::new(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error parsing an Amount from a decimal string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountParseError;

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "amount must be a non-negative decimal integer")
    }
}

impl std::error::Error for AmountParseError {}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError);
        }
        U256::from_str_radix(s, 10)
            .map(Amount)
            .map_err(|_| AmountParseError)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(DeError::custom)
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl std::ops::Mul for Amount {
    type Output = Amount;

    fn mul(self, rhs: Amount) -> Amount {
        Amount(self.0 * rhs.0)
    }
}

impl std::ops::Div for Amount {
    type Output = Amount;

    /// Floor division; the divisor must be non-zero.
    fn div(self, rhs: Amount) -> Amount {
        Amount(self.0 / rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(v: u64) -> Amount {
        Amount::from(v)
    }

    #[test]
    fn test_amount_parse_roundtrip() {
        for s in ["0", "1", "1000", "340282366920938463463374607431768211456"] {
            let amount = Amount::from_str(s).expect("parse failed");
            assert_eq!(amount.to_string(), s, "roundtrip failed for {}", s);
        }
    }

    #[test]
    fn test_amount_parse_rejects_non_digits() {
        assert!(Amount::from_str("").is_err());
        assert!(Amount::from_str("-1").is_err());
        assert!(Amount::from_str("1.5").is_err());
        assert!(Amount::from_str("0x10").is_err());
    }

    #[test]
    fn test_amount_floor_division() {
        assert_eq!(a(1000) / a(3), a(333));
        assert_eq!(a(5) / a(2), a(2));
    }

    #[test]
    fn test_amount_checked_sub() {
        assert_eq!(a(5).checked_sub(a(3)), Some(a(2)));
        assert_eq!(a(3).checked_sub(a(5)), None);
    }

    #[test]
    fn test_split_bps() {
        // 2% of 10_000 is 200.
        assert_eq!(a(10_000).split_bps(200), (a(9_800), a(200)));
        assert_eq!(a(10_000).split_bps(0), (a(10_000), a(0)));
        assert_eq!(a(10_000).split_bps(10_000), (a(0), a(10_000)));
        // Floor on the cut: 0.6% of 999 truncates.
        assert_eq!(a(999).split_bps(60), (a(994), a(5)));
    }

    #[test]
    fn test_pow10() {
        assert_eq!(Amount::pow10(0), a(1));
        assert_eq!(Amount::pow10(18), Amount::from(1_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_times() {
        assert_eq!(a(200).times(5), a(1000));
        assert_eq!(a(200).times(0), Amount::ZERO);
    }

    #[test]
    fn test_amount_json_serializes_as_string() {
        let json = serde_json::to_value(a(123)).unwrap();
        assert_eq!(json, serde_json::json!("123"));
        let back: Amount = serde_json::from_value(json).unwrap();
        assert_eq!(back, a(123));
    }
}
