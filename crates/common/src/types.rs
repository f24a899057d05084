use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for an order.
///
/// Wraps a UUID to provide type safety and prevent mixing up
/// order IDs with other UUID-based identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random order ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an order ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Short human-facing order code: the last 8 hex characters, uppercased.
    pub fn short_code(&self) -> String {
        let hex = self.0.simple().to_string();
        hex[hex.len() - 8..].to_uppercase()
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for OrderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<OrderId> for Uuid {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

/// Error returned when a string is not a canonical account identifier.
#[derive(Debug, Clone, Error)]
#[error("not a canonical account id: {value:?}")]
pub struct InvalidAccountId {
    pub value: String,
}

/// Canonical identifier for a registered customer account.
///
/// Account primary keys are fixed-length 24-character hexadecimal strings.
/// Anything that does not match that shape is, by definition, not an account
/// reference and must be treated as a guest token by callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Parses a canonical account ID, rejecting anything that is not exactly
    /// 24 hexadecimal characters.
    pub fn parse(raw: &str) -> Result<Self, InvalidAccountId> {
        if raw.len() == 24 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidAccountId {
                value: raw.to_string(),
            })
        }
    }

    /// Returns true if the value has the canonical account ID shape.
    pub fn is_canonical(raw: &str) -> bool {
        raw.len() == 24 && raw.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount in integer minor units to avoid floating point issues.
///
/// Ledger amounts are whole VND, so the minor unit is the unit itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a money amount from an integer unit count.
    pub fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the raw amount.
    pub fn amount(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_new_creates_unique_ids() {
        let id1 = OrderId::new();
        let id2 = OrderId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn order_id_serialization_roundtrip() {
        let id = OrderId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn order_id_short_code_is_eight_upper_hex() {
        let code = OrderId::new().short_code();
        assert_eq!(code.len(), 8);
        assert!(code.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(code, code.to_uppercase());
    }

    #[test]
    fn account_id_accepts_24_hex() {
        let id = AccountId::parse("64ac1f0b9d3e2a7c5b8f0e1d").unwrap();
        assert_eq!(id.as_str(), "64ac1f0b9d3e2a7c5b8f0e1d");
        assert!(AccountId::is_canonical("ABCDEFabcdef012345678901"));
    }

    #[test]
    fn account_id_rejects_other_shapes() {
        assert!(AccountId::parse("guest-123").is_err());
        assert!(AccountId::parse("64ac1f0b9d3e2a7c5b8f0e1").is_err()); // 23 chars
        assert!(AccountId::parse("64ac1f0b9d3e2a7c5b8f0e1dd").is_err()); // 25 chars
        assert!(AccountId::parse("64ac1f0b9d3e2a7c5b8f0e1g").is_err()); // non-hex
        assert!(AccountId::parse("").is_err());
    }

    #[test]
    fn account_id_serde_validates() {
        let ok: Result<AccountId, _> = serde_json::from_str("\"64ac1f0b9d3e2a7c5b8f0e1d\"");
        assert!(ok.is_ok());
        let bad: Result<AccountId, _> = serde_json::from_str("\"guest-abc\"");
        assert!(bad.is_err());
    }

    #[test]
    fn money_arithmetic() {
        let a = Money::new(1000);
        let b = Money::new(500);
        assert_eq!((a + b).amount(), 1500);
        assert_eq!((a - b).amount(), 500);
    }

    #[test]
    fn money_sum() {
        let total: Money = [Money::new(100), Money::new(250)].into_iter().sum();
        assert_eq!(total.amount(), 350);
    }

    #[test]
    fn money_positivity() {
        assert!(Money::new(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(!Money::new(-5).is_positive());
    }

    #[test]
    fn money_serializes_as_bare_number() {
        assert_eq!(serde_json::to_string(&Money::new(1500000)).unwrap(), "1500000");
        let m: Money = serde_json::from_str("1500000").unwrap();
        assert_eq!(m.amount(), 1500000);
    }
}
