//! Customer identity: registered account or locally minted guest token.

use common::AccountId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// The "who" of an order.
///
/// Orders placed through the authenticated path carry a canonical account
/// identifier; anonymous checkouts carry a locally minted guest token. Both
/// are persisted in a single string field, so the variant is re-derived from
/// the stored value's shape: exactly 24 hexadecimal characters means a
/// registered account, anything else is a guest token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CustomerRef {
    /// A registered customer account, resolvable against the account store.
    Registered(AccountId),

    /// An anonymous purchaser. The token is unique enough for ledger
    /// purposes but never resolves to an account record.
    Guest(String),
}

impl CustomerRef {
    /// Classifies a raw identity value from a checkout request.
    ///
    /// An absent value mints a fresh guest token. A present value is kept
    /// verbatim and tagged by shape alone; whether a matching account record
    /// actually exists is irrelevant here.
    pub fn classify(raw: Option<&str>) -> Self {
        match raw {
            Some(value) => Self::from_stored(value),
            None => Self::Guest(Self::mint_guest_token()),
        }
    }

    /// Re-derives the variant from a stored identity value.
    pub fn from_stored(value: &str) -> Self {
        match AccountId::parse(value) {
            Ok(id) => Self::Registered(id),
            Err(_) => Self::Guest(value.to_string()),
        }
    }

    /// Mints a new guest token.
    pub fn mint_guest_token() -> String {
        format!("guest-{}", Uuid::new_v4())
    }

    /// Returns the single-field storage form of this reference.
    pub fn storage_key(&self) -> &str {
        match self {
            Self::Registered(id) => id.as_str(),
            Self::Guest(token) => token,
        }
    }

    /// Returns the account ID if this is a registered customer.
    pub fn account_id(&self) -> Option<&AccountId> {
        match self {
            Self::Registered(id) => Some(id),
            Self::Guest(_) => None,
        }
    }

    /// Returns true for guest references.
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }
}

impl std::fmt::Display for CustomerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

// Stored as a bare string so ledger rows keep one identity column.
impl Serialize for CustomerRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.storage_key())
    }
}

impl<'de> Deserialize<'de> for CustomerRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_stored(&value))
    }
}
