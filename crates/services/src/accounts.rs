//! Account service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::AccountId;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// A registered customer profile as seen by the order ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: AccountId,
    /// Registered full name; may be empty.
    pub full_name: String,
    /// Login name, always present.
    pub username: String,
    pub email: String,
}

impl AccountProfile {
    /// Best available human-readable name: the full name when set, the
    /// username otherwise.
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

/// Trait for account lookups.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Loads a profile by account ID. `None` when the account is unknown.
    async fn get_profile(&self, id: &AccountId) -> Result<Option<AccountProfile>>;

    /// Total number of registered customer accounts.
    async fn customer_count(&self) -> Result<u64>;

    /// Total number of defined roles.
    async fn role_count(&self) -> Result<u64>;
}

#[derive(Debug, Default)]
struct InMemoryAccountState {
    profiles: HashMap<AccountId, AccountProfile>,
    roles: Vec<String>,
    fail_on_lookup: bool,
}

/// In-memory account store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    state: Arc<RwLock<InMemoryAccountState>>,
}

impl InMemoryAccountStore {
    /// Creates a new in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile.
    pub fn insert(&self, profile: AccountProfile) {
        let mut state = self.state.write().unwrap();
        state.profiles.insert(profile.id.clone(), profile);
    }

    /// Defines a role.
    pub fn add_role(&self, name: &str) {
        self.state.write().unwrap().roles.push(name.to_string());
    }

    /// Configures the store to fail on the next lookup call.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_on_lookup = fail;
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get_profile(&self, id: &AccountId) -> Result<Option<AccountProfile>> {
        let state = self.state.read().unwrap();

        if state.fail_on_lookup {
            return Err(ServiceError::Accounts("Account lookup failed".to_string()));
        }

        Ok(state.profiles.get(id).cloned())
    }

    async fn customer_count(&self) -> Result<u64> {
        Ok(self.state.read().unwrap().profiles.len() as u64)
    }

    async fn role_count(&self) -> Result<u64> {
        Ok(self.state.read().unwrap().roles.len() as u64)
    }
}
