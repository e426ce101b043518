//! In-memory registry of the oracles this server controls.
//!
//! Populated once during startup registration, read-only afterwards while the
//! dispatcher resolves eligible oracles per request index.

use tokio::sync::RwLock;

use crate::models::{Address, OracleIdentity};

#[derive(Debug, Default)]
pub struct OracleRegistry {
    oracles: RwLock<Vec<OracleIdentity>>,
}

impl OracleRegistry {
    /// Append an identity, preserving insertion order.
    ///
    /// Returns `false` without modifying the registry when an identity with
    /// the same account is already present. Safe to call from concurrent
    /// registration workers.
    pub async fn add(&self, identity: OracleIdentity) -> bool {
        let mut oracles = self.oracles.write().await;
        if oracles.iter().any(|o| o.account == identity.account) {
            return false;
        }
        oracles.push(identity);
        true
    }

    /// Snapshot of all registered identities in insertion order.
    pub async fn all(&self) -> Vec<OracleIdentity> {
        self.oracles.read().await.clone()
    }

    /// Accounts of every oracle whose index set contains `index`, in
    /// insertion order. An empty result is a valid outcome, not an error.
    pub async fn oracles_for_index(&self, index: u8) -> Vec<Address> {
        self.oracles
            .read()
            .await
            .iter()
            .filter(|o| o.indexes.contains(&index))
            .map(|o| o.account)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.oracles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.oracles.read().await.is_empty()
    }
}
