//! One-time bulk registration of the oracle account pool.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info, warn};

use crate::chain::FlightSuretyGateway;
use crate::models::{Address, OracleIdentity};
use crate::registry::OracleRegistry;

pub struct OracleRegistrar {
    gateway: Arc<dyn FlightSuretyGateway>,
    registry: Arc<OracleRegistry>,
}

impl OracleRegistrar {
    pub fn new(gateway: Arc<dyn FlightSuretyGateway>, registry: Arc<OracleRegistry>) -> Self {
        Self { gateway, registry }
    }

    /// Register every account in the pool, best effort.
    ///
    /// Accounts are registered concurrently; within one account the
    /// registration transaction strictly precedes the index fetch. A failure
    /// at either step skips that account without retrying and without
    /// touching its siblings. Returns the number of oracles added.
    pub async fn register_all(&self, accounts: &[Address]) -> usize {
        let outcomes = join_all(
            accounts
                .iter()
                .copied()
                .map(|account| self.register_one(account)),
        )
        .await;

        let registered = outcomes.into_iter().filter(|added| *added).count();
        info!(
            registered,
            attempted = accounts.len(),
            "oracle registration pass complete"
        );
        registered
    }

    async fn register_one(&self, account: Address) -> bool {
        if let Err(err) = self.gateway.register_oracle(account).await {
            warn!(account = %account, error = %err, "oracle registration failed, skipping account");
            return false;
        }

        // An index fetch failure counts as a registration failure: the
        // identity never enters the registry without its indexes.
        let indexes = match self.gateway.my_indexes(account).await {
            Ok(indexes) => indexes,
            Err(err) => {
                warn!(account = %account, error = %err, "index fetch failed after registration, skipping account");
                return false;
            }
        };

        let added = self.registry.add(OracleIdentity { account, indexes }).await;
        if added {
            info!(account = %account, ?indexes, "registered oracle");
        } else {
            warn!(account = %account, "account already registered, ignoring duplicate");
        }
        added
    }
}
