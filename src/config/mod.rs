//! Server configuration, read from the environment at startup.

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::models::Address;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// HTTP endpoint of the Ethereum node.
    pub rpc_url: String,
    /// FlightSurety app contract (registration, responses, events).
    pub app_contract_address: Address,
    /// FlightSurety data contract (caller authorization).
    pub data_contract_address: Address,
    /// Node accounts below this offset are reserved for other roles.
    pub oracle_account_offset: usize,
    pub oracle_count: usize,
    /// Stake attached to each `registerOracle()` transaction.
    pub registration_stake_wei: u128,
    pub registration_gas: u64,
    pub call_gas: u64,
    pub submit_gas: u64,
    /// First block the dispatcher scans for `OracleRequest` events.
    pub events_from_block: u64,
    pub poll_interval_secs: u64,
    pub rpc_timeout_secs: u64,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let app_contract_address = env::var("APP_CONTRACT_ADDRESS")
            .context("APP_CONTRACT_ADDRESS is not set")?
            .parse()
            .context("APP_CONTRACT_ADDRESS is not a valid address")?;
        let data_contract_address = env::var("DATA_CONTRACT_ADDRESS")
            .context("DATA_CONTRACT_ADDRESS is not set")?
            .parse()
            .context("DATA_CONTRACT_ADDRESS is not a valid address")?;

        Ok(Self {
            rpc_url: env::var("ETH_RPC_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8545".to_string()),
            app_contract_address,
            data_contract_address,
            oracle_account_offset: env_or("ORACLE_ACCOUNT_OFFSET", 20),
            oracle_count: env_or("ORACLE_COUNT", 20),
            // 1 ether, the stake the app contract requires.
            registration_stake_wei: env_or("ORACLE_STAKE_WEI", 1_000_000_000_000_000_000),
            registration_gas: env_or("REGISTRATION_GAS", 1_000_000),
            call_gas: env_or("CALL_GAS", 100_000),
            submit_gas: env_or("SUBMIT_GAS", 100_000),
            events_from_block: env_or("ORACLE_EVENTS_FROM_BLOCK", 0),
            poll_interval_secs: env_or("EVENT_POLL_INTERVAL_SECONDS", 5),
            rpc_timeout_secs: env_or("RPC_TIMEOUT_SECONDS", 30),
            port: env_or("PORT", 3000),
        })
    }

    /// Slice of the node account pool this server registers as oracles.
    pub fn oracle_accounts(&self, accounts: &[Address]) -> Vec<Address> {
        accounts
            .iter()
            .skip(self.oracle_account_offset)
            .take(self.oracle_count)
            .copied()
            .collect()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_defaults() -> ServerConfig {
        ServerConfig {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            app_contract_address: Address::default(),
            data_contract_address: Address::default(),
            oracle_account_offset: 20,
            oracle_count: 20,
            registration_stake_wei: 1_000_000_000_000_000_000,
            registration_gas: 1_000_000,
            call_gas: 100_000,
            submit_gas: 100_000,
            events_from_block: 0,
            poll_interval_secs: 5,
            rpc_timeout_secs: 30,
            port: 3000,
        }
    }

    #[test]
    fn from_env_requires_contract_addresses() {
        // No contract addresses in the test environment.
        assert!(ServerConfig::from_env().is_err());
    }

    #[test]
    fn env_or_falls_back_on_missing_or_bad_values() {
        assert_eq!(env_or("FLIGHTSURETY_UNSET_TEST_KEY", 7u64), 7);
    }

    #[test]
    fn oracle_accounts_skips_reserved_slots() {
        let config = ServerConfig {
            oracle_account_offset: 2,
            oracle_count: 3,
            ..config_with_defaults()
        };

        let pool: Vec<Address> = (0u8..7).map(|i| Address::new([i; 20])).collect();
        let oracles = config.oracle_accounts(&pool);
        assert_eq!(oracles, pool[2..5].to_vec());

        // Fewer accounts than the configured slice: take what is there.
        let short: Vec<Address> = (0u8..3).map(|i| Address::new([i; 20])).collect();
        assert_eq!(config.oracle_accounts(&short), short[2..].to_vec());
    }
}
