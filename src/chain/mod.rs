//! Contract-call boundary to the FlightSurety contracts.
//!
//! Everything behind [`FlightSuretyGateway`] is an opaque remote operation
//! with its own failure modes; services never see transport details.

use async_trait::async_trait;

use crate::models::{Address, OracleRequest, OracleResponse};

pub mod abi;
pub mod rpc;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Error object returned by the node, including reverted transactions.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed rpc response for {0}: missing result")]
    MissingResult(String),

    #[error("decode error: {0}")]
    Decode(String),
}

/// Calls and queries the oracle server issues against the FlightSurety app
/// and data contracts.
#[async_trait]
pub trait FlightSuretyGateway: Send + Sync {
    /// Accounts managed by the connected node, in node order.
    async fn accounts(&self) -> Result<Vec<Address>, ChainError>;

    /// One-time administrative call authorizing the app contract to use the
    /// data contract.
    async fn authorize_caller(&self, from: Address) -> Result<(), ChainError>;

    /// Payable `registerOracle()` carrying the configured stake.
    async fn register_oracle(&self, from: Address) -> Result<(), ChainError>;

    /// Read-only `getMyIndexes()` for an already-registered account.
    async fn my_indexes(&self, from: Address) -> Result<[u8; 3], ChainError>;

    /// `submitOracleResponse(...)` from one oracle account. May revert under
    /// contract-defined conditions (index mismatch, flight already resolved).
    async fn submit_oracle_response(
        &self,
        from: Address,
        response: &OracleResponse,
    ) -> Result<(), ChainError>;

    /// Height of the most recent block.
    async fn latest_block(&self) -> Result<u64, ChainError>;

    /// `OracleRequest` events emitted in the inclusive block range.
    async fn oracle_requests(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<OracleRequest>, ChainError>;
}
