//! JSON-RPC implementation of the gateway against an Ethereum node.
//!
//! Transactions are sent with `eth_sendTransaction` from node-managed
//! accounts, the same trust model a local development chain provides; the
//! server never handles private keys itself.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::abi::{self, Token};
use super::{ChainError, FlightSuretyGateway};
use crate::config::ServerConfig;
use crate::models::{Address, OracleRequest, OracleResponse};

const ORACLE_REQUEST_EVENT: &str = "OracleRequest(uint8,address,string,uint256)";

pub struct EthereumGateway {
    http: Client,
    rpc_url: String,
    app_address: Address,
    data_address: Address,
    registration_stake_wei: u128,
    registration_gas: u64,
    call_gas: u64,
    submit_gas: u64,
}

impl EthereumGateway {
    pub fn new(config: &ServerConfig) -> Result<Self, ChainError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.rpc_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            app_address: config.app_contract_address,
            data_address: config.data_contract_address,
            registration_stake_wei: config.registration_stake_wei,
            registration_gas: config.registration_gas,
            call_gas: config.call_gas,
            submit_gas: config.submit_gas,
        })
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let body: Value = self
            .http
            .post(&self.rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": "flightsurety-server",
                "method": method,
                "params": params,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = body.get("error") {
            return Err(ChainError::Rpc {
                code: error.pointer("/code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .pointer("/message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown rpc error")
                    .to_string(),
            });
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| ChainError::MissingResult(method.to_string()))
    }

    /// Submit a state-changing call; resolution of the transaction itself is
    /// asynchronous on the node side, we only keep the hash for the logs.
    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        value_wei: u128,
        gas: u64,
        data: Vec<u8>,
    ) -> Result<(), ChainError> {
        let mut tx = json!({
            "from": from.to_string(),
            "to": to.to_string(),
            "gas": quantity_u64(gas),
            "data": format!("0x{}", hex::encode(data)),
        });
        if value_wei > 0 {
            tx["value"] = Value::String(quantity_u128(value_wei));
        }

        let tx_hash = self.rpc_call("eth_sendTransaction", json!([tx])).await?;
        tracing::debug!(to = %to, tx_hash = %tx_hash, "transaction accepted by node");
        Ok(())
    }
}

#[async_trait]
impl FlightSuretyGateway for EthereumGateway {
    async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        let result = self.rpc_call("eth_accounts", json!([])).await?;
        let raw = result
            .as_array()
            .ok_or_else(|| ChainError::Decode("eth_accounts did not return an array".to_string()))?;

        raw.iter()
            .map(|value| {
                value
                    .as_str()
                    .ok_or_else(|| ChainError::Decode("non-string account entry".to_string()))?
                    .parse()
                    .map_err(|err| ChainError::Decode(format!("bad account address: {err}")))
            })
            .collect()
    }

    async fn authorize_caller(&self, from: Address) -> Result<(), ChainError> {
        let data = abi::encode_call(
            "authorizeCaller(address)",
            &[Token::Address(self.app_address)],
        );
        self.send_transaction(from, self.data_address, 0, self.registration_gas, data)
            .await
    }

    async fn register_oracle(&self, from: Address) -> Result<(), ChainError> {
        let data = abi::encode_call("registerOracle()", &[]);
        self.send_transaction(
            from,
            self.app_address,
            self.registration_stake_wei,
            self.registration_gas,
            data,
        )
        .await
    }

    async fn my_indexes(&self, from: Address) -> Result<[u8; 3], ChainError> {
        let data = abi::encode_call("getMyIndexes()", &[]);
        let call = json!({
            "from": from.to_string(),
            "to": self.app_address.to_string(),
            "gas": quantity_u64(self.call_gas),
            "data": format!("0x{}", hex::encode(data)),
        });

        let result = self.rpc_call("eth_call", json!([call, "latest"])).await?;
        let bytes = decode_hex_value(&result, "eth_call")?;
        abi::decode_index_set(&bytes)
    }

    async fn submit_oracle_response(
        &self,
        from: Address,
        response: &OracleResponse,
    ) -> Result<(), ChainError> {
        let data = abi::encode_call(
            "submitOracleResponse(uint8,address,string,uint256,uint8)",
            &[
                Token::Uint8(response.index),
                Token::Address(response.airline),
                Token::String(response.flight.clone()),
                Token::Uint(u128::from(response.timestamp)),
                Token::Uint8(response.status.code()),
            ],
        );
        self.send_transaction(from, self.app_address, 0, self.submit_gas, data)
            .await
    }

    async fn latest_block(&self) -> Result<u64, ChainError> {
        let result = self.rpc_call("eth_blockNumber", json!([])).await?;
        parse_quantity(&result, "eth_blockNumber")
    }

    async fn oracle_requests(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<OracleRequest>, ChainError> {
        let filter = json!({
            "address": self.app_address.to_string(),
            "fromBlock": quantity_u64(from_block),
            "toBlock": quantity_u64(to_block),
            "topics": [abi::event_topic(ORACLE_REQUEST_EVENT)],
        });

        let result = self.rpc_call("eth_getLogs", json!([filter])).await?;
        let logs = result
            .as_array()
            .ok_or_else(|| ChainError::Decode("eth_getLogs did not return an array".to_string()))?;

        let mut requests = Vec::with_capacity(logs.len());
        for log in logs {
            let data = log
                .get("data")
                .map(|value| decode_hex_value(value, "log data"))
                .transpose()?
                .unwrap_or_default();
            requests.push(abi::decode_oracle_request(&data)?);
        }

        Ok(requests)
    }
}

fn quantity_u64(value: u64) -> String {
    format!("0x{value:x}")
}

fn quantity_u128(value: u128) -> String {
    format!("0x{value:x}")
}

fn parse_quantity(value: &Value, context: &str) -> Result<u64, ChainError> {
    let raw = value
        .as_str()
        .ok_or_else(|| ChainError::Decode(format!("{context}: quantity is not a string")))?;
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16)
        .map_err(|_| ChainError::Decode(format!("{context}: bad quantity {raw}")))
}

fn decode_hex_value(value: &Value, context: &str) -> Result<Vec<u8>, ChainError> {
    let raw = value
        .as_str()
        .ok_or_else(|| ChainError::Decode(format!("{context}: expected hex string")))?;
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|_| ChainError::Decode(format!("{context}: bad hex data")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_render_as_minimal_hex() {
        assert_eq!(quantity_u64(0), "0x0");
        assert_eq!(quantity_u64(1_000_000), "0xf4240");
        assert_eq!(quantity_u128(1_000_000_000_000_000_000), "0xde0b6b3a7640000");
    }

    #[test]
    fn parses_quantities_with_and_without_prefix() {
        assert_eq!(parse_quantity(&json!("0x2a"), "test").unwrap(), 42);
        assert_eq!(parse_quantity(&json!("2a"), "test").unwrap(), 42);
        assert!(parse_quantity(&json!("0xzz"), "test").is_err());
        assert!(parse_quantity(&json!(42), "test").is_err());
    }

    #[test]
    fn decodes_hex_payloads() {
        assert_eq!(
            decode_hex_value(&json!("0x0102"), "test").unwrap(),
            vec![1, 2]
        );
        assert!(decode_hex_value(&json!("0x01zz"), "test").is_err());
    }
}
