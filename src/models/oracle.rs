//! Oracle identities, contract events, and the flight-status simulator.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Address;

/// Flight status codes as the FlightSurety contracts encode them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

/// Codes the contract never pays out on.
pub const NO_PAYOUT_STATUS_CODES: [u8; 5] = [0, 10, 30, 40, 50];

impl FlightStatus {
    pub fn code(self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlightStatus::Unknown),
            10 => Some(FlightStatus::OnTime),
            20 => Some(FlightStatus::LateAirline),
            30 => Some(FlightStatus::LateWeather),
            40 => Some(FlightStatus::LateTechnical),
            50 => Some(FlightStatus::LateOther),
            _ => None,
        }
    }

    /// Draw a simulated status for one oracle response.
    ///
    /// 60% of draws report code 20; the rest pick uniformly from the
    /// no-payout codes. The contract's payout logic depends on this exact
    /// numeric mapping, so it must not be "corrected".
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        if rng.gen_range(0..10) < 6 {
            FlightStatus::LateAirline
        } else {
            let code = NO_PAYOUT_STATUS_CODES[rng.gen_range(0..NO_PAYOUT_STATUS_CODES.len())];
            FlightStatus::from_code(code).unwrap_or(FlightStatus::Unknown)
        }
    }
}

/// One registered oracle: its account and the three indexes the contract
/// assigned to it. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleIdentity {
    pub account: Address,
    pub indexes: [u8; 3],
}

/// `OracleRequest` event emitted by the app contract when a passenger asks
/// for a flight-status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub index: u8,
    pub airline: Address,
    pub flight: String,
    pub timestamp: u64,
}

/// Payload of one `submitOracleResponse` transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResponse {
    pub index: u8,
    pub airline: Address,
    pub flight: String,
    pub timestamp: u64,
    pub status: FlightStatus,
}

impl OracleResponse {
    pub fn to_request(request: &OracleRequest, status: FlightStatus) -> Self {
        Self {
            index: request.index,
            airline: request.airline,
            flight: request.flight.clone(),
            timestamp: request.timestamp,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn status_codes_roundtrip() {
        for code in [0u8, 10, 20, 30, 40, 50] {
            assert_eq!(FlightStatus::from_code(code).unwrap().code(), code);
        }
        assert!(FlightStatus::from_code(25).is_none());
    }

    #[test]
    fn random_status_matches_expected_distribution() {
        const DRAWS: usize = 100_000;

        let mut counts: HashMap<u8, usize> = HashMap::new();
        for _ in 0..DRAWS {
            *counts.entry(FlightStatus::random().code()).or_default() += 1;
        }

        // 60% dominant branch, ~8% for each of the five no-payout codes.
        let dominant = counts.get(&20).copied().unwrap_or(0);
        assert!(
            (58_000..=62_000).contains(&dominant),
            "code 20 drawn {dominant} times"
        );
        for code in NO_PAYOUT_STATUS_CODES {
            let n = counts.get(&code).copied().unwrap_or(0);
            assert!((6_500..=9_500).contains(&n), "code {code} drawn {n} times");
        }
    }

    #[test]
    fn response_carries_request_fields() {
        let request = OracleRequest {
            index: 4,
            airline: Address::new([7u8; 20]),
            flight: "ND1309".to_string(),
            timestamp: 1_588_000_000,
        };

        let response = OracleResponse::to_request(&request, FlightStatus::OnTime);
        assert_eq!(response.index, 4);
        assert_eq!(response.airline, request.airline);
        assert_eq!(response.flight, "ND1309");
        assert_eq!(response.timestamp, 1_588_000_000);
        assert_eq!(response.status, FlightStatus::OnTime);
    }
}
