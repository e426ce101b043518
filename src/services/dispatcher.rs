//! Event-driven oracle response dispatcher.
//!
//! Polls the node for `OracleRequest` events from a cursor and, per event,
//! fans out one response transaction per eligible oracle. Submissions within
//! a batch are independent units of work: each outcome is awaited and logged
//! on its own, a rejected response never blocks its siblings, and there is no
//! retry (a failed submission is an oracle that declined to answer).

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::chain::FlightSuretyGateway;
use crate::models::{FlightStatus, OracleRequest, OracleResponse};
use crate::registry::OracleRegistry;

/// Blocks scanned per poll cycle, to keep log queries bounded.
const MAX_BLOCKS_PER_CYCLE: u64 = 200;

pub struct ResponseDispatcher {
    gateway: Arc<dyn FlightSuretyGateway>,
    registry: Arc<OracleRegistry>,
    poll_interval: Duration,
    /// Next block to scan. Starts at the configured from-block, so history
    /// replay is an explicit choice rather than an accident.
    next_block: Mutex<u64>,
}

impl ResponseDispatcher {
    pub fn new(
        gateway: Arc<dyn FlightSuretyGateway>,
        registry: Arc<OracleRegistry>,
        from_block: u64,
        poll_interval: Duration,
    ) -> Self {
        Self {
            gateway,
            registry,
            poll_interval,
            next_block: Mutex::new(from_block),
        }
    }

    /// Run the poll loop forever. A failed cycle is logged and the loop
    /// keeps serving future events.
    pub async fn start(self) {
        info!("oracle response dispatcher started");

        loop {
            if let Err(err) = self.poll_once().await {
                error!(error = %err, "event poll cycle failed");
            }

            sleep(self.poll_interval).await;
        }
    }

    pub async fn poll_once(&self) -> Result<(), crate::chain::ChainError> {
        let latest = self.gateway.latest_block().await?;

        let mut next_block = self.next_block.lock().await;
        let from = *next_block;
        if from > latest {
            return Ok(());
        }
        let to = latest.min(from.saturating_add(MAX_BLOCKS_PER_CYCLE));

        let requests = self.gateway.oracle_requests(from, to).await?;
        for request in &requests {
            self.dispatch(request).await;
        }

        *next_block = to + 1;
        if !requests.is_empty() {
            info!(
                from_block = from,
                to_block = to,
                events = requests.len(),
                "dispatch cycle complete"
            );
        }

        Ok(())
    }

    /// Submit one response per oracle eligible for the request's index.
    pub async fn dispatch(&self, request: &OracleRequest) {
        let eligible = self.registry.oracles_for_index(request.index).await;
        if eligible.is_empty() {
            debug!(
                index = request.index,
                flight = %request.flight,
                "no registered oracle holds this index"
            );
            return;
        }

        info!(
            index = request.index,
            flight = %request.flight,
            oracles = eligible.len(),
            "dispatching oracle responses"
        );

        let submissions = eligible.into_iter().map(|account| {
            // Each oracle draws its own status, simulating independent
            // real-world observers.
            let response = OracleResponse::to_request(request, FlightStatus::random());
            async move {
                match self.gateway.submit_oracle_response(account, &response).await {
                    Ok(()) => info!(
                        account = %account,
                        flight = %response.flight,
                        status = response.status.code(),
                        "oracle response submitted"
                    ),
                    Err(err) => warn!(
                        account = %account,
                        flight = %response.flight,
                        error = %err,
                        "oracle response rejected"
                    ),
                }
            }
        });

        join_all(submissions).await;
    }
}
