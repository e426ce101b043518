//! FlightSurety Oracle Server
//!
//! Off-chain companion to the FlightSurety contracts: registers a pool of
//! simulated oracle accounts, watches the app contract for `OracleRequest`
//! events, and submits a flight-status response from every oracle eligible
//! for a request's index.

pub mod chain;
pub mod config;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod routes;
pub mod services;
