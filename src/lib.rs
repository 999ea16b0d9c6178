//! Toolkit for deploying and managing fungible tokens through a Soroban token
//! factory on the Stellar network.
//!
//! The crate includes modules for validating deployment parameters, computing
//! deployment fees, formatting values for display, mapping failures to
//! user-facing errors, pinning token images to IPFS, and a relay forwarding
//! factory events to webhook subscribers.

/// Module for configurations related to the Stellar network and IPFS.
pub mod config;

/// Module for limits and fixed values.
pub mod constants;

/// Module for user-facing errors.
pub mod errors;

/// Module for deployment fee calculation.
pub mod fees;

/// Module for display formatting of amounts, addresses and dates.
pub mod formatting;

/// Module for the IPFS pinning service client.
pub mod ipfs;

/// Module containing models used throughout the application.
pub mod models;

/// Module for handling Prometheus metrics.
pub mod prometheus_handler;

/// Module for the webhook relay server and event listener.
pub mod relay;

/// Module for validating deployment parameters.
pub mod validation;

/// Module containing utilities for testing purposes.
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;
