/// Module containing fixtures for testing purposes.
pub mod fixtures;

/// Module containing proptest strategies for deployment parameters.
pub mod strategies;

/// Module containing mocked Pinata, Soroban RPC and webhook endpoints.
pub mod wiremock_utils;
