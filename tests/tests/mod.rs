pub mod pinata;
pub mod relay_api;
pub mod soroban;
pub mod webhooks;
