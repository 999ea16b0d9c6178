/// Module for the token deployment parameters.
pub mod token;

/// Module for the deployment fee.
pub mod fee;

/// Module for validation outcomes.
pub mod validation;

/// Module for the factory events relayed to webhooks.
pub mod event;
