/// Number of stroops in one XLM.
pub const STROOPS_PER_XLM: i128 = 10_000_000;

/// Base deployment fee in XLM, charged for every token.
pub const BASE_FEE_XLM: u64 = 7;
/// Additional fee in XLM when the deployment carries metadata.
pub const METADATA_FEE_XLM: u64 = 3;

/// Maximum number of characters in a token name.
pub const MAX_TOKEN_NAME_LENGTH: usize = 32;
/// Maximum number of characters in a token symbol.
pub const MAX_TOKEN_SYMBOL_LENGTH: usize = 12;
/// Maximum number of decimals a token can be deployed with.
pub const MAX_TOKEN_DECIMALS: u32 = 18;
/// Maximum number of characters in a metadata description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Maximum image size accepted for upload (5 MiB).
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;
/// MIME types accepted for the token image.
pub const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/jpg", "image/svg+xml"];

/// Length of a strkey encoded Stellar account or contract address.
pub const STELLAR_ADDRESS_LEN: usize = 56;
/// Leading character of an account (ed25519 public key) address.
pub const ACCOUNT_ADDRESS_PREFIX: u8 = b'G';
/// Leading character of a contract address.
pub const CONTRACT_ADDRESS_PREFIX: u8 = b'C';

/// Topic symbol emitted by the factory when a token is deployed.
pub const DEPLOY_EVENT_TOPIC: &str = "deploy";
/// Topic symbol emitted by the factory when tokens are burned.
pub const BURN_EVENT_TOPIC: &str = "burn";
