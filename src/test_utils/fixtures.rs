use crate::models::token::{ImageFile, TokenDeployParams};
use rstest::*;
use tracing_subscriber::{filter, FmtSubscriber};

/// A syntactically valid account address.
pub fn mock_wallet_address() -> String {
    format!("G{}", "X".repeat(55))
}

/// A syntactically valid contract address.
pub fn mock_token_address() -> String {
    format!("C{}", "X".repeat(55))
}

pub fn mock_transaction_hash() -> String {
    "a".repeat(64)
}

/// An image of `size` bytes with the given MIME type.
pub fn mock_image(name: &str, size: usize, mime_type: &str) -> ImageFile {
    ImageFile::new(name, mime_type, vec![b'x'; size])
}

/// A parameter set that passes every validation check.
#[fixture]
pub fn valid_params() -> TokenDeployParams {
    TokenDeployParams {
        name: "My Token".into(),
        symbol: "MTK".into(),
        decimals: 7,
        initial_supply: "1000000".into(),
        admin_wallet: mock_wallet_address(),
        metadata: None,
    }
}

/// This fixture configures the tests. The following setup
/// is used:
/// - The log level is set to `info`
#[fixture]
pub fn setup() {
    let filter = filter::EnvFilter::new("info");
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
