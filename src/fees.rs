use crate::{
    constants::{BASE_FEE_XLM, METADATA_FEE_XLM},
    models::{fee::Fee, token::TokenDeployParams},
};

/// Computes the deployment fee.
///
/// The base fee is always charged; the metadata fee only when the deployment
/// carries metadata.
pub const fn calculate_fee(has_metadata: bool) -> Fee {
    let base_fee = BASE_FEE_XLM;
    let metadata_fee = if has_metadata { METADATA_FEE_XLM } else { 0 };
    Fee { base_fee, metadata_fee, total_fee: base_fee + metadata_fee }
}

impl Fee {
    /// Fee for the given deployment parameters.
    pub const fn for_params(params: &TokenDeployParams) -> Self {
        calculate_fee(params.has_metadata())
    }
}
