use crate::constants::STROOPS_PER_XLM;
use serde::{Deserialize, Serialize};

/// Deployment fee breakdown, in XLM.
///
/// Always built through [`crate::fees::calculate_fee`], which keeps
/// `total_fee == base_fee + metadata_fee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    pub base_fee: u64,
    pub metadata_fee: u64,
    pub total_fee: u64,
}

impl Fee {
    /// Total fee expressed in stroops, as passed to the factory contract.
    pub fn total_stroops(&self) -> i128 {
        i128::from(self.total_fee) * STROOPS_PER_XLM
    }
}
