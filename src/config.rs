use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::{env::var, fmt, str::FromStr};
use url::Url;

/// Stellar network the toolkit talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    /// Maps the network name reported by the browser wallet.
    ///
    /// The wallet reports `PUBLIC` for mainnet and various names for test
    /// networks, so anything that does not mention "public" is a testnet.
    pub fn from_wallet_network(name: &str) -> Self {
        if name.to_lowercase().contains("public") {
            Self::Mainnet
        } else {
            Self::Testnet
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Testnet => "testnet",
            Self::Mainnet => "mainnet",
        }
    }

    /// Endpoints and passphrase of the network.
    pub fn config(self) -> NetworkConfig {
        match self {
            Self::Testnet => NetworkConfig {
                network_passphrase: "Test SDF Network ; September 2015",
                horizon_url: Url::parse("https://horizon-testnet.stellar.org").expect("static url"),
                soroban_rpc_url: Url::parse("https://soroban-testnet.stellar.org").expect("static url"),
            },
            Self::Mainnet => NetworkConfig {
                network_passphrase: "Public Global Stellar Network ; September 2015",
                horizon_url: Url::parse("https://horizon.stellar.org").expect("static url"),
                soroban_rpc_url: Url::parse("https://soroban-mainnet.stellar.org").expect("static url"),
            },
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "testnet" => Ok(Self::Testnet),
            "mainnet" => Ok(Self::Mainnet),
            other => Err(eyre!("unknown stellar network: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network_passphrase: &'static str,
    pub horizon_url: Url,
    pub soroban_rpc_url: Url,
}

/// Configuration for talking to the Stellar network and the token factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StellarConfig {
    pub network: Network,
    /// Network endpoints, with `SOROBAN_RPC_URL` applied if set.
    pub endpoints: NetworkConfig,
    /// Token factory contract id. The event listener does not run without it.
    pub factory_contract_id: Option<String>,
}

impl StellarConfig {
    /// Reads `STELLAR_NETWORK` (default `testnet`), `SOROBAN_RPC_URL` and
    /// `FACTORY_CONTRACT_ID`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let network = lookup("STELLAR_NETWORK").map(|n| n.parse::<Network>()).transpose()?.unwrap_or_default();
        let mut endpoints = network.config();
        if let Some(url) = lookup("SOROBAN_RPC_URL") {
            endpoints.soroban_rpc_url = Url::parse(&url).map_err(|err| eyre!("invalid SOROBAN_RPC_URL: {err}"))?;
        }
        let factory_contract_id = lookup("FACTORY_CONTRACT_ID").filter(|id| !id.is_empty());

        Ok(Self { network, endpoints, factory_contract_id })
    }
}

/// Credentials and endpoints of the Pinata pinning service.
#[derive(Clone, PartialEq, Eq)]
pub struct IpfsConfig {
    pub api_key: String,
    pub api_secret: String,
    pub api_url: Url,
    pub gateway_url: Url,
}

impl fmt::Debug for IpfsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpfsConfig")
            .field("api_key", &"...")
            .field("api_secret", &"...")
            .field("api_url", &self.api_url.as_str())
            .field("gateway_url", &self.gateway_url.as_str())
            .finish()
    }
}

impl IpfsConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_url: Url::parse("https://api.pinata.cloud").expect("static url"),
            gateway_url: Url::parse("https://gateway.pinata.cloud/ipfs/").expect("static url"),
        }
    }

    /// Reads `IPFS_API_KEY` and `IPFS_API_SECRET`, both default to empty.
    pub fn from_env() -> Self {
        Self::new(var("IPFS_API_KEY").unwrap_or_default(), var("IPFS_API_SECRET").unwrap_or_default())
    }

    /// Returns true if both credentials are set.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}
