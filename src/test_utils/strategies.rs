use crate::models::token::{ImageFile, TokenDeployParams, TokenMetadata};
use proptest::{collection::vec, option, prelude::*};

const BASE32: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Valid account addresses: `G` followed by 55 base32 characters.
pub fn stellar_address() -> impl Strategy<Value = String> {
    vec(prop::sample::select(BASE32), 55)
        .prop_map(|chars| format!("G{}", chars.into_iter().map(char::from).collect::<String>()))
}

pub fn token_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ]{0,31}"
}

pub fn token_symbol() -> impl Strategy<Value = String> {
    "[A-Z]{1,12}"
}

pub fn initial_supply() -> impl Strategy<Value = String> {
    "[1-9][0-9]{0,38}"
}

pub fn token_metadata() -> impl Strategy<Value = TokenMetadata> {
    ("[a-zA-Z0-9 .,]{0,500}", option::of(prop::sample::select(vec!["image/png", "image/jpeg", "image/svg+xml"])))
        .prop_map(|(description, mime_type)| TokenMetadata {
            description,
            image: mime_type.map(|mime_type| ImageFile::new("logo", mime_type, vec![0; 16])),
        })
}

/// Parameter sets that pass validation, with and without metadata.
pub fn token_deploy_params() -> impl Strategy<Value = TokenDeployParams> {
    (token_name(), token_symbol(), 0_u32..=18, initial_supply(), stellar_address(), option::of(token_metadata()))
        .prop_map(|(name, symbol, decimals, initial_supply, admin_wallet, metadata)| TokenDeployParams {
            name,
            symbol,
            decimals,
            initial_supply,
            admin_wallet,
            metadata,
        })
}
