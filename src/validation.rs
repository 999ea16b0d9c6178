//! Structural checks on token deployment parameters.
//!
//! Every check reports instead of failing: predicates return `bool`, the file
//! check returns a [`FileValidation`] and [`validate_token_params`] collects
//! all failing fields in a single pass.

use crate::{
    constants::{
        ACCEPTED_IMAGE_TYPES, ACCOUNT_ADDRESS_PREFIX, CONTRACT_ADDRESS_PREFIX, MAX_DESCRIPTION_LENGTH,
        MAX_IMAGE_SIZE, MAX_TOKEN_DECIMALS, MAX_TOKEN_NAME_LENGTH, MAX_TOKEN_SYMBOL_LENGTH, STELLAR_ADDRESS_LEN,
    },
    models::{
        token::{ImageFile, TokenDeployParams},
        validation::{FileValidation, ValidationResult},
    },
};
use std::collections::BTreeMap;

pub const INVALID_NAME: &str = "Token name must be 1-32 alphanumeric characters";
pub const INVALID_SYMBOL: &str = "Symbol must be 1-12 uppercase letters";
pub const INVALID_DECIMALS: &str = "Decimals must be between 0 and 18";
pub const INVALID_SUPPLY: &str = "Initial supply must be a positive number";
pub const INVALID_ADDRESS: &str = "Invalid Stellar address";
pub const INVALID_DESCRIPTION: &str = "Description must be 500 characters or less";
pub const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload PNG, JPG, or SVG";
pub const FILE_TOO_LARGE: &str = "File size must be less than 5MB";

/// Strkey alphabet (RFC 4648 base32, upper case).
const fn is_base32(byte: u8) -> bool {
    matches!(byte, b'A'..=b'Z' | b'2'..=b'7')
}

fn is_strkey_with_prefix(address: &str, prefix: u8) -> bool {
    let bytes = address.as_bytes();
    bytes.len() == STELLAR_ADDRESS_LEN && bytes[0] == prefix && bytes[1..].iter().copied().all(is_base32)
}

/// Returns true if `address` is shaped like a Stellar account address (`G...`, 56 characters).
///
/// Only the grammar is checked, not the strkey checksum.
pub fn is_valid_stellar_address(address: &str) -> bool {
    is_strkey_with_prefix(address, ACCOUNT_ADDRESS_PREFIX)
}

/// Returns true if `address` is shaped like a Soroban contract address (`C...`, 56 characters).
pub fn is_valid_contract_address(address: &str) -> bool {
    is_strkey_with_prefix(address, CONTRACT_ADDRESS_PREFIX)
}

pub fn is_valid_token_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= MAX_TOKEN_NAME_LENGTH
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ')
}

pub fn is_valid_token_symbol(symbol: &str) -> bool {
    !symbol.is_empty() && symbol.len() <= MAX_TOKEN_SYMBOL_LENGTH && symbol.bytes().all(|b| b.is_ascii_uppercase())
}

/// Returns true if `decimals` is a whole number in `[0, 18]`.
///
/// Takes a float so raw form input (`1.5`, `-1`) can be checked before it is
/// narrowed into [`TokenDeployParams::decimals`].
pub fn is_valid_decimals(decimals: f64) -> bool {
    decimals.fract() == 0.0 && (0.0..=f64::from(MAX_TOKEN_DECIMALS)).contains(&decimals)
}

/// Returns true if `supply` is a decimal integer strictly greater than zero.
pub fn is_valid_supply(supply: &str) -> bool {
    !supply.is_empty() && supply.bytes().all(|b| b.is_ascii_digit()) && supply.bytes().any(|b| b != b'0')
}

pub fn is_valid_image_file(file: &ImageFile) -> FileValidation {
    if !ACCEPTED_IMAGE_TYPES.contains(&file.mime_type.as_str()) {
        return FileValidation::rejected(INVALID_FILE_TYPE);
    }
    if file.size() > MAX_IMAGE_SIZE {
        return FileValidation::rejected(FILE_TOO_LARGE);
    }
    FileValidation::ok()
}

pub fn is_valid_description(description: &str) -> bool {
    description.chars().count() <= MAX_DESCRIPTION_LENGTH
}

/// Runs every field check on `params` and returns the failing fields.
pub fn validate_token_params(params: &TokenDeployParams) -> ValidationResult {
    let mut errors = BTreeMap::new();

    if !is_valid_token_name(&params.name) {
        errors.insert("name", INVALID_NAME.to_string());
    }
    if !is_valid_token_symbol(&params.symbol) {
        errors.insert("symbol", INVALID_SYMBOL.to_string());
    }
    if !is_valid_decimals(f64::from(params.decimals)) {
        errors.insert("decimals", INVALID_DECIMALS.to_string());
    }
    if !is_valid_supply(&params.initial_supply) {
        errors.insert("initialSupply", INVALID_SUPPLY.to_string());
    }
    if !is_valid_stellar_address(&params.admin_wallet) {
        errors.insert("adminWallet", INVALID_ADDRESS.to_string());
    }

    if let Some(metadata) = &params.metadata {
        if !is_valid_description(&metadata.description) {
            errors.insert("description", INVALID_DESCRIPTION.to_string());
        }
        if let Some(FileValidation { valid: false, error }) = metadata.image.as_ref().map(is_valid_image_file) {
            errors.insert("image", error.unwrap_or_default());
        }
    }

    ValidationResult::from_errors(errors)
}
