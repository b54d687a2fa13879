// address.rs
//
// Network-prefixed addresses (XAddress):
//
//   <prefix><network char><base58(type byte || script || checksum)>
//
// The payload is the full output script, so every address template encodes
// the same way. The checksum is the first 4 bytes of
// sha256(prefix || network char || type byte || script).

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::constants::{ADDRESS_PREFIX, XADDRESS_TYPE_SCRIPT};
use crate::script::{address_payload, classify, AddressKind};
use crate::types::Script;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    pub fn as_char(&self) -> char {
        match self {
            Network::Mainnet => '_',
            Network::Testnet => 'T',
            Network::Regtest => 'R',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '_' => Some(Network::Mainnet),
            'T' => Some(Network::Testnet),
            'R' => Some(Network::Regtest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address does not start with '{}'", ADDRESS_PREFIX)]
    MissingPrefix,
    #[error("unknown network character '{0}'")]
    UnknownNetwork(char),
    #[error("address is for {found:?}, expected {expected:?}")]
    WrongNetwork { expected: Network, found: Network },
    #[error("invalid base58: {0}")]
    Base58(String),
    #[error("address payload too short")]
    TooShort,
    #[error("unsupported address type {0}")]
    UnsupportedType(u8),
    #[error("checksum mismatch")]
    Checksum,
    #[error("address script is not a standard address template")]
    NotAnAddressScript,
}

/// A decoded address, ready to be used against the indexer's script endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub network: Network,
    pub kind: AddressKind,
    pub script: Script,
    /// Hash or commitment embedded in the script
    pub payload: Vec<u8>,
}

impl ParsedAddress {
    pub fn indexer_type(&self) -> &'static str {
        self.kind.indexer_type()
    }

    pub fn payload_hex(&self) -> String {
        hex::encode(&self.payload)
    }
}

fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

fn checksum(network: Network, type_byte: u8, payload: &[u8]) -> [u8; 4] {
    let mut preimage = Vec::with_capacity(ADDRESS_PREFIX.len() + 2 + payload.len());
    preimage.extend_from_slice(ADDRESS_PREFIX.as_bytes());
    preimage.push(network.as_char() as u8);
    preimage.push(type_byte);
    preimage.extend_from_slice(payload);

    let digest = sha256(&preimage);
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[0..4]);
    out
}

/// Encode raw script bytes as an address string. Does not check the template;
/// callers go through `script_to_address` for that.
pub fn encode_address(script: &[u8], network: Network) -> String {
    let mut extended = vec![XADDRESS_TYPE_SCRIPT];
    extended.extend_from_slice(script);
    extended.extend_from_slice(&checksum(network, XADDRESS_TYPE_SCRIPT, script));

    format!(
        "{}{}{}",
        ADDRESS_PREFIX,
        network.as_char(),
        bs58::encode(extended).into_string()
    )
}

/// Derive the address of an output script. `None` for anything that is not a
/// standard address template.
pub fn script_to_address(script: &Script, network: Network) -> Option<String> {
    classify(script).address_kind()?;
    Some(encode_address(script.as_bytes(), network))
}

pub fn parse_address(address: &str, expected: Network) -> Result<ParsedAddress, AddressError> {
    let rest = address
        .strip_prefix(ADDRESS_PREFIX)
        .ok_or(AddressError::MissingPrefix)?;

    let mut chars = rest.chars();
    let network_char = chars.next().ok_or(AddressError::TooShort)?;
    let network =
        Network::from_char(network_char).ok_or(AddressError::UnknownNetwork(network_char))?;
    if network != expected {
        return Err(AddressError::WrongNetwork {
            expected,
            found: network,
        });
    }

    let raw = bs58::decode(chars.as_str())
        .into_vec()
        .map_err(|e| AddressError::Base58(e.to_string()))?;
    if raw.len() < 1 + 4 {
        return Err(AddressError::TooShort);
    }

    let (body, check) = raw.split_at(raw.len() - 4);
    let type_byte = body[0];
    if type_byte != XADDRESS_TYPE_SCRIPT {
        return Err(AddressError::UnsupportedType(type_byte));
    }
    let script = &body[1..];
    if checksum(network, type_byte, script) != check {
        return Err(AddressError::Checksum);
    }

    let (kind, payload) = address_payload(script).ok_or(AddressError::NotAnAddressScript)?;
    Ok(ParsedAddress {
        network,
        kind,
        script: Script::from_bytes(script),
        payload: payload.to_vec(),
    })
}
