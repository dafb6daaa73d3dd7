use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};
use alloy_primitives::{Address, hex};
use thiserror::Error;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct PoolConfig {
        int24 tick;
        address pairedToken;
        uint24 devBuyFee;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct PreSaleTokenConfig {
        string name;
        string symbol;
        uint256 supply;
        uint24 fee;
        bytes32 salt;
        address deployer;
        uint256 fid;
        string image;
        string castHash;
        PoolConfig poolConfig;
    }

    function deployToken(PreSaleTokenConfig preSaleTokenConfig) external;

    function name() external view returns (string);

    event Transfer(address indexed from, address indexed to, uint256 value);
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("input is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("input too short for a selector ({0} bytes)")]
    InputTooShort(usize),

    #[error("unknown selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),

    #[error("abi decode failed: {0}")]
    Abi(#[from] alloy::sol_types::Error),
}

/// Marker for a receipt log carrying the ERC-20 `Transfer` signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferTopic {
    /// Contract that emitted the log.
    pub token: Address,
}

/// Decodes `deployToken` call data into its token configuration.
///
/// The whole tuple must decode; a short payload, a foreign selector or a field
/// that fails validation yields an error and nothing else.
pub fn decode_call(input_hex: &str) -> Result<PreSaleTokenConfig, DecodeError> {
    let bytes = hex::decode(input_hex.trim())?;
    if bytes.len() < 4 {
        return Err(DecodeError::InputTooShort(bytes.len()));
    }

    let mut selector = [0u8; 4];
    selector.copy_from_slice(&bytes[..4]);
    if selector != deployTokenCall::SELECTOR {
        return Err(DecodeError::UnknownSelector(selector));
    }

    let call = deployTokenCall::abi_decode_validate(&bytes)?;
    Ok(call.preSaleTokenConfig)
}

/// Matches a log against the `Transfer(address,address,uint256)` signature.
pub fn decode_transfer_log(log: &Log) -> Option<TransferTopic> {
    match log.topics().first() {
        Some(topic) if *topic == Transfer::SIGNATURE_HASH => Some(TransferTopic {
            token: log.address(),
        }),
        _ => None,
    }
}

/// Returns the first `Transfer` emitter among `logs`.
pub fn find_transfer(logs: &[Log]) -> Option<TransferTopic> {
    logs.iter().find_map(decode_transfer_log)
}
