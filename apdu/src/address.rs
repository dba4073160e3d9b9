// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address parameters and derive address APDU
//!
//! The address parameter block is shared by address derivation, device-owned
//! transaction outputs, CIP-36 registration payment destinations, and message
//! signing.
//!
//! ## Encoding:
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   ADDR_TYPE   |  NETWORK_ID or PROTOCOL_MAGIC (4B, Byron only) |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /     SPENDING (packed path, 28-byte script hash, or nothing)   /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  STAKING_TAG  |                                               |
//! +-+-+-+-+-+-+-+-+                                               +
//! /  STAKING (packed path, 28-byte hash, 3 x u32 pointer, nothing) /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use alloc::vec::Vec;
use core::str::FromStr;

use encdec::{DecodeOwned, Encode};
use num_enum::TryFromPrimitive;

use crate::{
    fixture::PathOrBytes,
    helpers::{get_u32, put_slice, put_u32, put_u8},
    path::DerivationPath,
    ApduError, ApduStatic, Command, Instruction, KeyHash, ADA_APDU_CLA, KEY_HASH_LEN,
};

/// Cardano address types (header nibble)
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    TryFromPrimitive,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum AddressType {
    BasePaymentKeyStakeKey = 0x00,
    BasePaymentScriptStakeKey = 0x01,
    BasePaymentKeyStakeScript = 0x02,
    BasePaymentScriptStakeScript = 0x03,
    PointerKey = 0x04,
    PointerScript = 0x05,
    EnterpriseKey = 0x06,
    EnterpriseScript = 0x07,
    Byron = 0x08,
    RewardKey = 0x0E,
    RewardScript = 0x0F,
}

/// Staking data source tags
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum StakingTag {
    None = 0x11,
    KeyPath = 0x22,
    KeyHash = 0x33,
    BlockchainPointer = 0x44,
    ScriptHash = 0x55,
}

/// Derive the staking tag for an address type.
///
/// Some address types fix the staking source regardless of the supplied
/// value, otherwise this depends on whether a path or a hash was provided.
pub fn staking_tag(addr_type: AddressType, is_path: bool) -> StakingTag {
    use AddressType::*;

    match addr_type {
        Byron | EnterpriseKey | EnterpriseScript => StakingTag::None,
        BasePaymentKeyStakeScript | BasePaymentScriptStakeScript | RewardScript => {
            StakingTag::ScriptHash
        }
        PointerKey | PointerScript => StakingTag::BlockchainPointer,
        BasePaymentKeyStakeKey | BasePaymentScriptStakeKey | RewardKey => match is_path {
            true => StakingTag::KeyPath,
            false => StakingTag::KeyHash,
        },
    }
}

/// Network descriptor, Byron addresses use the protocol magic while all
/// others use the network id
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Network {
    pub protocol_magic: u32,
    pub network_id: u8,
}

impl Network {
    pub const MAINNET: Network = Network {
        protocol_magic: 764824073,
        network_id: 1,
    };

    pub const TESTNET: Network = Network {
        protocol_magic: 42,
        network_id: 0,
    };
}

/// Stake certificate pointer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockchainPointer {
    pub block_index: u32,
    pub tx_index: u32,
    pub certificate_index: u32,
}

impl Encode for BlockchainPointer {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(3 * 4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u32(&mut buff[index..], self.block_index)?;
        index += put_u32(&mut buff[index..], self.tx_index)?;
        index += put_u32(&mut buff[index..], self.certificate_index)?;

        Ok(index)
    }
}

impl DecodeOwned for BlockchainPointer {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        let (block_index, n) = get_u32(&buff[index..])?;
        index += n;
        let (tx_index, n) = get_u32(&buff[index..])?;
        index += n;
        let (certificate_index, n) = get_u32(&buff[index..])?;
        index += n;

        Ok((
            Self {
                block_index,
                tx_index,
                certificate_index,
            },
            index,
        ))
    }
}

/// Spending (payment) part of an address
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpendingSource {
    /// No spending part (reward addresses with hashes supplied elsewhere)
    None,
    /// Key derived on the device
    Path(DerivationPath),
    /// Payment script hash
    ScriptHash(KeyHash),
}

/// Staking value as supplied by the caller, before tag derivation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StakingValue {
    None,
    Path(DerivationPath),
    Hash(KeyHash),
    Pointer(BlockchainPointer),
}

/// Resolved staking part of an address
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StakingSource {
    None,
    KeyPath(DerivationPath),
    KeyHash(KeyHash),
    ScriptHash(KeyHash),
    BlockchainPointer(BlockchainPointer),
}

impl StakingSource {
    /// Fetch the wire tag for this staking source
    pub fn tag(&self) -> StakingTag {
        match self {
            StakingSource::None => StakingTag::None,
            StakingSource::KeyPath(_) => StakingTag::KeyPath,
            StakingSource::KeyHash(_) => StakingTag::KeyHash,
            StakingSource::ScriptHash(_) => StakingTag::ScriptHash,
            StakingSource::BlockchainPointer(_) => StakingTag::BlockchainPointer,
        }
    }
}

/// Address parameter block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressParams {
    pub addr_type: AddressType,
    pub network: Network,
    pub spending: SpendingSource,
    pub staking: StakingSource,
}

impl AddressParams {
    /// Create address parameters, deriving the staking source from the
    /// address type and supplied staking value
    pub fn new(
        addr_type: AddressType,
        network: Network,
        spending: SpendingSource,
        staking: StakingValue,
    ) -> Result<Self, ApduError> {
        let tag = staking_tag(addr_type, matches!(staking, StakingValue::Path(_)));

        let staking = match (tag, staking) {
            (StakingTag::None, _) => StakingSource::None,
            (StakingTag::KeyPath, StakingValue::Path(p)) => StakingSource::KeyPath(p),
            (StakingTag::KeyHash, StakingValue::Hash(h)) => StakingSource::KeyHash(h),
            (StakingTag::ScriptHash, StakingValue::Hash(h)) => StakingSource::ScriptHash(h),
            (StakingTag::BlockchainPointer, StakingValue::Pointer(p)) => {
                StakingSource::BlockchainPointer(p)
            }
            (_t, _v) => {
                #[cfg(feature = "log")]
                log::error!("staking value {_v:?} incompatible with {addr_type} ({_t})");
                return Err(ApduError::Unsupported("staking value for address type"));
            }
        };

        Ok(Self {
            addr_type,
            network,
            spending,
            staking,
        })
    }

    /// Create address parameters from textual fixture values, where each of
    /// `spending` and `staking` is either an `m/` path or a hex string
    pub fn from_fixture(
        addr_type: AddressType,
        network: Network,
        spending: &str,
        staking: &str,
    ) -> Result<Self, ApduError> {
        let spending = match PathOrBytes::from_str(spending)? {
            PathOrBytes::Path(p) => SpendingSource::Path(p),
            PathOrBytes::Bytes(b) if b.is_empty() => SpendingSource::None,
            PathOrBytes::Bytes(b) => SpendingSource::ScriptHash(key_hash(&b)?),
        };

        let staking = match staking_tag(addr_type, PathOrBytes::is_path(staking)) {
            StakingTag::None => StakingValue::None,
            StakingTag::KeyPath => StakingValue::Path(DerivationPath::from_str(staking)?),
            StakingTag::KeyHash | StakingTag::ScriptHash => {
                StakingValue::Hash(key_hash(&hex::decode(staking)?)?)
            }
            StakingTag::BlockchainPointer => {
                let b = hex::decode(staking)?;
                let (p, n) = BlockchainPointer::decode_owned(&b)?;
                if n != b.len() {
                    return Err(ApduError::InvalidLength);
                }
                StakingValue::Pointer(p)
            }
        };

        Self::new(addr_type, network, spending, staking)
    }
}

/// Convert a byte slice to a key hash
pub(crate) fn key_hash(b: &[u8]) -> Result<KeyHash, ApduError> {
    KeyHash::try_from(b).map_err(|_| ApduError::InvalidLength)
}

impl Encode for AddressParams {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let network = match self.addr_type {
            AddressType::Byron => 4,
            _ => 1,
        };

        let spending = match &self.spending {
            SpendingSource::None => 0,
            SpendingSource::Path(p) => p.encode_len()?,
            SpendingSource::ScriptHash(_) => KEY_HASH_LEN,
        };

        let staking = match &self.staking {
            StakingSource::None => 0,
            StakingSource::KeyPath(p) => p.encode_len()?,
            StakingSource::KeyHash(_) | StakingSource::ScriptHash(_) => KEY_HASH_LEN,
            StakingSource::BlockchainPointer(p) => p.encode_len()?,
        };

        Ok(1 + network + spending + 1 + staking)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u8(buff, self.addr_type as u8)?;

        index += match self.addr_type {
            AddressType::Byron => put_u32(&mut buff[index..], self.network.protocol_magic)?,
            _ => put_u8(&mut buff[index..], self.network.network_id)?,
        };

        index += match &self.spending {
            SpendingSource::None => 0,
            SpendingSource::Path(p) => p.encode(&mut buff[index..])?,
            SpendingSource::ScriptHash(h) => put_slice(&mut buff[index..], h)?,
        };

        index += put_u8(&mut buff[index..], self.staking.tag() as u8)?;

        index += match &self.staking {
            StakingSource::None => 0,
            StakingSource::KeyPath(p) => p.encode(&mut buff[index..])?,
            StakingSource::KeyHash(h) | StakingSource::ScriptHash(h) => {
                put_slice(&mut buff[index..], h)?
            }
            StakingSource::BlockchainPointer(p) => p.encode(&mut buff[index..])?,
        };

        Ok(index)
    }
}

/// Derive address mode (P1)
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum AddressMode {
    /// Return the address to the host
    Return = 0x01,
    /// Display the address on the device
    Display = 0x02,
}

/// Derive address APDU, payload is an [AddressParams] block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeriveAddress {
    pub mode: AddressMode,
    pub params: AddressParams,
}

impl DeriveAddress {
    pub fn new(mode: AddressMode, params: AddressParams) -> Self {
        Self { mode, params }
    }
}

impl ApduStatic for DeriveAddress {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::DeriveAddress as u8;

    fn p1(&self) -> u8 {
        self.mode as u8
    }
}

impl Encode for DeriveAddress {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        self.params.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        self.params.encode(buff)
    }
}

/// Derived address response (raw address bytes)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressResp {
    pub address: Vec<u8>,
}

impl DecodeOwned for AddressResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        Ok((
            Self {
                address: buff.to_vec(),
            },
            buff.len(),
        ))
    }
}
