// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Multi-asset token bundles, shared by outputs and mint

use alloc::vec::Vec;
use core::fmt::Debug;

use encdec::Encode;

use super::{MintStep, OutputStep, TxItem, TxPhase};
use crate::{
    helpers::{len_u32, put_i64, put_sized, put_slice, put_u32, put_u64},
    ApduError, ApduStatic, Command, Instruction, KeyHash, ADA_APDU_CLA, KEY_HASH_LEN,
};

/// Maximum asset name length
pub const MAX_ASSET_NAME_LEN: usize = 32;

/// Token amount, unsigned for outputs and signed for mint / burn
pub trait TokenAmount: Copy + Debug + PartialEq {
    fn put(self, buff: &mut [u8]) -> Result<usize, ApduError>;
}

impl TokenAmount for u64 {
    fn put(self, buff: &mut [u8]) -> Result<usize, ApduError> {
        put_u64(buff, self)
    }
}

impl TokenAmount for i64 {
    fn put(self, buff: &mut [u8]) -> Result<usize, ApduError> {
        put_i64(buff, self)
    }
}

/// Token with an asset name and amount
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token<A> {
    name: heapless::Vec<u8, MAX_ASSET_NAME_LEN>,
    pub amount: A,
}

impl<A: TokenAmount> Token<A> {
    /// Create a token, asset names are limited to [MAX_ASSET_NAME_LEN] bytes
    pub fn new(name: &[u8], amount: A) -> Result<Self, ApduError> {
        let name = heapless::Vec::from_slice(name).map_err(|_| ApduError::InvalidLength)?;
        Ok(Self { name, amount })
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }
}

/// Tokens grouped under a minting policy
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AssetGroup<A> {
    pub policy_id: KeyHash,
    pub tokens: Vec<Token<A>>,
}

/// Asset group header APDU, sent before the group's tokens
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                     POLICY_ID (28 bytes)                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          NUM_TOKENS                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxAssetGroup {
    phase: TxPhase,
    policy_id: KeyHash,
    num_tokens: u32,
}

impl TxAssetGroup {
    pub fn new<A>(phase: TxPhase, group: &AssetGroup<A>) -> Result<Self, ApduError> {
        Ok(Self {
            phase,
            policy_id: group.policy_id,
            num_tokens: len_u32(group.tokens.len())?,
        })
    }
}

impl TxItem for TxAssetGroup {
    fn phase(&self) -> TxPhase {
        self.phase
    }
}

impl ApduStatic for TxAssetGroup {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase as u8
    }

    fn p2(&self) -> u8 {
        match self.phase {
            TxPhase::Mint => MintStep::AssetGroup as u8,
            _ => OutputStep::AssetGroup as u8,
        }
    }
}

impl Encode for TxAssetGroup {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(KEY_HASH_LEN + 4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_slice(buff, &self.policy_id)?;
        index += put_u32(&mut buff[index..], self.num_tokens)?;

        Ok(index)
    }
}

/// Token APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          NAME_LEN                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                    ASSET_NAME (max 32 bytes)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                AMOUNT (u64 output, i64 mint)                  +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxToken<'a, A> {
    phase: TxPhase,
    token: &'a Token<A>,
}

impl<'a, A: TokenAmount> TxToken<'a, A> {
    pub fn new(phase: TxPhase, token: &'a Token<A>) -> Self {
        Self { phase, token }
    }
}

impl<'a, A> TxItem for TxToken<'a, A> {
    fn phase(&self) -> TxPhase {
        self.phase
    }
}

impl<'a, A: TokenAmount> ApduStatic for TxToken<'a, A> {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase as u8
    }

    fn p2(&self) -> u8 {
        match self.phase {
            TxPhase::Mint => MintStep::Token as u8,
            _ => OutputStep::Token as u8,
        }
    }
}

impl<'a, A: TokenAmount> Encode for TxToken<'a, A> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + self.token.name.len() + 8)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_sized(buff, &self.token.name)?;
        index += self.token.amount.put(&mut buff[index..])?;

        Ok(index)
    }
}
