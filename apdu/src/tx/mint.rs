// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Token minting / burning

use alloc::vec::Vec;

use encdec::Encode;
use num_enum::TryFromPrimitive;

use super::{AssetGroup, TxAssetGroup, TxItem, TxPhase, TxToken};
use crate::{
    frame::Frame,
    helpers::{len_u32, put_u32},
    ApduError, ApduStatic, Command, Instruction, ADA_APDU_CLA,
};

/// Mint sub-steps (P2)
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum MintStep {
    BasicData = 0x30,
    AssetGroup = 0x31,
    Token = 0x32,
    Confirm = 0x33,
}

/// Mint, asset groups with signed token amounts (negative to burn)
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Mint {
    pub groups: Vec<AssetGroup<i64>>,
}

impl Mint {
    /// Check whether the mint carries any asset groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Build the complete APDU sequence for this mint
    pub fn frames(&self) -> Result<Vec<Frame>, ApduError> {
        let mut frames = alloc::vec![TxMintInit {
            num_groups: len_u32(self.groups.len())?
        }
        .frame()?];

        for g in &self.groups {
            frames.push(TxAssetGroup::new(TxPhase::Mint, g)?.frame()?);

            for t in &g.tokens {
                frames.push(TxToken::new(TxPhase::Mint, t).frame()?);
            }
        }

        frames.push(TxMintConfirm.frame()?);

        Ok(frames)
    }
}

/// Mint initialisation APDU, carrying the number of asset groups (u32)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TxMintInit {
    pub num_groups: u32,
}

impl TxItem for TxMintInit {
    fn phase(&self) -> TxPhase {
        TxPhase::Mint
    }
}

impl ApduStatic for TxMintInit {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }

    fn p2(&self) -> u8 {
        MintStep::BasicData as u8
    }
}

impl Encode for TxMintInit {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        put_u32(buff, self.num_groups)
    }
}

/// Mint confirmation APDU (no payload)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TxMintConfirm;

impl TxItem for TxMintConfirm {
    fn phase(&self) -> TxPhase {
        TxPhase::Mint
    }
}

impl ApduStatic for TxMintConfirm {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }

    fn p2(&self) -> u8 {
        MintStep::Confirm as u8
    }
}

impl Encode for TxMintConfirm {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}
