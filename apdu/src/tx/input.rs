// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;

use super::{TxItem, TxPhase};
use crate::{
    helpers::{put_slice, put_u32},
    ApduError, ApduStatic, Command, Hash32, Instruction, ADA_APDU_CLA, HASH_LEN,
};

/// Transaction input reference
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TxInput {
    pub tx_hash: Hash32,
    pub index: u32,
}

/// Input kinds, sharing an encoding but sent in different phases
#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::Display)]
pub enum InputKind {
    Spend,
    Collateral,
    Reference,
}

/// Add an input to the transaction
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                      TX_HASH (32 bytes)                       /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        OUTPUT_INDEX                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TxInputAdd {
    pub kind: InputKind,
    pub input: TxInput,
}

impl TxInputAdd {
    pub fn new(kind: InputKind, input: TxInput) -> Self {
        Self { kind, input }
    }
}

impl TxItem for TxInputAdd {
    fn phase(&self) -> TxPhase {
        match self.kind {
            InputKind::Spend => TxPhase::Inputs,
            InputKind::Collateral => TxPhase::CollateralInputs,
            InputKind::Reference => TxPhase::ReferenceInputs,
        }
    }
}

impl ApduStatic for TxInputAdd {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }
}

impl Encode for TxInputAdd {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(HASH_LEN + 4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_slice(buff, &self.input.tx_hash)?;
        index += put_u32(&mut buff[index..], self.input.index)?;

        Ok(index)
    }
}
