// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;
use num_enum::TryFromPrimitive;

use super::{TxItem, TxPhase};
use crate::{
    helpers::{put_slice, put_u8},
    path::DerivationPath,
    ApduError, ApduStatic, Command, Instruction, KeyHash, ADA_APDU_CLA, KEY_HASH_LEN,
};

#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum RequiredSignerType {
    Path = 0x00,
    Hash = 0x01,
}

/// Required signer APDU, a device key path or key hash
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RequiredSigner {
    Path(DerivationPath),
    Hash(KeyHash),
}

impl RequiredSigner {
    pub fn kind(&self) -> RequiredSignerType {
        match self {
            RequiredSigner::Path(_) => RequiredSignerType::Path,
            RequiredSigner::Hash(_) => RequiredSignerType::Hash,
        }
    }
}

impl TxItem for RequiredSigner {
    fn phase(&self) -> TxPhase {
        TxPhase::RequiredSigners
    }
}

impl ApduStatic for RequiredSigner {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }
}

impl Encode for RequiredSigner {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let n = match self {
            RequiredSigner::Path(p) => p.encode_len()?,
            RequiredSigner::Hash(_) => KEY_HASH_LEN,
        };
        Ok(1 + n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u8(buff, self.kind() as u8)?;

        index += match self {
            RequiredSigner::Path(p) => p.encode(&mut buff[index..])?,
            RequiredSigner::Hash(h) => put_slice(&mut buff[index..], h)?,
        };

        Ok(index)
    }
}
