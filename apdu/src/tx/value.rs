// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;

use super::{TxItem, TxPhase};
use crate::{
    helpers::{put_slice, put_u64},
    ApduError, ApduStatic, Command, Hash32, Instruction, ADA_APDU_CLA, HASH_LEN,
};

/// Single value transaction fields
#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::Display)]
pub enum ValueKind {
    Fee,
    Ttl,
    ValidityStart,
    TotalCollateral,
    Treasury,
    Donation,
}

/// Single value APDU (8-byte big-endian), for fee, TTL, validity interval
/// start, total collateral, treasury and donation
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TxValue {
    pub kind: ValueKind,
    pub value: u64,
}

impl TxValue {
    pub fn new(kind: ValueKind, value: u64) -> Self {
        Self { kind, value }
    }
}

impl TxItem for TxValue {
    fn phase(&self) -> TxPhase {
        match self.kind {
            ValueKind::Fee => TxPhase::Fee,
            ValueKind::Ttl => TxPhase::Ttl,
            ValueKind::ValidityStart => TxPhase::ValidityStart,
            ValueKind::TotalCollateral => TxPhase::TotalCollateral,
            ValueKind::Treasury => TxPhase::Treasury,
            ValueKind::Donation => TxPhase::Donation,
        }
    }
}

impl ApduStatic for TxValue {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }
}

impl Encode for TxValue {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(8)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        put_u64(buff, self.value)
    }
}

/// Script data hash APDU
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TxScriptDataHash(pub Hash32);

impl TxItem for TxScriptDataHash {
    fn phase(&self) -> TxPhase {
        TxPhase::ScriptDataHash
    }
}

impl ApduStatic for TxScriptDataHash {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }
}

impl Encode for TxScriptDataHash {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(HASH_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        put_slice(buff, &self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn value_frames() {
        for (kind, p1) in [
            (ValueKind::Fee, 0x04),
            (ValueKind::Ttl, 0x05),
            (ValueKind::ValidityStart, 0x09),
            (ValueKind::TotalCollateral, 0x10),
            (ValueKind::Treasury, 0x15),
            (ValueKind::Donation, 0x16),
        ] {
            let f = TxValue::new(kind, 0x0102_0304_0506_0708).frame().unwrap();

            assert_eq!(f.to_vec(), [0xd7, 0x21, p1, 0x00, 0x08, 1, 2, 3, 4, 5, 6, 7, 8], "{kind}");
        }

        let f = TxScriptDataHash([0xfe; HASH_LEN]).frame().unwrap();
        assert_eq!((f.p1(), f.payload().len()), (0x0c, HASH_LEN));
    }
}
