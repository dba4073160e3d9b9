// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;

use super::{TxItem, TxPhase};
use crate::{path::DerivationPath, ApduError, ApduStatic, Command, Instruction, ADA_APDU_CLA};

/// Transaction confirmation APDU (no payload), the device responds with
/// the transaction body hash ([HashResp](crate::signature::HashResp))
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TxConfirm;

impl TxItem for TxConfirm {
    fn phase(&self) -> TxPhase {
        TxPhase::Confirm
    }
}

impl ApduStatic for TxConfirm {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }
}

impl Encode for TxConfirm {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}

/// Witness request APDU, carrying the packed signing key path.
/// The device responds with a
/// [SignatureResp](crate::signature::SignatureResp).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxWitness(pub DerivationPath);

impl TxItem for TxWitness {
    fn phase(&self) -> TxPhase {
        TxPhase::Witnesses
    }
}

impl ApduStatic for TxWitness {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }
}

impl Encode for TxWitness {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        self.0.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        self.0.encode(buff)
    }
}

#[cfg(test)]
mod test {
    use core::str::FromStr;

    use super::*;

    #[test]
    fn confirm_and_witness_frames() {
        assert_eq!(TxConfirm.frame().unwrap().to_vec(), [0xd7, 0x21, 0x0a, 0x00, 0x00]);

        let f = TxWitness(DerivationPath::from_str("m/1852'/1815'/0'/0/0").unwrap())
            .frame()
            .unwrap();
        assert_eq!((f.p1(), f.payload().len()), (0x0f, 21));
    }
}
