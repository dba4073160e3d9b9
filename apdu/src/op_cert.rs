// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Operational certificate signing APDU

use encdec::Encode;

use crate::{
    helpers::{put_slice, put_u64},
    path::DerivationPath,
    ApduError, ApduStatic, Command, Instruction, ADA_APDU_CLA,
};

/// Length of a KES public key
pub const KES_KEY_LEN: usize = 32;

/// Operational certificate signing APDU, signed with the pool cold key.
/// The device responds with a [SignatureResp](crate::signature::SignatureResp).
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                        KES_PUBLIC_KEY                         /
/// /                          (32 bytes)                           /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          KES_PERIOD                           |
/// |                         (8-byte u64)                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         ISSUE_COUNTER                         |
/// |                         (8-byte u64)                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                    COLD_KEY_PATH (packed)                     /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SignOpCert {
    pub kes_public_key: [u8; KES_KEY_LEN],
    pub kes_period: u64,
    pub issue_counter: u64,
    pub path: DerivationPath,
}

impl ApduStatic for SignOpCert {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignOpCert as u8;
}

impl Encode for SignOpCert {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(KES_KEY_LEN + 8 + 8 + self.path.encode_len()?)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_slice(buff, &self.kes_public_key)?;
        index += put_u64(&mut buff[index..], self.kes_period)?;
        index += put_u64(&mut buff[index..], self.issue_counter)?;
        index += self.path.encode(&mut buff[index..])?;

        Ok(index)
    }
}
