// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Extended public key APDUs

use encdec::{DecodeOwned, Encode};

use crate::{
    helpers::get_arr, path::DerivationPath, ApduError, ApduStatic, Command, Instruction,
    ADA_APDU_CLA,
};

/// Length of an Ed25519 public key
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of a BIP32-Ed25519 chain code
pub const CHAIN_CODE_LEN: usize = 32;

/// Public key request APDU, the payload is the packed derivation path
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GetPublicKey {
    pub path: DerivationPath,
}

impl GetPublicKey {
    pub fn new(path: DerivationPath) -> Self {
        Self { path }
    }
}

impl ApduStatic for GetPublicKey {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::GetPublicKey as u8;
}

impl Encode for GetPublicKey {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        self.path.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        self.path.encode(buff)
    }
}

/// Extended public key response APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                          PUBLIC_KEY                           /
/// /                   (32-byte Ed25519 public key)                /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                          CHAIN_CODE                           /
/// /                          (32 bytes)                           /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PublicKeyResp {
    pub public_key: [u8; PUBLIC_KEY_LEN],
    pub chain_code: [u8; CHAIN_CODE_LEN],
}

impl PublicKeyResp {
    /// Extended public key (key followed by chain code)
    pub fn xpub(&self) -> [u8; PUBLIC_KEY_LEN + CHAIN_CODE_LEN] {
        let mut x = [0u8; PUBLIC_KEY_LEN + CHAIN_CODE_LEN];
        x[..PUBLIC_KEY_LEN].copy_from_slice(&self.public_key);
        x[PUBLIC_KEY_LEN..].copy_from_slice(&self.chain_code);
        x
    }
}

impl DecodeOwned for PublicKeyResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        let (public_key, n) = get_arr::<PUBLIC_KEY_LEN>(buff)?;
        index += n;

        let (chain_code, n) = get_arr::<CHAIN_CODE_LEN>(&buff[index..])?;
        index += n;

        Ok((
            Self {
                public_key,
                chain_code,
            },
            index,
        ))
    }
}
