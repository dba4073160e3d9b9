// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Stake / committee / DRep credentials

use core::str::FromStr;

use encdec::Encode;
use num_enum::TryFromPrimitive;

use crate::{
    address::key_hash,
    fixture::PathOrBytes,
    helpers::{put_slice, put_u8},
    path::DerivationPath,
    ApduError, KeyHash, KEY_HASH_LEN,
};

/// Credential type tags
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum CredentialType {
    KeyPath = 0x00,
    ScriptHash = 0x01,
    KeyHash = 0x02,
}

/// Credential, either a device key or a key / script hash
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     TYPE      |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /           PACKED PATH (KEY_PATH) or 28-byte HASH              /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    KeyPath(DerivationPath),
    ScriptHash(KeyHash),
    KeyHash(KeyHash),
}

impl Credential {
    /// Fetch credential type tag
    pub fn kind(&self) -> CredentialType {
        match self {
            Credential::KeyPath(_) => CredentialType::KeyPath,
            Credential::ScriptHash(_) => CredentialType::ScriptHash,
            Credential::KeyHash(_) => CredentialType::KeyHash,
        }
    }

    /// Build a key credential from a fixture string (path or key hash)
    pub fn key_from_fixture(s: &str) -> Result<Self, ApduError> {
        match PathOrBytes::from_str(s)? {
            PathOrBytes::Path(p) => Ok(Credential::KeyPath(p)),
            PathOrBytes::Bytes(b) => Ok(Credential::KeyHash(key_hash(&b)?)),
        }
    }

    /// Fetch the derivation path for device-owned credentials
    pub fn path(&self) -> Option<&DerivationPath> {
        match self {
            Credential::KeyPath(p) => Some(p),
            _ => None,
        }
    }
}

impl Encode for Credential {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let n = match self {
            Credential::KeyPath(p) => p.encode_len()?,
            Credential::ScriptHash(_) | Credential::KeyHash(_) => KEY_HASH_LEN,
        };
        Ok(1 + n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u8(buff, self.kind() as u8)?;

        index += match self {
            Credential::KeyPath(p) => p.encode(&mut buff[index..])?,
            Credential::ScriptHash(h) | Credential::KeyHash(h) => put_slice(&mut buff[index..], h)?,
        };

        Ok(index)
    }
}
