// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Textual fixture values
//!
//! Test vectors describe keys as either a derivation path (`m/1852'/1815'/0'`)
//! or a hex string (a key or script hash), distinguished only by the `m/`
//! prefix. The wire format carries no such ambiguity so this is resolved
//! here, at the input boundary, into a tagged value.

use alloc::vec::Vec;
use core::str::FromStr;

use crate::{path::DerivationPath, ApduError};

/// Path or raw bytes parsed from a fixture string
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOrBytes {
    Path(DerivationPath),
    Bytes(Vec<u8>),
}

impl PathOrBytes {
    /// Check whether a fixture string denotes a derivation path
    pub fn is_path(s: &str) -> bool {
        s.starts_with("m/")
    }

    /// Check whether the value is empty (no bytes supplied)
    pub fn is_empty(&self) -> bool {
        matches!(self, PathOrBytes::Bytes(b) if b.is_empty())
    }
}

impl FromStr for PathOrBytes {
    type Err = ApduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::is_path(s) {
            true => Ok(Self::Path(DerivationPath::from_str(s)?)),
            false => Ok(Self::Bytes(hex::decode(s)?)),
        }
    }
}

impl From<DerivationPath> for PathOrBytes {
    fn from(p: DerivationPath) -> Self {
        Self::Path(p)
    }
}
