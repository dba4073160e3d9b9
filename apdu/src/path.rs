// Copyright (c) 2022-2023 The MobileCoin Foundation

//! BIP-32 derivation paths
//!
//! ## Encoding:
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      LEN      |                 INDEX[0] ...                  |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /              LEN x u32 big-endian indices (max 10)            /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use core::{fmt::Display, str::FromStr};

use encdec::{DecodeOwned, Encode};

use crate::{
    helpers::{get_u32, put_u32, put_u8},
    ApduError,
};

/// Maximum number of path components accepted by the device
pub const MAX_PATH_LEN: usize = 10;

/// Hardened derivation flag
pub const HARDENED: u32 = 0x8000_0000;

/// Derivation path of up to [MAX_PATH_LEN] indices
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(heapless::Vec<u32, MAX_PATH_LEN>);

impl DerivationPath {
    /// Create a derivation path from raw indices (hardened flag included)
    pub fn new(indices: &[u32]) -> Result<Self, ApduError> {
        heapless::Vec::from_slice(indices)
            .map(Self)
            .map_err(|_| ApduError::InvalidPath)
    }

    /// Fetch path indices
    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    /// Fetch path length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the path is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse `m/1852'/1815'/0'/0/1` style paths, `'` or `h` marking hardened indices
impl FromStr for DerivationPath {
    type Err = ApduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = match s {
            "m" => return Ok(Self::default()),
            _ => s.strip_prefix("m/").ok_or(ApduError::InvalidPath)?,
        };

        let mut p = heapless::Vec::new();

        for c in rest.split('/') {
            let (n, hardened) = match c.strip_suffix('\'').or_else(|| c.strip_suffix('h')) {
                Some(n) => (n, true),
                None => (c, false),
            };

            let i = u32::from_str(n).map_err(|_| ApduError::InvalidPath)?;
            if i >= HARDENED {
                return Err(ApduError::InvalidPath);
            }

            let i = match hardened {
                true => i | HARDENED,
                false => i,
            };

            p.push(i).map_err(|_| ApduError::InvalidPath)?;
        }

        Ok(Self(p))
    }
}

impl Display for DerivationPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "m")?;
        for i in self.0.iter() {
            match i & HARDENED != 0 {
                true => write!(f, "/{}'", i & !HARDENED)?,
                false => write!(f, "/{i}")?,
            }
        }
        Ok(())
    }
}

impl Encode for DerivationPath {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1 + self.0.len() * 4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u8(buff, self.0.len() as u8)?;

        for i in self.0.iter() {
            index += put_u32(&mut buff[index..], *i)?;
        }

        Ok(index)
    }
}

impl DecodeOwned for DerivationPath {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        let n = *buff.first().ok_or(ApduError::InvalidLength)? as usize;
        if n > MAX_PATH_LEN {
            return Err(ApduError::InvalidPath);
        }

        let mut index = 1;
        let mut p = heapless::Vec::new();

        for _ in 0..n {
            let (i, l) = get_u32(&buff[index..])?;
            index += l;

            p.push(i).map_err(|_| ApduError::InvalidPath)?;
        }

        Ok((Self(p), index))
    }
}
