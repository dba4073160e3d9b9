// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Signature and hash responses shared by the signing instructions

use encdec::DecodeOwned;

use crate::{helpers::get_arr, ApduError, Hash32, HASH_LEN};

/// Length of an Ed25519 signature
pub const SIGNATURE_LEN: usize = 64;

/// Signature response APDU, returned by transaction / vote witness requests
/// and operational certificate signing.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                           SIGNATURE                           /
/// /                    (64-byte Ed25519 signature)                /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SignatureResp {
    pub signature: [u8; SIGNATURE_LEN],
}

impl DecodeOwned for SignatureResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        let (signature, n) = get_arr::<SIGNATURE_LEN>(buff)?;
        Ok((Self { signature }, n))
    }
}

/// Hash response APDU, returned on transaction and vote confirmation
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct HashResp {
    pub hash: Hash32,
}

impl DecodeOwned for HashResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        let (hash, n) = get_arr::<HASH_LEN>(buff)?;
        Ok((Self { hash }, n))
    }
}

#[cfg(test)]
mod test {
    use rand::random;

    use super::*;

    #[test]
    fn decode_signature() {
        let mut buff = [0u8; SIGNATURE_LEN];
        for b in buff.iter_mut() {
            *b = random();
        }

        let (r, n) = SignatureResp::decode_owned(&buff).unwrap();
        assert_eq!((r.signature, n), (buff, SIGNATURE_LEN));

        assert_eq!(
            SignatureResp::decode_owned(&buff[..HASH_LEN]),
            Err(ApduError::InvalidLength)
        );
    }

    #[test]
    fn decode_hash() {
        let buff = [0x5au8; HASH_LEN];
        assert_eq!(
            HashResp::decode_owned(&buff),
            Ok((HashResp { hash: buff }, HASH_LEN))
        );
        assert!(HashResp::decode_owned(&[]).is_err());
    }
}
