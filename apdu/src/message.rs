// Copyright (c) 2022-2023 The MobileCoin Foundation

//! CIP-8 message signing APDUs
//!
//! Messages are signed in three steps: [MessageInit] announces the message
//! length, signing key and display options, [MessageChunk] frames carry the
//! message bytes and [MessageConfirm] finalises, returning a
//! [MessageSignatureResp].
//!
//! The first chunk is smaller than later chunks as the device shares its
//! buffer with the init fields, and smaller again for hex display.

use alloc::vec::Vec;

use encdec::{DecodeOwned, Encode};
use num_enum::TryFromPrimitive;

use crate::{
    address::AddressParams,
    chunk::{Chunk, ChunkCursor},
    frame::Frame,
    helpers::{get_arr, get_u32, len_u32, put_u32, put_u8},
    path::DerivationPath,
    pubkey::PUBLIC_KEY_LEN,
    signature::SIGNATURE_LEN,
    ApduError, ApduStatic, Command, Included, Instruction, ADA_APDU_CLA,
};

/// First chunk size for messages displayed as ascii
pub const MAX_FIRST_CHUNK_ASCII: usize = 198;

/// First chunk size for messages displayed as hex
pub const MAX_FIRST_CHUNK_HEX: usize = 99;

/// Size of every chunk after the first
pub const MAX_CHUNK_SIZE: usize = 250;

/// Maximum length of a returned address field
pub const MAX_ADDRESS_FIELD_LEN: usize = 128;

/// Message signing steps (P1)
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum MessageStep {
    Init = 0x01,
    Chunk = 0x02,
    Confirm = 0x03,
}

/// Content of the COSE `address` header field
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum AddressFieldType {
    Address = 0x01,
    KeyHash = 0x02,
}

/// Message to be signed
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MessageData {
    /// Raw message bytes
    pub message: Vec<u8>,

    /// Signing key path
    pub signing_path: DerivationPath,

    /// Sign the blake2b-224 hash of the message rather than the message
    pub hash_payload: bool,

    /// Display the message as ascii (hex otherwise)
    pub is_ascii: bool,

    /// Address placed in the address field, the signing key hash when absent
    pub address: Option<AddressParams>,
}

impl MessageData {
    pub fn address_field_type(&self) -> AddressFieldType {
        match self.address {
            Some(_) => AddressFieldType::Address,
            None => AddressFieldType::KeyHash,
        }
    }

    /// First chunk size for the configured display mode
    pub fn first_chunk_size(&self) -> usize {
        match self.is_ascii {
            true => MAX_FIRST_CHUNK_ASCII,
            false => MAX_FIRST_CHUNK_HEX,
        }
    }
}

/// Message signing initialisation APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        MESSAGE_LENGTH                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                   SIGNING_PATH (packed)                       /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  HASH_PAYLOAD |    IS_ASCII   |  ADDR_FIELD   |               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+               +
/// /           ADDRESS_PARAMS (iff ADDR_FIELD is Address)          /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MessageInit<'a> {
    pub msg_len: u32,
    pub data: &'a MessageData,
}

impl<'a> ApduStatic for MessageInit<'a> {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignMessage as u8;

    fn p1(&self) -> u8 {
        MessageStep::Init as u8
    }
}

impl<'a> Encode for MessageInit<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let mut len = 4 + self.data.signing_path.encode_len()? + 3;

        if let Some(a) = &self.data.address {
            len += a.encode_len()?;
        }

        Ok(len)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u32(buff, self.msg_len)?;
        index += self.data.signing_path.encode(&mut buff[index..])?;
        index += Included::from(self.data.hash_payload).encode(&mut buff[index..])?;
        index += Included::from(self.data.is_ascii).encode(&mut buff[index..])?;
        index += put_u8(&mut buff[index..], self.data.address_field_type() as u8)?;

        if let Some(a) = &self.data.address {
            index += a.encode(&mut buff[index..])?;
        }

        Ok(index)
    }
}

/// Message chunk APDU, a u32 chunk length followed by the chunk bytes
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct MessageChunk<'a>(pub Chunk<'a>);

impl<'a> ApduStatic for MessageChunk<'a> {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignMessage as u8;

    fn p1(&self) -> u8 {
        MessageStep::Chunk as u8
    }
}

impl<'a> Encode for MessageChunk<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        self.0.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        self.0.encode(buff)
    }
}

/// Message confirmation APDU (no payload)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct MessageConfirm;

impl ApduStatic for MessageConfirm {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignMessage as u8;

    fn p1(&self) -> u8 {
        MessageStep::Confirm as u8
    }
}

impl Encode for MessageConfirm {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}

/// Chunk state for signing a single message
#[derive(Clone, Debug, PartialEq)]
pub struct MessageSign<'a> {
    data: &'a MessageData,
    cursor: ChunkCursor<'a>,
    init: bool,
}

impl<'a> MessageSign<'a> {
    pub fn new(data: &'a MessageData) -> Self {
        Self {
            data,
            cursor: ChunkCursor::with_first(&data.message, data.first_chunk_size(), MAX_CHUNK_SIZE),
            init: false,
        }
    }

    /// Build the init frame, this must be called exactly once and before [MessageSign::chunks]
    pub fn init(&mut self) -> Result<Frame, ApduError> {
        if self.init {
            return Err(ApduError::ChunkOrder);
        }
        self.init = true;

        MessageInit {
            msg_len: len_u32(self.data.message.len())?,
            data: self.data,
        }
        .frame()
    }

    /// Build every chunk frame, an empty message produces a single empty chunk
    pub fn chunks(&mut self) -> Result<Vec<Frame>, ApduError> {
        if !self.init {
            return Err(ApduError::ChunkOrder);
        }

        let mut frames = alloc::vec![MessageChunk(Chunk(self.cursor.first()?)).frame()?];

        while let Some(c) = self.cursor.next_chunk()? {
            frames.push(MessageChunk(Chunk(c)).frame()?);
        }

        Ok(frames)
    }

    /// Build the confirm frame
    pub fn confirm(&self) -> Result<Frame, ApduError> {
        MessageConfirm.frame()
    }
}

/// Message signature response APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                     SIGNATURE (64 bytes)                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                SIGNING_PUBLIC_KEY (32 bytes)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      ADDRESS_FIELD_LENGTH                     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                 ADDRESS_FIELD (max 128 bytes)                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MessageSignatureResp {
    pub signature: [u8; SIGNATURE_LEN],
    pub signing_public_key: [u8; PUBLIC_KEY_LEN],
    pub address_field: Vec<u8>,
}

impl DecodeOwned for MessageSignatureResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        let (signature, n) = get_arr::<SIGNATURE_LEN>(buff)?;
        index += n;

        let (signing_public_key, n) = get_arr::<PUBLIC_KEY_LEN>(&buff[index..])?;
        index += n;

        let (len, n) = get_u32(&buff[index..])?;
        index += n;

        let len = len as usize;
        if len > MAX_ADDRESS_FIELD_LEN || buff.len() < index + len {
            return Err(ApduError::InvalidLength);
        }

        let address_field = buff[index..][..len].to_vec();
        index += len;

        Ok((
            Self {
                signature,
                signing_public_key,
                address_field,
            },
            index,
        ))
    }
}

#[cfg(test)]
mod test {
    use core::str::FromStr;

    use super::*;
    use crate::{
        address::{AddressType, Network},
        test::encode_payload,
    };

    fn message(message: Vec<u8>, is_ascii: bool) -> MessageData {
        MessageData {
            message,
            signing_path: DerivationPath::from_str("m/1852'/1815'/0'/0/0").unwrap(),
            hash_payload: false,
            is_ascii,
            address: None,
        }
    }

    #[test]
    fn ascii_message_chunks() {
        let m = message(alloc::vec![b'a'; 500], true);
        let mut s = MessageSign::new(&m);

        assert_eq!(s.chunks(), Err(ApduError::ChunkOrder));

        let init = s.init().unwrap();
        assert_eq!(&init.payload()[..4], &500u32.to_be_bytes());

        let chunks = s.chunks().unwrap();
        let lens: Vec<usize> = chunks.iter().map(|f| f.payload().len() - 4).collect();
        assert_eq!(lens, [198, 250, 52]);

        let rebuilt: Vec<u8> = chunks.iter().flat_map(|f| f.payload()[4..].to_vec()).collect();
        assert_eq!(rebuilt, m.message);

        assert_eq!(s.init(), Err(ApduError::ChunkOrder));
    }

    #[test]
    fn hex_message_first_chunk() {
        let m = message(alloc::vec![0xfe; 120], false);
        let mut s = MessageSign::new(&m);

        s.init().unwrap();
        let chunks = s.chunks().unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(&chunks[0].payload()[..4], &(MAX_FIRST_CHUNK_HEX as u32).to_be_bytes());
        assert_eq!(&chunks[1].payload()[..4], &21u32.to_be_bytes());
    }

    #[test]
    fn empty_message_single_chunk() {
        let m = message(Vec::new(), true);
        let mut s = MessageSign::new(&m);

        s.init().unwrap();
        let chunks = s.chunks().unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].payload(), &[0, 0, 0, 0]);
    }

    #[test]
    fn init_flags_and_address() {
        let mut m = message(b"hello".to_vec(), true);

        let buff = encode_payload(&MessageInit { msg_len: 5, data: &m });
        assert_eq!(buff.len(), 4 + 21 + 3);
        assert_eq!(&buff[25..], &[0x01, 0x02, 0x02]);

        m.hash_payload = true;
        m.address = Some(
            AddressParams::from_fixture(
                AddressType::EnterpriseKey,
                Network::MAINNET,
                "m/1852'/1815'/0'/0/0",
                "",
            )
            .unwrap(),
        );

        let buff = encode_payload(&MessageInit { msg_len: 5, data: &m });
        assert_eq!(&buff[25..28], &[0x02, 0x02, 0x01]);
        assert_eq!(buff[28], AddressType::EnterpriseKey as u8);
    }

    #[test]
    fn decode_message_signature() {
        let mut buff = alloc::vec![0x01; 64];
        buff.extend_from_slice(&[0x02; 32]);
        buff.extend_from_slice(&[0, 0, 0, 3, 0xa, 0xb, 0xc]);

        let (r, n) = MessageSignatureResp::decode_owned(&buff).unwrap();
        assert_eq!(n, buff.len());
        assert_eq!(r.address_field, [0xa, 0xb, 0xc]);
        assert_eq!(r.signing_public_key, [0x02; 32]);

        // Truncated address field
        assert_eq!(
            MessageSignatureResp::decode_owned(&buff[..buff.len() - 1]),
            Err(ApduError::InvalidLength)
        );
    }
}
