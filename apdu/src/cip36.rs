// Copyright (c) 2022-2023 The MobileCoin Foundation

//! CIP-36 governance vote signing APDUs
//!
//! Vote signing is a four step exchange: [VoteInit] carries the total
//! vote-cast length with the first chunk, [VoteChunk] frames carry the
//! remaining bytes, [VoteConfirm] finalises (the device responds with the
//! vote-cast data hash) and [VoteWitness] requests the signature.
//!
//! [Cip36Vote] threads chunk state between these steps.

use alloc::vec::Vec;

use encdec::Encode;
use num_enum::TryFromPrimitive;

use crate::{
    chunk::{ChunkCursor, MAX_CHUNK_SIZE},
    frame::Frame,
    helpers::{len_u32, put_slice, put_u32},
    path::DerivationPath,
    ApduError, ApduStatic, Command, Instruction, ADA_APDU_CLA,
};

/// Maximum vote-cast bytes carried per frame
pub const MAX_CIP36_PAYLOAD_SIZE: usize = MAX_CHUNK_SIZE;

/// Vote signing steps (P1)
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum VoteStep {
    Init = 0x01,
    Chunk = 0x02,
    Confirm = 0x03,
    Witness = 0x04,
}

/// Vote signing initialisation APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         TOTAL_LENGTH                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /               VOTE_CAST_DATA (first, max 240 bytes)           /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VoteInit<'a> {
    pub total_len: u32,
    pub chunk: &'a [u8],
}

impl<'a> ApduStatic for VoteInit<'a> {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignCip36Vote as u8;

    fn p1(&self) -> u8 {
        VoteStep::Init as u8
    }
}

impl<'a> Encode for VoteInit<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + self.chunk.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u32(buff, self.total_len)?;
        index += put_slice(&mut buff[index..], self.chunk)?;

        Ok(index)
    }
}

/// Vote-cast continuation APDU, raw bytes with no length prefix
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VoteChunk<'a>(pub &'a [u8]);

impl<'a> ApduStatic for VoteChunk<'a> {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignCip36Vote as u8;

    fn p1(&self) -> u8 {
        VoteStep::Chunk as u8
    }
}

impl<'a> Encode for VoteChunk<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.0.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        put_slice(buff, self.0)
    }
}

/// Vote confirmation APDU (no payload), the device responds with the
/// vote-cast data hash ([HashResp](crate::signature::HashResp))
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VoteConfirm;

impl ApduStatic for VoteConfirm {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignCip36Vote as u8;

    fn p1(&self) -> u8 {
        VoteStep::Confirm as u8
    }
}

impl Encode for VoteConfirm {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}

/// Vote witness APDU, carrying the packed signing key path.
/// The device responds with a [SignatureResp](crate::signature::SignatureResp).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VoteWitness(pub DerivationPath);

impl ApduStatic for VoteWitness {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignCip36Vote as u8;

    fn p1(&self) -> u8 {
        VoteStep::Witness as u8
    }
}

impl Encode for VoteWitness {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        self.0.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        self.0.encode(buff)
    }
}

/// Chunk state for a single vote-cast payload.
///
/// [Cip36Vote::init] must be called exactly once before [Cip36Vote::chunks].
#[derive(Clone, Debug, PartialEq)]
pub struct Cip36Vote<'a> {
    cursor: ChunkCursor<'a>,
}

impl<'a> Cip36Vote<'a> {
    /// Create vote state over hex-decoded vote-cast data
    pub fn new(vote_cast: &'a [u8]) -> Self {
        Self {
            cursor: ChunkCursor::new(vote_cast, MAX_CIP36_PAYLOAD_SIZE),
        }
    }

    /// Vote-cast bytes not yet framed
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Check whether every vote-cast byte has been framed
    pub fn is_done(&self) -> bool {
        self.cursor.is_done()
    }

    /// Build the init frame, consuming the first chunk
    pub fn init(&mut self) -> Result<Frame, ApduError> {
        let total_len = len_u32(self.cursor.total_len())?;
        let chunk = self.cursor.first()?;

        VoteInit { total_len, chunk }.frame()
    }

    /// Build frames for all remaining vote-cast bytes, in order
    pub fn chunks(&mut self) -> Result<Vec<Frame>, ApduError> {
        let mut frames = Vec::new();

        while let Some(c) = self.cursor.next_chunk()? {
            frames.push(VoteChunk(c).frame()?);
        }

        #[cfg(feature = "log")]
        log::debug!("{} vote chunk frames", frames.len());

        Ok(frames)
    }

    /// Build the confirm frame
    pub fn confirm(&self) -> Result<Frame, ApduError> {
        VoteConfirm.frame()
    }

    /// Build the witness frame for the provided signing path
    pub fn witness(&self, path: &DerivationPath) -> Result<Frame, ApduError> {
        VoteWitness(path.clone()).frame()
    }
}
