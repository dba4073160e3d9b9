// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Output datums and reference scripts

use alloc::vec::Vec;

use encdec::Encode;
use num_enum::TryFromPrimitive;

use super::{OutputStep, TxItem, TxPhase};
use crate::{
    chunk::{Chunk, ChunkCursor, FirstChunk, MAX_CHUNK_SIZE},
    frame::Frame,
    helpers::{put_slice, put_u8},
    ApduError, ApduStatic, Command, Hash32, Instruction, ADA_APDU_CLA, HASH_LEN,
};

/// Datum type tags
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum DatumType {
    Hash = 0x00,
    Inline = 0x01,
}

/// Output datum, referenced by hash or provided inline
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Datum {
    Hash(Hash32),
    Inline(Vec<u8>),
}

impl Datum {
    pub fn kind(&self) -> DatumType {
        match self {
            Datum::Hash(_) => DatumType::Hash,
            Datum::Inline(_) => DatumType::Inline,
        }
    }

    /// Build the frames for this datum, the datum header followed by any
    /// remaining inline chunks
    pub fn frames(&self, phase: TxPhase) -> Result<Vec<Frame>, ApduError> {
        match self {
            Datum::Hash(h) => Ok(alloc::vec![TxDatum {
                phase,
                value: DatumValue::Hash(h),
            }
            .frame()?]),
            Datum::Inline(d) => {
                let mut c = ChunkCursor::new(d, MAX_CHUNK_SIZE);

                let mut frames = alloc::vec![TxDatum {
                    phase,
                    value: DatumValue::Inline(FirstChunk::from_cursor(&mut c)?),
                }
                .frame()?];

                frames.extend(chunk_frames(phase, OutputStep::DatumChunk, &mut c)?);

                Ok(frames)
            }
        }
    }
}

/// Build the frames for a reference script
pub fn script_ref_frames(phase: TxPhase, script: &[u8]) -> Result<Vec<Frame>, ApduError> {
    let mut c = ChunkCursor::new(script, MAX_CHUNK_SIZE);

    let mut frames = alloc::vec![TxScriptRef {
        phase,
        first: FirstChunk::from_cursor(&mut c)?,
    }
    .frame()?];

    frames.extend(chunk_frames(phase, OutputStep::ScriptRefChunk, &mut c)?);

    Ok(frames)
}

fn chunk_frames(
    phase: TxPhase,
    step: OutputStep,
    c: &mut ChunkCursor,
) -> Result<Vec<Frame>, ApduError> {
    let mut frames = Vec::new();

    while let Some(chunk) = c.next_chunk()? {
        frames.push(
            TxOutputChunk {
                phase,
                step,
                chunk: Chunk(chunk),
            }
            .frame()?,
        );
    }

    Ok(frames)
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum DatumValue<'a> {
    Hash(&'a Hash32),
    Inline(FirstChunk<'a>),
}

/// Datum header APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     TYPE      |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /    DATUM_HASH (32 bytes) or TOTAL_LEN + CHUNK_LEN + CHUNK     /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxDatum<'a> {
    phase: TxPhase,
    value: DatumValue<'a>,
}

impl<'a> TxItem for TxDatum<'a> {
    fn phase(&self) -> TxPhase {
        self.phase
    }
}

impl<'a> ApduStatic for TxDatum<'a> {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase as u8
    }

    fn p2(&self) -> u8 {
        OutputStep::Datum as u8
    }
}

impl<'a> Encode for TxDatum<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let n = match &self.value {
            DatumValue::Hash(_) => HASH_LEN,
            DatumValue::Inline(c) => c.encode_len()?,
        };
        Ok(1 + n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        match &self.value {
            DatumValue::Hash(h) => {
                index += put_u8(buff, DatumType::Hash as u8)?;
                index += put_slice(&mut buff[index..], *h)?;
            }
            DatumValue::Inline(c) => {
                index += put_u8(buff, DatumType::Inline as u8)?;
                index += c.encode(&mut buff[index..])?;
            }
        }

        Ok(index)
    }
}

/// Reference script header APDU, carrying the total script length and first chunk
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxScriptRef<'a> {
    phase: TxPhase,
    first: FirstChunk<'a>,
}

impl<'a> TxItem for TxScriptRef<'a> {
    fn phase(&self) -> TxPhase {
        self.phase
    }
}

impl<'a> ApduStatic for TxScriptRef<'a> {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase as u8
    }

    fn p2(&self) -> u8 {
        OutputStep::ScriptRef as u8
    }
}

impl<'a> Encode for TxScriptRef<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        self.first.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        self.first.encode(buff)
    }
}

/// Subsequent datum or reference script chunk APDU
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxOutputChunk<'a> {
    phase: TxPhase,
    step: OutputStep,
    chunk: Chunk<'a>,
}

impl<'a> TxItem for TxOutputChunk<'a> {
    fn phase(&self) -> TxPhase {
        self.phase
    }
}

impl<'a> ApduStatic for TxOutputChunk<'a> {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase as u8
    }

    fn p2(&self) -> u8 {
        self.step as u8
    }
}

impl<'a> Encode for TxOutputChunk<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        self.chunk.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        self.chunk.encode(buff)
    }
}

#[cfg(test)]
mod test {
    use rand::{thread_rng, RngCore};

    use super::*;

    #[test]
    fn hash_datum_single_frame() {
        let frames = Datum::Hash([0x5e; HASH_LEN]).frames(TxPhase::Outputs).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!((frames[0].p1(), frames[0].p2()), (0x03, 0x34));
        assert_eq!(frames[0].payload()[0], 0x00);
        assert_eq!(frames[0].payload().len(), 1 + HASH_LEN);
    }

    #[test]
    fn inline_datum_chunks() {
        let mut d = alloc::vec![0u8; 600];
        thread_rng().fill_bytes(&mut d);

        let frames = Datum::Inline(d.clone()).frames(TxPhase::CollateralOutput).unwrap();

        // 240 in the header frame, then 240 and 120
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].p2(), 0x34);
        assert_eq!(&frames[0].payload()[..9], &[0x01, 0, 0, 0x02, 0x58, 0, 0, 0, 240]);

        let mut r = frames[0].payload()[9..].to_vec();
        for f in &frames[1..] {
            assert_eq!((f.p1(), f.p2()), (0x12, 0x35));
            r.extend_from_slice(&f.payload()[4..]);
        }

        assert_eq!(r, d);
    }

    #[test]
    fn script_ref_chunks() {
        let s = [0x82u8; 241];
        let frames = script_ref_frames(TxPhase::Outputs, &s).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].p2(), 0x36);
        assert_eq!(&frames[0].payload()[..8], &[0, 0, 0, 241, 0, 0, 0, 240]);
        assert_eq!(frames[1].p2(), 0x37);
        assert_eq!(frames[1].payload(), &[0, 0, 0, 1, 0x82]);
    }
}
