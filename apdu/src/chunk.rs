// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Chunking for payloads exceeding a single frame
//!
//! Logical payloads (vote-cast data, messages, inline datums, reference
//! scripts) are split into bounded slices by a [ChunkCursor]. The first
//! frame of a chunked payload always carries the total payload length, so
//! the device can track progress, with subsequent frames carrying only the
//! remaining bytes.

use encdec::Encode;

use crate::{
    helpers::{len_u32, put_sized, put_u32},
    ApduError,
};

/// Maximum chunk size for inline datums, reference scripts and vote-cast data
pub const MAX_CHUNK_SIZE: usize = 240;

/// Cursor over a borrowed payload, yielding bounded chunks.
///
/// The cursor only advances, once the first chunk has been taken it can not
/// be restarted. A cursor over an empty payload yields a single empty chunk
/// so every chunked payload produces at least the initial frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkCursor<'a> {
    data: &'a [u8],
    index: usize,
    first_size: usize,
    chunk_size: usize,
    started: bool,
}

impl<'a> ChunkCursor<'a> {
    /// Create a cursor emitting chunks of up to `chunk_size` bytes
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        Self::with_first(data, chunk_size, chunk_size)
    }

    /// Create a cursor with a different size for the first chunk
    pub fn with_first(data: &'a [u8], first_size: usize, chunk_size: usize) -> Self {
        Self {
            data,
            index: 0,
            first_size,
            chunk_size,
            started: false,
        }
    }

    /// Total length of the logical payload
    pub fn total_len(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes not yet emitted
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    /// Check whether the first chunk has been emitted
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Check whether all bytes have been emitted
    pub fn is_done(&self) -> bool {
        self.started && self.remaining() == 0
    }

    /// Take the first chunk, this must be called exactly once
    pub fn first(&mut self) -> Result<&'a [u8], ApduError> {
        if self.started {
            return Err(ApduError::ChunkOrder);
        }

        self.started = true;

        Ok(self.take(self.first_size))
    }

    /// Take the next subsequent chunk, `None` when exhausted
    pub fn next_chunk(&mut self) -> Result<Option<&'a [u8]>, ApduError> {
        if !self.started {
            return Err(ApduError::ChunkOrder);
        }

        match self.remaining() {
            0 => Ok(None),
            _ => Ok(Some(self.take(self.chunk_size))),
        }
    }

    fn take(&mut self, n: usize) -> &'a [u8] {
        let data = self.data;
        let n = n.min(data.len() - self.index);

        let c = &data[self.index..][..n];
        self.index += n;

        c
    }
}

impl<'a> Iterator for ChunkCursor<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        match self.started {
            false => self.first().ok(),
            true => self.next_chunk().ok().flatten(),
        }
    }
}

/// Initial chunk of a length-prefixed payload
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         TOTAL_LENGTH                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         CHUNK_LENGTH                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                      CHUNK (max 240 bytes)                    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FirstChunk<'a> {
    pub total_len: u32,
    pub chunk: &'a [u8],
}

impl<'a> FirstChunk<'a> {
    /// Take the first chunk from a cursor
    pub fn from_cursor(c: &mut ChunkCursor<'a>) -> Result<Self, ApduError> {
        let total_len = len_u32(c.total_len())?;
        let chunk = c.first()?;

        Ok(Self { total_len, chunk })
    }
}

impl<'a> Encode for FirstChunk<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + 4 + self.chunk.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u32(buff, self.total_len)?;
        index += put_sized(&mut buff[index..], self.chunk)?;

        Ok(index)
    }
}

/// Subsequent chunk of a length-prefixed payload
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         CHUNK_LENGTH                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                             CHUNK                             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Chunk<'a>(pub &'a [u8]);

impl<'a> Encode for Chunk<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + self.0.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        put_sized(buff, self.0)
    }
}

#[cfg(test)]
mod test {
    use alloc::vec::Vec;

    use rand::{random, thread_rng, RngCore};

    use super::*;
    use crate::test::encode_payload;

    #[test]
    fn chunks_reconstruct_payload() {
        for chunk_size in [1, 7, 99, 198, MAX_CHUNK_SIZE, 250] {
            let n = random::<usize>() % 2048;
            let mut data = alloc::vec![0u8; n];
            thread_rng().fill_bytes(&mut data);

            let chunks: Vec<&[u8]> = ChunkCursor::new(&data, chunk_size).collect();

            assert!(chunks.iter().all(|c| c.len() <= chunk_size));
            assert_eq!(chunks.concat(), data, "chunk size: {chunk_size}");
        }
    }

    #[test]
    fn first_chunk_sizes() {
        let data = [0xabu8; 500];
        let mut c = ChunkCursor::with_first(&data, 198, 250);

        assert!(!c.is_started());
        assert_eq!(c.total_len(), 500);

        assert_eq!(c.first().map(|v| v.len()), Ok(198));
        assert_eq!(c.remaining(), 302);
        assert_eq!(c.first(), Err(ApduError::ChunkOrder));

        assert_eq!(c.next_chunk().map(|v| v.map(|v| v.len())), Ok(Some(250)));
        assert_eq!(c.next_chunk().map(|v| v.map(|v| v.len())), Ok(Some(52)));
        assert!(c.is_done());
        assert_eq!(c.next_chunk(), Ok(None));
    }

    #[test]
    fn chunk_before_first() {
        let mut c = ChunkCursor::new(&[1, 2, 3], MAX_CHUNK_SIZE);
        assert_eq!(c.next_chunk(), Err(ApduError::ChunkOrder));
    }

    #[test]
    fn empty_payload_yields_single_chunk() {
        let chunks: Vec<&[u8]> = ChunkCursor::new(&[], MAX_CHUNK_SIZE).collect();
        assert_eq!(chunks, [&[] as &[u8]]);
    }

    #[test]
    fn encode_first_chunk() {
        let data = [0x11u8; 300];
        let mut c = ChunkCursor::new(&data, MAX_CHUNK_SIZE);

        let f = FirstChunk::from_cursor(&mut c).unwrap();
        let buff = encode_payload(&f);

        assert_eq!(&buff[..8], &[0x00, 0x00, 0x01, 0x2c, 0x00, 0x00, 0x00, 0xf0]);
        assert_eq!(buff.len(), 8 + MAX_CHUNK_SIZE);

        let next = c.next_chunk().unwrap().unwrap();
        let buff = encode_payload(&Chunk(next));
        assert_eq!(&buff[..4], &[0x00, 0x00, 0x00, 60]);
        assert_eq!(buff.len(), 4 + 60);
    }
}
