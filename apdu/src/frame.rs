// Copyright (c) 2022-2023 The MobileCoin Foundation

//! APDU frame codec
//!
//! Frames consist of a fixed 5-byte header followed by a payload of at most
//! [MAX_PAYLOAD_LEN] bytes. This layer knows nothing about payload semantics,
//! larger logical payloads must be split by the command builders prior to framing.
//!
//! ## Encoding:
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      CLA      |      INS      |      P1       |      P2       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      LEN      |                                               |
//! +-+-+-+-+-+-+-+-+                                               +
//! /                            PAYLOAD                            /
//! /                     (LEN bytes, max 255)                      /
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use alloc::vec::Vec;

use encdec::{DecodeOwned, Encode};

use crate::{helpers::put_slice, ApduError, ApduHeader, Command, Instruction, ADA_APDU_CLA};

/// Length of the fixed frame header
pub const HEADER_LEN: usize = 5;

/// Maximum frame payload length
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Command frame, an [ApduHeader] with a bounded payload
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    header: ApduHeader,
    payload: heapless::Vec<u8, MAX_PAYLOAD_LEN>,
}

impl Frame {
    /// Serialize a frame for the provided instruction, parameters, and payload.
    ///
    /// Payloads longer than [MAX_PAYLOAD_LEN] are rejected with
    /// [ApduError::PayloadTooLarge], callers must chunk these beforehand.
    pub fn new(ins: Instruction, p1: u8, p2: u8, payload: &[u8]) -> Result<Self, ApduError> {
        let header = ApduHeader {
            cla: ADA_APDU_CLA,
            ins: ins as u8,
            p1,
            p2,
        };

        Self::with_header(header, payload)
    }

    /// Serialize a frame with a prepared header
    pub fn with_header(header: ApduHeader, payload: &[u8]) -> Result<Self, ApduError> {
        let payload = heapless::Vec::from_slice(payload).map_err(|_| {
            #[cfg(feature = "log")]
            log::error!(
                "unchunked payload ({} bytes) for ins {:#04x}",
                payload.len(),
                header.ins
            );
            ApduError::PayloadTooLarge(payload.len())
        })?;

        Ok(Self { header, payload })
    }

    /// Serialize a typed [Command] into a frame
    pub fn from_command<C: Command>(cmd: &C) -> Result<Self, ApduError> {
        let n = cmd.encode_len()?;
        if n > MAX_PAYLOAD_LEN {
            #[cfg(feature = "log")]
            log::error!("unchunked payload ({n} bytes) for ins {:#04x}", C::INS);
            return Err(ApduError::PayloadTooLarge(n));
        }

        let mut buff = [0u8; MAX_PAYLOAD_LEN];
        let n = cmd.encode(&mut buff[..n])?;

        let f = Self::with_header(cmd.header(), &buff[..n])?;

        #[cfg(feature = "log")]
        log::trace!("frame: {f:02x?}");

        Ok(f)
    }

    /// Fetch frame header
    pub fn header(&self) -> &ApduHeader {
        &self.header
    }

    /// Fetch instruction code
    pub fn ins(&self) -> u8 {
        self.header.ins
    }

    /// Fetch parameter 1
    pub fn p1(&self) -> u8 {
        self.header.p1
    }

    /// Fetch parameter 2
    pub fn p2(&self) -> u8 {
        self.header.p2
    }

    /// Fetch frame payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Encode the complete frame (header and payload) to a vector
    pub fn to_vec(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(HEADER_LEN + self.payload.len());

        v.extend_from_slice(&[
            self.header.cla,
            self.header.ins,
            self.header.p1,
            self.header.p2,
            self.payload.len() as u8,
        ]);
        v.extend_from_slice(&self.payload);

        v
    }
}

impl Encode for Frame {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(HEADER_LEN + self.payload.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < HEADER_LEN + self.payload.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.header.cla;
        buff[1] = self.header.ins;
        buff[2] = self.header.p1;
        buff[3] = self.header.p2;
        buff[4] = self.payload.len() as u8;

        let n = put_slice(&mut buff[HEADER_LEN..], &self.payload)?;

        Ok(HEADER_LEN + n)
    }
}

impl DecodeOwned for Frame {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < HEADER_LEN {
            return Err(ApduError::InvalidLength);
        }

        let header = ApduHeader {
            cla: buff[0],
            ins: buff[1],
            p1: buff[2],
            p2: buff[3],
        };

        let n = buff[4] as usize;
        if buff.len() < HEADER_LEN + n {
            return Err(ApduError::InvalidLength);
        }

        let payload = heapless::Vec::from_slice(&buff[HEADER_LEN..][..n])
            .map_err(|_| ApduError::InvalidLength)?;

        Ok((Self { header, payload }, HEADER_LEN + n))
    }
}

#[cfg(test)]
mod test {
    use alloc::vec;

    use super::*;

    #[test]
    fn serialize_header_and_payload() {
        let f = Frame::new(Instruction::SignTx, 0x03, 0x30, &[0xaa, 0xbb]).unwrap();

        assert_eq!(f.to_vec(), vec![0xd7, 0x21, 0x03, 0x30, 0x02, 0xaa, 0xbb]);

        let mut buff = [0u8; 16];
        let n = f.encode(&mut buff).unwrap();
        assert_eq!(&buff[..n], &f.to_vec()[..]);

        let (d, m) = Frame::decode_owned(&buff[..n]).unwrap();
        assert_eq!(d, f);
        assert_eq!(m, n);
    }

    #[test]
    fn command_header_from_apdu_static() {
        use crate::{tx::TxConfirm, version::GetSerial, ApduStatic};

        assert_eq!((GetSerial::CLA, GetSerial::INS), (ADA_APDU_CLA, 0x01));

        let f = GetSerial.frame().unwrap();
        assert_eq!(f.header(), &GetSerial.header());
        assert_eq!(f.to_vec(), vec![0xd7, 0x01, 0x00, 0x00, 0x00]);

        // Parameters are taken from the command
        let h = TxConfirm.header();
        assert_eq!((h.cla, h.ins, h.p1, h.p2), (0xd7, 0x21, 0x0a, 0x00));
        assert_eq!(TxConfirm.frame().unwrap().header(), &h);
    }

    #[test]
    fn empty_payload() {
        let f = Frame::new(Instruction::GetVersion, 0, 0, &[]).unwrap();
        assert_eq!(f.to_vec(), vec![0xd7, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn payload_limit() {
        let max = vec![0x5a; MAX_PAYLOAD_LEN];
        let f = Frame::new(Instruction::SignMessage, 0x02, 0, &max).unwrap();
        assert_eq!(f.to_vec()[4], 0xff);
        assert_eq!(f.payload().len(), MAX_PAYLOAD_LEN);

        let over = vec![0x5a; MAX_PAYLOAD_LEN + 1];
        assert_eq!(
            Frame::new(Instruction::SignMessage, 0x02, 0, &over),
            Err(ApduError::PayloadTooLarge(MAX_PAYLOAD_LEN + 1))
        );
    }

    #[test]
    fn decode_truncated_frame() {
        assert_eq!(
            Frame::decode_owned(&[0xd7, 0x10, 0x00, 0x00, 0x04, 0x01]),
            Err(ApduError::InvalidLength)
        );
    }
}
