// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Device status words and raw response splitting
//!
//! Every device response ends with a 2-byte big-endian status word.
//! [StatusCode::Success] is the only status accepted for continuation of a
//! multi-frame operation, anything else is a rejection.

use alloc::vec::Vec;

use byteorder::{BigEndian, ByteOrder};
use encdec::DecodeOwned;
use num_enum::TryFromPrimitive;

use crate::ApduError;

/// Length of the trailing status word
pub const STATUS_LEN: usize = 2;

/// Cardano app status words
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, strum::Display)]
#[repr(u16)]
pub enum StatusCode {
    Success = 0x9000,
    MalformedRequestHeader = 0x6e01,
    BadCla = 0x6e02,
    UnknownIns = 0x6e03,
    StillInCall = 0x6e04,
    InvalidRequestParameters = 0x6e05,
    InvalidState = 0x6e06,
    InvalidData = 0x6e07,
    RejectedByUser = 0x6e09,
    RejectedByPolicy = 0x6e10,
    DeviceLocked = 0x6e11,
}

/// Raw device response, data followed by a status word
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub data: Vec<u8>,
    pub status: u16,
}

impl Response {
    /// Create a response from data and a known status
    pub fn new(data: &[u8], status: StatusCode) -> Self {
        Self {
            data: data.to_vec(),
            status: status as u16,
        }
    }

    /// Known status code, `None` for status words outside the app's set
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::try_from(self.status).ok()
    }

    /// Check whether the device accepted the request
    pub fn is_success(&self) -> bool {
        self.status_code() == Some(StatusCode::Success)
    }

    /// Encode response to raw bytes (data then status word)
    pub fn to_vec(&self) -> Vec<u8> {
        let mut v = self.data.clone();
        v.extend_from_slice(&self.status.to_be_bytes());
        v
    }
}

impl DecodeOwned for Response {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < STATUS_LEN {
            return Err(ApduError::InvalidLength);
        }

        let (data, sw) = buff.split_at(buff.len() - STATUS_LEN);

        Ok((
            Self {
                data: data.to_vec(),
                status: BigEndian::read_u16(sw),
            },
            buff.len(),
        ))
    }
}
