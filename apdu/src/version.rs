// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application version and device serial APDUs

use core::fmt::Display;

use encdec::{DecodeOwned, Encode};

use crate::{helpers::get_arr, ApduError, ApduStatic, Command, Instruction, ADA_APDU_CLA};

/// Fetch application version APDU (no payload)
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct GetVersion;

impl ApduStatic for GetVersion {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::GetVersion as u8;
}

impl Encode for GetVersion {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}

/// Application version response APDU
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     MAJOR     |     MINOR     |     PATCH     |     FLAGS     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VersionResp {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub flags: AppFlags,
}

bitflags::bitflags! {
    /// Application build flags
    pub struct AppFlags: u8 {
        /// Debug build
        const DEBUG = 1 << 0;

        /// Headless (automated confirmation) build
        const HEADLESS = 1 << 1;

        /// Reduced feature build for memory constrained devices
        const APP_XS = 1 << 2;
    }
}

impl Display for VersionResp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl DecodeOwned for VersionResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        let ([major, minor, patch, flags], n) = get_arr::<4>(buff)?;

        Ok((
            Self {
                major,
                minor,
                patch,
                flags: AppFlags::from_bits_truncate(flags),
            },
            n,
        ))
    }
}

/// Fetch device serial APDU (no payload)
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct GetSerial;

impl ApduStatic for GetSerial {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::GetSerial as u8;
}

impl Encode for GetSerial {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}

/// Length of the device serial
pub const SERIAL_LEN: usize = 7;

/// Device serial response APDU
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SerialResp {
    pub serial: [u8; SERIAL_LEN],
}

impl DecodeOwned for SerialResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        let (serial, n) = get_arr::<SERIAL_LEN>(buff)?;
        Ok((Self { serial }, n))
    }
}
