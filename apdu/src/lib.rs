// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for Cardano app communication
//!
//! This module provides the command encoding layer for the Cardano hardware wallet app,
//! split into a frame codec ([frame]) producing fixed 5-byte-header APDUs and a set of
//! typed command builders, one module per instruction family.
//!
//! Logical operations (signing a transaction, a vote, or a message) are decomposed into
//! ordered sequences of frames as the device only accepts bounded payloads and interleaves
//! user confirmation between steps. Unbounded payloads are split using [chunk::ChunkCursor].
//!
//! All field encodings are big-endian. Optional values are announced with an [Included]
//! byte (`0x02` present / `0x01` absent), never a plain boolean.

#![no_std]

extern crate alloc;

use core::fmt::Display;

use encdec::Encode;

pub mod address;
pub mod chunk;
pub mod cip36;
pub mod credential;
pub mod fixture;
pub mod frame;
pub mod governance;
pub mod message;
pub mod op_cert;
pub mod path;
pub mod prelude;
pub mod pubkey;
pub mod signature;
pub mod status;
pub mod tx;
pub mod version;

mod helpers;

use frame::Frame;
use tx::TxPhase;

/// Cardano APDU Class
pub const ADA_APDU_CLA: u8 = 0xd7;

/// Length of key, script and pool hashes (blake2b-224)
pub const KEY_HASH_LEN: usize = 28;

/// Length of transaction, datum and anchor hashes (blake2b-256)
pub const HASH_LEN: usize = 32;

/// Blake2b-224 hash of a key or script
pub type KeyHash = [u8; KEY_HASH_LEN];

/// Blake2b-256 hash
pub type Hash32 = [u8; HASH_LEN];

/// Cardano APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[repr(u8)]
pub enum Instruction {
    // General instructions
    /// Fetch application version
    GetVersion = 0x00,

    /// Fetch device serial
    GetSerial = 0x01,

    // Key / address instructions
    /// Fetch extended public key for a derivation path
    GetPublicKey = 0x10,

    /// Derive (and optionally display) an address
    DeriveAddress = 0x11,

    // Signing instructions
    /// Multi-stage transaction signing
    SignTx = 0x21,

    /// Sign an operational certificate
    SignOpCert = 0x22,

    /// Multi-stage CIP-36 vote signing
    SignCip36Vote = 0x23,

    /// Multi-stage CIP-8 message signing
    SignMessage = 0x24,
}

/// Presence marker for optional values.
///
/// Note this is _not_ a boolean, absent values are encoded as `0x01`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum Included {
    No = 0x01,
    Yes = 0x02,
}

impl From<bool> for Included {
    fn from(v: bool) -> Self {
        match v {
            true => Included::Yes,
            false => Included::No,
        }
    }
}

impl<T> From<&Option<T>> for Included {
    fn from(v: &Option<T>) -> Self {
        Included::from(v.is_some())
    }
}

impl Encode for Included {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        helpers::put_u8(buff, *self as u8)
    }
}

pub use ledger_proto::{ApduHeader, ApduStatic};

/// Command APDU, binds an encodable payload to the [ApduStatic] class,
/// instruction, and parameters.
///
/// Implemented for all [ApduStatic] payloads, see [Frame::from_command]
/// for conversion to wire frames.
pub trait Command: ApduStatic + Encode<Error = ApduError> {
    /// Build the frame header for this command
    fn header(&self) -> ApduHeader {
        ApduHeader {
            cla: Self::CLA,
            ins: Self::INS,
            p1: self.p1(),
            p2: self.p2(),
        }
    }

    /// Encode command into a single [Frame]
    fn frame(&self) -> Result<Frame, ApduError>
    where
        Self: Sized,
    {
        Frame::from_command(self)
    }
}

impl<T: ApduStatic + Encode<Error = ApduError>> Command for T {}

/// Cardano APDU encoding error
///
/// Encoding errors are fatal to the operation in progress, no frame is produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApduError {
    /// Buffer too short or field length invalid
    InvalidLength,

    /// Invalid value encountered while decoding
    InvalidEncoding,

    /// Payload exceeds the single frame limit and must be chunked by the caller
    PayloadTooLarge(usize),

    /// Variant (or variant combination) not supported by the protocol
    Unsupported(&'static str),

    /// Malformed derivation path
    InvalidPath,

    /// Malformed hex string
    InvalidHex,

    /// Chunk requested before the initial frame, or initial frame requested twice
    ChunkOrder,

    /// Transaction phase requested out of order
    UnexpectedPhase { actual: TxPhase, current: TxPhase },

    /// Transaction phase left before all declared items were sent
    MissingItems(TxPhase),

    /// More items sent than declared for a transaction phase
    TooManyItems(TxPhase),
}

impl Display for ApduError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ApduError::InvalidLength => write!(f, "invalid length"),
            ApduError::InvalidEncoding => write!(f, "invalid encoding"),
            ApduError::PayloadTooLarge(n) => {
                write!(f, "payload of {n} bytes exceeds single frame limit")
            }
            ApduError::Unsupported(v) => write!(f, "unsupported variant: {v}"),
            ApduError::InvalidPath => write!(f, "invalid derivation path"),
            ApduError::InvalidHex => write!(f, "invalid hex string"),
            ApduError::ChunkOrder => write!(f, "chunk sequence out of order"),
            ApduError::UnexpectedPhase { actual, current } => {
                write!(f, "unexpected phase {actual} (current: {current})")
            }
            ApduError::MissingItems(p) => write!(f, "missing items for phase {p}"),
            ApduError::TooManyItems(p) => write!(f, "too many items for phase {p}"),
        }
    }
}

impl From<encdec::Error> for ApduError {
    fn from(_: encdec::Error) -> Self {
        ApduError::InvalidLength
    }
}

impl From<hex::FromHexError> for ApduError {
    fn from(_: hex::FromHexError) -> Self {
        ApduError::InvalidHex
    }
}
