// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_ada_apdu::{status::StatusCode, ApduError};

/// Ledger Cardano API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// APDU encoding or decoding failed
    #[error("APDU error: {0}")]
    Apdu(ApduError),

    /// Device rejected the request
    #[error("Request rejected by device: {0}")]
    Rejected(StatusCode),

    /// Device returned a status word outside the app's set
    #[error("Unknown device status: {0:04x}")]
    UnknownStatus(u16),

    /// Ledger transport error
    #[error("Transport error: {0}")]
    Transport(ledger_lib::Error),

    /// Response length exceeds a single frame
    #[error("Invalid length")]
    InvalidLength,

    /// Unexpected APDU response
    #[error("Unexpected APDU response")]
    UnexpectedResponse,

    /// Background exchange task failed
    #[error("Exchange task failed")]
    Task,
}

impl From<ApduError> for Error {
    fn from(e: ApduError) -> Self {
        Error::Apdu(e)
    }
}

impl From<ledger_lib::Error> for Error {
    fn from(e: ledger_lib::Error) -> Self {
        Error::Transport(e)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(_: tokio::task::JoinError) -> Self {
        Error::Task
    }
}
