// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger Cardano API Library (and CLI)
//!
//! Sequences [ledger_ada_apdu] command frames into exchanges with a device
//! via [ledger_lib] transports, either HID or the emulator TCP socket.

/// Re-export `ledger-ada-apdu` for consumers
pub use ledger_ada_apdu::{self as apdu};

/// Re-export `ledger-lib` transports and the [Exchange] trait
pub use ledger_lib::{self, Exchange};

mod exchange;
pub use exchange::MAX_RESPONSE_LEN;

mod handle;
pub use handle::{DeviceHandle, Pending, VoteSignature};

mod error;
pub use error::Error;

/// Transports for device communication
pub mod transport;

pub mod tx;
pub use tx::{SignedTx, TransactionHandle, Witness};
