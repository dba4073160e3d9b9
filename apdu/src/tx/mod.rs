// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing APDUs.
//!
//! Transactions are streamed to the device in [TxPhase] order, each APDU
//! using [Instruction::SignTx](crate::Instruction::SignTx) with the phase
//! as P1 and (for multi-frame items) a sub-step as P2. [TxProgress] tracks
//! the phases and item counts declared in [TxInit].

mod phase;
pub use phase::*;

mod init;
pub use init::*;

mod input;
pub use input::*;

mod asset;
pub use asset::*;

mod datum;
pub use datum::*;

mod output;
pub use output::*;

mod value;
pub use value::*;

mod certificate;
pub use certificate::*;

mod withdrawal;
pub use withdrawal::*;

mod aux_data;
pub use aux_data::*;

mod mint;
pub use mint::*;

mod required_signer;
pub use required_signer::*;

mod witness;
pub use witness::*;

mod transaction;
pub use transaction::*;

/// Transaction item, binds an APDU to the phase it is sent in
pub trait TxItem {
    /// Phase (and P1 stage) for this item
    fn phase(&self) -> TxPhase;
}
