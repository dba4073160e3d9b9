// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction APIs
//!
//! A [TransactionHandle] issues transaction items in phase order, checking
//! each against the counts and flags declared on init before any frame is
//! sent. A transaction that fails partway must be restarted from init.

use std::{sync::Arc, time::Duration};

use encdec::DecodeOwned;
use log::debug;
use tokio::sync::Mutex;

use ledger_ada_apdu::{
    frame::Frame,
    path::DerivationPath,
    signature::{HashResp, SignatureResp, SIGNATURE_LEN},
    tx::{Cip36ConfirmResp, TxConfirm, TxInit, TxPhase, TxProgress, TxStep, TxWitness},
    ApduError, Command, Hash32,
};

use crate::{
    exchange::exchange,
    handle::{decode, Pending},
    Error, Exchange,
};

/// Handle to a hardware wallet configured for transaction execution
///
/// See [DeviceHandle::transaction][super::DeviceHandle::transaction] to
/// create a [TransactionHandle]
pub struct TransactionHandle<T> {
    t: Arc<Mutex<T>>,

    /// Timeout for each item, any item may await user confirmation
    timeout: Duration,

    /// Phase tracking against the declared [TxInit]
    progress: TxProgress,

    /// Transaction body hash, set on confirmation
    tx_hash: Option<Hash32>,

    /// CIP-36 registration result, where included
    aux_data: Option<Cip36ConfirmResp>,

    /// Witnesses received
    witnesses: Vec<Witness>,
}

/// Transaction witness
#[derive(Clone, Debug, PartialEq)]
pub struct Witness {
    pub path: DerivationPath,
    pub signature: [u8; SIGNATURE_LEN],
}

/// Signed transaction result
#[derive(Clone, Debug, PartialEq)]
pub struct SignedTx {
    /// Transaction body hash
    pub tx_hash: Hash32,

    /// CIP-36 registration hash and signature, where included
    pub aux_data: Option<Cip36ConfirmResp>,

    /// Witnesses in request order
    pub witnesses: Vec<Witness>,
}

impl<T: Exchange + Send + 'static> TransactionHandle<T> {
    /// Initialise a new transaction
    pub(crate) async fn init(
        t: Arc<Mutex<T>>,
        init: TxInit,
        timeout: Duration,
    ) -> Result<Self, Error> {
        debug!("Starting transaction");

        exchange(&mut *t.lock().await, &init.frame()?, timeout).await?;

        Ok(Self {
            t,
            timeout,
            progress: TxProgress::new(init),
            tx_hash: None,
            aux_data: None,
            witnesses: Vec::new(),
        })
    }

    /// Fetch the current transaction phase
    pub fn phase(&self) -> TxPhase {
        self.progress.phase()
    }

    /// Issue a single transaction item, returning the response to its final frame
    pub async fn step(&mut self, step: &TxStep) -> Result<Vec<u8>, Error> {
        match step.phase {
            TxPhase::Confirm => {
                let hash = self.confirm().await?;
                Ok(hash.to_vec())
            }
            TxPhase::Witnesses => {
                // Witness steps carry the path, recover it from the frame payload
                let path = witness_path(step)?;
                let sig = self.witness(&path).await?;
                Ok(sig.to_vec())
            }
            TxPhase::AuxData => {
                let resp = self.send(step.phase, &step.frames).await?;

                if step.frames.len() > 1 {
                    self.aux_data = Some(decode(&resp)?);
                }

                Ok(resp)
            }
            _ => self.send(step.phase, &step.frames).await,
        }
    }

    /// Confirm the transaction, awaiting user approval.
    ///
    /// Returns the transaction body hash.
    pub async fn confirm(&mut self) -> Result<Hash32, Error> {
        self.progress.advance(TxPhase::Confirm)?;

        debug!("Awaiting transaction approval");

        let p = Pending::spawn(self.t.clone(), TxConfirm.frame()?, self.timeout);
        let r: HashResp = decode(&p.response().await?)?;

        self.tx_hash = Some(r.hash);

        Ok(r.hash)
    }

    /// Request a witness for the provided signing path
    pub async fn witness(&mut self, path: &DerivationPath) -> Result<[u8; SIGNATURE_LEN], Error> {
        self.progress.advance(TxPhase::Witnesses)?;

        debug!("Requesting witness for: {path}");

        let resp = self.exchange(&TxWitness(path.clone()).frame()?).await?;
        let r: SignatureResp = decode(&resp)?;

        self.witnesses.push(Witness {
            path: path.clone(),
            signature: r.signature,
        });

        Ok(r.signature)
    }

    /// Complete the transaction, all declared witnesses must have been requested
    pub fn finish(self) -> Result<SignedTx, Error> {
        match (self.progress.is_complete(), self.tx_hash) {
            (true, Some(tx_hash)) => Ok(SignedTx {
                tx_hash,
                aux_data: self.aux_data,
                witnesses: self.witnesses,
            }),
            _ => Err(ApduError::MissingItems(self.progress.phase()).into()),
        }
    }

    async fn send(&mut self, phase: TxPhase, frames: &[Frame]) -> Result<Vec<u8>, Error> {
        self.progress.advance(phase)?;

        let mut resp = Vec::new();
        for f in frames {
            resp = self.exchange(f).await?;
        }

        Ok(resp)
    }

    async fn exchange(&self, frame: &Frame) -> Result<Vec<u8>, Error> {
        let mut t = self.t.lock().await;
        exchange(&mut *t, frame, self.timeout).await
    }
}

fn witness_path(step: &TxStep) -> Result<DerivationPath, Error> {
    match step.frames.as_slice() {
        [f] => Ok(DerivationPath::decode_owned(f.payload())?.0),
        _ => Err(Error::UnexpectedResponse),
    }
}
