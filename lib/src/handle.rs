// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Handle for connected ledger devices
//!
//! This provides methods for interacting with the device
//! and is generic over [ledger_lib::Exchange] transports.
//!
//! Requests are either blocking ([DeviceHandle::request]), awaiting the
//! device response, or started with [DeviceHandle::start] where a user
//! confirmation occurs before the device responds, returning a [Pending]
//! exchange to be polled for completion.

use std::{sync::Arc, time::Duration};

use encdec::DecodeOwned;
use log::debug;
use tokio::{sync::Mutex, task::JoinHandle};

use ledger_ada_apdu::{
    address::{AddressMode, AddressParams, AddressResp, DeriveAddress},
    cip36::Cip36Vote,
    frame::Frame,
    message::{MessageData, MessageSign, MessageSignatureResp},
    op_cert::SignOpCert,
    path::DerivationPath,
    pubkey::{GetPublicKey, PublicKeyResp},
    signature::{HashResp, SignatureResp, SIGNATURE_LEN},
    tx::{Transaction, TxInit},
    version::{GetSerial, GetVersion, SerialResp, VersionResp},
    ApduError, Command, Hash32,
};

use crate::{
    exchange::exchange,
    tx::{SignedTx, TransactionHandle},
    Error, Exchange,
};

/// Cardano handle for a connected ledger device.
///
/// This is generic over [Exchange] types to support different
/// underlying transports
pub struct DeviceHandle<T> {
    /// Transport for communication
    t: Arc<Mutex<T>>,
    /// Timeout for user acknowledgements
    user_timeout_s: usize,
    /// Timeout for APDU requests
    request_timeout_s: usize,
}

impl<T> Clone for DeviceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            t: self.t.clone(),
            user_timeout_s: self.user_timeout_s,
            request_timeout_s: self.request_timeout_s,
        }
    }
}

/// Create a [DeviceHandle] wrapper from a type implementing [Exchange]
impl<T: Exchange> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
            user_timeout_s: 60,
            request_timeout_s: 2,
        }
    }
}

/// Started exchange awaiting device response
pub struct Pending {
    h: JoinHandle<Result<Vec<u8>, Error>>,
}

impl Pending {
    /// Spawn an exchange on the provided transport
    pub(crate) fn spawn<T: Exchange + Send + 'static>(
        t: Arc<Mutex<T>>,
        frame: Frame,
        timeout: Duration,
    ) -> Self {
        let h = tokio::spawn(async move {
            let mut t = t.lock().await;
            exchange(&mut *t, &frame, timeout).await
        });

        Self { h }
    }

    /// Check whether the device has responded
    pub fn is_finished(&self) -> bool {
        self.h.is_finished()
    }

    /// Await the device response
    pub async fn response(self) -> Result<Vec<u8>, Error> {
        self.h.await?
    }
}

/// Signed CIP-36 vote
#[derive(Clone, Debug, PartialEq)]
pub struct VoteSignature {
    /// Hash of the vote-cast data
    pub data_hash: Hash32,
    /// Witness signature over the data hash
    pub signature: [u8; SIGNATURE_LEN],
}

impl<T> DeviceHandle<T> {
    /// Set the user acknowledgement timeout in seconds
    pub fn with_user_timeout(mut self, seconds: usize) -> Self {
        self.user_timeout_s = seconds;
        self
    }

    /// Set the APDU request timeout in seconds
    pub fn with_request_timeout(mut self, seconds: usize) -> Self {
        self.request_timeout_s = seconds;
        self
    }

    /// Helper to fetch user interaction timeout
    fn user_timeout(&self) -> Duration {
        Duration::from_secs(self.user_timeout_s as u64)
    }

    /// Helper to fetch APDU request timeout
    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s as u64)
    }
}

impl<T: Exchange + Send + 'static> DeviceHandle<T> {
    /// Issue a request and await the response data
    pub async fn request(&self, frame: &Frame) -> Result<Vec<u8>, Error> {
        let mut t = self.t.lock().await;
        exchange(&mut *t, frame, self.request_timeout()).await
    }

    /// Issue a request, decoding the response data
    pub async fn request_decode<R>(&self, frame: &Frame) -> Result<R, Error>
    where
        R: DecodeOwned<Output = R, Error = ApduError>,
    {
        let resp = self.request(frame).await?;
        decode(&resp)
    }

    /// Start a request requiring user confirmation, returning a [Pending]
    /// handle to poll for the response.
    ///
    /// The transport remains locked until the device responds.
    pub fn start(&self, frame: Frame) -> Pending {
        Pending::spawn(self.t.clone(), frame, self.user_timeout())
    }

    /// Fetch application version
    pub async fn version(&self) -> Result<VersionResp, Error> {
        debug!("Requesting app version");
        self.request_decode(&GetVersion.frame()?).await
    }

    /// Fetch device serial
    pub async fn serial(&self) -> Result<SerialResp, Error> {
        debug!("Requesting serial");
        self.request_decode(&GetSerial.frame()?).await
    }

    /// Fetch the extended public key for a derivation path
    pub async fn public_key(&self, path: &DerivationPath) -> Result<PublicKeyResp, Error> {
        debug!("Requesting public key for: {path}");

        let req = GetPublicKey::new(path.clone());
        let p = self.start(req.frame()?);

        decode(&p.response().await?)
    }

    /// Derive an address, returning the raw address bytes
    pub async fn derive_address(&self, params: &AddressParams) -> Result<Vec<u8>, Error> {
        debug!("Deriving address: {params:?}");

        let req = DeriveAddress::new(AddressMode::Return, params.clone());
        let r: AddressResp = self.request_decode(&req.frame()?).await?;

        Ok(r.address)
    }

    /// Display an address on the device, completing once the user has
    /// acknowledged it
    pub async fn show_address(&self, params: &AddressParams) -> Result<(), Error> {
        debug!("Showing address: {params:?}");

        let req = DeriveAddress::new(AddressMode::Display, params.clone());
        self.start(req.frame()?).response().await?;

        Ok(())
    }

    /// Sign an operational certificate with the pool cold key
    pub async fn sign_op_cert(&self, cert: &SignOpCert) -> Result<[u8; SIGNATURE_LEN], Error> {
        debug!("Signing operational certificate (KES period: {})", cert.kes_period);

        let r: SignatureResp = decode(&self.start(cert.frame()?).response().await?)?;

        Ok(r.signature)
    }

    /// Sign CIP-36 vote-cast data with the key at the provided path
    pub async fn sign_vote(
        &self,
        vote_cast: &[u8],
        witness: &DerivationPath,
    ) -> Result<VoteSignature, Error> {
        let mut v = Cip36Vote::new(vote_cast);

        debug!("Signing vote ({} bytes)", vote_cast.len());

        self.request(&v.init()?).await?;
        for f in v.chunks()? {
            self.request(&f).await?;
        }

        // Confirmation awaits user approval
        let h: HashResp = decode(&self.start(v.confirm()?).response().await?)?;

        let s: SignatureResp = self.request_decode(&v.witness(witness)?).await?;

        Ok(VoteSignature {
            data_hash: h.hash,
            signature: s.signature,
        })
    }

    /// Sign a CIP-8 message
    pub async fn sign_message(&self, msg: &MessageData) -> Result<MessageSignatureResp, Error> {
        let mut m = MessageSign::new(msg);

        debug!(
            "Signing message ({} bytes, ascii: {})",
            msg.message.len(),
            msg.is_ascii
        );

        self.request(&m.init()?).await?;
        for f in m.chunks()? {
            self.request(&f).await?;
        }

        decode(&self.start(m.confirm()?).response().await?)
    }

    /// Start a transaction, returning a [TransactionHandle] for issuing
    /// each transaction item
    pub async fn transaction(&self, init: TxInit) -> Result<TransactionHandle<T>, Error> {
        TransactionHandle::init(self.t.clone(), init, self.user_timeout()).await
    }

    /// Sign a complete transaction
    pub async fn sign_transaction(&self, tx: &Transaction) -> Result<SignedTx, Error> {
        let steps = tx.steps()?;

        let mut h = self.transaction(tx.init()?).await?;

        // Init is issued by the handle
        for s in steps.iter().skip(1) {
            h.step(s).await?;
        }

        h.finish()
    }
}

/// Decode a typed response from response data
pub(crate) fn decode<R>(buff: &[u8]) -> Result<R, Error>
where
    R: DecodeOwned<Output = R, Error = ApduError>,
{
    let (r, _n) = R::decode_owned(buff)?;
    Ok(r)
}
