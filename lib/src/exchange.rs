// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Frame exchange over [ledger_lib::Exchange] transports

use std::time::Duration;

use encdec::DecodeOwned;
use ledger_lib::Exchange;
use log::trace;

use ledger_ada_apdu::{
    frame::{Frame, MAX_PAYLOAD_LEN},
    status::{Response, StatusCode, STATUS_LEN},
};

use crate::Error;

/// Maximum raw response length, a full payload and the status word
pub const MAX_RESPONSE_LEN: usize = MAX_PAYLOAD_LEN + STATUS_LEN;

/// Send a frame and split the response, non-success status words are
/// returned as errors
pub(crate) async fn exchange<T: Exchange + Send + ?Sized>(
    t: &mut T,
    frame: &Frame,
    timeout: Duration,
) -> Result<Vec<u8>, Error> {
    let req = frame.to_vec();
    trace!("tx: {}", hex::encode(&req));

    let raw = t.exchange(&req, timeout).await?;
    trace!("rx: {}", hex::encode(&raw));

    if raw.len() > MAX_RESPONSE_LEN {
        return Err(Error::InvalidLength);
    }

    let (resp, _) = Response::decode_owned(&raw)?;

    match resp.status_code() {
        Some(StatusCode::Success) => Ok(resp.data),
        Some(s) => Err(Error::Rejected(s)),
        None => Err(Error::UnknownStatus(resp.status)),
    }
}
