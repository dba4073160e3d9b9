// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Device transports
//!
//! Devices are discovered and connected via [LedgerProvider] (HID and TCP),
//! [connect_tcp] connects directly to a Speculos emulator APDU socket, and
//! [DryRun] prints frames without a device.

use std::{net::SocketAddr, time::Duration};

use async_trait::async_trait;
use log::debug;

pub use ledger_lib::{
    transport::{GenericDevice, TcpInfo, TcpTransport},
    Filters, LedgerHandle, LedgerInfo, LedgerProvider, Transport,
};

use ledger_ada_apdu::status::StatusCode;

use crate::{Error, Exchange};

/// Connect to an emulator APDU socket
pub async fn connect_tcp(addr: SocketAddr) -> Result<GenericDevice, Error> {
    debug!("Connecting to {addr}");

    let mut t = TcpTransport::new()?;
    let d = t.connect(TcpInfo { addr }).await?;

    Ok(d.into())
}

/// Dry-run transport, prints each frame as hex and responds with
/// zero-filled data and a success status
#[derive(Clone, Debug, Default)]
pub struct DryRun {
    frames: Vec<Vec<u8>>,
}

/// Data length of dry-run responses, sized for the largest fixed response
const DRY_RUN_RESP_LEN: usize = 128;

impl DryRun {
    /// Frames sent via this transport
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }
}

#[async_trait]
impl Exchange for DryRun {
    async fn exchange(
        &mut self,
        command: &[u8],
        _timeout: Duration,
    ) -> Result<Vec<u8>, ledger_lib::Error> {
        println!("{}", hex::encode(command));
        self.frames.push(command.to_vec());

        let mut resp = vec![0u8; DRY_RUN_RESP_LEN];
        resp.extend_from_slice(&(StatusCode::Success as u16).to_be_bytes());

        Ok(resp)
    }
}
