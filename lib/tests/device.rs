// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{str::FromStr, time::Duration};

use ledger_ada::{
    apdu::{
        address::{AddressParams, AddressType, Network},
        op_cert::SignOpCert,
        path::DerivationPath,
        status::StatusCode,
        version::{AppFlags, GetSerial},
        Command,
    },
    DeviceHandle, Error, Exchange, MAX_RESPONSE_LEN,
};

mod helpers;
use helpers::{setup, MockDevice};

const STAKE_PATH: &str = "m/1852'/1815'/0'/2/0";
const SPEND_PATH: &str = "m/1852'/1815'/0'/0/0";

#[tokio::test]
async fn version_and_serial() -> anyhow::Result<()> {
    setup();

    let (d, frames) = MockDevice::new();
    let d = d.respond(&[7, 1, 0, 0x02]).respond(&[1, 2, 3, 4, 5, 6, 7]);
    let h = DeviceHandle::from(d);

    let v = h.version().await?;
    assert_eq!((v.major, v.minor, v.patch), (7, 1, 0));
    assert_eq!(v.flags, AppFlags::HEADLESS);

    let s = h.serial().await?;
    assert_eq!(s.serial, [1, 2, 3, 4, 5, 6, 7]);

    assert_eq!(
        frames.get(),
        [vec![0xd7, 0x00, 0x00, 0x00, 0x00], vec![0xd7, 0x01, 0x00, 0x00, 0x00]]
    );

    Ok(())
}

#[tokio::test]
async fn public_key() -> anyhow::Result<()> {
    setup();

    let mut resp = vec![0xaa; 32];
    resp.extend_from_slice(&[0xbb; 32]);

    let (d, frames) = MockDevice::new();
    let h = DeviceHandle::from(d.respond(&resp));

    let p = DerivationPath::from_str("m/1852'/1815'/0'").unwrap();
    let k = h.public_key(&p).await?;

    assert_eq!(k.public_key, [0xaa; 32]);
    assert_eq!(k.chain_code, [0xbb; 32]);

    let f = &frames.get()[0];
    assert_eq!(&f[..5], &[0xd7, 0x10, 0x00, 0x00, 13]);
    assert_eq!(f[5], 3);

    Ok(())
}

#[tokio::test]
async fn derive_and_show_address() -> anyhow::Result<()> {
    setup();

    let (d, frames) = MockDevice::new();
    let h = DeviceHandle::from(d.respond(&[0x01, 0x02, 0x03]));

    let p = AddressParams::from_fixture(
        AddressType::BasePaymentKeyStakeKey,
        Network::MAINNET,
        SPEND_PATH,
        STAKE_PATH,
    )
    .unwrap();

    assert_eq!(h.derive_address(&p).await?, [0x01, 0x02, 0x03]);
    h.show_address(&p).await?;

    assert_eq!(frames.headers(), [(0x11, 0x01, 0x00), (0x11, 0x02, 0x00)]);

    // Both requests carry the same parameter block
    let f = frames.get();
    assert_eq!(f[0][4..], f[1][4..]);

    Ok(())
}

#[tokio::test]
async fn rejected_request() {
    setup();

    let (d, _frames) = MockDevice::new();
    let h = DeviceHandle::from(d.reject(StatusCode::RejectedByUser));

    let p = AddressParams::from_fixture(
        AddressType::EnterpriseKey,
        Network::TESTNET,
        SPEND_PATH,
        "",
    )
    .unwrap();

    let r = h.show_address(&p).await;
    assert!(matches!(r, Err(Error::Rejected(StatusCode::RejectedByUser))));
}

#[tokio::test]
async fn unknown_status() {
    setup();

    let (d, _frames) = MockDevice::new();
    let h = DeviceHandle::from(UnknownStatus(d));

    let r = h.serial().await;
    assert!(matches!(r, Err(Error::UnknownStatus(0x6d00))));
}

/// Wraps a device replacing every status word with `0x6d00`
struct UnknownStatus(MockDevice);

#[async_trait::async_trait]
impl Exchange for UnknownStatus {
    async fn exchange(
        &mut self,
        command: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, ledger_lib::Error> {
        let mut r = self.0.exchange(command, timeout).await?;
        let n = r.len();
        r[n - 2..].copy_from_slice(&[0x6d, 0x00]);
        Ok(r)
    }
}

#[tokio::test]
async fn sign_op_cert() -> anyhow::Result<()> {
    setup();

    let (d, frames) = MockDevice::new();
    let h = DeviceHandle::from(d.respond(&[0x5c; 64]));

    let c = SignOpCert {
        kes_public_key: [0x01; 32],
        kes_period: 47,
        issue_counter: 42,
        path: DerivationPath::from_str("m/1853'/1815'/0'/0'").unwrap(),
    };

    assert_eq!(h.sign_op_cert(&c).await?, [0x5c; 64]);
    assert_eq!(frames.headers(), [(0x22, 0x00, 0x00)]);
    assert_eq!(frames.get()[0].len(), 5 + 32 + 8 + 8 + 17);

    Ok(())
}

#[tokio::test]
async fn oversized_response_rejected() {
    setup();

    // A full payload plus status word is the largest valid response
    let mut max = vec![0x11; MAX_RESPONSE_LEN - 2];
    max.extend_from_slice(&[0x90, 0x00]);

    let mut over = vec![0x11; MAX_RESPONSE_LEN - 1];
    over.extend_from_slice(&[0x90, 0x00]);

    let (d, frames) = MockDevice::new();
    let h = DeviceHandle::from(d.respond_raw(max).respond_raw(over));

    let r = h.request(&GetSerial.frame().unwrap()).await.unwrap();
    assert_eq!(r.len(), MAX_RESPONSE_LEN - 2);

    let r = h.request(&GetSerial.frame().unwrap()).await;
    assert!(matches!(r, Err(Error::InvalidLength)));

    assert_eq!(frames.get().len(), 2);
}

#[tokio::test]
async fn request_and_user_timeouts() -> anyhow::Result<()> {
    setup();

    let (d, frames) = MockDevice::new();
    let d = d.respond(&[7, 1, 0, 0x00]).respond(&[0x01; 64]);
    let h = DeviceHandle::from(d)
        .with_request_timeout(3)
        .with_user_timeout(30);

    // Plain requests use the request timeout, confirmations the user timeout
    h.version().await?;
    h.public_key(&DerivationPath::from_str(STAKE_PATH).unwrap())
        .await?;

    assert_eq!(
        frames.timeouts(),
        [Duration::from_secs(3), Duration::from_secs(30)]
    );

    Ok(())
}
