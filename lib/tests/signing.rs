// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::str::FromStr;

use rand::{thread_rng, RngCore};

use ledger_ada::{
    apdu::{
        message::MessageData,
        path::DerivationPath,
        status::StatusCode,
    },
    DeviceHandle, Error,
};

mod helpers;
use helpers::{setup, MockDevice};

#[tokio::test]
async fn sign_vote() -> anyhow::Result<()> {
    setup();

    let mut vote_cast = vec![0u8; 1978];
    thread_rng().fill_bytes(&mut vote_cast);

    // Init and chunk acks, then data hash and signature
    let (d, frames) = MockDevice::new();
    let d = d.ack(9).respond(&[0x0d; 32]).respond(&[0x5e; 64]);
    let h = DeviceHandle::from(d);

    let path = DerivationPath::from_str("m/1694'/1815'/0'/0'/0'").unwrap();
    let r = h.sign_vote(&vote_cast, &path).await?;

    assert_eq!(r.data_hash, [0x0d; 32]);
    assert_eq!(r.signature, [0x5e; 64]);

    let headers = frames.headers();
    assert_eq!(headers.len(), 1 + 8 + 1 + 1);
    assert_eq!(headers[0], (0x23, 0x01, 0x00));
    assert!(headers[1..9].iter().all(|h| *h == (0x23, 0x02, 0x00)));
    assert_eq!(headers[9], (0x23, 0x03, 0x00));
    assert_eq!(headers[10], (0x23, 0x04, 0x00));

    // Reassemble vote-cast data from init and chunk frames
    let f = frames.get();
    assert_eq!(&f[0][5..9], &1978u32.to_be_bytes());

    let mut rebuilt = f[0][9..].to_vec();
    for c in &f[1..9] {
        rebuilt.extend_from_slice(&c[5..]);
    }
    assert_eq!(rebuilt, vote_cast);

    Ok(())
}

#[tokio::test]
async fn vote_rejected_on_confirm() {
    setup();

    let (d, frames) = MockDevice::new();
    let d = d.ack(1).reject(StatusCode::RejectedByUser);
    let h = DeviceHandle::from(d);

    let path = DerivationPath::from_str("m/1694'/1815'/0'/0'/0'").unwrap();
    let r = h.sign_vote(&[0x01; 100], &path).await;

    assert!(matches!(r, Err(Error::Rejected(StatusCode::RejectedByUser))));

    // No witness requested after rejection
    assert_eq!(frames.headers().len(), 2);
}

#[tokio::test]
async fn sign_message() -> anyhow::Result<()> {
    setup();

    let mut resp = vec![0x51; 64];
    resp.extend_from_slice(&[0x9b; 32]);
    resp.extend_from_slice(&[0, 0, 0, 28]);
    resp.extend_from_slice(&[0x1c; 28]);

    let (d, frames) = MockDevice::new();
    let h = DeviceHandle::from(d.ack(4).respond(&resp));

    let m = MessageData {
        message: vec![b'x'; 500],
        signing_path: DerivationPath::from_str("m/1852'/1815'/0'/0/0").unwrap(),
        hash_payload: false,
        is_ascii: true,
        address: None,
    };

    let r = h.sign_message(&m).await?;

    assert_eq!(r.signature, [0x51; 64]);
    assert_eq!(r.signing_public_key, [0x9b; 32]);
    assert_eq!(r.address_field, [0x1c; 28]);

    assert_eq!(
        frames.headers(),
        [
            (0x24, 0x01, 0x00),
            (0x24, 0x02, 0x00),
            (0x24, 0x02, 0x00),
            (0x24, 0x02, 0x00),
            (0x24, 0x03, 0x00)
        ]
    );

    // Chunk lengths follow the ascii first chunk size
    let lens: Vec<u32> = frames.get()[1..4]
        .iter()
        .map(|f| u32::from_be_bytes([f[5], f[6], f[7], f[8]]))
        .collect();
    assert_eq!(lens, [198, 250, 52]);

    Ok(())
}
