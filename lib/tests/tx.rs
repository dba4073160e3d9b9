// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::str::FromStr;

use ledger_ada::{
    apdu::{
        address::Network,
        credential::Credential,
        path::DerivationPath,
        tx::{
            Certificate, OutputDestination, OutputFormat, SigningMode, Transaction, TxInput,
            TxOutput, TxPhase,
        },
        ApduError, HASH_LEN,
    },
    DeviceHandle, Error,
};

mod helpers;
use helpers::{setup, MockDevice};

fn path(s: &str) -> DerivationPath {
    DerivationPath::from_str(s).unwrap()
}

fn tx() -> Transaction {
    let input = TxInput {
        tx_hash: [0x3b; HASH_LEN],
        index: 0,
    };

    Transaction {
        inputs: vec![input, input],
        outputs: vec![TxOutput::new(
            OutputFormat::ArrayLegacy,
            OutputDestination::ThirdParty(vec![0x61; 29]),
            3_003_112,
        )],
        ttl: Some(10),
        certificates: vec![Certificate::StakeRegistration {
            stake: Credential::KeyPath(path("m/1852'/1815'/0'/2/0")),
        }],
        donation: Some(5),
        collateral_inputs: vec![input],
        witness_paths: vec![
            path("m/1852'/1815'/0'/0/0"),
            path("m/1852'/1815'/0'/2/0"),
            path("m/1852'/1815'/0'/0/0"),
        ],
        ..Transaction::new(Network::TESTNET, SigningMode::Ordinary, 42)
    }
}

#[tokio::test]
async fn sign_transaction() {
    setup();

    let (d, frames) = MockDevice::new();
    let d = d
        .ack(10)
        .respond(&[0x7a; HASH_LEN])
        .respond(&[0x01; 64])
        .respond(&[0x02; 64]);

    let h = DeviceHandle::from(d);
    let signed = h.sign_transaction(&tx()).await.unwrap();

    let p1: Vec<u8> = frames.headers().iter().map(|(_, p1, _)| *p1).collect();
    assert_eq!(
        p1,
        [0x01, 0x02, 0x02, 0x03, 0x03, 0x04, 0x05, 0x06, 0x0d, 0x16, 0x0a, 0x0f, 0x0f]
    );
    assert!(frames.headers().iter().all(|(ins, _, _)| *ins == 0x21));

    assert_eq!(signed.tx_hash, [0x7a; HASH_LEN]);
    assert_eq!(signed.aux_data, None);

    // Duplicate signing paths are witnessed once
    assert_eq!(signed.witnesses.len(), 2);
    assert_eq!(signed.witnesses[0].path, path("m/1852'/1815'/0'/0/0"));
    assert_eq!(signed.witnesses[0].signature, [0x01; 64]);
    assert_eq!(signed.witnesses[1].path, path("m/1852'/1815'/0'/2/0"));
    assert_eq!(signed.witnesses[1].signature, [0x02; 64]);
}

#[tokio::test]
async fn out_of_order_step_not_sent() {
    setup();

    let t = tx();
    let steps = t.steps().unwrap();

    let (d, frames) = MockDevice::new();
    let h = DeviceHandle::from(d);

    let mut th = h.transaction(t.init().unwrap()).await.unwrap();
    assert_eq!(th.phase(), TxPhase::Init);

    // Fee before the declared inputs and outputs
    let fee = steps.iter().find(|s| s.phase == TxPhase::Fee).unwrap();
    let r = th.step(fee).await;

    assert!(matches!(
        r,
        Err(Error::Apdu(ApduError::MissingItems(TxPhase::Inputs)))
    ));

    // Only the init frame reached the device
    assert_eq!(frames.get().len(), 1);
    assert_eq!(th.phase(), TxPhase::Init);
}

#[tokio::test]
async fn finish_requires_witnesses() {
    setup();

    let t = tx();
    let steps = t.steps().unwrap();

    let (d, _frames) = MockDevice::new();
    let d = d.ack(10).respond(&[0x7a; HASH_LEN]);
    let h = DeviceHandle::from(d);

    let mut th = h.transaction(t.init().unwrap()).await.unwrap();

    // Issue everything up to and including confirmation
    for s in steps.iter().skip(1).filter(|s| s.phase != TxPhase::Witnesses) {
        th.step(s).await.unwrap();
    }
    assert_eq!(th.phase(), TxPhase::Confirm);

    let r = th.finish();
    assert!(matches!(
        r,
        Err(Error::Apdu(ApduError::MissingItems(TxPhase::Confirm)))
    ));
}
