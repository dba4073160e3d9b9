// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction certificates
//!
//! Each certificate is sent as a single APDU, a type byte followed by the
//! credential(s) and type specific trailing fields. Pool registration
//! parameters are not supported, the registration certificate carries only
//! its type.

use encdec::Encode;
use num_enum::TryFromPrimitive;

use super::{TxItem, TxPhase};
use crate::{
    credential::Credential,
    governance::{anchor_len, put_anchor, Anchor, DRep},
    helpers::{put_slice, put_u64, put_u8},
    path::DerivationPath,
    ApduError, ApduStatic, Command, Instruction, KeyHash, ADA_APDU_CLA, KEY_HASH_LEN,
};

/// Certificate type tags
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display, strum::EnumIter)]
#[repr(u8)]
pub enum CertificateType {
    StakeRegistration = 0,
    StakeDeregistration = 1,
    StakeDelegation = 2,
    StakePoolRegistration = 3,
    StakePoolRetirement = 4,
    StakeRegistrationConway = 7,
    StakeDeregistrationConway = 8,
    VoteDelegation = 9,
    AuthorizeCommitteeHot = 14,
    ResignCommitteeCold = 15,
    DRepRegistration = 16,
    DRepDeregistration = 17,
    DRepUpdate = 18,
}

/// Transaction certificate
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     TYPE      |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /        CREDENTIAL(S) / POOL KEY PATH (type dependent)         /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /   POOL HASH / DEPOSIT / DREP / EPOCH / ANCHOR (type dependent) /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Certificate {
    StakeRegistration {
        stake: Credential,
    },
    StakeDeregistration {
        stake: Credential,
    },
    StakeDelegation {
        stake: Credential,
        pool: KeyHash,
    },
    StakePoolRegistration,
    StakePoolRetirement {
        pool_key: DerivationPath,
        epoch: u64,
    },
    StakeRegistrationConway {
        stake: Credential,
        deposit: u64,
    },
    StakeDeregistrationConway {
        stake: Credential,
        deposit: u64,
    },
    VoteDelegation {
        stake: Credential,
        drep: DRep,
    },
    AuthorizeCommitteeHot {
        cold: Credential,
        hot: Credential,
    },
    ResignCommitteeCold {
        cold: Credential,
        anchor: Option<Anchor>,
    },
    DRepRegistration {
        drep: Credential,
        deposit: u64,
        anchor: Option<Anchor>,
    },
    DRepDeregistration {
        drep: Credential,
        deposit: u64,
    },
    DRepUpdate {
        drep: Credential,
        anchor: Option<Anchor>,
    },
}

impl Certificate {
    pub fn kind(&self) -> CertificateType {
        use Certificate::*;

        match self {
            StakeRegistration { .. } => CertificateType::StakeRegistration,
            StakeDeregistration { .. } => CertificateType::StakeDeregistration,
            StakeDelegation { .. } => CertificateType::StakeDelegation,
            StakePoolRegistration => CertificateType::StakePoolRegistration,
            StakePoolRetirement { .. } => CertificateType::StakePoolRetirement,
            StakeRegistrationConway { .. } => CertificateType::StakeRegistrationConway,
            StakeDeregistrationConway { .. } => CertificateType::StakeDeregistrationConway,
            VoteDelegation { .. } => CertificateType::VoteDelegation,
            AuthorizeCommitteeHot { .. } => CertificateType::AuthorizeCommitteeHot,
            ResignCommitteeCold { .. } => CertificateType::ResignCommitteeCold,
            DRepRegistration { .. } => CertificateType::DRepRegistration,
            DRepDeregistration { .. } => CertificateType::DRepDeregistration,
            DRepUpdate { .. } => CertificateType::DRepUpdate,
        }
    }
}

impl TxItem for Certificate {
    fn phase(&self) -> TxPhase {
        TxPhase::Certificates
    }
}

impl ApduStatic for Certificate {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }
}

impl Encode for Certificate {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        use Certificate::*;

        let n = match self {
            StakeRegistration { stake } | StakeDeregistration { stake } => stake.encode_len()?,
            StakeDelegation { stake, .. } => stake.encode_len()? + KEY_HASH_LEN,
            StakePoolRegistration => 0,
            StakePoolRetirement { pool_key, .. } => pool_key.encode_len()? + 8,
            StakeRegistrationConway { stake, .. } | StakeDeregistrationConway { stake, .. } => {
                stake.encode_len()? + 8
            }
            VoteDelegation { stake, drep } => stake.encode_len()? + drep.encode_len()?,
            AuthorizeCommitteeHot { cold, hot } => cold.encode_len()? + hot.encode_len()?,
            ResignCommitteeCold { cold, anchor } => {
                cold.encode_len()? + anchor_len(anchor.as_ref())?
            }
            DRepRegistration {
                drep,
                anchor,
                ..
            } => drep.encode_len()? + 8 + anchor_len(anchor.as_ref())?,
            DRepDeregistration { drep, .. } => drep.encode_len()? + 8,
            DRepUpdate { drep, anchor } => drep.encode_len()? + anchor_len(anchor.as_ref())?,
        };

        Ok(1 + n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        use Certificate::*;

        let mut index = 0;

        index += put_u8(buff, self.kind() as u8)?;

        match self {
            StakeRegistration { stake } | StakeDeregistration { stake } => {
                index += stake.encode(&mut buff[index..])?;
            }
            StakeDelegation { stake, pool } => {
                index += stake.encode(&mut buff[index..])?;
                index += put_slice(&mut buff[index..], pool)?;
            }
            StakePoolRegistration => (),
            StakePoolRetirement { pool_key, epoch } => {
                index += pool_key.encode(&mut buff[index..])?;
                index += put_u64(&mut buff[index..], *epoch)?;
            }
            StakeRegistrationConway { stake, deposit }
            | StakeDeregistrationConway { stake, deposit } => {
                index += stake.encode(&mut buff[index..])?;
                index += put_u64(&mut buff[index..], *deposit)?;
            }
            VoteDelegation { stake, drep } => {
                index += stake.encode(&mut buff[index..])?;
                index += drep.encode(&mut buff[index..])?;
            }
            AuthorizeCommitteeHot { cold, hot } => {
                index += cold.encode(&mut buff[index..])?;
                index += hot.encode(&mut buff[index..])?;
            }
            ResignCommitteeCold { cold, anchor } => {
                index += cold.encode(&mut buff[index..])?;
                index += put_anchor(&mut buff[index..], anchor.as_ref())?;
            }
            DRepRegistration {
                drep,
                deposit,
                anchor,
            } => {
                index += drep.encode(&mut buff[index..])?;
                index += put_u64(&mut buff[index..], *deposit)?;
                index += put_anchor(&mut buff[index..], anchor.as_ref())?;
            }
            DRepDeregistration { drep, deposit } => {
                index += drep.encode(&mut buff[index..])?;
                index += put_u64(&mut buff[index..], *deposit)?;
            }
            DRepUpdate { drep, anchor } => {
                index += drep.encode(&mut buff[index..])?;
                index += put_anchor(&mut buff[index..], anchor.as_ref())?;
            }
        }

        Ok(index)
    }
}

#[cfg(test)]
mod test {
    use core::str::FromStr;

    use super::*;
    use crate::test::encode_payload;

    fn stake() -> Credential {
        Credential::key_from_fixture("m/1852'/1815'/0'/2/0").unwrap()
    }

    #[test]
    fn pool_registration_type_only() {
        let c = Certificate::StakePoolRegistration;
        assert_eq!(encode_payload(&c), [0x03]);

        let f = c.frame().unwrap();
        assert_eq!(f.to_vec(), [0xd7, 0x21, 0x06, 0x00, 0x01, 0x03]);
    }

    #[test]
    fn unsupported_certificate_type() {
        for v in [5u8, 6, 10, 13, 19, 0xff] {
            assert!(CertificateType::try_from(v).is_err(), "accepted type {v}");
        }
        assert_eq!(
            CertificateType::try_from(9),
            Ok(CertificateType::VoteDelegation)
        );
    }

    #[test]
    fn encode_stake_certificates() {
        let b = encode_payload(&Certificate::StakeRegistration { stake: stake() });
        assert_eq!(&b[..3], &[0x00, 0x00, 5]);
        assert_eq!(b.len(), 1 + 1 + 21);

        let b = encode_payload(&Certificate::StakeDelegation {
            stake: stake(),
            pool: [0xf6; KEY_HASH_LEN],
        });
        assert_eq!(b[0], 0x02);
        assert_eq!(&b[23..], &[0xf6; KEY_HASH_LEN]);

        let b = encode_payload(&Certificate::StakeDeregistrationConway {
            stake: stake(),
            deposit: 2_000_000,
        });
        assert_eq!(b[0], 0x08);
        assert_eq!(&b[23..], &2_000_000u64.to_be_bytes());
    }

    #[test]
    fn encode_pool_retirement() {
        let b = encode_payload(&Certificate::StakePoolRetirement {
            pool_key: DerivationPath::from_str("m/1853'/1815'/0'/0'").unwrap(),
            epoch: 10,
        });

        assert_eq!(&b[..2], &[0x04, 4]);
        assert_eq!(&b[18..], &[0, 0, 0, 0, 0, 0, 0, 10]);
    }

    #[test]
    fn encode_governance_certificates() {
        let b = encode_payload(&Certificate::VoteDelegation {
            stake: stake(),
            drep: DRep::NoConfidence,
        });
        assert_eq!(b[0], 0x09);
        assert_eq!(b[b.len() - 1], 0x03);

        let b = encode_payload(&Certificate::AuthorizeCommitteeHot {
            cold: Credential::ScriptHash([0x01; KEY_HASH_LEN]),
            hot: Credential::KeyHash([0x02; KEY_HASH_LEN]),
        });
        assert_eq!(b.len(), 1 + 2 * (1 + KEY_HASH_LEN));
        assert_eq!((b[0], b[1], b[30]), (14, 0x01, 0x02));

        let anchor = Anchor::new("https://x.io", [0x44; 32]).unwrap();
        let b = encode_payload(&Certificate::DRepRegistration {
            drep: stake(),
            deposit: 500,
            anchor: Some(anchor),
        });
        assert_eq!(b[0], 16);
        assert_eq!(&b[23..31], &500u64.to_be_bytes());
        assert_eq!(b[31], 0x02);
        assert_eq!(&b[64..], b"https://x.io");

        let b = encode_payload(&Certificate::DRepUpdate {
            drep: stake(),
            anchor: None,
        });
        assert_eq!((b[0], b[b.len() - 1]), (18, 0x01));

        let b = encode_payload(&Certificate::ResignCommitteeCold {
            cold: stake(),
            anchor: None,
        });
        assert_eq!(b.len(), 1 + 22 + 1);
    }
}
