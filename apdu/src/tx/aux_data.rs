// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction auxiliary data
//!
//! Auxiliary data is either an arbitrary hash, sent as a single APDU, or a
//! CIP-36 (or legacy CIP-15) vote key registration, which the device
//! serializes and hashes itself. Registrations use a sub-protocol selected
//! by P2:
//!
//! `TYPE -> INIT -> (VOTE_KEY | DELEGATION*) -> STAKING_KEY -> PAYMENT_ADDRESS -> NONCE -> VOTING_PURPOSE? -> CONFIRM`
//!
//! where `VOTING_PURPOSE` is only sent for the CIP-36 format.

use alloc::vec::Vec;

use encdec::{DecodeOwned, Encode};
use num_enum::TryFromPrimitive;

use super::{OutputDestination, TxItem, TxPhase};
use crate::{
    frame::Frame,
    helpers::{get_arr, len_u32, put_slice, put_u32, put_u64, put_u8},
    path::DerivationPath,
    ApduError, ApduStatic, Command, Hash32, Included, Instruction, ADA_APDU_CLA, HASH_LEN,
};

/// Length of a vote public key
pub const VOTE_KEY_LEN: usize = 32;

/// Auxiliary data type tags
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum AuxDataType {
    ArbitraryHash = 0x00,
    Cip36Registration = 0x01,
}

/// CIP-36 registration sub-steps (P2)
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum Cip36Step {
    /// Auxiliary data type, sent before the registration sub-steps
    Type = 0x00,
    VoteKey = 0x30,
    StakingKey = 0x31,
    PaymentAddress = 0x32,
    Nonce = 0x33,
    Confirm = 0x34,
    VotingPurpose = 0x35,
    Init = 0x36,
    Delegation = 0x37,
}

/// Registration metadata format
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum Cip36Format {
    Cip15 = 0x01,
    Cip36 = 0x02,
}

/// Vote key tags
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum VoteKeyType {
    Path = 0x01,
    PublicKey = 0x02,
}

/// Vote key, derived on the device or provided as a public key
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum VoteKey {
    Path(DerivationPath),
    PublicKey([u8; VOTE_KEY_LEN]),
}

impl VoteKey {
    pub fn kind(&self) -> VoteKeyType {
        match self {
            VoteKey::Path(_) => VoteKeyType::Path,
            VoteKey::PublicKey(_) => VoteKeyType::PublicKey,
        }
    }
}

impl Encode for VoteKey {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let n = match self {
            VoteKey::Path(p) => p.encode_len()?,
            VoteKey::PublicKey(_) => VOTE_KEY_LEN,
        };
        Ok(1 + n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u8(buff, self.kind() as u8)?;

        index += match self {
            VoteKey::Path(p) => p.encode(&mut buff[index..])?,
            VoteKey::PublicKey(k) => put_slice(&mut buff[index..], k)?,
        };

        Ok(index)
    }
}

/// Weighted vote key delegation
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Delegation {
    pub key: VoteKey,
    pub weight: u32,
}

/// Voting power target, a single vote key or a set of delegations (CIP-36 only)
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum VotingTarget {
    Key(VoteKey),
    Delegations(Vec<Delegation>),
}

/// Vote key registration
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cip36Registration {
    pub format: Cip36Format,
    pub target: VotingTarget,
    pub staking_path: DerivationPath,
    pub payment: OutputDestination,
    pub nonce: u64,
    pub voting_purpose: Option<u64>,
}

/// Transaction auxiliary data
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AuxData {
    ArbitraryHash(Hash32),
    Cip36Registration(Cip36Registration),
}

impl AuxData {
    pub fn kind(&self) -> AuxDataType {
        match self {
            AuxData::ArbitraryHash(_) => AuxDataType::ArbitraryHash,
            AuxData::Cip36Registration(_) => AuxDataType::Cip36Registration,
        }
    }

    /// Build the complete APDU sequence for this auxiliary data
    pub fn frames(&self) -> Result<Vec<Frame>, ApduError> {
        let r = match self {
            AuxData::ArbitraryHash(h) => return Ok(alloc::vec![TxAuxData::Hash(h).frame()?]),
            AuxData::Cip36Registration(r) => r,
        };

        let delegations: &[Delegation] = match (&r.format, &r.target) {
            (Cip36Format::Cip15, VotingTarget::Delegations(_)) => {
                return Err(ApduError::Unsupported("delegations in CIP-15 registration"))
            }
            (Cip36Format::Cip15, _) if r.voting_purpose.is_some() => {
                return Err(ApduError::Unsupported("voting purpose in CIP-15 registration"))
            }
            (_, VotingTarget::Delegations(d)) => d.as_slice(),
            (_, VotingTarget::Key(_)) => &[],
        };

        let mut frames = alloc::vec![
            TxAuxData::Registration.frame()?,
            TxAuxData::Init {
                format: r.format,
                num_delegations: len_u32(delegations.len())?,
            }
            .frame()?,
        ];

        match &r.target {
            VotingTarget::Key(k) => frames.push(TxAuxData::VoteKey(k).frame()?),
            VotingTarget::Delegations(d) => {
                for d in d {
                    frames.push(TxAuxData::Delegation(d).frame()?);
                }
            }
        }

        frames.push(TxAuxData::StakingKey(&r.staking_path).frame()?);
        frames.push(TxAuxData::PaymentAddress(&r.payment).frame()?);
        frames.push(TxAuxData::Nonce(r.nonce).frame()?);

        if r.format == Cip36Format::Cip36 {
            frames.push(TxAuxData::VotingPurpose(r.voting_purpose).frame()?);
        }

        frames.push(TxAuxData::Confirm.frame()?);

        #[cfg(feature = "log")]
        log::debug!("{} registration encoded to {} frames", r.format, frames.len());

        Ok(frames)
    }
}

/// Auxiliary data APDUs
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TxAuxData<'a> {
    /// Arbitrary hash, type byte followed by a 32-byte hash
    Hash(&'a Hash32),
    /// Registration type byte, opening the registration sub-protocol
    Registration,
    /// Format (u8) and number of delegations (u32)
    Init {
        format: Cip36Format,
        num_delegations: u32,
    },
    VoteKey(&'a VoteKey),
    /// Vote key followed by weight (u32)
    Delegation(&'a Delegation),
    StakingKey(&'a DerivationPath),
    PaymentAddress(&'a OutputDestination),
    Nonce(u64),
    /// Included flag, followed by the purpose (u64) where present
    VotingPurpose(Option<u64>),
    Confirm,
}

impl<'a> TxItem for TxAuxData<'a> {
    fn phase(&self) -> TxPhase {
        TxPhase::AuxData
    }
}

impl<'a> ApduStatic for TxAuxData<'a> {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }

    fn p2(&self) -> u8 {
        let s = match self {
            TxAuxData::Hash(_) | TxAuxData::Registration => Cip36Step::Type,
            TxAuxData::Init { .. } => Cip36Step::Init,
            TxAuxData::VoteKey(_) => Cip36Step::VoteKey,
            TxAuxData::Delegation(_) => Cip36Step::Delegation,
            TxAuxData::StakingKey(_) => Cip36Step::StakingKey,
            TxAuxData::PaymentAddress(_) => Cip36Step::PaymentAddress,
            TxAuxData::Nonce(_) => Cip36Step::Nonce,
            TxAuxData::VotingPurpose(_) => Cip36Step::VotingPurpose,
            TxAuxData::Confirm => Cip36Step::Confirm,
        };
        s as u8
    }
}

impl<'a> Encode for TxAuxData<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let n = match self {
            TxAuxData::Hash(_) => 1 + HASH_LEN,
            TxAuxData::Registration => 1,
            TxAuxData::Init { .. } => 1 + 4,
            TxAuxData::VoteKey(k) => k.encode_len()?,
            TxAuxData::Delegation(d) => d.key.encode_len()? + 4,
            TxAuxData::StakingKey(p) => p.encode_len()?,
            TxAuxData::PaymentAddress(d) => d.encode_len()?,
            TxAuxData::Nonce(_) => 8,
            TxAuxData::VotingPurpose(Some(_)) => 1 + 8,
            TxAuxData::VotingPurpose(None) => 1,
            TxAuxData::Confirm => 0,
        };
        Ok(n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        match self {
            TxAuxData::Hash(h) => {
                index += put_u8(buff, AuxDataType::ArbitraryHash as u8)?;
                index += put_slice(&mut buff[index..], *h)?;
            }
            TxAuxData::Registration => {
                index += put_u8(buff, AuxDataType::Cip36Registration as u8)?;
            }
            TxAuxData::Init {
                format,
                num_delegations,
            } => {
                index += put_u8(buff, *format as u8)?;
                index += put_u32(&mut buff[index..], *num_delegations)?;
            }
            TxAuxData::VoteKey(k) => {
                index += k.encode(buff)?;
            }
            TxAuxData::Delegation(d) => {
                index += d.key.encode(buff)?;
                index += put_u32(&mut buff[index..], d.weight)?;
            }
            TxAuxData::StakingKey(p) => {
                index += p.encode(buff)?;
            }
            TxAuxData::PaymentAddress(d) => {
                index += d.encode(buff)?;
            }
            TxAuxData::Nonce(n) => {
                index += put_u64(buff, *n)?;
            }
            TxAuxData::VotingPurpose(p) => {
                index += Included::from(p).encode(buff)?;
                if let Some(p) = p {
                    index += put_u64(&mut buff[index..], *p)?;
                }
            }
            TxAuxData::Confirm => (),
        }

        Ok(index)
    }
}

/// Registration confirmation response, the auxiliary data hash and the
/// registration signature
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cip36ConfirmResp {
    pub aux_data_hash: Hash32,
    pub signature: [u8; 64],
}

impl DecodeOwned for Cip36ConfirmResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        let (aux_data_hash, n) = get_arr::<HASH_LEN>(buff)?;
        index += n;

        let (signature, n) = get_arr::<64>(&buff[index..])?;
        index += n;

        Ok((
            Self {
                aux_data_hash,
                signature,
            },
            index,
        ))
    }
}

#[cfg(test)]
mod test {
    use core::str::FromStr;

    use super::*;
    use crate::{
        address::{AddressParams, AddressType, Network},
        KEY_HASH_LEN,
    };

    fn registration(format: Cip36Format, target: VotingTarget) -> Cip36Registration {
        let payment = AddressParams::from_fixture(
            AddressType::BasePaymentKeyStakeKey,
            Network::MAINNET,
            "m/1852'/1815'/0'/0/0",
            "m/1852'/1815'/0'/2/0",
        )
        .unwrap();

        Cip36Registration {
            format,
            target,
            staking_path: DerivationPath::from_str("m/1852'/1815'/0'/2/0").unwrap(),
            payment: OutputDestination::DeviceOwned(payment),
            nonce: 1454448,
            voting_purpose: None,
        }
    }

    #[test]
    fn arbitrary_hash_single_frame() {
        let frames = AuxData::ArbitraryHash([0xde; HASH_LEN]).frames().unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!((frames[0].p1(), frames[0].p2()), (0x08, 0x00));
        assert_eq!(frames[0].payload()[0], 0x00);
        assert_eq!(frames[0].payload().len(), 1 + HASH_LEN);
    }

    #[test]
    fn cip36_registration_frames() {
        let target = VotingTarget::Delegations(alloc::vec![
            Delegation {
                key: VoteKey::PublicKey([0x4b; VOTE_KEY_LEN]),
                weight: 1,
            },
            Delegation {
                key: VoteKey::Path(DerivationPath::from_str("m/1694'/1815'/0'/0/1").unwrap()),
                weight: 2,
            },
        ]);

        let r = AuxData::Cip36Registration(Cip36Registration {
            voting_purpose: Some(0),
            ..registration(Cip36Format::Cip36, target)
        });

        let frames = r.frames().unwrap();
        let steps: Vec<u8> = frames.iter().map(|f| f.p2()).collect();

        assert_eq!(steps, [0x00, 0x36, 0x37, 0x37, 0x31, 0x32, 0x33, 0x35, 0x34]);
        assert!(frames.iter().all(|f| f.p1() == 0x08));

        assert_eq!(frames[0].payload(), &[0x01]);
        assert_eq!(frames[1].payload(), &[0x02, 0, 0, 0, 2]);
        assert_eq!(frames[2].payload()[0], 0x02);
        assert_eq!(&frames[2].payload()[1 + VOTE_KEY_LEN..], &[0, 0, 0, 1]);
        assert_eq!(frames[3].payload()[0], 0x01);
        assert_eq!(frames[5].payload()[0], 0x02);
        assert_eq!(frames[7].payload(), &[0x02, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(frames[8].payload().is_empty());
    }

    #[test]
    fn cip15_registration_frames() {
        let r = AuxData::Cip36Registration(registration(
            Cip36Format::Cip15,
            VotingTarget::Key(VoteKey::PublicKey([0x4b; VOTE_KEY_LEN])),
        ));

        let frames = r.frames().unwrap();
        let steps: Vec<u8> = frames.iter().map(|f| f.p2()).collect();

        // No voting purpose for CIP-15
        assert_eq!(steps, [0x00, 0x36, 0x30, 0x31, 0x32, 0x33, 0x34]);
        assert_eq!(frames[1].payload(), &[0x01, 0, 0, 0, 0]);
    }

    #[test]
    fn reject_cip15_delegations() {
        let r = AuxData::Cip36Registration(registration(
            Cip36Format::Cip15,
            VotingTarget::Delegations(alloc::vec![]),
        ));
        assert!(matches!(r.frames(), Err(ApduError::Unsupported(_))));

        let r = AuxData::Cip36Registration(Cip36Registration {
            voting_purpose: Some(0),
            ..registration(
                Cip36Format::Cip15,
                VotingTarget::Key(VoteKey::PublicKey([0u8; VOTE_KEY_LEN])),
            )
        });
        assert!(matches!(r.frames(), Err(ApduError::Unsupported(_))));
    }

    #[test]
    fn decode_confirm_response() {
        let mut buff = [0u8; HASH_LEN + 64];
        buff[..HASH_LEN].copy_from_slice(&[0x01; HASH_LEN]);
        buff[HASH_LEN..].copy_from_slice(&[0x02; 64]);

        let (r, n) = Cip36ConfirmResp::decode_owned(&buff).unwrap();
        assert_eq!(n, buff.len());
        assert_eq!(r.aux_data_hash, [0x01; HASH_LEN]);
        assert_eq!(r.signature, [0x02; 64]);

        assert_eq!(
            Cip36ConfirmResp::decode_owned(&buff[..KEY_HASH_LEN]),
            Err(ApduError::InvalidLength)
        );
    }
}
