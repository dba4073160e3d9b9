// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Conway governance types, DReps, anchors, voters and votes

use alloc::string::String;

use encdec::Encode;
use num_enum::TryFromPrimitive;

use crate::{
    helpers::{put_slice, put_u32, put_u8},
    path::DerivationPath,
    tx::{TxItem, TxPhase},
    ApduError, ApduStatic, Command, Hash32, Included, Instruction, KeyHash, ADA_APDU_CLA,
    HASH_LEN, KEY_HASH_LEN,
};

/// Maximum anchor URL length
pub const MAX_URL_LEN: usize = 128;

/// DRep type tags
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum DRepType {
    KeyHash = 0x00,
    ScriptHash = 0x01,
    Abstain = 0x02,
    NoConfidence = 0x03,
    KeyPath = 0xa0,
}

/// Delegated representative
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DRep {
    KeyHash(KeyHash),
    ScriptHash(KeyHash),
    Abstain,
    NoConfidence,
    KeyPath(DerivationPath),
}

impl DRep {
    pub fn kind(&self) -> DRepType {
        match self {
            DRep::KeyHash(_) => DRepType::KeyHash,
            DRep::ScriptHash(_) => DRepType::ScriptHash,
            DRep::Abstain => DRepType::Abstain,
            DRep::NoConfidence => DRepType::NoConfidence,
            DRep::KeyPath(_) => DRepType::KeyPath,
        }
    }
}

impl Encode for DRep {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let n = match self {
            DRep::KeyHash(_) | DRep::ScriptHash(_) => KEY_HASH_LEN,
            DRep::Abstain | DRep::NoConfidence => 0,
            DRep::KeyPath(p) => p.encode_len()?,
        };
        Ok(1 + n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u8(buff, self.kind() as u8)?;

        index += match self {
            DRep::KeyHash(h) | DRep::ScriptHash(h) => put_slice(&mut buff[index..], h)?,
            DRep::Abstain | DRep::NoConfidence => 0,
            DRep::KeyPath(p) => p.encode(&mut buff[index..])?,
        };

        Ok(index)
    }
}

/// Off-chain metadata anchor (URL and data hash)
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                    DATA_HASH (32 bytes)                       /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /               URL (max 128 bytes, trailing field)             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Optional anchors are preceded by an [Included] flag, see [put_anchor].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    url: String,
    data_hash: Hash32,
}

impl Anchor {
    /// Create an anchor, URLs are limited to [MAX_URL_LEN] bytes
    pub fn new(url: &str, data_hash: Hash32) -> Result<Self, ApduError> {
        if url.len() > MAX_URL_LEN {
            return Err(ApduError::InvalidLength);
        }

        Ok(Self {
            url: String::from(url),
            data_hash,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn data_hash(&self) -> &Hash32 {
        &self.data_hash
    }
}

impl Encode for Anchor {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(HASH_LEN + self.url.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_slice(buff, &self.data_hash)?;
        index += put_slice(&mut buff[index..], self.url.as_bytes())?;

        Ok(index)
    }
}

/// Compute the encoded length of an optional anchor
pub(crate) fn anchor_len(a: Option<&Anchor>) -> Result<usize, ApduError> {
    match a {
        Some(a) => Ok(1 + a.encode_len()?),
        None => Ok(1),
    }
}

/// Write an optional anchor, prefixed by an [Included] flag
pub(crate) fn put_anchor(buff: &mut [u8], a: Option<&Anchor>) -> Result<usize, ApduError> {
    let mut index = 0;

    index += Included::from(a.is_some()).encode(buff)?;

    if let Some(a) = a {
        index += a.encode(&mut buff[index..])?;
    }

    Ok(index)
}

/// Voter type tags
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum VoterType {
    CommitteeKeyHash = 0,
    CommitteeScriptHash = 1,
    CommitteeKeyPath = 100,
    DRepKeyHash = 2,
    DRepScriptHash = 3,
    DRepKeyPath = 102,
    StakePoolKeyHash = 4,
    StakePoolKeyPath = 104,
}

/// Governance voter
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Voter {
    CommitteeKeyHash(KeyHash),
    CommitteeScriptHash(KeyHash),
    CommitteeKeyPath(DerivationPath),
    DRepKeyHash(KeyHash),
    DRepScriptHash(KeyHash),
    DRepKeyPath(DerivationPath),
    StakePoolKeyHash(KeyHash),
    StakePoolKeyPath(DerivationPath),
}

impl Voter {
    pub fn kind(&self) -> VoterType {
        match self {
            Voter::CommitteeKeyHash(_) => VoterType::CommitteeKeyHash,
            Voter::CommitteeScriptHash(_) => VoterType::CommitteeScriptHash,
            Voter::CommitteeKeyPath(_) => VoterType::CommitteeKeyPath,
            Voter::DRepKeyHash(_) => VoterType::DRepKeyHash,
            Voter::DRepScriptHash(_) => VoterType::DRepScriptHash,
            Voter::DRepKeyPath(_) => VoterType::DRepKeyPath,
            Voter::StakePoolKeyHash(_) => VoterType::StakePoolKeyHash,
            Voter::StakePoolKeyPath(_) => VoterType::StakePoolKeyPath,
        }
    }

    /// Fetch the derivation path for device-owned voters
    pub fn path(&self) -> Option<&DerivationPath> {
        match self {
            Voter::CommitteeKeyPath(p) | Voter::DRepKeyPath(p) | Voter::StakePoolKeyPath(p) => {
                Some(p)
            }
            _ => None,
        }
    }
}

impl Encode for Voter {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let n = match self.path() {
            Some(p) => p.encode_len()?,
            None => KEY_HASH_LEN,
        };
        Ok(1 + n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u8(buff, self.kind() as u8)?;

        index += match self {
            Voter::CommitteeKeyHash(h)
            | Voter::CommitteeScriptHash(h)
            | Voter::DRepKeyHash(h)
            | Voter::DRepScriptHash(h)
            | Voter::StakePoolKeyHash(h) => put_slice(&mut buff[index..], h)?,
            Voter::CommitteeKeyPath(p) | Voter::DRepKeyPath(p) | Voter::StakePoolKeyPath(p) => {
                p.encode(&mut buff[index..])?
            }
        };

        Ok(index)
    }
}

/// Governance action identifier
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GovActionId {
    pub tx_hash: Hash32,
    pub index: u32,
}

impl Encode for GovActionId {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(HASH_LEN + 4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_slice(buff, &self.tx_hash)?;
        index += put_u32(&mut buff[index..], self.index)?;

        Ok(index)
    }
}

/// Vote option
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum Vote {
    No = 0,
    Yes = 1,
    Abstain = 2,
}

/// Voting procedure APDU, a single vote cast by a voter on a governance action
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                     VOTER (type + path / hash)                /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                 GOV_ACTION_ID (32-byte hash + u32)            /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     VOTE      | ANCHOR_FLAG   |      ANCHOR (optional) ...    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VotingProcedure {
    pub voter: Voter,
    pub action: GovActionId,
    pub vote: Vote,
    pub anchor: Option<Anchor>,
}

impl TxItem for VotingProcedure {
    fn phase(&self) -> TxPhase {
        TxPhase::VotingProcedures
    }
}

impl ApduStatic for VotingProcedure {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }
}

impl Encode for VotingProcedure {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.voter.encode_len()?
            + self.action.encode_len()?
            + 1
            + anchor_len(self.anchor.as_ref())?)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += self.voter.encode(buff)?;
        index += self.action.encode(&mut buff[index..])?;
        index += put_u8(&mut buff[index..], self.vote as u8)?;
        index += put_anchor(&mut buff[index..], self.anchor.as_ref())?;

        Ok(index)
    }
}

#[cfg(test)]
mod test {
    use core::str::FromStr;

    use super::*;
    use crate::test::encode_payload;

    #[test]
    fn encode_dreps() {
        assert_eq!(encode_payload(&DRep::Abstain), [0x02]);
        assert_eq!(encode_payload(&DRep::NoConfidence), [0x03]);

        let p = DerivationPath::from_str("m/1852'/1815'/0'/3/0").unwrap();
        let buff = encode_payload(&DRep::KeyPath(p));
        assert_eq!(&buff[..2], &[0xa0, 5]);

        let buff = encode_payload(&DRep::ScriptHash([0x11; KEY_HASH_LEN]));
        assert_eq!(buff.len(), 1 + KEY_HASH_LEN);
        assert_eq!(buff[0], 0x01);
    }

    #[test]
    fn anchor_url_limit() {
        let url = "x".repeat(MAX_URL_LEN + 1);
        assert_eq!(Anchor::new(&url, [0u8; 32]), Err(ApduError::InvalidLength));

        let a = Anchor::new("https://example.com/a.json", [0x22; 32]).unwrap();
        let buff = encode_payload(&a);
        assert_eq!(&buff[..HASH_LEN], &[0x22; HASH_LEN]);
        assert_eq!(&buff[HASH_LEN..], b"https://example.com/a.json");
    }

    #[test]
    fn encode_voting_procedure() {
        let p = VotingProcedure {
            voter: Voter::DRepKeyPath(DerivationPath::from_str("m/1852'/1815'/0'/3/0").unwrap()),
            action: GovActionId {
                tx_hash: [0x33; 32],
                index: 3,
            },
            vote: Vote::Abstain,
            anchor: None,
        };

        let buff = encode_payload(&p);
        assert_eq!(buff[0], 102);
        assert_eq!(&buff[22 + 32..22 + 36], &[0, 0, 0, 3]);
        assert_eq!(&buff[22 + 36..], &[0x02, 0x01]);

        let f = p.frame().unwrap();
        assert_eq!((f.ins(), f.p1(), f.p2()), (0x21, 0x13, 0x00));
    }
}
