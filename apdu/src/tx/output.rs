// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction outputs
//!
//! Outputs are sent as a nested sequence of APDUs: basic data, then each
//! asset group followed by its tokens, then the optional datum and
//! reference script (both chunked when large), then a confirmation.
//! Collateral outputs use the same sequence with a different P1 stage.

use alloc::vec::Vec;

use encdec::Encode;
use num_enum::TryFromPrimitive;

use super::{script_ref_frames, AssetGroup, Datum, TxAssetGroup, TxItem, TxPhase, TxToken};
use crate::{
    address::AddressParams,
    frame::Frame,
    helpers::{len_u32, put_sized, put_u32, put_u64, put_u8},
    ApduError, ApduStatic, Command, Included, Instruction, ADA_APDU_CLA,
};

/// Output sub-steps (P2)
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum OutputStep {
    BasicData = 0x30,
    AssetGroup = 0x31,
    Token = 0x32,
    Confirm = 0x33,
    Datum = 0x34,
    DatumChunk = 0x35,
    ScriptRef = 0x36,
    ScriptRefChunk = 0x37,
}

/// Output serialization format
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum OutputFormat {
    /// Pre-babbage array format
    ArrayLegacy = 0x00,
    /// Babbage map format, required for inline datums and reference scripts
    MapBabbage = 0x01,
}

/// Destination type tags
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum DestinationType {
    ThirdParty = 0x01,
    DeviceOwned = 0x02,
}

/// Output destination, a raw third party address or device-owned address
/// parameters
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum OutputDestination {
    ThirdParty(Vec<u8>),
    DeviceOwned(AddressParams),
}

impl OutputDestination {
    pub fn kind(&self) -> DestinationType {
        match self {
            OutputDestination::ThirdParty(_) => DestinationType::ThirdParty,
            OutputDestination::DeviceOwned(_) => DestinationType::DeviceOwned,
        }
    }
}

impl Encode for OutputDestination {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let n = match self {
            OutputDestination::ThirdParty(a) => 4 + a.len(),
            OutputDestination::DeviceOwned(p) => p.encode_len()?,
        };
        Ok(1 + n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u8(buff, self.kind() as u8)?;

        index += match self {
            OutputDestination::ThirdParty(a) => put_sized(&mut buff[index..], a)?,
            OutputDestination::DeviceOwned(p) => p.encode(&mut buff[index..])?,
        };

        Ok(index)
    }
}

/// Transaction output
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxOutput {
    pub format: OutputFormat,
    pub destination: OutputDestination,
    pub coin: u64,
    pub assets: Vec<AssetGroup<u64>>,
    pub datum: Option<Datum>,
    pub script_ref: Option<Vec<u8>>,
}

impl TxOutput {
    /// Create a simple ADA-only output
    pub fn new(format: OutputFormat, destination: OutputDestination, coin: u64) -> Self {
        Self {
            format,
            destination,
            coin,
            assets: Vec::new(),
            datum: None,
            script_ref: None,
        }
    }

    /// Build the complete APDU sequence for this output
    pub fn frames(&self, phase: TxPhase) -> Result<Vec<Frame>, ApduError> {
        if self.format == OutputFormat::ArrayLegacy
            && (matches!(self.datum, Some(Datum::Inline(_))) || self.script_ref.is_some())
        {
            return Err(ApduError::Unsupported("babbage output fields in legacy output"));
        }

        let mut frames = alloc::vec![TxOutputBasic::new(phase, self)?.frame()?];

        for g in &self.assets {
            frames.push(TxAssetGroup::new(phase, g)?.frame()?);

            for t in &g.tokens {
                frames.push(TxToken::new(phase, t).frame()?);
            }
        }

        if let Some(d) = &self.datum {
            frames.extend(d.frames(phase)?);
        }

        if let Some(s) = &self.script_ref {
            frames.extend(script_ref_frames(phase, s)?);
        }

        frames.push(TxOutputConfirm { phase }.frame()?);

        #[cfg(feature = "log")]
        log::debug!("output encoded to {} frames", frames.len());

        Ok(frames)
    }
}

/// Output basic data APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    FORMAT     |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                 DESTINATION (type + address)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                          COIN (u64)                           +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       NUM_ASSET_GROUPS                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | DATUM_FLAG    |  SCRIPT_FLAG  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxOutputBasic<'a> {
    phase: TxPhase,
    output: &'a TxOutput,
    num_asset_groups: u32,
}

impl<'a> TxOutputBasic<'a> {
    pub fn new(phase: TxPhase, output: &'a TxOutput) -> Result<Self, ApduError> {
        Ok(Self {
            phase,
            output,
            num_asset_groups: len_u32(output.assets.len())?,
        })
    }
}

impl<'a> TxItem for TxOutputBasic<'a> {
    fn phase(&self) -> TxPhase {
        self.phase
    }
}

impl<'a> ApduStatic for TxOutputBasic<'a> {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase as u8
    }

    fn p2(&self) -> u8 {
        OutputStep::BasicData as u8
    }
}

impl<'a> Encode for TxOutputBasic<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1 + self.output.destination.encode_len()? + 8 + 4 + 1 + 1)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let o = self.output;
        let mut index = 0;

        index += put_u8(buff, o.format as u8)?;
        index += o.destination.encode(&mut buff[index..])?;
        index += put_u64(&mut buff[index..], o.coin)?;
        index += put_u32(&mut buff[index..], self.num_asset_groups)?;
        index += Included::from(&o.datum).encode(&mut buff[index..])?;
        index += Included::from(&o.script_ref).encode(&mut buff[index..])?;

        Ok(index)
    }
}

/// Output confirmation APDU (no payload)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TxOutputConfirm {
    phase: TxPhase,
}

impl TxItem for TxOutputConfirm {
    fn phase(&self) -> TxPhase {
        self.phase
    }
}

impl ApduStatic for TxOutputConfirm {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase as u8
    }

    fn p2(&self) -> u8 {
        OutputStep::Confirm as u8
    }
}

impl Encode for TxOutputConfirm {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        address::{AddressType, Network},
        tx::Token,
        HASH_LEN, KEY_HASH_LEN,
    };

    fn third_party() -> OutputDestination {
        OutputDestination::ThirdParty(
            hex::decode("01d2d1d233e88e9c8428b68ada19acbdcf5a6d6e8fe1e6bbaf2d8f6b1fb3d4ab6e1c6a3e1b96e8e6a6d5ec32e67c3c1ce2b6e5a74aa80cd0ba")
                .unwrap(),
        )
    }

    #[test]
    fn encode_simple_output() {
        let o = TxOutput::new(OutputFormat::ArrayLegacy, third_party(), 1_000_000);
        let frames = o.frames(TxPhase::Outputs).unwrap();

        assert_eq!(frames.len(), 2);

        let b = frames[0].payload();
        assert_eq!((frames[0].p1(), frames[0].p2()), (0x03, 0x30));
        assert_eq!(&b[..6], &[0x00, 0x01, 0, 0, 0, 57]);
        assert_eq!(&b[6 + 57..], &[0, 0, 0, 0, 0, 0x0f, 0x42, 0x40, 0, 0, 0, 0, 0x01, 0x01]);

        assert_eq!((frames[1].p2(), frames[1].payload().len()), (0x33, 0));
    }

    #[test]
    fn encode_full_output() {
        let params = AddressParams::from_fixture(
            AddressType::BasePaymentKeyStakeKey,
            Network::MAINNET,
            "m/1852'/1815'/0'/0/0",
            "m/1852'/1815'/0'/2/0",
        )
        .unwrap();

        let o = TxOutput {
            assets: alloc::vec![AssetGroup {
                policy_id: [0x11; KEY_HASH_LEN],
                tokens: alloc::vec![Token::new(b"a", 1).unwrap(), Token::new(b"b", 2).unwrap()],
            }],
            datum: Some(Datum::Hash([0x22; HASH_LEN])),
            script_ref: Some(alloc::vec![0x33; 10]),
            ..TxOutput::new(OutputFormat::MapBabbage, OutputDestination::DeviceOwned(params), 2)
        };

        let frames = o.frames(TxPhase::CollateralOutput).unwrap();
        let steps: Vec<u8> = frames.iter().map(|f| f.p2()).collect();

        assert_eq!(steps, [0x30, 0x31, 0x32, 0x32, 0x34, 0x36, 0x33]);
        assert!(frames.iter().all(|f| f.p1() == 0x12));

        let b = frames[0].payload();
        assert_eq!(&b[..2], &[0x01, 0x02]);
        assert_eq!(&b[b.len() - 2..], &[0x02, 0x02]);
    }

    #[test]
    fn reject_babbage_fields_in_legacy_output() {
        let o = TxOutput {
            script_ref: Some(alloc::vec![0x00]),
            ..TxOutput::new(OutputFormat::ArrayLegacy, third_party(), 1)
        };

        assert!(matches!(
            o.frames(TxPhase::Outputs),
            Err(ApduError::Unsupported(_))
        ));
    }
}
