// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;
use num_enum::TryFromPrimitive;
use strum::{Display, EnumString};

use super::{TxItem, TxPhase};
use crate::{
    address::Network,
    helpers::{put_u32, put_u64, put_u8},
    ApduError, ApduStatic, Command, Included, Instruction, ADA_APDU_CLA,
};

/// Transaction signing mode, determines which witnesses the device will
/// produce and which transaction elements are permitted
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumString, TryFromPrimitive)]
#[repr(u8)]
pub enum SigningMode {
    Ordinary = 0x03,
    PoolRegistrationAsOwner = 0x04,
    PoolRegistrationAsOperator = 0x05,
    Multisig = 0x06,
    Plutus = 0x07,
}

bitflags::bitflags! {
    /// Transaction option flags
    pub struct TxOptions: u64 {
        /// Serialize sets using CBOR tag 258
        const TAG_CBOR_SETS = 1 << 0;
    }
}

/// Transaction initialisation APDU, declares the transaction shape
/// (presence flags and item counts) for the following phases
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                        OPTIONS (u64)                          +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  NETWORK_ID   |            PROTOCOL_MAGIC (u32) ...           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      ...      |  TTL  |  AUX  | VALID |  MINT |  SDH  | NETID |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | COUT  | TCOLL | TREAS | DONAT |  MODE |  NUM_INPUTS (u32) ... |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /  NUM_OUTPUTS, NUM_CERTIFICATES, NUM_WITHDRAWALS,              /
/// /  NUM_COLLATERAL_INPUTS, NUM_REQUIRED_SIGNERS,                 /
/// /  NUM_REFERENCE_INPUTS, NUM_VOTING_PROCEDURES,                 /
/// /  NUM_WITNESSES (u32 each)                                     /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Presence flags are one byte each, using the [Included] convention.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxInit {
    pub options: TxOptions,
    pub network: Network,

    pub include_ttl: bool,
    pub include_aux_data: bool,
    pub include_validity_start: bool,
    pub include_mint: bool,
    pub include_script_data_hash: bool,
    pub include_network_id: bool,
    pub include_collateral_output: bool,
    pub include_total_collateral: bool,
    pub include_treasury: bool,
    pub include_donation: bool,

    pub signing_mode: SigningMode,

    pub num_inputs: u32,
    pub num_outputs: u32,
    pub num_certificates: u32,
    pub num_withdrawals: u32,
    pub num_collateral_inputs: u32,
    pub num_required_signers: u32,
    pub num_reference_inputs: u32,
    pub num_voting_procedures: u32,
    /// Number of unique witness paths
    pub num_witnesses: u32,
}

impl TxInit {
    /// Encoded length of a [TxInit] APDU
    pub const LEN: usize = 8 + 1 + 4 + 10 + 1 + 9 * 4;

    /// Create an empty transaction init, with no optional fields and no items
    pub fn new(options: TxOptions, network: Network, signing_mode: SigningMode) -> Self {
        Self {
            options,
            network,
            include_ttl: false,
            include_aux_data: false,
            include_validity_start: false,
            include_mint: false,
            include_script_data_hash: false,
            include_network_id: false,
            include_collateral_output: false,
            include_total_collateral: false,
            include_treasury: false,
            include_donation: false,
            signing_mode,
            num_inputs: 0,
            num_outputs: 0,
            num_certificates: 0,
            num_withdrawals: 0,
            num_collateral_inputs: 0,
            num_required_signers: 0,
            num_reference_inputs: 0,
            num_voting_procedures: 0,
            num_witnesses: 0,
        }
    }
}

impl TxItem for TxInit {
    fn phase(&self) -> TxPhase {
        TxPhase::Init
    }
}

impl ApduStatic for TxInit {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }
}

impl Encode for TxInit {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(Self::LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u64(buff, self.options.bits())?;
        index += put_u8(&mut buff[index..], self.network.network_id)?;
        index += put_u32(&mut buff[index..], self.network.protocol_magic)?;

        for f in [
            self.include_ttl,
            self.include_aux_data,
            self.include_validity_start,
            self.include_mint,
            self.include_script_data_hash,
            self.include_network_id,
            self.include_collateral_output,
            self.include_total_collateral,
            self.include_treasury,
            self.include_donation,
        ] {
            index += Included::from(f).encode(&mut buff[index..])?;
        }

        index += put_u8(&mut buff[index..], self.signing_mode as u8)?;

        for n in [
            self.num_inputs,
            self.num_outputs,
            self.num_certificates,
            self.num_withdrawals,
            self.num_collateral_inputs,
            self.num_required_signers,
            self.num_reference_inputs,
            self.num_voting_procedures,
            self.num_witnesses,
        ] {
            index += put_u32(&mut buff[index..], n)?;
        }

        Ok(index)
    }
}
