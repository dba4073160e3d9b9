// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing phases and progress tracking

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use super::TxInit;
use crate::ApduError;

/// Transaction signing phase, discriminants are the P1 stage values
/// sent with each [Instruction::SignTx](crate::Instruction::SignTx) APDU.
///
/// Phases must be entered in [TxPhase::ORDER], which differs from the
/// numeric stage values.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Debug,
    EnumString,
    Display,
    EnumVariantNames,
    EnumIter,
    TryFromPrimitive,
)]
#[repr(u8)]
pub enum TxPhase {
    Init = 0x01,
    Inputs = 0x02,
    Outputs = 0x03,
    Fee = 0x04,
    Ttl = 0x05,
    Certificates = 0x06,
    Withdrawals = 0x07,
    AuxData = 0x08,
    ValidityStart = 0x09,
    Confirm = 0x0a,
    Mint = 0x0b,
    ScriptDataHash = 0x0c,
    CollateralInputs = 0x0d,
    RequiredSigners = 0x0e,
    Witnesses = 0x0f,
    TotalCollateral = 0x10,
    ReferenceInputs = 0x11,
    CollateralOutput = 0x12,
    VotingProcedures = 0x13,
    Treasury = 0x15,
    Donation = 0x16,
}

impl TxPhase {
    /// Order in which phases are processed by the device
    pub const ORDER: [TxPhase; 21] = [
        TxPhase::Init,
        TxPhase::AuxData,
        TxPhase::Inputs,
        TxPhase::Outputs,
        TxPhase::Fee,
        TxPhase::Ttl,
        TxPhase::Certificates,
        TxPhase::Withdrawals,
        TxPhase::ValidityStart,
        TxPhase::Mint,
        TxPhase::ScriptDataHash,
        TxPhase::CollateralInputs,
        TxPhase::RequiredSigners,
        TxPhase::CollateralOutput,
        TxPhase::TotalCollateral,
        TxPhase::ReferenceInputs,
        TxPhase::VotingProcedures,
        TxPhase::Treasury,
        TxPhase::Donation,
        TxPhase::Confirm,
        TxPhase::Witnesses,
    ];

    /// Fetch the position of this phase in [TxPhase::ORDER]
    pub fn position(&self) -> usize {
        Self::ORDER
            .iter()
            .position(|p| p == self)
            .unwrap_or(Self::ORDER.len())
    }
}

/// Transaction progress tracker.
///
/// Checks each item against the counts and presence flags declared in
/// [TxInit], rejecting out of order phases, skipped items, and excess items.
/// Multi-frame items (outputs, mint, auxiliary data) count as one item.
#[derive(Clone, Debug, PartialEq)]
pub struct TxProgress {
    init: TxInit,
    phase: TxPhase,
    items: u32,
}

impl TxProgress {
    /// Create a tracker for a transaction following the provided [TxInit]
    pub fn new(init: TxInit) -> Self {
        Self {
            init,
            phase: TxPhase::Init,
            items: 1,
        }
    }

    /// Fetch the current phase
    pub fn phase(&self) -> TxPhase {
        self.phase
    }

    /// Fetch the number of items sent in the current phase
    pub fn items(&self) -> u32 {
        self.items
    }

    /// Number of items expected for a phase
    pub fn expected(&self, phase: TxPhase) -> u32 {
        let i = &self.init;
        let flag = |v: bool| v as u32;

        match phase {
            TxPhase::Init | TxPhase::Fee | TxPhase::Confirm => 1,
            TxPhase::AuxData => flag(i.include_aux_data),
            TxPhase::Inputs => i.num_inputs,
            TxPhase::Outputs => i.num_outputs,
            TxPhase::Ttl => flag(i.include_ttl),
            TxPhase::Certificates => i.num_certificates,
            TxPhase::Withdrawals => i.num_withdrawals,
            TxPhase::ValidityStart => flag(i.include_validity_start),
            TxPhase::Mint => flag(i.include_mint),
            TxPhase::ScriptDataHash => flag(i.include_script_data_hash),
            TxPhase::CollateralInputs => i.num_collateral_inputs,
            TxPhase::RequiredSigners => i.num_required_signers,
            TxPhase::CollateralOutput => flag(i.include_collateral_output),
            TxPhase::TotalCollateral => flag(i.include_total_collateral),
            TxPhase::ReferenceInputs => i.num_reference_inputs,
            TxPhase::VotingProcedures => i.num_voting_procedures,
            TxPhase::Treasury => flag(i.include_treasury),
            TxPhase::Donation => flag(i.include_donation),
            TxPhase::Witnesses => i.num_witnesses,
        }
    }

    /// Record an item for the provided phase, checking ordering and counts
    pub fn advance(&mut self, phase: TxPhase) -> Result<(), ApduError> {
        let (current, next) = (self.phase.position(), phase.position());

        // Additional item in the current phase
        if next == current {
            if self.items >= self.expected(phase) {
                return Err(ApduError::TooManyItems(phase));
            }

            self.items += 1;
            return Ok(());
        }

        if next < current {
            return Err(ApduError::UnexpectedPhase {
                actual: phase,
                current: self.phase,
            });
        }

        if self.expected(phase) == 0 {
            return Err(ApduError::UnexpectedPhase {
                actual: phase,
                current: self.phase,
            });
        }

        // Current and skipped phases must be complete
        if self.items < self.expected(self.phase) {
            return Err(ApduError::MissingItems(self.phase));
        }
        for p in &TxPhase::ORDER[current + 1..next] {
            if self.expected(*p) > 0 {
                return Err(ApduError::MissingItems(*p));
            }
        }

        #[cfg(feature = "log")]
        log::debug!("tx phase {} -> {}", self.phase, phase);

        self.phase = phase;
        self.items = 1;

        Ok(())
    }

    /// Check whether the transaction has been confirmed
    pub fn is_confirmed(&self) -> bool {
        self.phase.position() >= TxPhase::Confirm.position()
    }

    /// Check whether all witnesses have been requested
    pub fn is_complete(&self) -> bool {
        match self.phase {
            TxPhase::Confirm => self.init.num_witnesses == 0,
            TxPhase::Witnesses => self.items == self.init.num_witnesses,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::{
        address::Network,
        tx::{SigningMode, TxOptions},
    };

    fn init() -> TxInit {
        TxInit {
            num_inputs: 2,
            num_outputs: 1,
            num_witnesses: 1,
            include_ttl: true,
            ..TxInit::new(TxOptions::empty(), Network::MAINNET, SigningMode::Ordinary)
        }
    }

    #[test]
    fn phase_order_complete() {
        for p in TxPhase::iter() {
            assert!(p.position() < TxPhase::ORDER.len(), "{p} missing from order");
        }
        assert_eq!(TxPhase::TotalCollateral.position(), TxPhase::CollateralOutput.position() + 1);
    }

    #[test]
    fn ordered_phases() {
        let mut p = TxProgress::new(init());

        for phase in [
            TxPhase::Inputs,
            TxPhase::Inputs,
            TxPhase::Outputs,
            TxPhase::Fee,
            TxPhase::Ttl,
            TxPhase::Confirm,
        ] {
            p.advance(phase).unwrap();
        }

        assert!(p.is_confirmed());
        assert!(!p.is_complete());

        p.advance(TxPhase::Witnesses).unwrap();
        assert!(p.is_complete());
    }

    #[test]
    fn reject_invalid_transitions() {
        let mut p = TxProgress::new(init());

        // Entering a phase not announced in init
        assert_eq!(
            p.advance(TxPhase::AuxData),
            Err(ApduError::UnexpectedPhase {
                actual: TxPhase::AuxData,
                current: TxPhase::Init
            })
        );

        p.advance(TxPhase::Inputs).unwrap();

        // Leaving a phase before all items are sent
        assert_eq!(
            p.advance(TxPhase::Outputs),
            Err(ApduError::MissingItems(TxPhase::Inputs))
        );

        p.advance(TxPhase::Inputs).unwrap();
        assert_eq!(
            p.advance(TxPhase::Inputs),
            Err(ApduError::TooManyItems(TxPhase::Inputs))
        );

        // Skipping mandatory phases
        p.advance(TxPhase::Outputs).unwrap();
        assert_eq!(
            p.advance(TxPhase::Ttl),
            Err(ApduError::MissingItems(TxPhase::Fee))
        );

        // Moving backwards
        p.advance(TxPhase::Fee).unwrap();
        assert_eq!(
            p.advance(TxPhase::Inputs),
            Err(ApduError::UnexpectedPhase {
                actual: TxPhase::Inputs,
                current: TxPhase::Fee
            })
        );
    }
}
