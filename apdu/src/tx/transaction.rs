// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Complete transaction records
//!
//! A [Transaction] collects every part of a transaction to be signed,
//! derives the matching [TxInit], and produces the APDU sequence for each
//! item in [TxPhase::ORDER].

use alloc::vec::Vec;

use super::{
    AuxData, Certificate, InputKind, Mint, RequiredSigner, SigningMode, TxConfirm, TxInit,
    TxInput, TxInputAdd, TxItem, TxOptions, TxOutput, TxPhase, TxScriptDataHash, TxValue,
    TxWitness, ValueKind, Withdrawal,
};
use crate::{
    address::Network, frame::Frame, governance::VotingProcedure, helpers::len_u32,
    path::DerivationPath, ApduError, Command, Hash32,
};

/// Transaction to be signed
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
    pub options: TxOptions,
    pub network: Network,
    pub signing_mode: SigningMode,
    pub include_network_id: bool,

    pub aux_data: Option<AuxData>,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub fee: u64,
    pub ttl: Option<u64>,
    pub certificates: Vec<Certificate>,
    pub withdrawals: Vec<Withdrawal>,
    pub validity_start: Option<u64>,
    pub mint: Option<Mint>,
    pub script_data_hash: Option<Hash32>,
    pub collateral_inputs: Vec<TxInput>,
    pub required_signers: Vec<RequiredSigner>,
    pub collateral_output: Option<TxOutput>,
    pub total_collateral: Option<u64>,
    pub reference_inputs: Vec<TxInput>,
    pub voting_procedures: Vec<VotingProcedure>,
    pub treasury: Option<u64>,
    pub donation: Option<u64>,

    /// Signing paths, duplicates are requested once
    pub witness_paths: Vec<DerivationPath>,
}

/// Frames for a single transaction item
#[derive(Clone, PartialEq, Debug)]
pub struct TxStep {
    pub phase: TxPhase,
    pub frames: Vec<Frame>,
}

impl TxStep {
    fn single<C: Command>(phase: TxPhase, c: &C) -> Result<Self, ApduError> {
        Ok(Self {
            phase,
            frames: alloc::vec![c.frame()?],
        })
    }
}

impl Transaction {
    /// Create an empty transaction with the provided fee
    pub fn new(network: Network, signing_mode: SigningMode, fee: u64) -> Self {
        Self {
            options: TxOptions::empty(),
            network,
            signing_mode,
            include_network_id: false,
            aux_data: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            fee,
            ttl: None,
            certificates: Vec::new(),
            withdrawals: Vec::new(),
            validity_start: None,
            mint: None,
            script_data_hash: None,
            collateral_inputs: Vec::new(),
            required_signers: Vec::new(),
            collateral_output: None,
            total_collateral: None,
            reference_inputs: Vec::new(),
            voting_procedures: Vec::new(),
            treasury: None,
            donation: None,
            witness_paths: Vec::new(),
        }
    }

    /// Fetch de-duplicated witness paths, in order of first occurrence
    pub fn unique_witnesses(&self) -> Vec<DerivationPath> {
        let mut w: Vec<DerivationPath> = Vec::with_capacity(self.witness_paths.len());

        for p in &self.witness_paths {
            if !w.contains(p) {
                w.push(p.clone());
            }
        }

        w
    }

    fn mint(&self) -> Option<&Mint> {
        self.mint.as_ref().filter(|m| !m.is_empty())
    }

    /// Build the [TxInit] describing this transaction
    pub fn init(&self) -> Result<TxInit, ApduError> {
        Ok(TxInit {
            include_ttl: self.ttl.is_some(),
            include_aux_data: self.aux_data.is_some(),
            include_validity_start: self.validity_start.is_some(),
            include_mint: self.mint().is_some(),
            include_script_data_hash: self.script_data_hash.is_some(),
            include_network_id: self.include_network_id,
            include_collateral_output: self.collateral_output.is_some(),
            include_total_collateral: self.total_collateral.is_some(),
            include_treasury: self.treasury.is_some(),
            include_donation: self.donation.is_some(),

            num_inputs: len_u32(self.inputs.len())?,
            num_outputs: len_u32(self.outputs.len())?,
            num_certificates: len_u32(self.certificates.len())?,
            num_withdrawals: len_u32(self.withdrawals.len())?,
            num_collateral_inputs: len_u32(self.collateral_inputs.len())?,
            num_required_signers: len_u32(self.required_signers.len())?,
            num_reference_inputs: len_u32(self.reference_inputs.len())?,
            num_voting_procedures: len_u32(self.voting_procedures.len())?,
            num_witnesses: len_u32(self.unique_witnesses().len())?,

            ..TxInit::new(self.options, self.network, self.signing_mode)
        })
    }

    /// Build the APDU sequence for every item, in phase order
    pub fn steps(&self) -> Result<Vec<TxStep>, ApduError> {
        let mut s = alloc::vec![TxStep::single(TxPhase::Init, &self.init()?)?];

        if let Some(a) = &self.aux_data {
            s.push(TxStep {
                phase: TxPhase::AuxData,
                frames: a.frames()?,
            });
        }

        inputs(&mut s, InputKind::Spend, &self.inputs)?;

        for o in &self.outputs {
            s.push(TxStep {
                phase: TxPhase::Outputs,
                frames: o.frames(TxPhase::Outputs)?,
            });
        }

        s.push(TxStep::single(
            TxPhase::Fee,
            &TxValue::new(ValueKind::Fee, self.fee),
        )?);

        value(&mut s, ValueKind::Ttl, self.ttl)?;

        for c in &self.certificates {
            s.push(TxStep::single(TxPhase::Certificates, c)?);
        }
        for w in &self.withdrawals {
            s.push(TxStep::single(TxPhase::Withdrawals, w)?);
        }

        value(&mut s, ValueKind::ValidityStart, self.validity_start)?;

        if let Some(m) = self.mint() {
            s.push(TxStep {
                phase: TxPhase::Mint,
                frames: m.frames()?,
            });
        }

        if let Some(h) = &self.script_data_hash {
            s.push(TxStep::single(
                TxPhase::ScriptDataHash,
                &TxScriptDataHash(*h),
            )?);
        }

        inputs(&mut s, InputKind::Collateral, &self.collateral_inputs)?;

        for r in &self.required_signers {
            s.push(TxStep::single(TxPhase::RequiredSigners, r)?);
        }

        if let Some(o) = &self.collateral_output {
            s.push(TxStep {
                phase: TxPhase::CollateralOutput,
                frames: o.frames(TxPhase::CollateralOutput)?,
            });
        }

        value(&mut s, ValueKind::TotalCollateral, self.total_collateral)?;

        inputs(&mut s, InputKind::Reference, &self.reference_inputs)?;

        for v in &self.voting_procedures {
            s.push(TxStep::single(TxPhase::VotingProcedures, v)?);
        }

        value(&mut s, ValueKind::Treasury, self.treasury)?;
        value(&mut s, ValueKind::Donation, self.donation)?;

        s.push(TxStep::single(TxPhase::Confirm, &TxConfirm)?);

        for p in self.unique_witnesses() {
            s.push(TxStep::single(TxPhase::Witnesses, &TxWitness(p))?);
        }

        Ok(s)
    }
}

fn inputs(s: &mut Vec<TxStep>, kind: InputKind, inputs: &[TxInput]) -> Result<(), ApduError> {
    for i in inputs {
        let c = TxInputAdd::new(kind, *i);
        s.push(TxStep::single(c.phase(), &c)?);
    }
    Ok(())
}

fn value(s: &mut Vec<TxStep>, kind: ValueKind, v: Option<u64>) -> Result<(), ApduError> {
    if let Some(v) = v {
        let c = TxValue::new(kind, v);
        s.push(TxStep::single(c.phase(), &c)?);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use core::str::FromStr;

    use super::*;
    use crate::{
        tx::{OutputDestination, OutputFormat, TxProgress},
        HASH_LEN,
    };

    fn path(s: &str) -> DerivationPath {
        DerivationPath::from_str(s).unwrap()
    }

    fn tx() -> Transaction {
        let input = TxInput {
            tx_hash: [0x3b; HASH_LEN],
            index: 0,
        };

        Transaction {
            inputs: alloc::vec![input, input],
            outputs: alloc::vec![TxOutput::new(
                OutputFormat::ArrayLegacy,
                OutputDestination::ThirdParty(alloc::vec![0x61; 29]),
                3_003_112,
            )],
            ttl: Some(10),
            donation: Some(5),
            collateral_inputs: alloc::vec![input],
            witness_paths: alloc::vec![
                path("m/1852'/1815'/0'/0/0"),
                path("m/1852'/1815'/0'/2/0"),
                path("m/1852'/1815'/0'/0/0"),
            ],
            ..Transaction::new(Network::TESTNET, SigningMode::Plutus, 42)
        }
    }

    #[test]
    fn duplicate_witnesses_collapsed() {
        let t = tx();

        assert_eq!(t.unique_witnesses().len(), 2);

        let i = t.init().unwrap();
        assert_eq!(i.num_witnesses, 2);
        assert_eq!(i.num_inputs, 2);
        assert_eq!(i.num_collateral_inputs, 1);
        assert!(i.include_ttl && i.include_donation && !i.include_mint);
    }

    #[test]
    fn steps_follow_phase_order() {
        let t = tx();
        let steps = t.steps().unwrap();

        let phases: Vec<TxPhase> = steps.iter().map(|s| s.phase).collect();
        assert_eq!(
            phases,
            [
                TxPhase::Init,
                TxPhase::Inputs,
                TxPhase::Inputs,
                TxPhase::Outputs,
                TxPhase::Fee,
                TxPhase::Ttl,
                TxPhase::CollateralInputs,
                TxPhase::Donation,
                TxPhase::Confirm,
                TxPhase::Witnesses,
                TxPhase::Witnesses,
            ]
        );

        // Every step is accepted by the progress tracker
        let mut p = TxProgress::new(t.init().unwrap());
        for s in &steps[1..] {
            p.advance(s.phase).unwrap();
            assert!(s.frames.iter().all(|f| f.p1() == s.phase as u8));
        }
        assert!(p.is_complete());
    }

    #[test]
    fn empty_mint_not_included() {
        let t = Transaction {
            mint: Some(Mint::default()),
            ..tx()
        };

        assert!(!t.init().unwrap().include_mint);
        assert!(t.steps().unwrap().iter().all(|s| s.phase != TxPhase::Mint));
    }
}
