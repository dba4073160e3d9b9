// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    address::{
        AddressMode, AddressParams, AddressResp, AddressType, BlockchainPointer, DeriveAddress,
        Network, SpendingSource, StakingSource, StakingValue,
    },
    cip36::{Cip36Vote, VoteChunk, VoteConfirm, VoteInit, VoteWitness},
    credential::Credential,
    fixture::PathOrBytes,
    frame::Frame,
    governance::{Anchor, DRep, GovActionId, Vote, Voter, VotingProcedure},
    message::{AddressFieldType, MessageData, MessageSign, MessageSignatureResp},
    op_cert::SignOpCert,
    path::DerivationPath,
    pubkey::{GetPublicKey, PublicKeyResp},
    signature::{HashResp, SignatureResp},
    status::{Response, StatusCode},
    tx::{
        AssetGroup, AuxData, Certificate, Cip36ConfirmResp, Cip36Registration, Datum, Mint,
        OutputDestination, OutputFormat, RequiredSigner, SigningMode, Token, Transaction,
        TxInit, TxInput, TxItem, TxOptions, TxOutput, TxPhase, TxProgress, TxStep, Withdrawal,
    },
    version::{AppFlags, GetSerial, GetVersion, SerialResp, VersionResp},
    ApduError, ApduHeader, ApduStatic, Command, Included, Instruction,
};
