// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::str::FromStr;

use ledger_ada::{
    apdu::{address::Network, path::DerivationPath},
    transport::Filters,
};

/// Fixed length hex argument
#[derive(Clone, PartialEq, Debug)]
pub struct HexData<const N: usize = 32>(pub [u8; N]);

impl<const N: usize> FromStr for HexData<N> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b = [0u8; N];

        hex::decode_to_slice(s, &mut b)?;

        Ok(HexData(b))
    }
}

impl<const N: usize> AsRef<[u8; N]> for HexData<N> {
    fn as_ref(&self) -> &[u8; N] {
        &self.0
    }
}

/// Variable length hex argument
#[derive(Clone, PartialEq, Debug)]
pub struct HexBytes(pub Vec<u8>);

impl FromStr for HexBytes {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(s).map(HexBytes)
    }
}

/// Parse a derivation path argument (`m/1852'/1815'/0'`)
pub fn parse_path(s: &str) -> Result<DerivationPath, String> {
    DerivationPath::from_str(s).map_err(|e| format!("{e}"))
}

/// Network selection
#[derive(Copy, Clone, PartialEq, Debug, clap::ValueEnum, strum::Display)]
pub enum NetworkArg {
    Mainnet,
    Testnet,
}

impl From<NetworkArg> for Network {
    fn from(n: NetworkArg) -> Self {
        match n {
            NetworkArg::Mainnet => Network::MAINNET,
            NetworkArg::Testnet => Network::TESTNET,
        }
    }
}

/// Transports for device discovery
#[derive(Copy, Clone, PartialEq, Debug, clap::ValueEnum, strum::Display)]
pub enum TargetArg {
    Any,
    Hid,
    Tcp,
}

impl From<TargetArg> for Filters {
    fn from(t: TargetArg) -> Self {
        match t {
            TargetArg::Any => Filters::Any,
            TargetArg::Hid => Filters::Hid,
            TargetArg::Tcp => Filters::Tcp,
        }
    }
}
