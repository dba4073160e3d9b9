// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for interacting with the Ledger Cardano app

use std::net::SocketAddr;

use clap::Parser;
use log::{debug, info, LevelFilter};
use serde::Serialize;

use ledger_ada::{
    apdu::{
        address::{AddressParams, AddressType},
        message::MessageData,
        op_cert::SignOpCert,
        path::DerivationPath,
    },
    transport::{connect_tcp, DryRun, LedgerProvider, Transport},
    DeviceHandle, Exchange,
};

mod helpers;
use helpers::*;

/// Ledger Cardano command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Supported transports for ledger discovery
    #[clap(long, value_enum, default_value = "any")]
    target: TargetArg,

    /// Device index (where more than one device is available)
    #[clap(long, default_value = "0")]
    device_index: usize,

    /// Connect directly to an emulator APDU socket (eg. `127.0.0.1:9999`)
    #[clap(long, conflicts_with = "dry_run")]
    tcp: Option<SocketAddr>,

    /// Print encoded frames instead of exchanging them with a device
    #[clap(long)]
    dry_run: bool,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// List available devices
    List,

    /// Fetch application version
    Version,

    /// Fetch device serial
    Serial,

    /// Fetch the extended public key for a derivation path
    PublicKey {
        /// Derivation path
        #[clap(long, value_parser = parse_path)]
        path: DerivationPath,
    },

    /// Derive an address (and optionally show it on the device)
    Address {
        /// Address type (eg. `base-payment-key-stake-key`)
        #[clap(long)]
        addr_type: AddressType,

        #[clap(long, value_enum, default_value = "mainnet")]
        network: NetworkArg,

        /// Spending path (`m/...`) or script hash (hex)
        #[clap(long, default_value = "")]
        spending: String,

        /// Staking path (`m/...`), key / script hash or blockchain pointer (hex)
        #[clap(long, default_value = "")]
        staking: String,

        /// Display the address on the device
        #[clap(long)]
        show: bool,
    },

    /// Sign CIP-36 vote-cast data
    SignVote {
        /// Hex encoded vote-cast data
        #[clap(long)]
        vote_cast: HexBytes,

        /// Witness signing path
        #[clap(long, value_parser = parse_path)]
        path: DerivationPath,
    },

    /// Sign a CIP-8 message
    SignMessage {
        /// Message to sign
        message: String,

        /// Interpret the message as hex and display it as such
        #[clap(long)]
        hex: bool,

        /// Sign the message hash rather than the message
        #[clap(long)]
        hash_payload: bool,

        /// Signing path
        #[clap(long, value_parser = parse_path)]
        path: DerivationPath,

        /// Address type for the address field, the key hash is used where unset
        #[clap(long)]
        addr_type: Option<AddressType>,

        #[clap(long, value_enum, default_value = "mainnet")]
        network: NetworkArg,

        /// Address field spending path or script hash
        #[clap(long, default_value = "")]
        spending: String,

        /// Address field staking path, hash or pointer
        #[clap(long, default_value = "")]
        staking: String,
    },

    /// Sign an operational certificate
    OpCert {
        /// Hex encoded KES public key
        #[clap(long)]
        kes_public_key: HexData<32>,

        /// KES period
        #[clap(long)]
        kes_period: u64,

        /// Issue counter
        #[clap(long)]
        issue_counter: u64,

        /// Pool cold key path
        #[clap(long, value_parser = parse_path)]
        path: DerivationPath,
    },
}

/// Signature output
#[derive(Clone, PartialEq, Debug, Serialize)]
struct SignatureOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
    signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address_field: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default())?;

    // Execute against dry-run or direct emulator transports where selected
    if args.dry_run {
        debug!("Using dry-run transport");
        return execute(DeviceHandle::from(DryRun::default()), args.cmd).await;
    }

    if let Some(addr) = args.tcp {
        debug!("Using emulator at {addr}");
        let d = connect_tcp(addr).await?;
        return execute(DeviceHandle::from(d), args.cmd).await;
    }

    // Otherwise discover available devices
    let mut p = LedgerProvider::init().await;

    debug!("Using transport: {}", args.target);

    let mut devices = p.list(args.target.into()).await?;
    if devices.is_empty() {
        return Err(anyhow::anyhow!("No devices found"));
    }

    // Handle list command
    if args.cmd == Actions::List {
        info!("Devices:");
        for (i, d) in devices.iter().enumerate() {
            info!("  {i} {d:?}");
        }

        return Ok(());
    }

    if args.device_index >= devices.len() {
        return Err(anyhow::anyhow!(
            "Device index {} out of range ({} devices)",
            args.device_index,
            devices.len()
        ));
    }

    let info = devices.remove(args.device_index);
    debug!("Connecting to device: {info:?}");

    let d = p.connect(info).await?;

    execute(DeviceHandle::from(d), args.cmd).await
}

/// Execute a command with the provided transport
async fn execute<T>(d: DeviceHandle<T>, cmd: Actions) -> anyhow::Result<()>
where
    T: Exchange + Send + 'static,
{
    debug!("Executing command: {:?}", cmd);

    match cmd {
        Actions::List => {
            info!("device listing requires discovery (omit --tcp and --dry-run)");
        }
        Actions::Version => {
            let v = d.version().await?;

            info!("app version: {v} (flags: {:?})", v.flags);
        }
        Actions::Serial => {
            let s = d.serial().await?;

            info!("serial: {}", hex::encode(s.serial));
        }
        Actions::PublicKey { path } => {
            info!("requesting public key for: {path}");

            let k = d.public_key(&path).await?;

            info!("public key: {}", hex::encode(k.public_key));
            info!("chain code: {}", hex::encode(k.chain_code));
        }
        Actions::Address {
            addr_type,
            network,
            spending,
            staking,
            show,
        } => {
            let p = address(addr_type, network, &spending, &staking)?;

            match show {
                true => {
                    info!("confirm address on device");
                    d.show_address(&p).await?;
                }
                false => {
                    let a = d.derive_address(&p).await?;
                    info!("address: {}", hex::encode(a));
                }
            }
        }
        Actions::SignVote { vote_cast, path } => {
            info!("signing vote ({} bytes) with: {path}", vote_cast.0.len());

            let r = d.sign_vote(&vote_cast.0, &path).await?;

            output(&SignatureOutput {
                hash: Some(hex::encode(r.data_hash)),
                signature: hex::encode(r.signature),
                public_key: None,
                address_field: None,
            })?;
        }
        Actions::SignMessage {
            message,
            hex: is_hex,
            hash_payload,
            path,
            addr_type,
            network,
            spending,
            staking,
        } => {
            let message = match is_hex {
                true => hex::decode(&message)?,
                false => message.into_bytes(),
            };

            let address = match addr_type {
                Some(t) => Some(address(t, network, &spending, &staking)?),
                None => None,
            };

            let m = MessageData {
                message,
                signing_path: path,
                hash_payload,
                is_ascii: !is_hex,
                address,
            };

            let r = d.sign_message(&m).await?;

            output(&SignatureOutput {
                hash: None,
                signature: hex::encode(r.signature),
                public_key: Some(hex::encode(r.signing_public_key)),
                address_field: Some(hex::encode(&r.address_field)),
            })?;
        }
        Actions::OpCert {
            kes_public_key,
            kes_period,
            issue_counter,
            path,
        } => {
            let c = SignOpCert {
                kes_public_key: kes_public_key.0,
                kes_period,
                issue_counter,
                path,
            };

            let s = d.sign_op_cert(&c).await?;

            output(&SignatureOutput {
                hash: None,
                signature: hex::encode(s),
                public_key: None,
                address_field: None,
            })?;
        }
    }

    Ok(())
}

/// Build address parameters from textual arguments
fn address(
    addr_type: AddressType,
    network: NetworkArg,
    spending: &str,
    staking: &str,
) -> anyhow::Result<AddressParams> {
    AddressParams::from_fixture(addr_type, network.into(), spending, staking)
        .map_err(|e| anyhow::anyhow!("invalid address parameters: {e}"))
}

fn output(o: &SignatureOutput) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(o)?);
    Ok(())
}
