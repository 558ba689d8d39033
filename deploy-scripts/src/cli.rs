//! Definitions of CLI arguments for the deploy scripts
//!
//! Every argument is also read from the environment, so a run can be driven
//! entirely by a `.env` file.

use std::path::PathBuf;

use clap::Parser;

use crate::{
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_GAS_PRICES, SEID_COMMAND},
    types::{Inspection, Scenario},
};

#[derive(Parser, Clone, Debug)]
#[command(about = "Provision, configure and inspect the CDP contracts")]
pub struct Cli {
    /// Path to the file recording deployed addresses and code ids
    #[arg(long, env = "DEPLOYMENTS_PATH", default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// Directory holding the compiled contract artifacts
    #[arg(long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Configuration scenarios to apply after provisioning
    #[arg(long, env = "DEPLOY_SCENARIOS", value_delimiter = ',')]
    pub scenarios: Vec<Scenario>,

    /// Inspections to run at the end of the deployment
    #[arg(
        long,
        env = "DEPLOY_INSPECTIONS",
        value_delimiter = ',',
        default_value = "collateral-info"
    )]
    pub inspections: Vec<Inspection>,

    /// Rehearse the run against an in-memory chain
    #[arg(long, env = "DEPLOY_DRY_RUN")]
    pub dry_run: bool,

    /// The `seid` binary used to talk to the chain
    #[arg(long, env = "SEID_BINARY", default_value = SEID_COMMAND)]
    pub seid_binary: String,

    /// Gas prices attached to every transaction
    #[arg(long, env = "GAS_PRICES", default_value = DEFAULT_GAS_PRICES)]
    pub gas_prices: String,
}
