//! Definitions of CLI arguments for the deploy script

use std::path::PathBuf;

use clap::Parser;

use crate::{
    commands::run_deployment,
    constants::{CONFIG_PATH_ENV_VAR, DEFAULT_CONFIG_PATH},
    errors::ScriptError,
};

/// Deploy the UNIOracle, REWARD and UNIDCA contracts and hand ownership of
/// REWARD to UNIDCA.
///
/// Every argument is optional; a bare invocation deploys to the default network
/// of the configuration file.
#[derive(Parser)]
pub struct Cli {
    /// Path to the deployment configuration file
    #[arg(short, long, env = CONFIG_PATH_ENV_VAR, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Network profile to deploy to, defaults to `networks.default` in the config
    #[arg(short, long)]
    pub network: Option<String>,

    /// Network RPC URL, overriding the one in the network profile
    #[arg(short, long)]
    pub rpc_url: Option<String>,
}

impl Cli {
    /// Run the deployment described by the arguments
    pub async fn run(self) -> Result<(), ScriptError> {
        run_deployment(self).await
    }
}
