//! The deployment run: three contract creations followed by the reward token ownership transfer

use alloy::{
    primitives::{Address, TxHash},
    signers::local::PrivateKeySigner,
};
use tracing::info;

use crate::{
    cli::Cli,
    config::{DeployConfig, ExternalAddresses, NetworkProfile},
    constants::NUM_OWNERSHIP_TRANSFER_CONFIRMATIONS,
    deployer::{ContractDeployer, RpcDeployer},
    errors::ScriptError,
    types::{ContractDeploymentSpec, ContractKind, DeployedContractHandle, DeploymentReport},
    utils::setup_client,
};

/// Everything a deployment run needs before it touches the network
pub struct DeploymentContext {
    /// The identity signing every transaction
    pub signer: PrivateKeySigner,
    /// The network being deployed to
    pub profile: NetworkProfile,
}

impl DeploymentContext {
    /// Resolve the signing identity and the network profile from the config.
    ///
    /// The signing identity is resolved first, so a missing or malformed key
    /// fails before anything else is looked at.
    pub fn from_config(
        config: &DeployConfig,
        network: Option<&str>,
        rpc_override: Option<&str>,
    ) -> Result<Self, ScriptError> {
        let signer = config.signing_identity()?;
        let profile = config.network_profile(network, rpc_override)?;
        Ok(Self { signer, profile })
    }

    /// The address of the signing identity
    pub fn sender(&self) -> Address {
        self.signer.address()
    }
}

/// Run a deployment as configured by the CLI arguments and print the report
pub async fn run_deployment(cli: Cli) -> Result<(), ScriptError> {
    let config = DeployConfig::load(&cli.config)?;
    let ctx =
        DeploymentContext::from_config(&config, cli.network.as_deref(), cli.rpc_url.as_deref())?;
    info!(
        "deploying from {} to network `{}`",
        ctx.sender(),
        ctx.profile.name
    );

    let client = setup_client(ctx.signer.clone(), &ctx.profile.rpc_url).await?;
    let deployer = RpcDeployer::new(client, config.build_dir(), ctx.profile.tx_timeout);

    let report = deploy_all(&deployer, ctx.sender(), &ctx.profile.addresses).await?;
    println!("{report}");

    Ok(())
}

/// Deploy the oracle, the reward token and the DCA contract in that order, then
/// hand ownership of the reward token to the DCA contract.
///
/// Stops at the first failing step; contracts deployed before it stay on-chain.
pub async fn deploy_all<D: ContractDeployer>(
    deployer: &D,
    sender: Address,
    addresses: &ExternalAddresses,
) -> Result<DeploymentReport, ScriptError> {
    let oracle = deploy_contract(deployer, oracle_spec(sender, addresses)).await?;
    let reward = deploy_contract(deployer, reward_spec(sender)).await?;
    let dca = deploy_contract(deployer, dca_spec(sender, &reward, &oracle, addresses)).await?;

    let ownership_transfer_tx = transfer_reward_ownership(deployer, &reward, &dca, sender).await?;

    Ok(DeploymentReport {
        oracle,
        reward,
        dca,
        ownership_transfer_tx,
    })
}

/// The oracle reads prices from the UniswapV2 WETH/UNI pair
pub fn oracle_spec(sender: Address, addresses: &ExternalAddresses) -> ContractDeploymentSpec {
    ContractDeploymentSpec::with_address_args(
        ContractKind::UniOracle,
        &[addresses.uniswap_factory, addresses.weth, addresses.uni_token],
        sender,
        true, /* publish_source */
    )
}

/// The reward token takes no constructor arguments
pub fn reward_spec(sender: Address) -> ContractDeploymentSpec {
    ContractDeploymentSpec::with_address_args(
        ContractKind::Reward,
        &[],
        sender,
        true, /* publish_source */
    )
}

/// The DCA contract is constructed from the two contracts deployed before it
pub fn dca_spec(
    sender: Address,
    reward: &DeployedContractHandle,
    oracle: &DeployedContractHandle,
    addresses: &ExternalAddresses,
) -> ContractDeploymentSpec {
    ContractDeploymentSpec::with_address_args(
        ContractKind::UniDca,
        &[
            reward.address,
            oracle.address,
            addresses.swap_router,
            addresses.base_token,
        ],
        sender,
        true, /* publish_source */
    )
}

/// Deploy a single contract, logging where and when it landed
async fn deploy_contract<D: ContractDeployer>(
    deployer: &D,
    spec: ContractDeploymentSpec,
) -> Result<DeployedContractHandle, ScriptError> {
    info!("deploying {}", spec.kind);
    let handle = deployer.deploy(&spec).await?;
    info!(
        "{} deployed at {} in tx {:#x} (block {})",
        handle.kind,
        handle.address,
        handle.tx_hash,
        handle.block_number.map_or_else(|| "pending".to_string(), |n| n.to_string())
    );

    Ok(handle)
}

/// Make the DCA contract the owner of the reward token and check that the
/// transfer took effect
pub async fn transfer_reward_ownership<D: ContractDeployer>(
    deployer: &D,
    reward: &DeployedContractHandle,
    dca: &DeployedContractHandle,
    sender: Address,
) -> Result<TxHash, ScriptError> {
    info!("transferring {} ownership to {}", reward.kind, dca.address);
    let tx_hash = deployer
        .transfer_ownership(
            reward,
            dca.address,
            sender,
            NUM_OWNERSHIP_TRANSFER_CONFIRMATIONS,
        )
        .await?;

    let owner = deployer.owner_of(reward.address).await?;
    if owner != dca.address {
        return Err(ScriptError::ContractInteraction(format!(
            "{} owner is {} after transfer, expected {}",
            reward.kind, owner, dca.address
        )));
    }

    info!("{} now owned by {}", reward.kind, dca.kind);
    Ok(tx_hash)
}
