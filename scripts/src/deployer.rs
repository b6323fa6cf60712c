//! The interface through which the scripts touch the chain, and its RPC implementation

use std::{path::PathBuf, time::Duration};

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, TxHash},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use tracing::{debug, warn};

use crate::{
    artifacts::ContractArtifact,
    constants::NUM_DEPLOY_CONFIRMATIONS,
    errors::ScriptError,
    solidity::IReward,
    types::{ContractDeploymentSpec, DeployedContractHandle},
    utils::ensure_tx_success,
};

/// Submits contract creations and calls on behalf of the deployment run.
///
/// Every method blocks until the node has mined the transaction; none of them retry.
#[allow(async_fn_in_trait)]
pub trait ContractDeployer {
    /// Submit a contract-creation transaction and wait for its receipt
    async fn deploy(
        &self,
        spec: &ContractDeploymentSpec,
    ) -> Result<DeployedContractHandle, ScriptError>;

    /// Call `setupNewOwner(new_owner)` on the given contract from `sender`, waiting
    /// for `confirmations` confirmations. Returns the hash of the call.
    async fn transfer_ownership(
        &self,
        contract: &DeployedContractHandle,
        new_owner: Address,
        sender: Address,
        confirmations: u64,
    ) -> Result<TxHash, ScriptError>;

    /// Read the current owner of an ownership-gated contract
    async fn owner_of(&self, contract: Address) -> Result<Address, ScriptError>;
}

/// A [`ContractDeployer`] sending transactions through a JSON-RPC provider
pub struct RpcDeployer {
    /// The signing provider
    client: DynProvider,
    /// The directory holding the contract artifacts
    build_dir: PathBuf,
    /// How long to wait for each receipt
    tx_timeout: Duration,
}

impl RpcDeployer {
    /// Constructor
    pub fn new(client: DynProvider, build_dir: PathBuf, tx_timeout: Duration) -> Self {
        Self {
            client,
            build_dir,
            tx_timeout,
        }
    }
}

impl ContractDeployer for RpcDeployer {
    async fn deploy(
        &self,
        spec: &ContractDeploymentSpec,
    ) -> Result<DeployedContractHandle, ScriptError> {
        let artifact = ContractArtifact::load(&self.build_dir, spec.kind)?;
        let deploy_code = artifact.deploy_code(&spec.constructor_args)?;

        let tx = TransactionRequest::default()
            .with_from(spec.sender)
            .with_deploy_code(deploy_code);

        let pending_tx = self
            .client
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", spec.kind, e)))?;
        debug!("{} creation tx: {:#x}", spec.kind, pending_tx.tx_hash());

        let receipt = pending_tx
            .with_required_confirmations(NUM_DEPLOY_CONFIRMATIONS)
            .with_timeout(Some(self.tx_timeout))
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", spec.kind, e)))?;

        let handle = deployed_handle(spec, &receipt)?;
        if spec.publish_source {
            warn!(
                "source publication requested for {} at {}, publish it with your block explorer",
                spec.kind, handle.address
            );
        }

        Ok(handle)
    }

    async fn transfer_ownership(
        &self,
        contract: &DeployedContractHandle,
        new_owner: Address,
        sender: Address,
        confirmations: u64,
    ) -> Result<TxHash, ScriptError> {
        let reward = IReward::new(contract.address, &self.client);

        let pending_tx = reward
            .setupNewOwner(new_owner)
            .from(sender)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        debug!("{} setupNewOwner tx: {:#x}", contract.kind, pending_tx.tx_hash());

        let receipt = pending_tx
            .with_required_confirmations(confirmations)
            .with_timeout(Some(self.tx_timeout))
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        ensure_tx_success(&receipt, ScriptError::ContractInteraction)?;
        Ok(receipt.transaction_hash)
    }

    async fn owner_of(&self, contract: Address) -> Result<Address, ScriptError> {
        let reward = IReward::new(contract, &self.client);
        let owner = reward
            .owner()
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(owner)
    }
}

/// Build the handle of a deployed contract from its creation receipt.
///
/// A reverted creation, or a receipt without a contract address, is a deployment error.
pub(crate) fn deployed_handle(
    spec: &ContractDeploymentSpec,
    receipt: &TransactionReceipt,
) -> Result<DeployedContractHandle, ScriptError> {
    ensure_tx_success(receipt, |e| {
        ScriptError::ContractDeployment(format!("{}: {}", spec.kind, e))
    })?;

    let address = receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "{}: receipt for {:#x} has no contract address",
            spec.kind, receipt.transaction_hash
        ))
    })?;

    Ok(DeployedContractHandle {
        kind: spec.kind,
        address,
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        publish_source: spec.publish_source,
    })
}
