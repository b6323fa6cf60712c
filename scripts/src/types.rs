//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, TxHash},
};

/// The contracts deployed by the scripts
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// The UniswapV2 price oracle
    UniOracle,
    /// The ownership-gated reward token
    Reward,
    /// The cost-averaging contract, which ends up owning the reward token
    UniDca,
}

impl ContractKind {
    /// The contract name, which is also the stem of its artifact file
    pub fn contract_name(&self) -> &'static str {
        match self {
            ContractKind::UniOracle => "UNIOracle",
            ContractKind::Reward => "REWARD",
            ContractKind::UniDca => "UNIDCA",
        }
    }
}

impl Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.contract_name())
    }
}

/// A single contract-creation transaction to submit
#[derive(Debug, Clone, PartialEq)]
pub struct ContractDeploymentSpec {
    /// The contract to deploy
    pub kind: ContractKind,
    /// The constructor arguments, in declaration order
    pub constructor_args: Vec<DynSolValue>,
    /// The account sending the creation transaction
    pub sender: Address,
    /// Whether the contract's source should be published for verification
    pub publish_source: bool,
}

impl ContractDeploymentSpec {
    /// A spec for a contract whose constructor takes only addresses
    pub fn with_address_args(
        kind: ContractKind,
        args: &[Address],
        sender: Address,
        publish_source: bool,
    ) -> Self {
        Self {
            kind,
            constructor_args: args.iter().copied().map(DynSolValue::Address).collect(),
            sender,
            publish_source,
        }
    }
}

/// A contract that has been deployed on-chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContractHandle {
    /// The deployed contract
    pub kind: ContractKind,
    /// The address the contract was deployed at
    pub address: Address,
    /// The hash of the creation transaction
    pub tx_hash: TxHash,
    /// The block the creation transaction was included in, if the node reported one
    pub block_number: Option<u64>,
    /// Whether source publication was requested for the contract
    pub publish_source: bool,
}

/// The outcome of a full deployment run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReport {
    /// The oracle contract
    pub oracle: DeployedContractHandle,
    /// The reward token contract
    pub reward: DeployedContractHandle,
    /// The DCA contract
    pub dca: DeployedContractHandle,
    /// The hash of the confirmed ownership transfer of the reward token to the DCA contract
    pub ownership_transfer_tx: TxHash,
}

impl DeploymentReport {
    /// The deployed contracts, in deployment order
    pub fn contracts(&self) -> [&DeployedContractHandle; 3] {
        [&self.oracle, &self.reward, &self.dca]
    }
}

impl Display for DeploymentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for contract in self.contracts() {
            writeln!(f, "{} deployed at: {}", contract.kind, contract.address)?;
        }
        write!(
            f,
            "{} ownership transferred to {} in tx {:#x}",
            self.reward.kind, self.dca.kind, self.ownership_transfer_tx
        )
    }
}
