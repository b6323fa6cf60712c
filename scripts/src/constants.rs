//! Constants used in the deploy scripts

use alloy::primitives::{address, Address};

/// The default path of the deployment configuration file
pub const DEFAULT_CONFIG_PATH: &str = "deploy-config.yaml";

/// The environment variable that may point at the configuration file instead of `--config`
pub const CONFIG_PATH_ENV_VAR: &str = "DEPLOY_CONFIG";

/// The default directory containing the compiled contract artifacts,
/// relative to the configuration file
pub const DEFAULT_BUILD_DIR: &str = "build/contracts";

/// The extension of a contract artifact file
pub const ARTIFACT_EXTENSION: &str = "json";

/// The wallet profile in the `wallets` section whose key signs every transaction
pub const DEPLOYER_WALLET_KEY: &str = "dev_account_1";

/// The network profile used when neither the CLI nor `networks.default` names one
pub const DEFAULT_NETWORK: &str = "development";

/// The RPC URL used for a network profile that doesn't set one
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// The number of seconds to wait for a transaction receipt before giving up
pub const DEFAULT_TX_TIMEOUT_SECS: u64 = 120;

/// The number of confirmations to wait for a contract deployment transaction
pub const NUM_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The number of confirmations to wait for the reward token ownership transfer
pub const NUM_OWNERSHIP_TRANSFER_CONFIRMATIONS: u64 = 1;

/// The placeholder prefix the Solidity compiler leaves in bytecode with unlinked libraries
pub const UNLINKED_LIBRARY_MARKER: &str = "__";

// -------------------------------
// | External Protocol Addresses |
// -------------------------------

/// The UniswapV2 factory, passed to the oracle constructor
pub const DEFAULT_UNISWAP_FACTORY: Address = address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");

/// The wrapped ether token, passed to the oracle constructor
pub const DEFAULT_WETH: Address = address!("c778417E063141139Fce010982780140Aa0cD5Ab");

/// The UNI token, passed to the oracle constructor
pub const DEFAULT_UNI_TOKEN: Address = address!("1f9840a85d5aF5bf1D1762F925BDADdC4201F984");

/// The UniswapV2 router the DCA contract swaps through
pub const DEFAULT_SWAP_ROUTER: Address = address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D");

/// The token the DCA contract accumulates
pub const DEFAULT_BASE_TOKEN: Address = DEFAULT_UNI_TOKEN;
