//! Loading of the deployment configuration file
//!
//! The configuration is a YAML document holding the wallet profiles and one
//! profile per network. String values may reference environment variables as
//! `${NAME}`; these are resolved lazily, when the value is used, after the
//! optional `.env` file named by the `dotenv` key has been loaded.

use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    constants::{
        DEFAULT_BASE_TOKEN, DEFAULT_BUILD_DIR, DEFAULT_NETWORK, DEFAULT_RPC_URL,
        DEFAULT_SWAP_ROUTER, DEFAULT_TX_TIMEOUT_SECS, DEFAULT_UNISWAP_FACTORY,
        DEFAULT_UNI_TOKEN, DEFAULT_WETH, DEPLOYER_WALLET_KEY,
    },
    errors::ScriptError,
};

/// The deployment configuration, as read from disk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployConfig {
    /// A `.env` file to load before resolving `${VAR}` references
    #[serde(default)]
    pub dotenv: Option<PathBuf>,
    /// The directory holding the compiled contract artifacts
    #[serde(default)]
    pub build_dir: Option<PathBuf>,
    /// Wallet profiles, keyed by name
    #[serde(default)]
    pub wallets: HashMap<String, WalletConfig>,
    /// Network profiles
    #[serde(default)]
    pub networks: NetworksConfig,
    /// The directory relative paths in the config are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// A wallet profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    /// The hex-encoded private key, or a `${VAR}` reference to one
    pub private_key: Option<String>,
}

/// The `networks` section: a default network name plus one entry per network
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworksConfig {
    /// The network used when none is given on the command line
    pub default: Option<String>,
    /// The network profiles, keyed by name
    #[serde(flatten)]
    pub profiles: HashMap<String, NetworkConfig>,
}

/// A network profile as written in the config, before interpolation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkConfig {
    /// The JSON-RPC endpoint of the network
    pub rpc_url: Option<String>,
    /// How long to wait for each transaction receipt, in seconds
    pub tx_timeout_secs: Option<u64>,
    /// Override for the UniswapV2 factory address
    pub uniswap_factory: Option<String>,
    /// Override for the wrapped ether address
    pub weth: Option<String>,
    /// Override for the UNI token address
    pub uni_token: Option<String>,
    /// Override for the swap router address
    pub swap_router: Option<String>,
    /// Override for the DCA base token address
    pub base_token: Option<String>,
}

/// The external protocol addresses the deployed contracts are constructed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalAddresses {
    /// The UniswapV2 factory
    pub uniswap_factory: Address,
    /// The wrapped ether token
    pub weth: Address,
    /// The UNI token
    pub uni_token: Address,
    /// The router the DCA contract swaps through
    pub swap_router: Address,
    /// The token the DCA contract accumulates
    pub base_token: Address,
}

impl Default for ExternalAddresses {
    fn default() -> Self {
        Self {
            uniswap_factory: DEFAULT_UNISWAP_FACTORY,
            weth: DEFAULT_WETH,
            uni_token: DEFAULT_UNI_TOKEN,
            swap_router: DEFAULT_SWAP_ROUTER,
            base_token: DEFAULT_BASE_TOKEN,
        }
    }
}

/// A fully resolved network profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    /// The name of the network
    pub name: String,
    /// The JSON-RPC endpoint of the network
    pub rpc_url: String,
    /// How long to wait for each transaction receipt
    pub tx_timeout: Duration,
    /// The external protocol addresses on this network
    pub addresses: ExternalAddresses,
}

impl DeployConfig {
    /// Read the configuration at the given path and load its `.env` file, if any
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadConfig(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_yaml(&contents)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config.load_dotenv()?;
        Ok(config)
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml(contents: &str) -> Result<Self, ScriptError> {
        serde_yaml::from_str(contents).map_err(|e| ScriptError::ReadConfig(e.to_string()))
    }

    /// Load the `.env` file named by the config into the process environment.
    ///
    /// Variables already set in the environment take precedence.
    fn load_dotenv(&self) -> Result<(), ScriptError> {
        let Some(dotenv) = &self.dotenv else {
            return Ok(());
        };

        let dotenv_path = self.base_dir.join(dotenv);
        if !dotenv_path.exists() {
            warn!("dotenv file {} not found, skipping", dotenv_path.display());
            return Ok(());
        }

        dotenvy::from_path(&dotenv_path)
            .map_err(|e| ScriptError::Configuration(format!("{}: {}", dotenv_path.display(), e)))?;
        debug!("loaded environment from {}", dotenv_path.display());
        Ok(())
    }

    /// The directory holding the compiled contract artifacts
    pub fn build_dir(&self) -> PathBuf {
        let build_dir = self
            .build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));
        self.base_dir.join(build_dir)
    }

    /// Derive the signing identity from the deployer wallet's private key.
    ///
    /// Touches neither the network nor any wallet other than the deployer's.
    pub fn signing_identity(&self) -> Result<PrivateKeySigner, ScriptError> {
        let key_path = format!("wallets.{DEPLOYER_WALLET_KEY}.private_key");
        let raw_key = self
            .wallets
            .get(DEPLOYER_WALLET_KEY)
            .and_then(|wallet| wallet.private_key.as_deref())
            .ok_or_else(|| ScriptError::Configuration(format!("`{key_path}` is not set")))?;

        let key = interpolate_env(raw_key)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ScriptError::Configuration(format!("`{key_path}` is empty")));
        }

        // Don't echo the key back in the error
        PrivateKeySigner::from_str(key).map_err(|_| {
            ScriptError::Configuration(format!("`{key_path}` is not a valid private key"))
        })
    }

    /// Resolve the named network profile, falling back to `networks.default`
    /// and then to the local development network.
    ///
    /// `rpc_override` replaces the profile's RPC URL, in which case the URL in
    /// the config is never interpolated.
    pub fn network_profile(
        &self,
        network: Option<&str>,
        rpc_override: Option<&str>,
    ) -> Result<NetworkProfile, ScriptError> {
        let name = network
            .or(self.networks.default.as_deref())
            .unwrap_or(DEFAULT_NETWORK);

        let raw = match self.networks.profiles.get(name) {
            Some(profile) => profile.clone(),
            // The development network may be used without declaring it
            None if name == DEFAULT_NETWORK => NetworkConfig::default(),
            None => {
                return Err(ScriptError::Configuration(format!(
                    "network `{name}` is not defined under `networks`"
                )))
            }
        };

        let rpc_url = match (rpc_override, &raw.rpc_url) {
            (Some(url), _) => url.to_string(),
            (None, Some(url)) => interpolate_env(url)?,
            (None, None) => DEFAULT_RPC_URL.to_string(),
        };

        let defaults = ExternalAddresses::default();
        let addresses = ExternalAddresses {
            uniswap_factory: resolve_address(
                raw.uniswap_factory.as_deref(),
                defaults.uniswap_factory,
            )?,
            weth: resolve_address(raw.weth.as_deref(), defaults.weth)?,
            uni_token: resolve_address(raw.uni_token.as_deref(), defaults.uni_token)?,
            swap_router: resolve_address(raw.swap_router.as_deref(), defaults.swap_router)?,
            base_token: resolve_address(raw.base_token.as_deref(), defaults.base_token)?,
        };

        Ok(NetworkProfile {
            name: name.to_string(),
            rpc_url,
            tx_timeout: Duration::from_secs(raw.tx_timeout_secs.unwrap_or(DEFAULT_TX_TIMEOUT_SECS)),
            addresses,
        })
    }
}

/// Parse an optional configured address, falling back to the given default
fn resolve_address(value: Option<&str>, default: Address) -> Result<Address, ScriptError> {
    let Some(value) = value else {
        return Ok(default);
    };

    let value = interpolate_env(value)?;
    Address::from_str(value.trim())
        .map_err(|e| ScriptError::Configuration(format!("invalid address `{value}`: {e}")))
}

/// Replace every `${NAME}` in the value with the environment variable `NAME`
pub fn interpolate_env(value: &str) -> Result<String, ScriptError> {
    let mut resolved = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        resolved.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            ScriptError::Configuration(format!("unterminated `${{` in config value `{value}`"))
        })?;

        let name = &after[..end];
        let var = env::var(name).map_err(|_| {
            ScriptError::Configuration(format!("environment variable `{name}` is not set"))
        })?;
        resolved.push_str(&var);
        rest = &after[end + 1..];
    }

    resolved.push_str(rest);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use alloy::primitives::address;

    use super::{interpolate_env, DeployConfig};
    use crate::{
        constants::{DEFAULT_BUILD_DIR, DEFAULT_RPC_URL, DEFAULT_SWAP_ROUTER, DEFAULT_UNI_TOKEN},
        errors::ScriptError,
    };

    /// The first default account of a local Anvil node
    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_signing_identity() {
        let config = DeployConfig::from_yaml(&format!(
            "wallets:\n  dev_account_1:\n    private_key: \"{ANVIL_KEY}\"\n"
        ))
        .unwrap();

        let signer = config.signing_identity().unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_signing_identity_from_env() {
        env::set_var("DCA_SCRIPTS_TEST_KEY", ANVIL_KEY);
        let config = DeployConfig::from_yaml(
            "wallets:\n  dev_account_1:\n    private_key: ${DCA_SCRIPTS_TEST_KEY}\n",
        )
        .unwrap();

        assert!(config.signing_identity().is_ok());
    }

    #[test]
    fn test_missing_private_key() {
        let config = DeployConfig::from_yaml("wallets:\n  other_account: {}\n").unwrap();
        assert!(matches!(
            config.signing_identity(),
            Err(ScriptError::Configuration(_))
        ));

        let config = DeployConfig::from_yaml(
            "wallets:\n  dev_account_1:\n    private_key: ${DCA_SCRIPTS_UNSET_KEY}\n",
        )
        .unwrap();
        assert!(matches!(
            config.signing_identity(),
            Err(ScriptError::Configuration(_))
        ));
    }

    #[test]
    fn test_malformed_private_key() {
        let config = DeployConfig::from_yaml(
            "wallets:\n  dev_account_1:\n    private_key: \"0xnotakey\"\n",
        )
        .unwrap();

        let err = config.signing_identity().unwrap_err();
        assert!(matches!(err, ScriptError::Configuration(_)));
        assert!(!err.to_string().contains("notakey"));
    }

    #[test]
    fn test_load_dotenv_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dotenv.test"),
            format!("DCA_SCRIPTS_DOTENV_KEY={ANVIL_KEY}\n"),
        )
        .unwrap();

        let config_path = dir.path().join("deploy-config.yaml");
        fs::write(
            &config_path,
            "dotenv: dotenv.test\n\
             wallets:\n  dev_account_1:\n    private_key: ${DCA_SCRIPTS_DOTENV_KEY}\n",
        )
        .unwrap();

        let config = DeployConfig::load(&config_path).unwrap();
        assert_eq!(config.build_dir(), dir.path().join(DEFAULT_BUILD_DIR));

        let signer = config.signing_identity().unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_load_without_dotenv_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("deploy-config.yaml");
        fs::write(
            &config_path,
            "dotenv: .env\n\
             wallets:\n  dev_account_1:\n    private_key: ${DCA_SCRIPTS_MISSING_DOTENV_KEY}\n",
        )
        .unwrap();

        // A missing dotenv file is skipped, the key it would have set stays unset
        let config = DeployConfig::load(&config_path).unwrap();
        assert!(matches!(
            config.signing_identity(),
            Err(ScriptError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DeployConfig::load(&dir.path().join("deploy-config.yaml")),
            Err(ScriptError::ReadConfig(_))
        ));
    }

    #[test]
    fn test_default_network_profile() {
        let config = DeployConfig::default();
        let profile = config.network_profile(None, None).unwrap();

        assert_eq!(profile.name, "development");
        assert_eq!(profile.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(profile.addresses.swap_router, DEFAULT_SWAP_ROUTER);
        assert_eq!(profile.addresses.base_token, DEFAULT_UNI_TOKEN);
    }

    #[test]
    fn test_network_overrides() {
        env::set_var("DCA_SCRIPTS_TEST_RPC", "https://rpc.example.org");
        let config = DeployConfig::from_yaml(
            r#"
networks:
  default: testnet
  testnet:
    rpc_url: ${DCA_SCRIPTS_TEST_RPC}
    tx_timeout_secs: 30
    swap_router: "0x0000000000000000000000000000000000000001"
"#,
        )
        .unwrap();

        let profile = config.network_profile(None, None).unwrap();
        assert_eq!(profile.name, "testnet");
        assert_eq!(profile.rpc_url, "https://rpc.example.org");
        assert_eq!(profile.tx_timeout.as_secs(), 30);
        assert_eq!(
            profile.addresses.swap_router,
            address!("0000000000000000000000000000000000000001")
        );
        assert_eq!(profile.addresses.uni_token, DEFAULT_UNI_TOKEN);

        let profile = config
            .network_profile(Some("testnet"), Some("http://localhost:9545"))
            .unwrap();
        assert_eq!(profile.rpc_url, "http://localhost:9545");
    }

    #[test]
    fn test_unknown_network() {
        let config = DeployConfig::default();
        assert!(matches!(
            config.network_profile(Some("mainnet"), None),
            Err(ScriptError::Configuration(_))
        ));
    }

    #[test]
    fn test_interpolate_env() {
        env::set_var("DCA_SCRIPTS_TEST_HOST", "node");
        assert_eq!(
            interpolate_env("http://${DCA_SCRIPTS_TEST_HOST}:8545").unwrap(),
            "http://node:8545"
        );
        assert_eq!(interpolate_env("no variables").unwrap(), "no variables");
        assert!(interpolate_env("${UNTERMINATED").is_err());
    }
}
