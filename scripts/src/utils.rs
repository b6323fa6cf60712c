//! Utilities for the deploy scripts.

use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use tracing::info;

use crate::errors::ScriptError;

/// Sets up the client with which transactions are signed and sent,
/// checking that the RPC endpoint is reachable.
pub async fn setup_client(
    signer: PrivateKeySigner,
    rpc_url: &str,
) -> Result<DynProvider, ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new().wallet(signer).connect_http(url);

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    info!("connected to chain {chain_id} at {rpc_url}");

    Ok(DynProvider::new(provider))
}

/// Check the status of a mined transaction, mapping a revert to the given error
pub fn ensure_tx_success(
    receipt: &TransactionReceipt,
    to_err: impl FnOnce(String) -> ScriptError,
) -> Result<(), ScriptError> {
    if receipt.status() {
        Ok(())
    } else {
        Err(to_err(format!(
            "transaction {:#x} reverted",
            receipt.transaction_hash
        )))
    }
}


#[cfg(test)]
mod tests {
    use alloy::primitives::Address;

    use super::{ensure_tx_success, test_helpers::mock_receipt};
    use crate::errors::ScriptError;

    #[test]
    fn test_successful_tx() {
        let receipt = mock_receipt(true /* status */, None);
        assert!(ensure_tx_success(&receipt, ScriptError::ContractInteraction).is_ok());
    }

    #[test]
    fn test_reverted_tx() {
        let receipt = mock_receipt(false /* status */, Some(Address::repeat_byte(0x01)));

        let err = ensure_tx_success(&receipt, ScriptError::ContractInteraction).unwrap_err();
        assert!(matches!(err, ScriptError::ContractInteraction(_)));
        assert!(err.to_string().contains("reverted"));

        let err = ensure_tx_success(&receipt, ScriptError::ContractDeployment).unwrap_err();
        assert!(matches!(err, ScriptError::ContractDeployment(_)));
    }
}
