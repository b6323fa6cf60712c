//! Definitions of Solidity functions called after deployment

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IReward {
        function setupNewOwner(address newOwner) external;
        function owner() external view returns (address);
    }
}
