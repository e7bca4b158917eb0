use crate::error::{from_rpc_error, RaffleError, Result};
use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider, ProviderError, RpcError};
use ethers::types::Address;

/// JSON-RPC code for a method the provider does not implement.
const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// Account access and network identification, as exposed by a browser-style wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the wallet for account access and returns the selected account.
    async fn request_account(&self) -> Result<Address>;

    async fn chain_id(&self) -> Result<u64>;
}

/// Wallet reached over JSON-RPC; signing stays inside the wallet.
pub struct InjectedWallet {
    provider: Provider<Http>,
}

impl InjectedWallet {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| RaffleError::config(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;
        Ok(Self { provider })
    }

    pub fn provider(&self) -> &Provider<Http> {
        &self.provider
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        let requested: std::result::Result<Vec<Address>, ProviderError> =
            self.provider.request("eth_requestAccounts", ()).await;

        match requested {
            Ok(accounts) => Ok(accounts),
            Err(e)
                if e.as_error_response()
                    .is_some_and(|resp| resp.code == METHOD_NOT_FOUND_CODE) =>
            {
                tracing::debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.provider
                    .get_accounts()
                    .await
                    .map_err(|e| from_rpc_error(&e, "Failed to list accounts"))
            }
            Err(e) => Err(from_rpc_error(&e, "Account request failed")),
        }
    }
}

#[async_trait]
impl WalletProvider for InjectedWallet {
    async fn request_account(&self) -> Result<Address> {
        let accounts = self.accounts().await?;
        accounts
            .first()
            .copied()
            .ok_or_else(|| RaffleError::wallet("Wallet exposed no accounts"))
    }

    async fn chain_id(&self) -> Result<u64> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| from_rpc_error(&e, "Failed to read chain id"))?;
        Ok(chain_id.as_u64())
    }
}

/// Fails with `WrongNetwork` unless the wallet sits on the expected chain.
pub async fn ensure_network(wallet: &dyn WalletProvider, expected: u64) -> Result<()> {
    let actual = wallet.chain_id().await?;
    if actual != expected {
        return Err(RaffleError::WrongNetwork { expected, actual });
    }
    Ok(())
}
