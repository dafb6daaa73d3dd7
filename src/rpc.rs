use crate::abi::nameCall;
use alloy::providers::fillers::FillProvider;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Log, TransactionRequest};
use alloy::sol_types::SolCall;
use alloy::transports::TransportError;
use alloy_primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

type AlloyFullProvider = FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::Identity,
        alloy::providers::fillers::JoinFill<
            alloy::providers::fillers::GasFiller,
            alloy::providers::fillers::JoinFill<
                alloy::providers::fillers::BlobGasFiller,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::NonceFiller,
                    alloy::providers::fillers::ChainIdFiller,
                >,
            >,
        >,
    >,
    alloy::providers::RootProvider,
>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(9);

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("invalid transaction hash {0}")]
    InvalidHash(String),

    #[error("receipt not found for {0}")]
    ReceiptNotFound(String),

    #[error("rpc error: {0}")]
    Rpc(#[from] TransportError),

    #[error("request timeout after {} seconds", REQUEST_TIMEOUT.as_secs())]
    Timeout,

    #[error("could not decode call result: {0}")]
    Decode(#[from] alloy::sol_types::Error),
}

/// Read-only chain access used to enrich a matched deployment.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Logs from the confirmed receipt of `tx_hash`.
    async fn transaction_logs(&self, tx_hash: &str) -> Result<Vec<Log>, ReaderError>;

    /// ERC-20 `name()` of `token`.
    async fn token_name(&self, token: Address) -> Result<String, ReaderError>;
}

#[derive(Clone)]
pub struct RpcClient {
    provider: AlloyFullProvider,
    url: String,
}

impl RpcClient {
    pub fn new(rpc_url: &str) -> anyhow::Result<Self> {
        let parsed_url = rpc_url
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid RPC URL: {}", rpc_url))?;
        let provider: AlloyFullProvider = ProviderBuilder::new().connect_http(parsed_url);

        Ok(RpcClient {
            provider,
            url: rpc_url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn call_contract<C: SolCall>(
        &self,
        address: Address,
        call: C,
    ) -> Result<C::Return, ReaderError> {
        let request = TransactionRequest::default()
            .to(address)
            .input(Bytes::from(call.abi_encode()).into());

        let output = timeout(REQUEST_TIMEOUT, self.provider.call(request))
            .await
            .map_err(|_| ReaderError::Timeout)??;

        Ok(C::abi_decode_returns(&output)?)
    }
}

#[async_trait]
impl ChainReader for RpcClient {
    async fn transaction_logs(&self, tx_hash: &str) -> Result<Vec<Log>, ReaderError> {
        let hash: TxHash = tx_hash
            .parse()
            .map_err(|_| ReaderError::InvalidHash(tx_hash.to_string()))?;

        let receipt = timeout(REQUEST_TIMEOUT, self.provider.get_transaction_receipt(hash))
            .await
            .map_err(|_| ReaderError::Timeout)??
            .ok_or_else(|| ReaderError::ReceiptNotFound(tx_hash.to_string()))?;

        let logs = receipt.inner.logs().to_vec();
        debug!("Receipt for {} carries {} logs", tx_hash, logs.len());
        Ok(logs)
    }

    async fn token_name(&self, token: Address) -> Result<String, ReaderError> {
        self.call_contract(token, nameCall {}).await
    }
}
