use crate::abi::{decode_call, find_transfer};
use crate::alert::Alert;
use crate::classifier::{Classifier, Route, RouteKind};
use crate::config::DEFAULT_EXPLORER_WEB_URL;
use crate::explorer::{TransactionRecord, TransactionSource};
use crate::notifier::Notifier;
use crate::rpc::{ChainReader, ReaderError};
use crate::state::{MAX_RPC_FAILURES, PollState};
use alloy_primitives::Address;
use std::convert::Infallible;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("RPC failed {failures} times, giving up")]
    RpcFailureThreshold { failures: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Input was empty or `0x`; nothing was decoded.
    NoCalldata,
    Failed,
    Decoded,
}

/// Result of handling a transaction not seen before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub hash: String,
    pub decode: DecodeStatus,
    pub routes: Vec<RouteKind>,
    pub token: Option<Address>,
    pub token_name: Option<String>,
}

impl Processed {
    fn skipped(hash: String, decode: DecodeStatus) -> Self {
        Self {
            hash,
            decode,
            routes: Vec::new(),
            token: None,
            token_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    FetchFailed,
    NoTransaction,
    Unchanged,
    Processed(Processed),
}

pub struct Poller<S, R, N> {
    source: S,
    reader: R,
    notifier: N,
    classifier: Classifier,
    explorer_web_url: String,
    poll_interval: Duration,
    state: PollState,
}

impl<S, R, N> Poller<S, R, N>
where
    S: TransactionSource,
    R: ChainReader,
    N: Notifier,
{
    pub fn new(source: S, reader: R, notifier: N, classifier: Classifier) -> Self {
        Poller {
            source,
            reader,
            notifier,
            classifier,
            explorer_web_url: DEFAULT_EXPLORER_WEB_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: PollState::new(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_explorer_web_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_web_url = url.into();
        self
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Polls forever. Only returns once the RPC failure threshold is hit.
    pub async fn run(&mut self) -> Result<Infallible, PollerError> {
        info!(
            "Polling every {} ms with {} route(s)",
            self.poll_interval.as_millis(),
            self.classifier.routes().len()
        );

        loop {
            self.tick().await?;
            sleep(self.poll_interval).await;
        }
    }

    /// One fetch, compare, process step.
    pub async fn tick(&mut self) -> Result<Tick, PollerError> {
        let record = match self.source.latest_transaction().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                info!("No transaction returned for the wallet");
                return Ok(Tick::NoTransaction);
            }
            Err(e) => {
                warn!("Failed to fetch latest transaction: {}", e);
                return Ok(Tick::FetchFailed);
            }
        };

        if self.state.is_seen(&record.hash) {
            debug!("No new transaction");
            return Ok(Tick::Unchanged);
        }

        self.process(record).await.map(Tick::Processed)
    }

    async fn process(&mut self, record: TransactionRecord) -> Result<Processed, PollerError> {
        // Marked before any fallible step so a bad transaction is never retried.
        self.state.mark_seen(&record.hash);
        let hash = record.hash.clone();

        if record.has_no_calldata() {
            info!("Tx {} has no call data, skipping", hash);
            return Ok(Processed::skipped(hash, DecodeStatus::NoCalldata));
        }

        let config = match decode_call(&record.input) {
            Ok(config) => config,
            Err(e) => {
                info!("Tx {} is not a deployToken call: {}", hash, e);
                return Ok(Processed::skipped(hash, DecodeStatus::Failed));
            }
        };

        let routes: Vec<Route> = self.classifier.classify(&config).into_iter().cloned().collect();
        if routes.is_empty() {
            info!(
                "Tx {} ({}) matches no route, castHash {:?}, fid {}",
                hash, config.symbol, config.castHash, config.fid
            );
            return Ok(Processed::skipped(hash, DecodeStatus::Decoded));
        }

        let token = self.find_token(&hash).await?;
        let token_name = match token {
            Some(token) => self.read_token_name(token).await?,
            None => None,
        };

        info!(
            "Tx {} matched {:?}, token {:?}, name {:?}, castHash {:?}",
            hash,
            routes.iter().map(|r| r.kind.as_str()).collect::<Vec<_>>(),
            token,
            token_name,
            config.castHash
        );

        let alert = Alert {
            tx_hash: &hash,
            config: &config,
            token,
            token_name: token_name.as_deref(),
        };
        for route in &routes {
            let text = alert.render(&route.template, &self.explorer_web_url);
            match self.notifier.notify(&route.channel, &text).await {
                Ok(()) => info!("Sent {} alert for {}", route.kind.as_str(), hash),
                Err(e) => error!("Failed to send {} alert for {}: {}", route.kind.as_str(), hash, e),
            }
        }

        Ok(Processed {
            routes: routes.iter().map(|route| route.kind).collect(),
            hash,
            decode: DecodeStatus::Decoded,
            token,
            token_name,
        })
    }

    async fn find_token(&mut self, hash: &str) -> Result<Option<Address>, PollerError> {
        match self.reader.transaction_logs(hash).await {
            Ok(logs) => {
                let transfer = find_transfer(&logs);
                if transfer.is_none() {
                    info!("No ERC-20 Transfer event in receipt of {}", hash);
                }
                Ok(transfer.map(|t| t.token))
            }
            Err(e) => {
                self.record_reader_failure("fetch receipt", &e)?;
                Ok(None)
            }
        }
    }

    async fn read_token_name(&mut self, token: Address) -> Result<Option<String>, PollerError> {
        match self.reader.token_name(token).await {
            Ok(name) => Ok(Some(name)),
            Err(e) => {
                self.record_reader_failure("read token name", &e)?;
                Ok(None)
            }
        }
    }

    fn record_reader_failure(&mut self, action: &str, e: &ReaderError) -> Result<(), PollerError> {
        let reached = self.state.record_rpc_failure();
        let failures = self.state.rpc_failure_count();
        error!(
            "Failed to {} (failure {}/{}): {}",
            action, failures, MAX_RPC_FAILURES, e
        );

        if reached {
            return Err(PollerError::RpcFailureThreshold { failures });
        }
        Ok(())
    }
}
