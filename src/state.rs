/// Reader failures tolerated over the lifetime of the process.
pub const MAX_RPC_FAILURES: u32 = 10;

/// State carried between poll iterations.
///
/// `rpc_failure_count` only ever grows; it is cleared by a restart and
/// nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    last_seen_hash: Option<String>,
    rpc_failure_count: u32,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen_hash(&self) -> Option<&str> {
        self.last_seen_hash.as_deref()
    }

    pub fn rpc_failure_count(&self) -> u32 {
        self.rpc_failure_count
    }

    pub fn is_seen(&self, hash: &str) -> bool {
        self.last_seen_hash.as_deref() == Some(hash)
    }

    pub fn mark_seen(&mut self, hash: &str) {
        self.last_seen_hash = Some(hash.to_string());
    }

    /// Counts one reader failure. Returns `true` once the threshold is reached.
    pub fn record_rpc_failure(&mut self) -> bool {
        self.rpc_failure_count = self.rpc_failure_count.saturating_add(1);
        self.rpc_failure_count >= MAX_RPC_FAILURES
    }
}
