use crate::classifier::{BANKR_CAST_HASH, Classifier, DEFAULT_WATCH_FID, Route};
use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_EXPLORER_API_URL: &str = "https://api.basescan.org/api";
pub const DEFAULT_EXPLORER_WEB_URL: &str = "https://basescan.org";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub wallet_address: Address,
    pub rpc_url: String,
    pub explorer_api_url: String,
    pub explorer_web_url: String,
    pub explorer_api_key: Option<String>,
    pub telegram_bot_token: String,
    pub cast_hash_chat_id: String,
    pub fid_chat_id: Option<String>,
    pub watch_fid: U256,
    pub cast_hash_tag: String,
    pub poll_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| get(key).with_context(|| format!("{key} must be set in .env"));

        let wallet_address_str = require("WALLET_ADDRESS")?;
        let wallet_address = Address::from_str(wallet_address_str.trim())
            .context("Invalid WALLET_ADDRESS format")?;

        let rpc_url = require("RPC_URL")?;
        let telegram_bot_token = require("TELEGRAM_BOT_TOKEN")?;
        let cast_hash_chat_id = require("TELEGRAM_CHAT_ID")?;

        let watch_fid = match get("WATCH_FID") {
            Some(value) => U256::from_str(value.trim()).context("Invalid WATCH_FID")?,
            None => U256::from(DEFAULT_WATCH_FID),
        };

        let poll_interval_ms = match get("POLL_INTERVAL_MS") {
            Some(value) => value.trim().parse().context("Invalid POLL_INTERVAL_MS")?,
            None => DEFAULT_POLL_INTERVAL_MS,
        };

        Ok(Config {
            wallet_address,
            rpc_url,
            explorer_api_url: get("EXPLORER_API_URL")
                .unwrap_or_else(|| DEFAULT_EXPLORER_API_URL.to_string()),
            explorer_web_url: get("EXPLORER_WEB_URL")
                .unwrap_or_else(|| DEFAULT_EXPLORER_WEB_URL.to_string()),
            explorer_api_key: get("BASESCAN_API_KEY"),
            telegram_bot_token,
            cast_hash_chat_id,
            fid_chat_id: get("TELEGRAM_FID_CHAT_ID"),
            watch_fid,
            cast_hash_tag: get("CAST_HASH_TAG").unwrap_or_else(|| BANKR_CAST_HASH.to_string()),
            poll_interval: Duration::from_millis(poll_interval_ms),
        })
    }

    /// The cast-hash route always; the fid route when it has a channel.
    pub fn classifier(&self) -> Classifier {
        let mut routes = vec![Route::cast_hash(
            self.cast_hash_tag.clone(),
            self.cast_hash_chat_id.clone(),
        )];
        if let Some(fid_chat_id) = &self.fid_chat_id {
            routes.push(Route::fid(self.watch_fid, fid_chat_id.clone()));
        }
        Classifier::new(routes)
    }
}
