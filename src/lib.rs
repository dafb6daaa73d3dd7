pub mod abi;
pub mod alert;
pub mod classifier;
pub mod config;
pub mod explorer;
pub mod notifier;
pub mod poller;
pub mod rpc;
pub mod state;
