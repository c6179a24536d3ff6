pub mod boxes;
pub mod deploy;
pub mod error;
pub mod ledger_api;
pub mod pipeline;
pub mod provisioner;
pub mod signer;
pub mod slots;

#[cfg(feature = "cli")]
pub mod config;
