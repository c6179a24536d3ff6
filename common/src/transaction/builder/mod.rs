//! Construction of unsigned transactions from suggested network parameters.
//!
//! Application calls are described by [`AppCallConfig`], a single structure
//! whose optional lists are always present and simply empty when unused.

use log::trace;
use serde_bytes::ByteBuf;

use super::{
    BoxReference, OnComplete, StateSchema, SuggestedParams, Transaction, TransactionError,
    TransactionType,
};
use crate::{config::SIGNATURE_OVERHEAD, crypto::Address};

/// Everything an application call may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppCallConfig {
    pub app_id: u64,
    pub on_complete: OnComplete,
    pub args: Vec<Vec<u8>>,
    pub boxes: Vec<BoxReference>,
    pub foreign_assets: Vec<u64>,
    pub foreign_apps: Vec<u64>,
    pub accounts: Vec<Address>,
    pub note: Option<Vec<u8>>,
}

impl AppCallConfig {
    pub fn new(app_id: u64) -> Self {
        Self {
            app_id,
            ..Default::default()
        }
    }

    pub fn with_args(mut self, args: Vec<Vec<u8>>) -> Self {
        self.args = args;
        self
    }

    pub fn with_boxes(mut self, boxes: Vec<BoxReference>) -> Self {
        self.boxes = boxes;
        self
    }

    // Boxes, assets, apps and accounts share one per-transaction budget
    pub fn total_references(&self) -> usize {
        self.boxes.len() + self.foreign_assets.len() + self.foreign_apps.len() + self.accounts.len()
    }

    pub fn total_args_len(&self) -> usize {
        self.args.iter().map(Vec::len).sum()
    }
}

/// Parameters of an application creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppCreateConfig {
    pub approval_program: Vec<u8>,
    pub clear_program: Vec<u8>,
    pub global_schema: StateSchema,
    pub local_schema: StateSchema,
    pub on_complete: OnComplete,
    pub args: Vec<Vec<u8>>,
}

pub struct TransactionBuilder<'a> {
    sender: Address,
    params: &'a SuggestedParams,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(sender: Address, params: &'a SuggestedParams) -> Self {
        Self { sender, params }
    }

    fn base(&self, tx_type: TransactionType) -> Transaction {
        Transaction {
            first_valid: self.params.first_valid,
            last_valid: self.params.last_valid,
            genesis_id: self.params.genesis_id.clone(),
            genesis_hash: ByteBuf::from(self.params.genesis_hash.clone()),
            sender: self.sender,
            tx_type,
            ..Default::default()
        }
    }

    // fee = max(min_fee, fee_per_byte * estimated signed size)
    fn with_fee(&self, mut tx: Transaction) -> Result<Transaction, TransactionError> {
        tx.fee = self.params.min_fee;
        let size = tx.to_msgpack()?.len() as u64 + SIGNATURE_OVERHEAD;
        let fee = self.params.fee_per_byte.saturating_mul(size);
        tx.fee = fee.max(self.params.min_fee);
        if log::log_enabled!(log::Level::Trace) {
            trace!("estimated size {} bytes, fee {}", size, tx.fee);
        }
        Ok(tx)
    }

    /// Transfer `amount` microunits to `receiver`.
    pub fn payment(&self, receiver: Address, amount: u64) -> Result<Transaction, TransactionError> {
        let mut tx = self.base(TransactionType::Payment);
        tx.receiver = Some(receiver);
        tx.amount = amount;
        self.with_fee(tx)
    }

    /// Call an existing application.
    pub fn application_call(&self, config: AppCallConfig) -> Result<Transaction, TransactionError> {
        let mut tx = self.base(TransactionType::ApplicationCall);
        tx.app_id = config.app_id;
        tx.on_complete = config.on_complete;
        tx.app_args = config.args.into_iter().map(ByteBuf::from).collect();
        tx.boxes = config.boxes;
        tx.foreign_assets = config.foreign_assets;
        tx.foreign_apps = config.foreign_apps;
        tx.accounts = config.accounts;
        tx.note = config.note;
        self.with_fee(tx)
    }

    /// Create a new application.
    pub fn application_create(
        &self,
        config: AppCreateConfig,
    ) -> Result<Transaction, TransactionError> {
        let mut tx = self.base(TransactionType::ApplicationCall);
        tx.on_complete = config.on_complete;
        tx.approval_program = Some(config.approval_program);
        tx.clear_program = Some(config.clear_program);
        tx.global_schema = Some(config.global_schema).filter(|schema| !schema.is_empty());
        tx.local_schema = Some(config.local_schema).filter(|schema| !schema.is_empty());
        tx.app_args = config.args.into_iter().map(ByteBuf::from).collect();
        self.with_fee(tx)
    }
}
