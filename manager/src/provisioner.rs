use std::sync::Arc;

use algobox_common::{
    api::PendingTransactionResponse,
    config::{BOX_BYTE_MIN_BALANCE, BOX_FLAT_MIN_BALANCE},
    crypto::Address,
    transaction::builder::TransactionBuilder,
    utils::format_units,
};
use log::{debug, info};

use crate::{error::BoxError, pipeline::SubmissionPipeline};

/// Balance a box reserves on its application's account, in microunits.
pub fn box_min_balance(name: &[u8], size: u64) -> u64 {
    BOX_FLAT_MIN_BALANCE + BOX_BYTE_MIN_BALANCE * (name.len() as u64 + size)
}

/// Tops up application accounts before boxes are created.
pub struct BalanceProvisioner {
    pipeline: Arc<SubmissionPipeline>,
}

impl BalanceProvisioner {
    pub fn new(pipeline: Arc<SubmissionPipeline>) -> Self {
        Self { pipeline }
    }

    /// Send `amount` microunits from the signer to `receiver`.
    pub async fn transfer(
        &self,
        receiver: Address,
        amount: u64,
    ) -> Result<PendingTransactionResponse, BoxError> {
        let sender = self.pipeline.sender();
        info!(
            "Transferring {} microunits from {} to {}",
            amount, sender, receiver
        );

        let params = self.pipeline.suggested_params().await?;
        let txn = TransactionBuilder::new(sender, &params).payment(receiver, amount)?;
        self.pipeline.sign_and_submit(vec![txn]).await
    }

    /// Make sure `app_address` can afford box `name` of `size` bytes.
    ///
    /// Returns the funding transfer record when one was needed.
    pub async fn ensure_box_funding(
        &self,
        app_address: &Address,
        name: &[u8],
        size: u64,
    ) -> Result<Option<PendingTransactionResponse>, BoxError> {
        let account = self
            .pipeline
            .ledger()
            .account_information(app_address)
            .await?;
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "account {}: amount {}, min balance {}",
                app_address, account.amount, account.min_balance
            );
        }

        let required = box_min_balance(name, size);
        info!(
            "Box requires {} microunits, {} units",
            required,
            format_units(required)
        );

        if account.amount < account.min_balance.saturating_add(required) {
            let record = self.transfer(*app_address, required).await?;
            return Ok(Some(record));
        }

        Ok(None)
    }
}
