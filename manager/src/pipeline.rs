use std::sync::Arc;

use algobox_common::{
    api::PendingTransactionResponse,
    config::DEFAULT_WAIT_ROUNDS,
    crypto::Address,
    transaction::{
        assign_group_id, SignedTransaction, SuggestedParams, Transaction, TransactionError,
    },
};
use log::{debug, info, trace};

use crate::{
    error::BoxError,
    ledger_api::{ConfirmationOutcome, LedgerClient},
    signer::Signer,
};

/// Signs, submits and waits for transaction groups.
///
/// This is the only component that writes to the ledger.
pub struct SubmissionPipeline {
    ledger: Arc<dyn LedgerClient>,
    signer: Arc<dyn Signer>,
    wait_rounds: u64,
}

impl SubmissionPipeline {
    pub fn new(ledger: Arc<dyn LedgerClient>, signer: Arc<dyn Signer>) -> Self {
        Self {
            ledger,
            signer,
            wait_rounds: DEFAULT_WAIT_ROUNDS,
        }
    }

    pub fn with_wait_rounds(mut self, wait_rounds: u64) -> Self {
        self.wait_rounds = wait_rounds;
        self
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    pub fn sender(&self) -> Address {
        self.signer.address()
    }

    pub fn wait_rounds(&self) -> u64 {
        self.wait_rounds
    }

    pub async fn suggested_params(&self) -> Result<SuggestedParams, BoxError> {
        let params = self.ledger.suggested_params().await?;
        Ok(SuggestedParams::try_from(params)?)
    }

    /// Submit an already signed group and report how it ended.
    ///
    /// The last transaction of the group is the one tracked.
    pub async fn submit_outcome(&self, group: &[Vec<u8>]) -> Result<ConfirmationOutcome, BoxError> {
        let last = group.last().ok_or(TransactionError::EmptyGroup)?;
        let tx_id = SignedTransaction::from_msgpack(last)?.id()?;
        if log::log_enabled!(log::Level::Trace) {
            trace!("submitting group of {}, tracking {}", group.len(), tx_id);
        }

        let submitted = self.ledger.submit_raw_group(group).await?;
        info!("Transaction: {}", submitted);

        Ok(self
            .ledger
            .wait_for_confirmation(&tx_id, self.wait_rounds)
            .await?)
    }

    /// Submit an already signed group and wait for it to be confirmed.
    pub async fn submit_raw(
        &self,
        group: &[Vec<u8>],
    ) -> Result<PendingTransactionResponse, BoxError> {
        match self.submit_outcome(group).await? {
            ConfirmationOutcome::Confirmed(record) => {
                if log::log_enabled!(log::Level::Info) {
                    info!(
                        "Confirmed in round {}: {}",
                        record.confirmed_round.unwrap_or_default(),
                        serde_json::to_string(&record).unwrap_or_default()
                    );
                }
                Ok(record)
            }
            ConfirmationOutcome::TimedOut { tx_id, rounds } => {
                Err(BoxError::ConfirmationTimeout { tx_id, rounds })
            }
            ConfirmationOutcome::Rejected(reason) => Err(BoxError::SubmissionFailed(reason)),
        }
    }

    pub async fn submit_signed(
        &self,
        group: &[SignedTransaction],
    ) -> Result<PendingTransactionResponse, BoxError> {
        let encoded = group
            .iter()
            .map(SignedTransaction::to_msgpack)
            .collect::<Result<Vec<_>, _>>()?;
        self.submit_raw(&encoded).await
    }

    /// Group, sign and submit `transactions` with the pipeline's signer.
    pub async fn sign_and_submit(
        &self,
        mut transactions: Vec<Transaction>,
    ) -> Result<PendingTransactionResponse, BoxError> {
        if let Some(group_id) = assign_group_id(&mut transactions)? {
            if log::log_enabled!(log::Level::Debug) {
                debug!("group id {} for {} transactions", group_id, transactions.len());
            }
        }

        let signed = transactions
            .into_iter()
            .map(|txn| self.signer.sign_transaction(txn))
            .collect::<Result<Vec<_>, _>>()?;
        self.submit_signed(&signed).await
    }
}
