use algobox_common::{
    crypto::{Address, KeyPair},
    transaction::{SignedTransaction, Transaction, TransactionError},
};

/// Signing capability handed to the submission pipeline.
pub trait Signer: Send + Sync {
    fn address(&self) -> Address;

    fn sign_transaction(&self, txn: Transaction) -> Result<SignedTransaction, TransactionError>;
}

impl Signer for KeyPair {
    fn address(&self) -> Address {
        KeyPair::address(self)
    }

    fn sign_transaction(&self, txn: Transaction) -> Result<SignedTransaction, TransactionError> {
        let signature = self.sign(&txn.bytes_to_sign()?);
        Ok(SignedTransaction {
            sig: signature.to_vec(),
            txn,
        })
    }
}
